use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use todoboard_model::{
    NewTodo, Owner, Priority as ModelPriority, Todo, TodoDb, TodoPatch, ValidationError,
};
use todoboard_transfer::{
    CreateTodoRequest, ErrorResponse, ListTodosQuery, Priority, TodoDocument, UpdateTodoRequest,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod config;
use config::ServerConfig;

#[derive(Clone)]
struct AppState {
    db: Arc<TodoDb>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(?config, "Starting todoboard store");

    let db = TodoDb::new(&config.data_dir).context("Failed to open database")?;
    let origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .context("Invalid TODOBOARD_ALLOWED_ORIGIN")?;

    let app = app(AppState { db: Arc::new(db) })
        .layer(CorsLayer::permissive().allow_origin(origin))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")
}

fn app(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(state);

    Router::new().nest("/api", api_router)
}

// Handlers

async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<ListTodosQuery>,
) -> Result<Json<Vec<TodoDocument>>, AppError> {
    info!(owner_id = ?query.owner_id, "Listing todos");
    let todos = state.db.list(query.owner_id.as_deref())?;
    Ok(Json(todos.into_iter().map(todo_to_document).collect()))
}

async fn create_todo(
    State(state): State<AppState>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoDocument>), AppError> {
    info!(title = %req.title, user_id = %req.user_id, "Creating todo");
    let owner = Owner::new(req.user_id, req.user_name);
    let fields = NewTodo {
        title: req.title,
        description: req.description,
        priority: priority_to_model(req.priority),
        completed: req.completed,
        due_date: req.due_date,
    };
    let todo = Todo::create(fields, owner)?;
    state.db.insert(&todo)?;
    Ok((StatusCode::CREATED, Json(todo_to_document(todo))))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TodoDocument>, AppError> {
    info!(%id, "Fetching todo");
    let todo = state.db.get(&id)?.ok_or(AppError::NotFound(id))?;
    Ok(Json(todo_to_document(todo)))
}

/// Acknowledges with 204; the stored document is not echoed back.
async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<StatusCode, AppError> {
    info!(%id, "Updating todo");
    let patch = request_to_patch(req);
    patch.validate()?;

    let mut todo = state.db.get(&id)?.ok_or(AppError::NotFound(id))?;
    todo.apply(&patch);
    state.db.update(&todo)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    info!(%id, "Deleting todo");
    if state.db.delete(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(id))
    }
}

// Helper functions

fn todo_to_document(todo: Todo) -> TodoDocument {
    TodoDocument {
        id: todo.id,
        title: todo.title,
        description: todo.description,
        priority: model_priority_to_transfer(todo.priority),
        completed: todo.completed,
        due_date: todo.due_date,
        created_at: todo.created_at,
        user_id: todo.owner.id,
        user_name: todo.owner.name,
    }
}

fn request_to_patch(req: UpdateTodoRequest) -> TodoPatch {
    TodoPatch {
        title: req.title,
        description: req.description,
        priority: req.priority.map(priority_to_model),
        completed: req.completed,
        due_date: req.due_date,
    }
}

fn priority_to_model(priority: Priority) -> ModelPriority {
    match priority {
        Priority::Low => ModelPriority::Low,
        Priority::Mid => ModelPriority::Mid,
        Priority::High => ModelPriority::High,
    }
}

fn model_priority_to_transfer(priority: ModelPriority) -> Priority {
    match priority {
        ModelPriority::Low => Priority::Low,
        ModelPriority::Mid => Priority::Mid,
        ModelPriority::High => Priority::High,
    }
}

// Error handling

enum AppError {
    DatabaseError(anyhow::Error),
    NotFound(Uuid),
    Invalid(ValidationError),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Invalid(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::DatabaseError(err) => {
                error!(error = %err, "database error while handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AppError::NotFound(id) => {
                error!(%id, "todo not found");
                (StatusCode::NOT_FOUND, format!("Todo with id {} not found", id))
            }
            AppError::Invalid(err) => {
                warn!(error = %err, "rejected invalid todo");
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let db = TodoDb::new(dir.path()).unwrap();
            Self {
                router: app(AppState { db: Arc::new(db) }),
                _dir: dir,
            }
        }

        async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let builder = Request::builder().method(method).uri(uri);
            let request = match body {
                Some(body) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn create(&self, title: &str, user_id: &str) -> TodoDocument {
            let (status, body) = self
                .send(
                    "POST",
                    "/api/todos",
                    Some(json!({ "title": title, "user_id": user_id, "user_name": "Ada" })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            serde_json::from_value(body).unwrap()
        }
    }

    #[tokio::test]
    async fn test_create_and_list_by_owner() {
        let app = TestApp::new();
        let created = app.create("Water plants", "user_ada").await;
        app.create("Other person's todo", "user_bob").await;

        assert_eq!(created.title, "Water plants");
        assert_eq!(created.priority, Priority::Low);
        assert!(!created.completed);

        let (status, body) = app.send("GET", "/api/todos?owner_id=user_ada", None).await;
        assert_eq!(status, StatusCode::OK);
        let listed: Vec<TodoDocument> = serde_json::from_value(body).unwrap();
        assert_eq!(listed, vec![created]);

        let (_, body) = app.send("GET", "/api/todos", None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let app = TestApp::new();
        let (status, body) = app
            .send(
                "POST",
                "/api/todos",
                Some(json!({ "title": " ", "user_id": "u", "user_name": "n" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "title must not be empty");
    }

    #[tokio::test]
    async fn test_update_acknowledges_without_body() {
        let app = TestApp::new();
        let created = app.create("Draft", "user_ada").await;
        let uri = format!("/api/todos/{}", created.id);

        let (status, body) = app
            .send(
                "PUT",
                &uri,
                Some(json!({ "completed": true, "priority": "high" })),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = app.send("GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let stored: TodoDocument = serde_json::from_value(body).unwrap();
        assert!(stored.completed);
        assert_eq!(stored.priority, Priority::High);
        assert_eq!(stored.title, "Draft");
        assert_eq!(stored.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_validation_and_missing_todo() {
        let app = TestApp::new();
        let created = app.create("Draft", "user_ada").await;

        let (status, _) = app
            .send(
                "PUT",
                &format!("/api/todos/{}", created.id),
                Some(json!({ "title": "" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = app
            .send(
                "PUT",
                &format!("/api/todos/{}", Uuid::new_v4()),
                Some(json!({ "completed": true })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete() {
        let app = TestApp::new();
        let created = app.create("Temporary", "user_ada").await;
        let uri = format!("/api/todos/{}", created.id);

        let (status, _) = app.send("DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = app.send("DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));

        let (status, _) = app.send("GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
