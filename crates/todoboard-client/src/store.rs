use crate::{ClientConfig, RemoteStoreError};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use todoboard_transfer::{
    CreateTodoRequest, ErrorResponse, ListTodosQuery, TodoDocument, UpdateTodoRequest,
};
use tracing::{error, info};
use uuid::Uuid;

/// The narrow contract the client needs from a remote document store.
///
/// Every call is exactly one round trip. `update` and `delete` only
/// acknowledge; they never echo the stored document.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<TodoDocument>, RemoteStoreError>;
    async fn create(&self, req: CreateTodoRequest) -> Result<TodoDocument, RemoteStoreError>;
    async fn update(&self, id: Uuid, req: UpdateTodoRequest) -> Result<(), RemoteStoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), RemoteStoreError>;
}

/// Store reached over the JSON API served by the `todoboard` binary.
#[derive(Debug, Clone)]
pub struct HttpTodoStore {
    client: Client,
    api_base: String,
}

impl HttpTodoStore {
    pub fn new(config: &ClientConfig) -> Result<Self, RemoteStoreError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.clone(),
        })
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.api_base)
    }

    fn todo_url(&self, id: Uuid) -> String {
        format!("{}/todos/{}", self.api_base, id)
    }
}

#[async_trait]
impl TodoStore for HttpTodoStore {
    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<TodoDocument>, RemoteStoreError> {
        info!(owner_id = ?owner_id, "Fetching todos from API");
        let query = ListTodosQuery {
            owner_id: owner_id.map(str::to_owned),
        };
        let response = self
            .client
            .get(self.todos_url())
            .query(&query)
            .send()
            .await
            .inspect_err(|e| error!(error = %e, "Request to fetch todos failed"))?;

        let response = check_status(response, None).await?;
        response.json::<Vec<TodoDocument>>().await.map_err(|e| {
            error!(error = %e, "Failed to deserialize todos");
            RemoteStoreError::Decode(e.to_string())
        })
    }

    async fn create(&self, req: CreateTodoRequest) -> Result<TodoDocument, RemoteStoreError> {
        info!(title = %req.title, "Creating todo via API");
        let response = self
            .client
            .post(self.todos_url())
            .json(&req)
            .send()
            .await
            .inspect_err(|e| error!(error = %e, "Request to create todo failed"))?;

        let response = check_status(response, None).await?;
        response.json::<TodoDocument>().await.map_err(|e| {
            error!(error = %e, "Failed to deserialize created todo");
            RemoteStoreError::Decode(e.to_string())
        })
    }

    async fn update(&self, id: Uuid, req: UpdateTodoRequest) -> Result<(), RemoteStoreError> {
        info!(%id, "Updating todo via API");
        let response = self
            .client
            .put(self.todo_url(id))
            .json(&req)
            .send()
            .await
            .inspect_err(|e| error!(error = %e, %id, "Request to update todo failed"))?;

        check_status(response, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RemoteStoreError> {
        info!(%id, "Deleting todo via API");
        let response = self
            .client
            .delete(self.todo_url(id))
            .send()
            .await
            .inspect_err(|e| error!(error = %e, %id, "Request to delete todo failed"))?;

        check_status(response, Some(id)).await?;
        Ok(())
    }
}

/// Turns a non-success response into the matching store error.
async fn check_status(response: Response, id: Option<Uuid>) -> Result<Response, RemoteStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
        error!(%id, "Todo not found in store");
        return Err(RemoteStoreError::NotFound(id));
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    error!(status = status.as_u16(), message = %message, "Todo store rejected request");
    Err(RemoteStoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}
