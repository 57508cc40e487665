use crate::api::client::{ApiClient, CsvDownload};
use crate::chat::types::{ChatRequest, ChatResponse};
use crate::error::ApiError;
use async_trait::async_trait;

/// Seam between conversation state and the network. The real implementation
/// is [`ApiClient`]; tests substitute mocks.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;

    async fn export_csv(&self, thread_id: &str) -> Result<CsvDownload, ApiError>;
}

#[async_trait]
impl ChatTransport for ApiClient {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.chat(request).await
    }

    async fn export_csv(&self, thread_id: &str) -> Result<CsvDownload, ApiError> {
        self.export_chat_csv(thread_id).await
    }
}
