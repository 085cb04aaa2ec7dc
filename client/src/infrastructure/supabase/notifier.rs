//! Edge function 通知适配器

use std::sync::Arc;

use async_trait::async_trait;
use gavel_errors::{AppError, AppResult};
use gavel_ports::NotificationSender;

use super::client::SupabaseClient;

/// 欢迎邮件通过后端 edge function 投递
pub struct EdgeFunctionNotifier {
    client: Arc<SupabaseClient>,
}

impl EdgeFunctionNotifier {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationSender for EdgeFunctionNotifier {
    async fn send_welcome_email(
        &self,
        to: &str,
        payload: &serde_json::Value,
    ) -> AppResult<()> {
        let url = self.client.endpoint("functions/v1/send-welcome-email")?;
        let headers = self.client.auth_headers().await?;

        let mut body = payload.clone();
        body["to"] = serde_json::Value::String(to.to_string());

        let response = self
            .client
            .http()
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        self.client.check(response).await.map(|_| ())
    }
}
