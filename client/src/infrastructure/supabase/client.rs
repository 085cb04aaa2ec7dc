//! 共享 HTTP 客户端

use std::time::Duration;

use gavel_config::ProviderConfig;
use gavel_errors::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;
use url::Url;

/// 托管后端的 HTTP 客户端
///
/// 持有 anon key 和当前会话的 access token；token 由 auth 适配器
/// 在登录/恢复/登出时更新，REST 调用自动携带。
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: Secret<String>,
    access_token: RwLock<Option<String>>,
}

impl SupabaseClient {
    pub fn new(config: &ProviderConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| AppError::validation(format!("Invalid provider url: {}", e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            anon_key: config.anon_key.clone(),
            access_token: RwLock::new(None),
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// 拼接 API 路径
    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::internal(format!("Invalid endpoint path: {}", e)))
    }

    pub async fn set_access_token(&self, token: impl Into<String>) {
        *self.access_token.write().await = Some(token.into());
    }

    pub async fn clear_access_token(&self) {
        *self.access_token.write().await = None;
    }

    /// 认证头：apikey + bearer（无会话时 bearer 退回 anon key）
    pub async fn auth_headers(&self) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let anon = self.anon_key.expose_secret();

        headers.insert(
            "apikey",
            HeaderValue::from_str(anon)
                .map_err(|_| AppError::internal("Invalid anon key header"))?,
        );

        let bearer = match self.access_token.read().await.as_deref() {
            Some(token) => format!("Bearer {}", token),
            None => format!("Bearer {}", anon),
        };
        headers.insert(
            reqwest::header::AUTHORIZATION,
            HeaderValue::from_str(&bearer)
                .map_err(|_| AppError::internal("Invalid bearer header"))?,
        );

        Ok(headers)
    }

    /// 统一的响应检查：非 2xx 按状态码映射为 AppError
    ///
    /// 响应体只进日志上下文，不进用户可见消息
    pub async fn check(&self, response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response.text().await.unwrap_or_default();
        Err(AppError::from_provider_status(status.as_u16(), detail))
    }
}
