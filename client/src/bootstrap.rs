//! 应用装配
//!
//! 宿主进程的统一入口：加载配置、初始化遥测、把适配器与
//! 服务接成一棵依赖树。安全存储与生物识别门由平台侧注入，
//! 开发宿主可以用进程内实现。

use std::sync::Arc;

use gavel_config::AppConfig;
use gavel_errors::{AppError, AppResult};
use gavel_ports::{BiometricGate, SecureStore};
use tracing::info;

use crate::application::{
    AccessController, CaseService, DocumentService, SessionManager, UserAdminService,
};
use crate::domain::document::UploadPolicy;
use crate::infrastructure::supabase::{
    EdgeFunctionNotifier, SupabaseAuthProvider, SupabaseCaseRepository, SupabaseClient,
    SupabaseDocumentRepository, SupabaseDocumentStorage, SupabaseProfileRepository,
};

/// 装配好的服务容器
///
/// 进程内唯一实例；UI 层只通过这里拿服务句柄。
pub struct AppContext {
    config: AppConfig,
    /// 进程内聚合的 metrics 快照句柄；是否导出由宿主决定
    metrics: Option<gavel_telemetry::PrometheusHandle>,
    pub session: Arc<SessionManager>,
    pub access: Arc<AccessController>,
    pub users: Arc<UserAdminService>,
    pub cases: Arc<CaseService>,
    pub documents: Arc<DocumentService>,
}

impl AppContext {
    /// 从配置构建整棵依赖树
    pub fn from_config(
        config: AppConfig,
        secure_store: Arc<dyn SecureStore>,
        biometric: Arc<dyn BiometricGate>,
    ) -> AppResult<Self> {
        let client = Arc::new(SupabaseClient::new(&config.provider)?);

        let auth = Arc::new(SupabaseAuthProvider::new(
            client.clone(),
            secure_store.clone(),
        ));
        let profiles = Arc::new(SupabaseProfileRepository::new(client.clone()));
        let case_repo = Arc::new(SupabaseCaseRepository::new(client.clone()));
        let document_repo = Arc::new(SupabaseDocumentRepository::new(client.clone()));
        let storage = Arc::new(SupabaseDocumentStorage::new(client.clone()));
        let notifier = Arc::new(EdgeFunctionNotifier::new(client.clone()));

        let session = Arc::new(
            SessionManager::new(auth, profiles.clone(), secure_store, biometric)
                .with_biometric_prompt(config.biometric.prompt.clone()),
        );
        let access = Arc::new(AccessController::new(session.clone()));

        let users = Arc::new(UserAdminService::new(
            session.clone(),
            access.clone(),
            profiles,
            notifier,
        ));
        let cases = Arc::new(CaseService::new(
            session.clone(),
            access.clone(),
            case_repo,
        ));
        let documents = Arc::new(DocumentService::new(
            session.clone(),
            access.clone(),
            document_repo,
            storage,
            UploadPolicy {
                max_file_size: config.upload.max_file_size,
                allowed_file_types: config.upload.allowed_file_types.clone(),
            },
        ));

        info!(app = config.app_name, env = config.app_env, "services assembled");

        Ok(Self {
            config,
            metrics: None,
            session,
            access,
            users,
            cases,
            documents,
        })
    }

    /// 加载配置并初始化遥测后装配
    pub fn init(
        config_dir: &str,
        secure_store: Arc<dyn SecureStore>,
        biometric: Arc<dyn BiometricGate>,
    ) -> AppResult<Self> {
        let config = AppConfig::load(config_dir)
            .map_err(|e| AppError::internal(format!("Config load failed: {}", e)))?;

        if config.is_production() {
            gavel_telemetry::init_tracing_json(&config.telemetry.log_level);
        } else {
            gavel_telemetry::init_tracing(&config.telemetry.log_level);
        }
        let metrics = gavel_telemetry::init_metrics();

        let mut context = Self::from_config(config, secure_store, biometric)?;
        context.metrics = Some(metrics);
        Ok(context)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 当前进程的 metrics 快照（仅 [`AppContext::init`] 装配时可用）
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(|handle| handle.render())
    }
}
