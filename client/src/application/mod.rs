//! 应用层

pub mod access_controller;
pub mod case_service;
pub mod document_service;
pub mod session_manager;
pub mod user_admin;

pub use access_controller::AccessController;
pub use case_service::CaseService;
pub use document_service::DocumentService;
pub use session_manager::SessionManager;
pub use user_admin::UserAdminService;
