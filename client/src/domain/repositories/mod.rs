//! 领域仓储与 provider 接口

mod auth_provider;
mod case_repository;
mod document_repository;
mod profile_repository;

pub use auth_provider::*;
pub use case_repository::*;
pub use document_repository::*;
pub use profile_repository::*;
