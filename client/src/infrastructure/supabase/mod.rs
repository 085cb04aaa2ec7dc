//! 托管后端（Supabase 风格）REST 适配器
//!
//! auth、PostgREST、对象存储、edge function 各一个适配器，
//! 共享同一个 [`SupabaseClient`]。原始行结构只存在于本模块，
//! 经归一化后以领域类型离开边界。

mod auth_provider;
mod case_repository;
mod client;
mod document_repository;
mod notifier;
mod profile_repository;

pub use auth_provider::SupabaseAuthProvider;
pub use case_repository::SupabaseCaseRepository;
pub use client::SupabaseClient;
pub use document_repository::{SupabaseDocumentRepository, SupabaseDocumentStorage};
pub use notifier::EdgeFunctionNotifier;
pub use profile_repository::SupabaseProfileRepository;
