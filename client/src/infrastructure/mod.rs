//! 基础设施层

pub mod biometric;
pub mod secure_store;
pub mod supabase;

pub use biometric::NoopBiometricGate;
pub use secure_store::MemorySecureStore;
