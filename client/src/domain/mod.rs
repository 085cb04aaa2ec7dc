//! 领域层

pub mod case;
pub mod document;
pub mod identity;
pub mod repositories;
pub mod session;
pub mod value_objects;

pub use case::*;
pub use document::*;
pub use identity::*;
pub use session::*;
