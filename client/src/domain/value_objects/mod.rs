//! 值对象

mod email;

pub use email::*;
