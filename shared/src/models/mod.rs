//! Domain models for the PestCheck platform

pub mod alert;
pub mod detection;
pub mod farm;
pub mod notification;
pub mod pest;
pub mod user;

pub use alert::*;
pub use detection::*;
pub use farm::*;
pub use notification::*;
pub use pest::*;
pub use user::*;
