pub mod access;
pub mod cases;
pub mod chat;
pub mod config;
pub mod error;
pub mod model;
pub mod persistence;
pub mod seed;
pub mod store;
pub mod types;

pub use error::{ErrorKind, Result, VeritasError};
pub use types::*;
