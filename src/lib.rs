pub mod api;
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod shutdown;
pub mod store;

pub use error::{LifecycleError, Result};
