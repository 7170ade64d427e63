//! HTTP handlers.

pub mod cameras;
pub mod config;
pub mod health;
pub mod index;

pub use cameras::list_cameras;
pub use config::{get_config, update_config};
pub use health::health;
pub use index::index;
