pub mod model;
pub use model::{load_app_config, AppConfig, ConfigError};
