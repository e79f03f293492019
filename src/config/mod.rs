//! Configuration loading and management.

mod file;
mod paths;
mod types;
mod validate;

pub use file::{load_config, load_config_file, resolve_config_path, save_config};
pub use paths::{config_dir, config_file_path};
pub use types::{
    AuthConfig, ClassifierConfig, Config, DetectorConfig, MultiSubjectPolicy, ResizeFilter,
    ResizeMode, ResponseConfig, RoutingConfig, ScoreTransform, ServerConfig,
};
pub use validate::{validate_config, validate_model_files};
