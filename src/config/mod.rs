pub mod env;
mod loader;

pub use env::{AppConfig, DirectoryConfig, HuggingFaceConfig};
pub use loader::load_config;
