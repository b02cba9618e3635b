pub mod config;
pub mod document;
pub mod error;
pub mod model;

pub use config::{
    load_dotenv, version_or_unknown, Config, OutputConfig, OutputFormat, UpstreamConfig,
    UNKNOWN_VERSION,
};
pub use document::*;
pub use error::*;
pub use model::*;
