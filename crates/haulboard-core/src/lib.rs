//! haulboard-core: Shared types, wire decoding, configuration, and logging for haulboard.

pub mod api;
pub mod build_info;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod session;
pub mod types;

pub use config::{Config, SearchSettings};
pub use error::{Error, Result};
pub use session::Session;
pub use types::{EntityKind, SearchResult};
