//! # Embedscope I/O
//!
//! Everything that crosses the process boundary: the JSON wire formats of the
//! explorer API, the `at` location parameter that makes a camera shareable,
//! and the explorer configuration file.

pub mod api;
pub mod location;
pub mod config;

pub use api::{
    ApiClient, ApiError, DetailsRequest, EmbeddingData, EmbeddingRow, SearchRequest, Transport,
    TransportError,
};
pub use config::{ConfigError, ExplorerConfig, LodRule};
pub use location::{
    camera_query, query_param, LocationError, LocationSink, MemoryLocation, CAMERA_PARAM,
};
