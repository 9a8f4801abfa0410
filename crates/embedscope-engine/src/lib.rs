//! # Embedscope Engine
//!
//! Keeps the scatterplot's camera, visible set, level of detail and label
//! overlay in step with the renderer.
//!
//! Every camera change the renderer reports is normalized and persisted to the
//! shareable location on a trailing debounce, the visible points are queried
//! once, and the level-of-detail rule picks between plain points and labels.
//! In label mode the visible set is handed to a debounced fetcher whose
//! responses are applied only while they are still current.

pub mod debounce;
pub mod state;
pub mod handlers;
pub mod camera_store;
pub mod viewport_query;
pub mod lod;
pub mod fetcher;
pub mod engine;

pub use camera_store::{init_from_location, CameraStore};
pub use debounce::Debouncer;
pub use engine::{EngineError, Frame, ViewEngine};
pub use fetcher::{LabelEntry, LabelFetcher, LabelRequest, Resolution, Ticket};
pub use handlers::ZoomHandlers;
pub use lod::{decide, LodController, LodMode, LodTransition};
pub use state::{AppState, ErrorReporter, ErrorState, ErrorView, ZoomHandlerSlot};
pub use viewport_query::{ViewportQuery, VisibleSet};
