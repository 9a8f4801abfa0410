//! # Embedscope Core
//!
//! Data model for the embedding explorer: immutable point sets keyed by stable
//! index, the pan/zoom camera and its shareable `"x,y,distance"` form, an R-tree
//! spatial index for viewport culling, the zoom/selection command types, and
//! the single-threaded event bus the renderer and engine talk over.
//!
//! Everything here is pure and renderer-agnostic.

pub mod geometry;
pub mod embedding;
pub mod camera;
pub mod spatial;
pub mod commands;
pub mod palette;
pub mod clock;
pub mod event_bus;

pub use clock::{Clock, ManualClock, Millis, SharedClock, SystemClock};
pub use camera::{CameraParseError, CameraState, RawCamera, MIN_DISTANCE};
pub use commands::{SelectionEvent, Transition, ZoomCommand};
pub use event_bus::{EventBus, EventSender};
pub use embedding::{
    ClusterId, DatasetState, DatasetStatus, EmbeddingPoint, EmbeddingSet, PointIndex,
};
pub use geometry::{BBox, DataRect, Point};
pub use palette::{ClusterPalette, Rgb};
pub use spatial::SpatialIndex;
