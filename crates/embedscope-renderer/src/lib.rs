//! # Embedscope Renderer
//!
//! Boundary to the scatterplot point renderer, the data-to-pixel coordinate
//! mapping, and the label overlay drawn on top of the points.
//!
//! The GPU renderer is treated as opaque behind the [`Renderer`] trait;
//! [`HeadlessRenderer`] implements it on the CPU for tests and offline replay.

pub mod viewport;
pub mod render_data;
pub mod renderer;
pub mod headless;

pub use headless::{HeadlessFactory, HeadlessRenderer};
pub use render_data::{LabelBox, LabelItem, LabelLayer, LabelStyle};
pub use renderer::{
    ColorBy, EventKind, RenderError, RenderOptions, Renderer, RendererConfig, RendererEvent,
    RendererFactory, RendererSession, SubscriptionId,
};
pub use viewport::{CanvasSize, CoordinateMapper, LinearScale, Pixel};
