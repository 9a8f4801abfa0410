//! The boundary to the point renderer.
//!
//! The renderer itself is opaque; the engine only draws points, sets options,
//! queries the camera and the points in view, requests zooms, and listens for
//! `select` / `deselect` / `view` events.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use embedscope_core::{
    EmbeddingPoint, EventSender, PointIndex, RawCamera, Transition, ZoomCommand,
};

use crate::viewport::{CanvasSize, CoordinateMapper, LinearScale};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("canvas has no drawable area ({width}x{height})")]
    EmptyCanvas { width: f64, height: f64 },

    #[error("renderer has been destroyed")]
    Destroyed,

    #[error("renderer backend failure: {0}")]
    Backend(String),
}

/// Handle returned by [`Renderer::subscribe`].
pub type SubscriptionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Select,
    Deselect,
    View,
}

/// Events emitted by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent {
    Select { points: Vec<PointIndex> },
    Deselect,
    /// The camera moved; carries the camera and the scales for the new view.
    View {
        camera: RawCamera,
        x_scale: LinearScale,
        y_scale: LinearScale,
    },
}

impl RendererEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RendererEvent::Select { .. } => EventKind::Select,
            RendererEvent::Deselect => EventKind::Deselect,
            RendererEvent::View { .. } => EventKind::View,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorBy {
    Category,
}

/// Renderer options. `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub opacity: Option<f32>,
    pub deselect_on_dbl_click: Option<bool>,
    pub color_by: Option<ColorBy>,
    pub point_color: Option<Vec<String>>,
    pub show_reticle: Option<bool>,
    pub camera_target: Option<[f64; 2]>,
    pub camera_distance: Option<f64>,
}

impl RenderOptions {
    pub fn opacity(opacity: f32) -> Self {
        Self {
            opacity: Some(opacity),
            ..Default::default()
        }
    }

    /// Overwrite with every field `other` sets.
    pub fn merge(&mut self, other: &RenderOptions) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        take!(
            opacity,
            deselect_on_dbl_click,
            color_by,
            point_color,
            show_reticle,
            camera_target,
            camera_distance
        );
    }
}

/// Everything a renderer is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub canvas: CanvasSize,
    pub point_size: f32,
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
}

impl RendererConfig {
    /// Configuration with the base data-domain scales for `canvas`.
    pub fn new(canvas: CanvasSize, point_size: f32) -> Self {
        let mapper = CoordinateMapper::new(canvas);
        Self {
            canvas,
            point_size,
            x_scale: mapper.x,
            y_scale: mapper.y,
        }
    }
}

/// An opaque point renderer.
pub trait Renderer {
    fn draw(&mut self, points: &[EmbeddingPoint]) -> Result<(), RenderError>;
    fn set(&mut self, options: &RenderOptions) -> Result<(), RenderError>;
    /// Register `sink` for events of `kind`.
    fn subscribe(&mut self, kind: EventKind, sink: EventSender<RendererEvent>) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
    fn camera(&self) -> RawCamera;
    /// Indices inside the current frustum, ascending.
    fn points_in_view(&self) -> Vec<PointIndex>;
    /// Start a camera move. Completion shows up only as later view events.
    fn zoom(&mut self, command: &ZoomCommand, transition: Transition);
    /// Release the renderer's resources. Further calls are no-ops.
    fn destroy(&mut self);
}

/// Creates renderers; one instance per mount.
pub trait RendererFactory {
    type Renderer: Renderer;

    fn create(&mut self, config: &RendererConfig) -> Result<Self::Renderer, RenderError>;
}

/// Owns a renderer for the duration of a mount.
///
/// Dropping the session unsubscribes every listener it registered and destroys the
/// renderer, on every path out of the mount, including setup failures.
pub struct RendererSession<R: Renderer> {
    renderer: R,
    instance: u64,
    subscriptions: Vec<SubscriptionId>,
}

impl<R: Renderer> RendererSession<R> {
    pub fn new(renderer: R, instance: u64) -> Self {
        log::info!("Renderer instance {instance} mounted");
        Self {
            renderer,
            instance,
            subscriptions: Vec::new(),
        }
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        sink: EventSender<RendererEvent>,
    ) -> SubscriptionId {
        let id = self.renderer.subscribe(kind, sink);
        self.subscriptions.push(id);
        id
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<R: Renderer> Drop for RendererSession<R> {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.renderer.unsubscribe(id);
        }
        self.renderer.destroy();
        log::info!("Renderer instance {} destroyed", self.instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedscope_core::EventBus;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        unsubscribed: Vec<SubscriptionId>,
        destroyed: bool,
    }

    struct Recording(Rc<RefCell<Log>>, SubscriptionId);

    impl Renderer for Recording {
        fn draw(&mut self, _points: &[EmbeddingPoint]) -> Result<(), RenderError> {
            Err(RenderError::Backend("out of memory".into()))
        }
        fn set(&mut self, _options: &RenderOptions) -> Result<(), RenderError> {
            Ok(())
        }
        fn subscribe(
            &mut self,
            _kind: EventKind,
            _sink: EventSender<RendererEvent>,
        ) -> SubscriptionId {
            self.1 += 1;
            self.1
        }
        fn unsubscribe(&mut self, id: SubscriptionId) {
            self.0.borrow_mut().unsubscribed.push(id);
        }
        fn camera(&self) -> RawCamera {
            RawCamera {
                target: [0.0, 0.0],
                distance: 1.0,
            }
        }
        fn points_in_view(&self) -> Vec<PointIndex> {
            Vec::new()
        }
        fn zoom(&mut self, _command: &ZoomCommand, _transition: Transition) {}
        fn destroy(&mut self) {
            self.0.borrow_mut().destroyed = true;
        }
    }

    fn mount(log: Rc<RefCell<Log>>) -> Result<RendererSession<Recording>, RenderError> {
        let mut session = RendererSession::new(Recording(log, 0), 1);
        let bus = EventBus::new();
        session.subscribe(EventKind::View, bus.sender());
        session.subscribe(EventKind::Select, bus.sender());
        session.renderer_mut().draw(&[])?;
        Ok(session)
    }

    #[test]
    fn test_session_releases_on_setup_error() {
        let log = Rc::new(RefCell::new(Log::default()));
        assert!(mount(log.clone()).is_err());
        let log = log.borrow();
        assert_eq!(log.unsubscribed, vec![1, 2]);
        assert!(log.destroyed);
    }

    #[test]
    fn test_options_merge() {
        let mut options = RenderOptions {
            show_reticle: Some(true),
            ..Default::default()
        };
        options.merge(&RenderOptions::opacity(0.0));
        assert_eq!(options.opacity, Some(0.0));
        assert_eq!(options.show_reticle, Some(true));
    }
}
