//! A renderer without a GPU.
//!
//! Keeps the points in an R-tree, animates the camera against the shared clock,
//! and emits the same events a real renderer would. Used by tests and the replay
//! tool, and as the reference for what the engine expects of a renderer.

use embedscope_core::{
    CameraState, EmbeddingPoint, EmbeddingSet, EventSender, Millis, PointIndex, RawCamera,
    SharedClock, SpatialIndex, Transition, ZoomCommand,
};

use crate::renderer::{
    EventKind, RenderError, RenderOptions, Renderer, RendererConfig, RendererEvent,
    RendererFactory, SubscriptionId,
};
use crate::viewport::{CanvasSize, CoordinateMapper, Pixel};

#[derive(Debug, Clone, Copy)]
struct Animation {
    from: CameraState,
    to: CameraState,
    start: Millis,
    duration: Millis,
}

struct Listener {
    id: SubscriptionId,
    kind: EventKind,
    sink: EventSender<RendererEvent>,
}

pub struct HeadlessRenderer {
    clock: SharedClock,
    canvas: CanvasSize,
    embeddings: Option<EmbeddingSet>,
    index: SpatialIndex,
    camera: CameraState,
    animation: Option<Animation>,
    options: RenderOptions,
    listeners: Vec<Listener>,
    next_subscription: SubscriptionId,
    destroyed: bool,
}

impl HeadlessRenderer {
    pub fn new(config: &RendererConfig, clock: SharedClock) -> Result<Self, RenderError> {
        if !config.canvas.is_drawable() {
            return Err(RenderError::EmptyCanvas {
                width: config.canvas.width,
                height: config.canvas.height,
            });
        }
        log::debug!(
            "Headless renderer {}x{}, point size {}",
            config.canvas.width,
            config.canvas.height,
            config.point_size
        );
        Ok(Self {
            clock,
            canvas: config.canvas,
            embeddings: None,
            index: SpatialIndex::new(),
            camera: CameraState::default(),
            animation: None,
            options: RenderOptions::default(),
            listeners: Vec::new(),
            next_subscription: 0,
            destroyed: false,
        })
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::for_camera(self.canvas, &self.camera)
    }

    /// Step the running animation to the clock's current time, emitting a view
    /// event. Returns whether an animation is still running.
    pub fn advance(&mut self) -> bool {
        let Some(anim) = self.animation else {
            return false;
        };
        let elapsed = self.clock.now_ms().saturating_sub(anim.start);
        let t = if anim.duration == 0 {
            1.0
        } else {
            elapsed as f64 / anim.duration as f64
        };
        self.camera = anim.from.lerp(&anim.to, t);
        if t >= 1.0 {
            self.camera = anim.to;
            self.animation = None;
        }
        self.emit_view();
        self.animation.is_some()
    }

    /// Jump the camera, as a user interaction would. Cancels any animation.
    pub fn set_camera(&mut self, camera: CameraState) {
        if self.destroyed {
            return;
        }
        self.animation = None;
        self.camera = camera;
        self.emit_view();
    }

    /// Drag the view by a pixel delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let mapper = self.mapper();
        let origin = mapper.to_data(&Pixel::new(0.0, 0.0));
        let moved = mapper.to_data(&Pixel::new(dx, dy));
        let mut camera = self.camera;
        camera.target.x -= moved.x - origin.x;
        camera.target.y -= moved.y - origin.y;
        self.set_camera(camera);
    }

    /// Wheel zoom by `factor` (> 1 zooms in), keeping the point under the cursor fixed.
    pub fn zoom_at(&mut self, cursor: Pixel, factor: f64) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        let before = self.mapper().to_data(&cursor);
        let mut camera = self.camera;
        camera.distance /= factor;
        let after = CoordinateMapper::for_camera(self.canvas, &camera).to_data(&cursor);
        camera.target.x -= after.x - before.x;
        camera.target.y -= after.y - before.y;
        self.set_camera(CameraState::normalized(camera.target, camera.distance));
    }

    /// Simulate a lasso selection.
    pub fn lasso_select(&mut self, points: Vec<PointIndex>) {
        self.emit(RendererEvent::Select { points });
    }

    /// Select the point nearest to a click, if one is within `radius_px`.
    pub fn click(&mut self, cursor: Pixel, radius_px: f64) -> Option<PointIndex> {
        let mapper = self.mapper();
        let index = self.index.nearest(&mapper.to_data(&cursor))?;
        let position = self.embeddings.as_ref()?.position(index)?;
        let pixel = mapper.to_pixel(&position);
        let hit = ((pixel.x - cursor.x).powi(2) + (pixel.y - cursor.y).powi(2)).sqrt() <= radius_px;
        if hit {
            self.lasso_select(vec![index]);
            Some(index)
        } else {
            None
        }
    }

    /// Simulate a double click on empty space.
    pub fn double_click(&mut self) {
        if self.options.deselect_on_dbl_click.unwrap_or(false) {
            self.emit(RendererEvent::Deselect);
        }
    }

    fn emit_view(&mut self) {
        let mapper = self.mapper();
        self.emit(RendererEvent::View {
            camera: RawCamera::from(self.camera),
            x_scale: mapper.x,
            y_scale: mapper.y,
        });
    }

    fn emit(&mut self, event: RendererEvent) {
        if self.destroyed {
            return;
        }
        let kind = event.kind();
        for listener in self.listeners.iter().filter(|l| l.kind == kind) {
            if listener.sink.send(event.clone()).is_err() {
                log::debug!("listener {} has gone away", listener.id);
            }
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn draw(&mut self, points: &[EmbeddingPoint]) -> Result<(), RenderError> {
        if self.destroyed {
            return Err(RenderError::Destroyed);
        }
        let embeddings = EmbeddingSet::new(points.to_vec());
        self.index = SpatialIndex::build(&embeddings);
        self.embeddings = Some(embeddings);
        Ok(())
    }

    fn set(&mut self, options: &RenderOptions) -> Result<(), RenderError> {
        if self.destroyed {
            return Err(RenderError::Destroyed);
        }
        self.options.merge(options);
        if options.camera_target.is_some() || options.camera_distance.is_some() {
            let target = options
                .camera_target
                .unwrap_or([self.camera.target.x, self.camera.target.y]);
            let distance = options.camera_distance.unwrap_or(self.camera.distance);
            let camera = RawCamera { target, distance }.normalize();
            self.set_camera(camera);
        }
        Ok(())
    }

    fn subscribe(&mut self, kind: EventKind, sink: EventSender<RendererEvent>) -> SubscriptionId {
        self.next_subscription += 1;
        let id = self.next_subscription;
        self.listeners.push(Listener { id, kind, sink });
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|l| l.id != id);
    }

    fn camera(&self) -> RawCamera {
        RawCamera::from(self.camera)
    }

    fn points_in_view(&self) -> Vec<PointIndex> {
        self.index.query_viewport(&self.camera.frustum())
    }

    fn zoom(&mut self, command: &ZoomCommand, transition: Transition) {
        if self.destroyed {
            return;
        }
        let Some(to) = self
            .embeddings
            .as_ref()
            .and_then(|e| command.resolve(e, transition.padding))
        else {
            log::warn!("Cannot {}: no such point", command.description());
            return;
        };
        // A new zoom replaces whatever animation is running.
        self.animation = Some(Animation {
            from: self.camera,
            to,
            start: self.clock.now_ms(),
            duration: transition.duration_ms,
        });
        if transition.duration_ms == 0 {
            self.advance();
        }
    }

    fn destroy(&mut self) {
        self.listeners.clear();
        self.animation = None;
        self.embeddings = None;
        self.index = SpatialIndex::new();
        self.destroyed = true;
    }
}

/// Factory for [`HeadlessRenderer`]s sharing one clock.
pub struct HeadlessFactory {
    clock: SharedClock,
    created: usize,
}

impl HeadlessFactory {
    pub fn new(clock: SharedClock) -> Self {
        Self { clock, created: 0 }
    }

    pub fn created(&self) -> usize {
        self.created
    }
}

impl RendererFactory for HeadlessFactory {
    type Renderer = HeadlessRenderer;

    fn create(&mut self, config: &RendererConfig) -> Result<HeadlessRenderer, RenderError> {
        let renderer = HeadlessRenderer::new(config, self.clock.clone())?;
        self.created += 1;
        Ok(renderer)
    }
}
