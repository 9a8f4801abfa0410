//! The view engine ties renderer events to the camera store, the viewport
//! query, the level-of-detail controller and the label fetcher.
//!
//! It runs on one thread and is driven from the host's event loop:
//! [`ViewEngine::pump`] drains renderer events and zoom commands,
//! [`ViewEngine::tick`] fires timers whose deadline has passed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use embedscope_core::{
    CameraState, ClusterPalette, DatasetState, DatasetStatus, EventBus, PointIndex, RawCamera,
    SelectionEvent, SharedClock, Transition, ZoomCommand,
};
use embedscope_io::location::{camera_query, LocationSink};
use embedscope_io::{ApiError, EmbeddingData, ExplorerConfig};
use embedscope_renderer::render_data::truncate;
use embedscope_renderer::{
    CanvasSize, ColorBy, CoordinateMapper, EventKind, LabelBox, LabelItem, LabelLayer,
    LabelStyle, LinearScale, RenderError, RenderOptions, Renderer, RendererConfig, RendererEvent,
    RendererFactory, RendererSession,
};

use crate::camera_store::CameraStore;
use crate::debounce::Debouncer;
use crate::fetcher::{LabelFetcher, LabelRequest, Resolution, Ticket};
use crate::handlers::ZoomHandlers;
use crate::lod::{LodController, LodMode, LodTransition};
use crate::state::{AppState, ErrorState};
use crate::viewport_query::{ViewportQuery, VisibleSet};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Serializable snapshot of what is on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub instance: Option<u64>,
    pub camera: CameraState,
    pub location: String,
    pub dataset: DatasetStatus,
    pub mode: LodMode,
    pub opacity: f32,
    pub visible: usize,
    /// View queries run so far.
    pub queries: u64,
    pub labels: Vec<LabelBox>,
    pub error: ErrorState,
}

impl Frame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One mounted renderer and the queues bound to it.
struct Mount<R: Renderer> {
    session: RendererSession<R>,
    events: EventBus<RendererEvent>,
    commands: EventBus<ZoomCommand>,
    canvas: CanvasSize,
}

pub struct ViewEngine<F: RendererFactory, L: LocationSink> {
    config: ExplorerConfig,
    clock: SharedClock,
    app: AppState,
    factory: F,
    mount: Option<Mount<F::Renderer>>,
    instances: u64,
    resize: Debouncer<CanvasSize>,
    dataset: DatasetState,
    camera: CameraStore<L>,
    query: ViewportQuery,
    visible: Option<VisibleSet>,
    lod: LodController,
    fetcher: LabelFetcher,
    labels: LabelLayer,
    mapper: Option<CoordinateMapper>,
    palette: ClusterPalette,
    opacity: f32,
    selection: Vec<SelectionEvent>,
    selected: Vec<PointIndex>,
}

impl<F: RendererFactory, L: LocationSink> ViewEngine<F, L> {
    /// Engine whose camera starts from the `at` parameter of `initial_query`.
    pub fn new(
        config: ExplorerConfig,
        factory: F,
        location: L,
        initial_query: &str,
        clock: SharedClock,
        app: AppState,
    ) -> Self {
        let camera = CameraStore::from_query(location, initial_query, config.persist_debounce_ms);
        Self {
            resize: Debouncer::new(config.resize_debounce_ms),
            lod: LodController::new(config.lod_rule),
            fetcher: LabelFetcher::new(config.label_debounce_ms),
            palette: ClusterPalette::blues(config.cluster_count),
            labels: LabelLayer::new(LabelStyle::default()),
            query: ViewportQuery::new(),
            dataset: DatasetState::Loading,
            mount: None,
            instances: 0,
            visible: None,
            mapper: None,
            opacity: 1.0,
            selection: Vec::new(),
            selected: Vec::new(),
            config,
            clock,
            app,
            factory,
            camera,
        }
    }

    fn transition(&self) -> Transition {
        Transition {
            duration_ms: self.config.transition_duration_ms,
            padding: self.config.zoom_padding,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Create a renderer for `canvas`, replacing any mounted one.
    ///
    /// On failure nothing stays mounted, every resource acquired so far is
    /// released and the view is back in overview.
    pub fn mount(&mut self, canvas: CanvasSize) -> Result<(), EngineError> {
        self.unmount();
        let config = RendererConfig::new(canvas, self.config.point_size);
        let renderer = self.factory.create(&config)?;
        self.instances += 1;
        let instance = self.instances;
        let mut session = RendererSession::new(renderer, instance);

        let events = EventBus::new();
        for kind in [EventKind::Select, EventKind::Deselect, EventKind::View] {
            session.subscribe(kind, events.sender());
        }

        let camera = self.camera.current();
        let options = RenderOptions {
            opacity: Some(1.0),
            deselect_on_dbl_click: Some(true),
            color_by: Some(ColorBy::Category),
            point_color: Some(self.palette.hex_list()),
            show_reticle: Some(true),
            camera_target: Some([camera.target.x, camera.target.y]),
            camera_distance: Some(camera.distance),
        };
        session.renderer_mut().set(&options)?;
        if let Some(embeddings) = self.dataset.embeddings() {
            session.renderer_mut().draw(embeddings.points())?;
        }

        let commands = EventBus::new();
        self.app
            .install_zoom_handlers(ZoomHandlers::new(instance, commands.sender()));
        // Setup echoes are not user view changes.
        let discarded = events.drain().len();
        if discarded > 0 {
            log::trace!("Discarded {discarded} setup events");
        }
        self.mount = Some(Mount {
            session,
            events,
            commands,
            canvas,
        });
        self.refresh();
        Ok(())
    }

    /// Remount at `canvas` once resizing has settled.
    pub fn resize(&mut self, canvas: CanvasSize) {
        self.resize.schedule(canvas, self.clock.now_ms());
    }

    /// Destroy the renderer and stop every timer.
    pub fn teardown(&mut self) {
        self.resize.cancel();
        self.camera.cancel();
        self.app.cancel_timers();
        self.unmount();
        log::info!("View engine torn down");
    }

    fn unmount(&mut self) {
        self.fetcher.invalidate();
        if !self.labels.is_empty() {
            self.labels.clear();
        }
        if let Some(mount) = self.mount.take() {
            self.app.clear_zoom_handlers();
            drop(mount);
        }
        self.reset_view_state();
        self.opacity = 1.0;
        self.mapper = None;
    }

    fn reset_view_state(&mut self) {
        self.lod.reset();
        self.visible = None;
    }

    /// Replace the dataset and draw it if a renderer is mounted.
    pub fn set_dataset(&mut self, dataset: DatasetState) -> Result<(), EngineError> {
        match &dataset {
            DatasetState::Ready(set) => log::info!("Dataset {} ready: {} points", set.id, set.len()),
            DatasetState::Empty => log::info!("Dataset is empty"),
            DatasetState::Loading => log::debug!("Dataset loading"),
            DatasetState::Failed(msg) => self.app.reporter().report(msg.clone()),
        }
        self.dataset = dataset;
        self.fetcher.invalidate();
        self.labels.clear();
        self.reset_view_state();
        if let (Some(mount), Some(embeddings)) = (self.mount.as_mut(), self.dataset.embeddings()) {
            mount.session.renderer_mut().draw(embeddings.points())?;
        }
        if self.opacity != 1.0 {
            self.set_opacity(1.0);
        }
        self.refresh();
        Ok(())
    }

    // ── Event loop ───────────────────────────────────────────────────

    /// Forward queued zoom commands and process renderer events. View events
    /// drained together collapse into the last one. Returns the number of
    /// renderer events handled.
    pub fn pump(&mut self) -> usize {
        let transition = self.transition();
        let Some(mount) = self.mount.as_mut() else {
            return 0;
        };
        let commands = mount.commands.drain();
        for command in &commands {
            log::debug!("{}", command.description());
            mount.session.renderer_mut().zoom(command, transition);
        }
        let events = mount.events.drain();

        let mut last_view = None;
        for event in &events {
            match event {
                RendererEvent::Select { points } => {
                    self.selected = points.clone();
                    self.selection.push(SelectionEvent::Select(points.clone()));
                }
                RendererEvent::Deselect => {
                    self.selected.clear();
                    self.selection.push(SelectionEvent::Deselect);
                }
                RendererEvent::View {
                    camera,
                    x_scale,
                    y_scale,
                } => last_view = Some((*camera, *x_scale, *y_scale)),
            }
        }
        if let Some((camera, x_scale, y_scale)) = last_view {
            self.on_view(camera, x_scale, y_scale);
        }
        events.len()
    }

    /// Fire every timer that is due.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        self.app.tick();
        if let Some(canvas) = self.resize.poll(now) {
            log::info!("Remounting renderer at {}x{}", canvas.width, canvas.height);
            if let Err(err) = self.mount(canvas) {
                self.app.reporter().report(err.to_string());
            }
        }
        self.camera.tick(now);
        self.fetcher.tick(now);
    }

    fn on_view(&mut self, raw: RawCamera, x_scale: LinearScale, y_scale: LinearScale) {
        let camera = self.camera.on_view_change(raw);
        self.camera.persist(camera, self.clock.now_ms());
        self.mapper = Some(CoordinateMapper::from_scales(x_scale, y_scale));
        self.update_view(camera);
    }

    /// Re-derive everything from the renderer's current camera.
    fn refresh(&mut self) {
        let Some(mount) = self.mount.as_ref() else {
            return;
        };
        let camera = mount.session.renderer().camera().normalize();
        self.mapper = Some(CoordinateMapper::for_camera(mount.canvas, &camera));
        self.update_view(camera);
    }

    fn update_view(&mut self, camera: CameraState) {
        let Some(mount) = self.mount.as_ref() else {
            return;
        };
        let Some(visible) = self
            .query
            .query(mount.session.renderer(), &self.dataset, camera)
        else {
            return;
        };
        let transition = self.lod.update(visible.len(), &camera);
        self.visible = Some(visible);
        match transition {
            LodTransition::EnterDetail | LodTransition::StayDetail => {
                if transition == LodTransition::EnterDetail {
                    self.set_opacity(self.config.detail_point_opacity);
                }
                let cap = self.config.max_detail_labels;
                let indices: Vec<PointIndex> = self
                    .visible
                    .as_ref()
                    .map(|v| v.indices.iter().copied().take(cap).collect())
                    .unwrap_or_default();
                let total = self.visible.as_ref().map_or(0, VisibleSet::len);
                if total > cap {
                    log::debug!("Labelling {cap} of {total} visible points");
                }
                self.fetcher.request_labels(&indices, self.clock.now_ms());
                self.redraw_labels();
            }
            LodTransition::EnterOverview => {
                self.labels.clear();
                self.fetcher.invalidate();
                self.set_opacity(1.0);
            }
            LodTransition::StayOverview => {}
        }
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        if let Some(mount) = self.mount.as_mut() {
            if let Err(err) = mount.session.renderer_mut().set(&RenderOptions::opacity(opacity)) {
                log::warn!("Could not set point opacity: {err}");
            }
        }
    }

    /// Lay out the working labels of the visible points at their current pixels.
    fn redraw_labels(&mut self) {
        let (Some(mapper), Some(visible), Some(embeddings)) =
            (self.mapper, self.visible.as_ref(), self.dataset.embeddings())
        else {
            self.labels.clear();
            return;
        };
        let budget = self.config.label_char_budget;
        let items: Vec<LabelItem> = self
            .fetcher
            .entries()
            .filter(|entry| visible.contains(entry.index))
            .filter_map(|entry| {
                let position = embeddings.position(entry.index)?;
                Some(LabelItem {
                    index: entry.index,
                    anchor: mapper.to_pixel(&position),
                    text: truncate(&entry.text, budget),
                    fresh: entry.fresh,
                })
            })
            .take(self.config.max_detail_labels)
            .collect();
        self.labels.draw(&items);
    }

    // ── Labels ───────────────────────────────────────────────────────

    /// Label fetches the host should perform now.
    pub fn take_label_requests(&mut self) -> Vec<LabelRequest> {
        self.fetcher.take_requests()
    }

    /// Hand back the result of a label fetch.
    pub fn resolve_labels(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<EmbeddingData>, ApiError>,
    ) -> Resolution {
        let resolution = self.fetcher.resolve(ticket, result);
        match &resolution {
            Resolution::Applied(count) => {
                log::debug!("Applied {count} labels from fetch #{ticket}");
                if self.lod.mode() == LodMode::Detail {
                    self.redraw_labels();
                }
            }
            Resolution::Failed(msg) => {
                self.labels.clear();
                self.app.reporter().report(msg.clone());
            }
            Resolution::Stale => {}
        }
        resolution
    }

    // ── Search ───────────────────────────────────────────────────────

    /// Fly to a picked search result. Returns `false` if no renderer is mounted.
    pub fn navigate_to_search_result(&self, index: PointIndex) -> bool {
        match self.app.zoom_slot().get() {
            Some(handlers) => {
                handlers.zoom_to_point(index);
                true
            }
            None => false,
        }
    }

    /// Search was cancelled; fly home.
    pub fn clear_search(&self) -> bool {
        match self.app.zoom_slot().get() {
            Some(handlers) => {
                handlers.zoom_to_origin();
                true
            }
            None => false,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Selection changes since the last call, oldest first.
    pub fn take_selection_events(&mut self) -> Vec<SelectionEvent> {
        std::mem::take(&mut self.selection)
    }

    pub fn selected(&self) -> &[PointIndex] {
        &self.selected
    }

    pub fn camera(&self) -> CameraState {
        self.camera.current()
    }

    pub fn mode(&self) -> LodMode {
        self.lod.mode()
    }

    pub fn visible(&self) -> Option<&VisibleSet> {
        self.visible.as_ref()
    }

    pub fn labels(&self) -> &LabelLayer {
        &self.labels
    }

    pub fn fetcher(&self) -> &LabelFetcher {
        &self.fetcher
    }

    pub fn mapper(&self) -> Option<CoordinateMapper> {
        self.mapper
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn dataset(&self) -> &DatasetState {
        &self.dataset
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    pub fn location(&self) -> &L {
        self.camera.sink()
    }

    /// Successful location writes so far.
    pub fn location_writes(&self) -> usize {
        self.camera.writes()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Number of view queries run so far.
    pub fn query_count(&self) -> u64 {
        self.query.generation()
    }

    pub fn instance(&self) -> Option<u64> {
        self.mount.as_ref().map(|m| m.session.instance())
    }

    pub fn renderer(&self) -> Option<&F::Renderer> {
        self.mount.as_ref().map(|m| m.session.renderer())
    }

    pub fn renderer_mut(&mut self) -> Option<&mut F::Renderer> {
        self.mount.as_mut().map(|m| m.session.renderer_mut())
    }

    pub fn frame(&self) -> Frame {
        let camera = self.camera.current();
        Frame {
            instance: self.instance(),
            camera,
            location: camera_query(&camera),
            dataset: self.dataset.status(),
            mode: self.lod.mode(),
            opacity: self.opacity,
            visible: self.visible.as_ref().map_or(0, VisibleSet::len),
            queries: self.query.generation(),
            labels: self.labels.boxes().to_vec(),
            error: self.app.error_view().state(),
        }
    }
}

impl<F: RendererFactory, L: LocationSink> Drop for ViewEngine<F, L> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use embedscope_core::{EmbeddingPoint, ManualClock, Point};
    use embedscope_io::location::MemoryLocation;
    use embedscope_io::{LodRule, TransportError};
    use embedscope_renderer::{HeadlessFactory, Pixel};
    use std::rc::Rc;

    type Engine = ViewEngine<HeadlessFactory, MemoryLocation>;

    fn engine(query: &str, points: Vec<EmbeddingPoint>) -> (ManualClock, Engine) {
        engine_with(ExplorerConfig::default(), query, points)
    }

    fn engine_with(
        config: ExplorerConfig,
        query: &str,
        points: Vec<EmbeddingPoint>,
    ) -> (ManualClock, Engine) {
        let clock = ManualClock::new();
        let shared: SharedClock = Rc::new(clock.clone());
        let app = AppState::new(shared.clone(), config.error_dismiss_ms);
        let mut engine = ViewEngine::new(
            config,
            HeadlessFactory::new(shared.clone()),
            MemoryLocation::new(query),
            query,
            shared,
            app,
        );
        engine.mount(CanvasSize::new(800.0, 600.0)).unwrap();
        engine.set_dataset(DatasetState::from_points(points)).unwrap();
        (clock, engine)
    }

    fn line(n: usize) -> Vec<EmbeddingPoint> {
        (0..n)
            .map(|i| EmbeddingPoint::new(-0.5 + i as f64 / n as f64, 0.0))
            .collect()
    }

    #[test]
    fn test_mount_applies_initial_options() {
        let (_clock, engine) = engine("at=0.1%2C0.2%2C0.5", line(4));
        let renderer = engine.renderer().unwrap();
        let options = renderer.options();
        assert_eq!(options.deselect_on_dbl_click, Some(true));
        assert_eq!(options.color_by, Some(ColorBy::Category));
        assert_eq!(options.point_color.as_ref().map(Vec::len), Some(8));
        assert_eq!(options.show_reticle, Some(true));
        assert_eq!(
            renderer.camera().normalize(),
            CameraState::new(Point::new(0.1, 0.2), 0.5)
        );
        assert!(engine.app().zoom_slot().is_installed());
    }

    #[test]
    fn test_few_points_enter_detail_and_fetch() {
        let (clock, mut engine) = engine("", line(5));
        assert_eq!(engine.mode(), LodMode::Detail);
        assert_eq!(engine.opacity(), 0.0);
        clock.advance(200);
        engine.tick();
        let requests = engine.take_label_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].indices, vec![0, 1, 2, 3, 4]);

        let details = (0..5).map(|i| EmbeddingData::text(i, "x".repeat(150))).collect();
        engine.resolve_labels(requests[0].ticket, Ok(details));
        assert_eq!(engine.labels().len(), 5);
        let first = &engine.labels().boxes()[0];
        assert_eq!(first.lines.concat().chars().count(), 103);
    }

    #[test]
    fn test_fetch_failure_reports_and_clears() {
        let (clock, mut engine) = engine("", line(3));
        clock.advance(200);
        engine.tick();
        let ticket = engine.take_label_requests()[0].ticket;
        let res = engine.resolve_labels(ticket, Err(TransportError::Status(500).into()));
        assert!(matches!(res, Resolution::Failed(_)));
        assert!(engine.labels().is_empty());
        assert_eq!(
            engine.frame().error.error_msg.as_deref(),
            Some("Server responded with error: 500")
        );
    }

    #[test]
    fn test_selection_events_propagate() {
        let (_clock, mut engine) = engine("", line(3));
        let pixel = engine.mapper().unwrap().to_pixel(&Point::new(-0.5, 0.0));
        let renderer = engine.renderer_mut().unwrap();
        assert_eq!(renderer.click(pixel, 3.0), Some(0));
        engine.pump();
        assert_eq!(engine.selected(), &[0]);

        let renderer = engine.renderer_mut().unwrap();
        renderer.lasso_select(vec![0, 2]);
        renderer.double_click();
        engine.pump();
        assert_eq!(
            engine.take_selection_events(),
            vec![
                SelectionEvent::Select(vec![0]),
                SelectionEvent::Select(vec![0, 2]),
                SelectionEvent::Deselect,
            ]
        );
        assert!(engine.selected().is_empty());
    }

    #[test]
    fn test_empty_view_issues_no_label_request() {
        let points = (0..100)
            .map(|i| EmbeddingPoint::new(-0.45 + i as f64 * 0.001, 0.0))
            .collect();
        let (clock, mut engine) = engine("", points);
        assert_eq!(engine.mode(), LodMode::Overview);

        // a few points in view, then off into empty space before the fetch fires
        let renderer = engine.renderer_mut().unwrap();
        renderer.set_camera(CameraState::new(Point::new(-0.45, 0.0), 0.0035));
        engine.pump();
        assert_eq!(engine.visible().unwrap().len(), 4);
        assert!(engine.fetcher().is_pending());

        let renderer = engine.renderer_mut().unwrap();
        renderer.set_camera(CameraState::new(Point::new(0.9, 0.9), 0.01));
        engine.pump();
        assert_eq!(engine.mode(), LodMode::Detail);
        assert!(engine.visible().unwrap().is_empty());

        clock.advance(200);
        engine.tick();
        assert!(engine.take_label_requests().is_empty());
        assert!(!engine.fetcher().is_pending());
        assert!(engine.labels().is_empty());
    }

    #[test]
    fn test_zoom_factor_detail_caps_labels() {
        let config = ExplorerConfig {
            lod_rule: LodRule::ZoomFactor {
                zoom_start_threshold: 0.5,
            },
            max_detail_labels: 10,
            ..Default::default()
        };
        let (clock, mut engine) = engine_with(config, "", line(50));
        assert_eq!(engine.visible().unwrap().len(), 50);
        assert_eq!(engine.mode(), LodMode::Detail);

        clock.advance(200);
        engine.tick();
        let requests = engine.take_label_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].indices, (0..10).collect::<Vec<PointIndex>>());

        let details = (0..50).map(|i| EmbeddingData::text(i, "label")).collect();
        engine.resolve_labels(requests[0].ticket, Ok(details));
        assert_eq!(engine.labels().len(), 10);
    }

    #[test]
    fn test_frame_reports_dataset_status() {
        let (_clock, mut engine) = engine("", line(3));
        let id = engine.dataset().embeddings().unwrap().id;
        assert_eq!(engine.frame().dataset, DatasetStatus::Ready { id, points: 3 });

        engine.set_dataset(DatasetState::Loading).unwrap();
        assert_eq!(engine.frame().dataset, DatasetStatus::Loading);
        engine.set_dataset(DatasetState::Empty).unwrap();
        assert_eq!(engine.frame().dataset, DatasetStatus::Empty);

        engine
            .set_dataset(DatasetState::Failed("No response from server".into()))
            .unwrap();
        let frame = engine.frame();
        assert_eq!(
            frame.dataset,
            DatasetStatus::Failed {
                message: "No response from server".into()
            }
        );
        let json: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json["dataset"]["state"], "failed");
    }

    #[test]
    fn test_view_events_coalesce_into_one_query() {
        let (_clock, mut engine) = engine("", line(100));
        let before = engine.query_count();
        let renderer = engine.renderer_mut().unwrap();
        renderer.pan_by(10.0, 0.0);
        renderer.pan_by(10.0, 0.0);
        renderer.zoom_at(Pixel::new(400.0, 300.0), 2.0);
        assert_eq!(engine.pump(), 3);
        assert_eq!(engine.query_count(), before + 1);
        assert_relative_eq!(engine.camera().distance, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_dataset_skips_queries() {
        let (_clock, mut engine) = engine("", Vec::new());
        assert!(matches!(engine.dataset(), DatasetState::Empty));
        engine.renderer_mut().unwrap().pan_by(5.0, 5.0);
        engine.pump();
        assert_eq!(engine.query_count(), 0);
        assert!(engine.visible().is_none());
    }

    #[test]
    fn test_resize_remounts_with_new_handlers() {
        let (clock, mut engine) = engine("", line(3));
        let old = engine.app().zoom_slot().get().unwrap();
        engine.resize(CanvasSize::new(400.0, 400.0));
        engine.resize(CanvasSize::new(500.0, 500.0));
        clock.advance(100);
        engine.tick();
        assert_eq!(engine.factory().created(), 2);
        assert_eq!(engine.instance(), Some(2));
        let new = engine.app().zoom_slot().get().unwrap();
        assert_eq!(new.instance(), 2);
        assert_eq!(engine.renderer().unwrap().canvas(), CanvasSize::new(500.0, 500.0));
        // handlers of the destroyed instance are inert
        old.zoom_to_origin();
        assert_eq!(engine.pump(), 0);
    }

    #[test]
    fn test_mount_failure_leaves_nothing_mounted() {
        let (_clock, mut engine) = engine("", line(3));
        assert_eq!(engine.mode(), LodMode::Detail);
        assert_eq!(engine.opacity(), 0.0);
        let err = engine.mount(CanvasSize::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, EngineError::Render(RenderError::EmptyCanvas { .. })));
        assert!(engine.renderer().is_none());
        assert!(!engine.app().zoom_slot().is_installed());
        let frame = engine.frame();
        assert_eq!(frame.instance, None);
        assert_eq!(frame.mode, LodMode::Overview);
        assert_eq!(frame.opacity, 1.0);
        assert!(frame.labels.is_empty());
    }
}
