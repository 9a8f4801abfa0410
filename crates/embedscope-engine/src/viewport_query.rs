use serde::{Deserialize, Serialize};

use embedscope_core::{CameraState, DatasetState, PointIndex};
use embedscope_renderer::Renderer;

/// Indices inside the frustum of one camera, ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleSet {
    /// Increases with every query; later sets supersede earlier ones.
    pub generation: u64,
    pub camera: CameraState,
    pub indices: Vec<PointIndex>,
}

impl VisibleSet {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: PointIndex) -> bool {
        self.indices.binary_search(&index).is_ok()
    }
}

/// Asks the renderer what is visible, once per processed view change.
#[derive(Debug, Default)]
pub struct ViewportQuery {
    generation: u64,
}

impl ViewportQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible points for `camera`. Without a loaded, non-empty dataset there is
    /// nothing to query and `None` is returned.
    pub fn query<R: Renderer>(
        &mut self,
        renderer: &R,
        dataset: &DatasetState,
        camera: CameraState,
    ) -> Option<VisibleSet> {
        let embeddings = dataset.embeddings()?;
        if embeddings.is_empty() {
            return None;
        }
        let mut indices = renderer.points_in_view();
        indices.sort_unstable();
        indices.dedup();
        self.generation += 1;
        Some(VisibleSet {
            generation: self.generation,
            camera,
            indices,
        })
    }

    /// Number of queries run so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedscope_core::{EmbeddingPoint, ManualClock, Point};
    use embedscope_renderer::{CanvasSize, HeadlessRenderer, RendererConfig};
    use std::rc::Rc;

    fn renderer(points: &[EmbeddingPoint]) -> HeadlessRenderer {
        let config = RendererConfig::new(CanvasSize::new(100.0, 100.0), 3.0);
        let mut r = HeadlessRenderer::new(&config, Rc::new(ManualClock::new())).unwrap();
        r.draw(points).unwrap();
        r
    }

    #[test]
    fn test_query_tracks_current_camera() {
        let points = vec![EmbeddingPoint::new(0.9, 0.9), EmbeddingPoint::new(-0.1, 0.0)];
        let mut r = renderer(&points);
        let dataset = DatasetState::from_points(points);
        let mut q = ViewportQuery::new();

        let all = q.query(&r, &dataset, CameraState::ORIGIN).unwrap();
        assert_eq!(all.indices, vec![0, 1]);

        let zoomed = CameraState::new(Point::new(0.0, 0.0), 0.2);
        r.set_camera(zoomed);
        let near = q.query(&r, &dataset, zoomed).unwrap();
        assert_eq!(near.indices, vec![1]);
        assert!(near.generation > all.generation);
        assert!(near.contains(1) && !near.contains(0));
    }

    #[test]
    fn test_no_dataset_is_noop() {
        let r = renderer(&[]);
        let mut q = ViewportQuery::new();
        assert!(q.query(&r, &DatasetState::Loading, CameraState::ORIGIN).is_none());
        assert!(q.query(&r, &DatasetState::Empty, CameraState::ORIGIN).is_none());
        assert_eq!(q.generation(), 0);
    }
}
