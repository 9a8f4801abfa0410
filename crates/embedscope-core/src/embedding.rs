use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{BBox, Point};

/// Stable index of a point in the embedding array.
pub type PointIndex = u32;

/// Cluster / category identifier used for coloring.
pub type ClusterId = u32;

/// A single point of the embedding, in data space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingPoint {
    pub position: Point,
    pub cluster: Option<ClusterId>,
}

impl EmbeddingPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            cluster: None,
        }
    }

    pub fn with_cluster(mut self, cluster: ClusterId) -> Self {
        self.cluster = Some(cluster);
        self
    }
}

/// The loaded, immutable embedding array.
///
/// The position of a point in `points` is its [`PointIndex`]; it is the only key
/// shared between positions, label data and selection.
#[derive(Debug, Clone)]
pub struct EmbeddingSet {
    /// Identity of this load; a reload yields a new id.
    pub id: Uuid,
    points: Vec<EmbeddingPoint>,
}

impl EmbeddingSet {
    pub fn new(points: Vec<EmbeddingPoint>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
        }
    }

    pub fn get(&self, index: PointIndex) -> Option<&EmbeddingPoint> {
        self.points.get(index as usize)
    }

    pub fn position(&self, index: PointIndex) -> Option<Point> {
        self.get(index).map(|p| p.position)
    }

    pub fn points(&self) -> &[EmbeddingPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of a subset of points; unknown indices are ignored.
    pub fn bbox_of(&self, indices: &[PointIndex]) -> Option<BBox> {
        let positions: Vec<Point> = indices.iter().filter_map(|&i| self.position(i)).collect();
        BBox::from_points(&positions)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointIndex, &EmbeddingPoint)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as PointIndex, p))
    }
}

/// Load state of the embedding dataset.
///
/// `Loading` and `Empty` are kept apart: a request in flight and a request that
/// returned zero rows render differently.
#[derive(Debug, Clone, Default)]
pub enum DatasetState {
    #[default]
    Loading,
    Ready(EmbeddingSet),
    Empty,
    Failed(String),
}

impl DatasetState {
    /// Wrap a freshly loaded point list.
    pub fn from_points(points: Vec<EmbeddingPoint>) -> Self {
        if points.is_empty() {
            DatasetState::Empty
        } else {
            DatasetState::Ready(EmbeddingSet::new(points))
        }
    }

    pub fn embeddings(&self) -> Option<&EmbeddingSet> {
        match self {
            DatasetState::Ready(set) => Some(set),
            _ => None,
        }
    }

    pub fn status(&self) -> DatasetStatus {
        match self {
            DatasetState::Loading => DatasetStatus::Loading,
            DatasetState::Ready(set) => DatasetStatus::Ready {
                id: set.id,
                points: set.len(),
            },
            DatasetState::Empty => DatasetStatus::Empty,
            DatasetState::Failed(message) => DatasetStatus::Failed {
                message: message.clone(),
            },
        }
    }
}

/// What a host shows for the dataset, without the points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DatasetStatus {
    Loading,
    Ready { id: Uuid, points: usize },
    Empty,
    Failed { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmbeddingSet {
        EmbeddingSet::new(vec![
            EmbeddingPoint::new(-0.5, -0.5).with_cluster(1),
            EmbeddingPoint::new(0.5, 0.25),
            EmbeddingPoint::new(0.0, 0.75).with_cluster(3),
        ])
    }

    #[test]
    fn test_index_lookup() {
        let set = sample();
        assert_eq!(set.len(), 3);
        assert_eq!(set.position(1), Some(Point::new(0.5, 0.25)));
        assert_eq!(set.get(2).and_then(|p| p.cluster), Some(3));
        assert!(set.get(3).is_none());
    }

    #[test]
    fn test_bbox_of_subset() {
        let set = sample();
        let bbox = set.bbox_of(&[0, 2, 99]).unwrap();
        assert_eq!(bbox.min, Point::new(-0.5, -0.5));
        assert_eq!(bbox.max, Point::new(0.0, 0.75));
        assert!(set.bbox_of(&[42]).is_none());
    }

    #[test]
    fn test_dataset_state_distinguishes_empty() {
        assert_eq!(DatasetState::default().status(), DatasetStatus::Loading);
        assert_eq!(DatasetState::from_points(Vec::new()).status(), DatasetStatus::Empty);
        let ready = DatasetState::from_points(vec![EmbeddingPoint::new(0.0, 0.0)]);
        assert_eq!(ready.embeddings().map(|e| e.len()), Some(1));
        let id = ready.embeddings().unwrap().id;
        assert_eq!(ready.status(), DatasetStatus::Ready { id, points: 1 });
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        let failed = DatasetState::Failed("Server responded with error: 503".into());
        let json = serde_json::to_value(failed.status()).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["message"], "Server responded with error: 503");
        let loading = serde_json::to_value(DatasetStatus::Loading).unwrap();
        assert_eq!(loading["state"], "loading");
    }
}
