use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::embedding::{EmbeddingSet, PointIndex};
use crate::geometry::{DataRect, Point};

/// Closest a point zoom may get; equals a zoom factor of 100.
pub const MIN_POINT_ZOOM_DISTANCE: f64 = 0.01;

/// Fixed framing used by the "reset to default framing" handler.
pub const DEFAULT_FRAMING: DataRect = DataRect {
    x: 0.0,
    y: 0.0,
    width: 0.03,
    height: 0.03,
};

/// Animation parameters for a camera move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Duration in milliseconds; 0 jumps immediately.
    pub duration_ms: u64,
    /// Fraction of the framed extent added around the target when zooming to points.
    pub padding: f64,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            duration_ms: 1000,
            padding: 0.2,
        }
    }
}

/// A programmatic camera move. Fire-and-forget: the effect is only observable
/// through later view events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ZoomCommand {
    ToPoints(Vec<PointIndex>),
    ToOrigin,
    ToArea(DataRect),
}

impl ZoomCommand {
    pub fn to_point(index: PointIndex) -> Self {
        ZoomCommand::ToPoints(vec![index])
    }

    /// Camera this command ends at, or `None` if it names no known point.
    pub fn resolve(&self, embeddings: &EmbeddingSet, padding: f64) -> Option<CameraState> {
        match self {
            ZoomCommand::ToPoints(indices) => {
                let bbox = embeddings.bbox_of(indices)?;
                let half = bbox.width().max(bbox.height()) / 2.0 * (1.0 + padding.max(0.0));
                Some(CameraState::new(
                    bbox.center(),
                    half.max(MIN_POINT_ZOOM_DISTANCE),
                ))
            }
            ZoomCommand::ToOrigin => Some(CameraState::ORIGIN),
            ZoomCommand::ToArea(rect) => {
                let half = rect.width.abs().max(rect.height.abs()) / 2.0;
                Some(CameraState::normalized(rect.center(), half))
            }
        }
    }

    /// Human-readable description for logs.
    pub fn description(&self) -> String {
        match self {
            ZoomCommand::ToPoints(indices) if indices.len() == 1 => {
                format!("zoom to point {}", indices[0])
            }
            ZoomCommand::ToPoints(indices) => format!("zoom to {} points", indices.len()),
            ZoomCommand::ToOrigin => "zoom to origin".to_string(),
            ZoomCommand::ToArea(rect) => {
                let Point { x, y } = rect.center();
                format!("zoom to area around ({x}, {y})")
            }
        }
    }
}

/// Selection changes propagated to the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionEvent {
    Select(Vec<PointIndex>),
    Deselect,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingPoint;
    use approx::assert_relative_eq;

    fn set() -> EmbeddingSet {
        EmbeddingSet::new(vec![
            EmbeddingPoint::new(0.5, 0.5),
            EmbeddingPoint::new(-0.5, 0.0),
            EmbeddingPoint::new(-0.1, 0.3),
        ])
    }

    #[test]
    fn test_single_point_zoom_uses_minimum_distance() {
        let camera = ZoomCommand::to_point(0).resolve(&set(), 0.2).unwrap();
        assert_eq!(camera.target, Point::new(0.5, 0.5));
        assert_relative_eq!(camera.distance, MIN_POINT_ZOOM_DISTANCE, epsilon = 1e-12);
        assert_relative_eq!(camera.zoom_factor(), 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_multi_point_zoom_is_padded() {
        let camera = ZoomCommand::ToPoints(vec![1, 2]).resolve(&set(), 0.2).unwrap();
        assert_relative_eq!(camera.target.x, -0.3, epsilon = 1e-12);
        assert_relative_eq!(camera.target.y, 0.15, epsilon = 1e-12);
        // widest side 0.4, half 0.2, padded by 20%
        assert_relative_eq!(camera.distance, 0.24, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_point_resolves_to_none() {
        assert!(ZoomCommand::to_point(7).resolve(&set(), 0.2).is_none());
    }

    #[test]
    fn test_origin_and_area() {
        assert_eq!(ZoomCommand::ToOrigin.resolve(&set(), 0.2), Some(CameraState::ORIGIN));
        let camera = ZoomCommand::ToArea(DEFAULT_FRAMING).resolve(&set(), 0.2).unwrap();
        assert_relative_eq!(camera.target.x, 0.015, epsilon = 1e-12);
        assert_relative_eq!(camera.distance, 0.015, epsilon = 1e-12);
    }
}
