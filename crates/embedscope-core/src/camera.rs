use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{BBox, Point};

/// Smallest distance a normalized camera may carry.
pub const MIN_DISTANCE: f64 = 1e-9;

/// Pan/zoom state of the virtual camera over data space.
///
/// `distance` is the half-extent of the visible data rectangle: at distance 1 around
/// the origin the full `[-1, 1]` domain is on screen. Always `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub target: Point,
    pub distance: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::ORIGIN
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraParseError {
    #[error("expected 3 comma-separated values, found {0}")]
    FieldCount(usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("camera distance must be positive, got {0}")]
    NonPositiveDistance(f64),
}

impl CameraState {
    pub const ORIGIN: CameraState = CameraState {
        target: Point::ORIGIN,
        distance: 1.0,
    };

    pub fn new(target: Point, distance: f64) -> Self {
        Self { target, distance }
    }

    /// Build a camera from whatever the renderer reported, repairing bad values.
    pub fn normalized(target: Point, distance: f64) -> Self {
        let target = Point::new(
            if target.x.is_finite() { target.x } else { 0.0 },
            if target.y.is_finite() { target.y } else { 0.0 },
        );
        let distance = if !distance.is_finite() {
            1.0
        } else {
            distance.max(MIN_DISTANCE)
        };
        Self { target, distance }
    }

    /// Camera restored from a serialized `"x,y,distance"` location value.
    /// Absent or malformed input yields the origin camera.
    pub fn from_location(serialized: Option<&str>) -> Self {
        match serialized.map(str::parse::<CameraState>) {
            Some(Ok(camera)) => camera,
            Some(Err(err)) => {
                log::debug!("ignoring camera location: {err}");
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Serialized `"x,y,distance"` form; parses back to the same values.
    pub fn to_location(&self) -> String {
        self.to_string()
    }

    pub fn zoom_factor(&self) -> f64 {
        1.0 / self.distance
    }

    /// The data-space rectangle visible through this camera.
    pub fn frustum(&self) -> BBox {
        BBox::around(self.target, self.distance)
    }

    /// Interpolated camera between `self` and `to`, `t` in `[0, 1]`.
    pub fn lerp(&self, to: &CameraState, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            target: self.target.lerp(&to.target, t),
            distance: self.distance + (to.distance - self.distance) * t,
        }
    }

    pub fn approx_eq(&self, other: &CameraState, epsilon: f64) -> bool {
        (self.target.x - other.target.x).abs() <= epsilon
            && (self.target.y - other.target.y).abs() <= epsilon
            && (self.distance - other.distance).abs() <= epsilon
    }
}

impl fmt::Display for CameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.target.x, self.target.y, self.distance)
    }
}

impl FromStr for CameraState {
    type Err = CameraParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').collect();
        if fields.len() != 3 {
            return Err(CameraParseError::FieldCount(fields.len()));
        }
        let mut values = [0.0f64; 3];
        for (slot, field) in values.iter_mut().zip(&fields) {
            let trimmed = field.trim();
            *slot = trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| CameraParseError::InvalidNumber(trimmed.to_string()))?;
        }
        let [x, y, distance] = values;
        if distance <= 0.0 {
            return Err(CameraParseError::NonPositiveDistance(distance));
        }
        Ok(Self::new(Point::new(x, y), distance))
    }
}

/// Camera as reported by the renderer, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCamera {
    pub target: [f64; 2],
    pub distance: f64,
}

impl RawCamera {
    pub fn normalize(&self) -> CameraState {
        CameraState::normalized(Point::new(self.target[0], self.target[1]), self.distance)
    }
}

impl From<CameraState> for RawCamera {
    fn from(camera: CameraState) -> Self {
        Self {
            target: [camera.target.x, camera.target.y],
            distance: camera.distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_location_roundtrip() {
        for s in ["0.25,-0.5,0.01", "1e-3,3.14159,2", "-0.123456789012345,0,100"] {
            let camera = CameraState::from_location(Some(s));
            let back: CameraState = camera.to_location().parse().unwrap();
            let expected: Vec<f64> = s.split(',').map(|v| v.parse().unwrap()).collect();
            assert_relative_eq!(back.target.x, expected[0], epsilon = 1e-12);
            assert_relative_eq!(back.target.y, expected[1], epsilon = 1e-12);
            assert_relative_eq!(back.distance, expected[2], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_malformed_location_defaults() {
        for s in ["", "1,2", "1,2,3,4", "a,b,c", "0,0,0", "0,0,-1", "0,NaN,1", "inf,0,1"] {
            assert_eq!(CameraState::from_location(Some(s)), CameraState::ORIGIN, "{s}");
        }
        assert_eq!(CameraState::from_location(None), CameraState::ORIGIN);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "1,2".parse::<CameraState>(),
            Err(CameraParseError::FieldCount(2))
        );
        assert_eq!(
            "1,x,2".parse::<CameraState>(),
            Err(CameraParseError::InvalidNumber("x".into()))
        );
    }

    #[test]
    fn test_normalize_repairs_values() {
        let raw = RawCamera {
            target: [f64::NAN, 0.5],
            distance: -3.0,
        };
        let camera = raw.normalize();
        assert_eq!(camera.target, Point::new(0.0, 0.5));
        assert_eq!(camera.distance, MIN_DISTANCE);

        let camera = CameraState::normalized(Point::ORIGIN, f64::INFINITY);
        assert_eq!(camera.distance, 1.0);
    }

    #[test]
    fn test_frustum_and_zoom_factor() {
        let camera = CameraState::new(Point::new(0.5, -0.5), 0.25);
        let f = camera.frustum();
        assert_relative_eq!(f.min.x, 0.25, epsilon = 1e-12);
        assert_relative_eq!(f.max.y, -0.25, epsilon = 1e-12);
        assert_relative_eq!(camera.zoom_factor(), 4.0, epsilon = 1e-12);
    }
}
