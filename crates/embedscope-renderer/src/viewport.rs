use serde::{Deserialize, Serialize};

use embedscope_core::{CameraState, Point};

/// Data-space domain on both axes; fixed for the life of a session.
pub const DATA_DOMAIN: (f64, f64) = (-1.0, 1.0);

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 1.0 && self.height >= 1.0
    }
}

/// A position on the canvas, in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Affine map from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Data value to pixel. A degenerate domain maps everything to the range start.
    pub fn apply(&self, value: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 {
            return self.range.0;
        }
        self.range.0 + (value - self.domain.0) / span * (self.range.1 - self.range.0)
    }

    /// Pixel to data value.
    pub fn invert(&self, pixel: f64) -> f64 {
        let span = self.range.1 - self.range.0;
        if span == 0.0 {
            return self.domain.0;
        }
        self.domain.0 + (pixel - self.range.0) / span * (self.domain.1 - self.domain.0)
    }

    /// Same range, new domain.
    pub fn with_domain(&self, domain: (f64, f64)) -> Self {
        Self {
            domain,
            range: self.range,
        }
    }
}

/// Pair of scales mapping data space onto the canvas.
///
/// Rebuilt whenever the canvas size or the camera changes; never cached across
/// either.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapper {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl CoordinateMapper {
    /// Base mapping: the whole data domain stretched over the canvas.
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            x: LinearScale::new(DATA_DOMAIN, (0.0, canvas.width)),
            y: LinearScale::new(DATA_DOMAIN, (0.0, canvas.height)),
        }
    }

    /// Mapping for the part of data space visible through `camera`.
    pub fn for_camera(canvas: CanvasSize, camera: &CameraState) -> Self {
        let frustum = camera.frustum();
        let base = Self::new(canvas);
        Self {
            x: base.x.with_domain((frustum.min.x, frustum.max.x)),
            y: base.y.with_domain((frustum.min.y, frustum.max.y)),
        }
    }

    pub fn from_scales(x: LinearScale, y: LinearScale) -> Self {
        Self { x, y }
    }

    pub fn to_pixel(&self, point: &Point) -> Pixel {
        Pixel::new(self.x.apply(point.x), self.y.apply(point.y))
    }

    pub fn to_data(&self, pixel: &Pixel) -> Point {
        Point::new(self.x.invert(pixel.x), self.y.invert(pixel.y))
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(
            (self.x.range.1 - self.x.range.0).abs(),
            (self.y.range.1 - self.y.range.0).abs(),
        )
    }

    /// Camera whose frustum matches this mapping's domain.
    pub fn camera(&self) -> CameraState {
        let half = ((self.x.domain.1 - self.x.domain.0) / 2.0).abs();
        CameraState::normalized(
            Point::new(
                (self.x.domain.0 + self.x.domain.1) / 2.0,
                (self.y.domain.0 + self.y.domain.1) / 2.0,
            ),
            half,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_base_mapping() {
        let mapper = CoordinateMapper::new(CanvasSize::new(800.0, 600.0));
        let center = mapper.to_pixel(&Point::ORIGIN);
        assert_relative_eq!(center.x, 400.0, epsilon = 1e-9);
        assert_relative_eq!(center.y, 300.0, epsilon = 1e-9);
        let corner = mapper.to_pixel(&Point::new(-1.0, 1.0));
        assert_relative_eq!(corner.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(corner.y, 600.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inverse() {
        let mapper = CoordinateMapper::new(CanvasSize::new(1024.0, 768.0));
        let p = Point::new(0.123, -0.456);
        let back = mapper.to_data(&mapper.to_pixel(&p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
    }

    #[test]
    fn test_camera_mapping_centers_target() {
        let canvas = CanvasSize::new(500.0, 400.0);
        let camera = CameraState::new(Point::new(0.3, -0.2), 0.05);
        let mapper = CoordinateMapper::for_camera(canvas, &camera);
        let center = mapper.to_pixel(&camera.target);
        assert_relative_eq!(center.x, 250.0, epsilon = 1e-9);
        assert_relative_eq!(center.y, 200.0, epsilon = 1e-9);
        assert_relative_eq!(mapper.camera().distance, 0.05, epsilon = 1e-12);
        assert_eq!(mapper.canvas(), canvas);
    }

    #[test]
    fn test_resize_changes_mapping() {
        let camera = CameraState::ORIGIN;
        let small = CoordinateMapper::for_camera(CanvasSize::new(100.0, 100.0), &camera);
        let large = CoordinateMapper::for_camera(CanvasSize::new(200.0, 100.0), &camera);
        let p = Point::new(0.5, 0.5);
        assert_relative_eq!(small.to_pixel(&p).x, 75.0, epsilon = 1e-9);
        assert_relative_eq!(large.to_pixel(&p).x, 150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_scale() {
        let scale = LinearScale::new((1.0, 1.0), (0.0, 100.0));
        assert_eq!(scale.apply(5.0), 0.0);
        let scale = LinearScale::new((0.0, 1.0), (10.0, 10.0));
        assert_eq!(scale.invert(42.0), 0.0);
    }
}
