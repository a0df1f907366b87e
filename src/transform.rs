use crate::config::CanvasConfig;
use crate::node::{Point, Rectangle, Size};
use serde::{Deserialize, Serialize};

/// Allowed zoom range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(config.min_zoom, config.max_zoom)
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self::new(0.2, 4.0)
    }
}

/// Current pan/zoom of the visible canvas area.
///
/// Screen coordinates are relative to the canvas' top-left corner:
/// `screen = graph * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan: Point,
    pub zoom: f64,
    pub size: Size,
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            pan: Point::ZERO,
            zoom: 1.0,
            size,
        }
    }

    pub fn with_transform(pan: Point, zoom: f64, size: Size) -> Self {
        Self { pan, zoom, size }
    }

    pub fn graph_to_screen(&self, point: Point) -> Point {
        Point::new(point.x * self.zoom + self.pan.x, point.y * self.zoom + self.pan.y)
    }

    pub fn screen_to_graph(&self, point: Point) -> Point {
        Point::new((point.x - self.pan.x) / self.zoom, (point.y - self.pan.y) / self.zoom)
    }

    pub fn graph_to_screen_rect(&self, rect: &Rectangle) -> Rectangle {
        let origin = self.graph_to_screen(Point::new(rect.x, rect.y));
        Rectangle::new(origin.x, origin.y, rect.width * self.zoom, rect.height * self.zoom)
    }

    /// Finite pan and a finite, strictly positive zoom
    pub fn is_usable(&self) -> bool {
        self.zoom.is_finite() && self.zoom > 0.0 && self.pan.x.is_finite() && self.pan.y.is_finite()
    }

    pub fn resized(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan = self.pan.offset(dx, dy);
    }

    /// Multiply the zoom by `factor`, keeping the graph point under `focus` still
    pub fn zoom_by(&mut self, factor: f64, focus: Point, limits: ZoomLimits) {
        if !(factor > 0.0) {
            return;
        }
        let anchor = self.screen_to_graph(focus);
        self.zoom = limits.clamp(self.zoom * factor);
        self.pan = Point::new(focus.x - anchor.x * self.zoom, focus.y - anchor.y * self.zoom);
    }

    pub fn zoom_in(&mut self, step: f64, limits: ZoomLimits) {
        self.zoom_by(step, self.center(), limits);
    }

    pub fn zoom_out(&mut self, step: f64, limits: ZoomLimits) {
        self.zoom_by(1.0 / step, self.center(), limits);
    }

    /// Center `bounds` in the viewport at the largest zoom that fits
    pub fn fit_to(&mut self, bounds: &Rectangle, padding: f64, limits: ZoomLimits) {
        let scale = 1.0 + 2.0 * padding.max(0.0);
        let width = bounds.width.max(1.0) * scale;
        let height = bounds.height.max(1.0) * scale;
        self.zoom = limits.clamp((self.size.width / width).min(self.size.height / height));

        let center = bounds.center();
        self.pan = Point::new(
            self.size.width / 2.0 - center.x * self.zoom,
            self.size.height / 2.0 - center.y * self.zoom,
        );
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 720.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_degenerate_viewports_are_unusable() {
        let size = Size::new(800.0, 600.0);
        assert!(Viewport::new(size).is_usable());
        assert!(!Viewport::with_transform(Point::ZERO, 0.0, size).is_usable());
        assert!(!Viewport::with_transform(Point::ZERO, -1.0, size).is_usable());
        assert!(!Viewport::with_transform(Point::ZERO, f64::NAN, size).is_usable());
        assert!(!Viewport::with_transform(Point::new(f64::INFINITY, 0.0), 1.0, size).is_usable());
    }

    #[test]
    fn test_identity_transform() {
        let viewport = Viewport::new(Size::new(800.0, 600.0));
        let p = Point::new(12.5, -30.0);
        assert_eq!(viewport.graph_to_screen(p), p);
        assert_eq!(viewport.screen_to_graph(p), p);
    }

    #[test]
    fn test_pan_and_zoom() {
        let viewport = Viewport::with_transform(Point::new(100.0, 50.0), 2.0, Size::new(800.0, 600.0));
        let screen = viewport.graph_to_screen(Point::new(10.0, 20.0));
        assert_eq!(screen, Point::new(120.0, 90.0));
        assert!(approx(viewport.screen_to_graph(screen), Point::new(10.0, 20.0)));

        let rect = viewport.graph_to_screen_rect(&Rectangle::new(0.0, 0.0, 200.0, 70.0));
        assert_eq!(rect, Rectangle::new(100.0, 50.0, 400.0, 140.0));
    }

    #[test]
    fn test_zoom_keeps_focus_point() {
        let mut viewport = Viewport::with_transform(Point::new(30.0, -10.0), 1.0, Size::new(800.0, 600.0));
        let focus = Point::new(200.0, 150.0);
        let under_focus = viewport.screen_to_graph(focus);

        viewport.zoom_by(1.5, focus, ZoomLimits::default());
        assert_eq!(viewport.zoom, 1.5);
        assert!(approx(viewport.graph_to_screen(under_focus), focus));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let limits = ZoomLimits::default();
        let mut viewport = Viewport::default();
        for _ in 0..50 {
            viewport.zoom_in(1.2, limits);
        }
        assert_eq!(viewport.zoom, 4.0);
        for _ in 0..100 {
            viewport.zoom_out(1.2, limits);
        }
        assert_eq!(viewport.zoom, 0.2);

        viewport.zoom_by(0.0, Point::ZERO, limits);
        assert_eq!(viewport.zoom, 0.2);
    }

    #[test]
    fn test_fit_to_centers_bounds() {
        let mut viewport = Viewport::new(Size::new(800.0, 600.0));
        let bounds = Rectangle::new(400.0, 100.0, 200.0, 250.0);
        viewport.fit_to(&bounds, 0.1, ZoomLimits::default());

        let center = viewport.graph_to_screen(bounds.center());
        assert!(approx(center, Point::new(400.0, 300.0)));
        // Height is the limiting dimension: 600 / (250 * 1.2)
        assert!((viewport.zoom - 2.0).abs() < 1e-9);
    }
}
