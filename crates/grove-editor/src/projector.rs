//! Screen → canvas coordinate projection.
//!
//! The view owns pan/zoom and the container's on-screen rectangle. Both can
//! change between any two events, so they are read from the `CanvasHost` on
//! every call and never cached here.

use grove_core::Point;
use kurbo::{Affine, Rect};

/// Pan (in screen pixels) and zoom of the canvas viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom }
    }

    /// Canvas → container-local transform. Degenerate zoom is treated as 1.
    pub fn to_affine(self) -> Affine {
        let zoom = if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        };
        Affine::translate((self.x, self.y)) * Affine::scale(zoom)
    }
}

/// The view side of the canvas: where the container sits and how it is panned.
pub trait CanvasHost {
    /// Container rectangle in screen coordinates, `None` until mounted.
    fn container_rect(&self) -> Option<Rect>;

    fn transform(&self) -> ViewTransform;
}

/// A host with a fixed container and transform (headless embedding, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedHost {
    pub container: Option<Rect>,
    pub transform: ViewTransform,
}

impl FixedHost {
    pub fn mounted(container: Rect, transform: ViewTransform) -> Self {
        Self {
            container: Some(container),
            transform,
        }
    }

    pub fn unmounted() -> Self {
        Self::default()
    }
}

impl CanvasHost for FixedHost {
    fn container_rect(&self) -> Option<Rect> {
        self.container
    }

    fn transform(&self) -> ViewTransform {
        self.transform
    }
}

/// Project a screen point given an explicit container and transform.
pub fn project(screen: Point, container: Rect, transform: ViewTransform) -> Point {
    let local = screen - container.origin().to_vec2();
    transform.to_affine().inverse() * local
}

/// Project a screen point through the host's current state.
/// `None` when the container is not mounted yet.
pub fn project_with(host: &dyn CanvasHost, screen: Point) -> Option<Point> {
    let container = host.container_rect()?;
    Some(project(screen, container, host.transform()))
}
