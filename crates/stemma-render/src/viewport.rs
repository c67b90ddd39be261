//! Pan/zoom state for the whole scene.
//!
//! The transform maps scene coordinates to screen coordinates as `screen = scene * k + (x, y)`.

use crate::model::{Bounds, LayoutPoint};
use crate::{Error, Result};
use serde::Serialize;
use stemma_core::StemmaConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn apply(&self, p: LayoutPoint) -> LayoutPoint {
        LayoutPoint::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    pub fn invert(&self, p: LayoutPoint) -> LayoutPoint {
        LayoutPoint::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }

    /// SVG `transform` attribute value.
    pub fn to_svg_attr(&self) -> String {
        format!(
            "translate({},{}) scale({})",
            crate::svg::util::fmt(self.x),
            crate::svg::util::fmt(self.y),
            crate::svg::util::fmt(self.k)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewport {
    width: f64,
    height: f64,
    min_scale: f64,
    max_scale: f64,
    padding: f64,
    transform: ViewTransform,
    fitted: bool,
}

impl Viewport {
    pub fn new(width: f64, height: f64, min_scale: f64, max_scale: f64, padding: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::InvalidViewport {
                message: format!("viewport size must be finite and positive, got {width}x{height}"),
            });
        }
        if !(min_scale.is_finite() && max_scale.is_finite() && min_scale > 0.0 && min_scale <= max_scale)
        {
            return Err(Error::InvalidViewport {
                message: format!("scale range [{min_scale}, {max_scale}] is empty or not positive"),
            });
        }
        Ok(Self {
            width,
            height,
            min_scale,
            max_scale,
            padding: if padding.is_finite() { padding.max(0.0) } else { 0.0 },
            transform: ViewTransform::IDENTITY,
            fitted: false,
        })
    }

    pub fn from_config(config: &StemmaConfig) -> Result<Self> {
        Self::new(
            config.get_f64("viewport.width").unwrap_or(900.0),
            config.get_f64("viewport.height").unwrap_or(600.0),
            config.get_f64("viewport.minScale").unwrap_or(0.2),
            config.get_f64("viewport.maxScale").unwrap_or(4.0),
            config.get_f64("viewport.fitPadding").unwrap_or(50.0),
        )
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn scale_range(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn clamp_scale(&self, k: f64) -> f64 {
        if k.is_nan() {
            return 1.0_f64.clamp(self.min_scale, self.max_scale);
        }
        k.clamp(self.min_scale, self.max_scale)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> ViewTransform {
        if dx.is_finite() && dy.is_finite() {
            self.transform.x += dx;
            self.transform.y += dy;
        }
        self.transform
    }

    /// Multiplies the scale by `factor`, keeping the scene point under `anchor` (screen space)
    /// fixed.
    pub fn zoom_by(&mut self, factor: f64, anchor: LayoutPoint) -> ViewTransform {
        if !factor.is_finite() || factor <= 0.0 {
            return self.transform;
        }
        self.zoom_to(self.transform.k * factor, anchor)
    }

    pub fn zoom_to(&mut self, k: f64, anchor: LayoutPoint) -> ViewTransform {
        let k = self.clamp_scale(k);
        let scene = self.transform.invert(anchor);
        self.transform = ViewTransform {
            k,
            x: anchor.x - scene.x * k,
            y: anchor.y - scene.y * k,
        };
        self.transform
    }

    pub fn screen_to_scene(&self, p: LayoutPoint) -> LayoutPoint {
        self.transform.invert(p)
    }

    /// Transform that centers `bounds` in the viewport at the clamped fitting scale.
    pub fn fit_transform(&self, bounds: &Bounds) -> ViewTransform {
        let raw = ((self.width - self.padding) / bounds.width())
            .min((self.height - self.padding) / bounds.height());
        let k = self.clamp_scale(raw);
        ViewTransform {
            k,
            x: (self.width - bounds.width() * k) / 2.0 - bounds.min_x * k,
            y: (self.height - bounds.height() * k) / 2.0 - bounds.min_y * k,
        }
    }

    /// Fits the viewport to `bounds` the first time it is called. Later calls leave manual
    /// pan/zoom untouched and return `None`.
    pub fn auto_fit(&mut self, bounds: Option<Bounds>) -> Option<ViewTransform> {
        if self.fitted {
            return None;
        }
        self.fitted = true;
        let Some(bounds) = bounds else {
            tracing::debug!("auto-fit skipped: empty scene");
            return None;
        };
        self.transform = self.fit_transform(&bounds);
        tracing::debug!(k = self.transform.k, x = self.transform.x, y = self.transform.y, "auto-fit");
        Some(self.transform)
    }
}
