//! Pan, zoom and grid state of the canvas.
//!
//! Screen space is what pointer events report; canvas space is what nodes
//! are stored in. `screen = canvas * zoom + pan`.

use crate::{DesignerConfig, Position, Rectangle, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Cell size in canvas units
    pub size: f32,
    pub visible: bool,
    /// Dropped nodes land on grid intersections
    pub snap: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            size: 50.0,
            visible: true,
            snap: false,
        }
    }
}

/// Viewport of one designer session; never persisted with the workflow
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasState {
    pan: Position,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    zoom_sensitivity: f32,
    pub grid: GridSettings,
}

impl CanvasState {
    pub fn new(config: &DesignerConfig) -> Self {
        Self {
            pan: Position::ORIGIN,
            zoom: 1.0_f32.max(config.min_zoom).min(config.max_zoom),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_sensitivity: config.zoom_sensitivity,
            grid: config.grid,
        }
    }

    pub fn pan(&self) -> Position {
        self.pan
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn zoom_range(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn to_screen(&self, canvas: Position) -> Position {
        canvas.scale(self.zoom) + self.pan
    }

    pub fn to_canvas(&self, screen: Position) -> Position {
        (screen - self.pan).scale(1.0 / self.zoom)
    }

    pub fn rect_to_screen(&self, rect: &Rectangle) -> Rectangle {
        Rectangle::from_origin_size(
            self.to_screen(rect.origin()),
            Size::new(rect.width * self.zoom, rect.height * self.zoom),
        )
    }

    /// Shift the view by a screen-space delta
    pub fn pan_by(&mut self, delta: Position) {
        if delta.is_finite() {
            self.pan = self.pan + delta;
        }
    }

    /// Set zoom, clamped to the configured range. Returns the applied value.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            self.zoom = zoom.max(self.min_zoom).min(self.max_zoom);
        }
        self.zoom
    }

    /// Wheel zoom around a screen point; the canvas point under the cursor
    /// stays under the cursor
    pub fn zoom_at(&mut self, screen: Position, wheel_delta: f32) {
        let anchor = self.to_canvas(screen);
        let old = self.zoom;
        let new = self.set_zoom(old - wheel_delta * self.zoom_sensitivity);
        if new == old {
            return;
        }
        self.pan = screen - anchor.scale(new);
    }

    /// Zoom and pan so `bounds` fills the viewport with `padding` screen
    /// pixels on every side
    pub fn fit_to(&mut self, bounds: &Rectangle, viewport: Size, padding: f32) {
        let avail_w = (viewport.width - 2.0 * padding).max(1.0);
        let avail_h = (viewport.height - 2.0 * padding).max(1.0);

        if bounds.is_empty() {
            self.set_zoom(1.0);
        } else {
            self.set_zoom((avail_w / bounds.width).min(avail_h / bounds.height));
        }

        // Center the bounds
        let center = bounds.center();
        self.pan = Position::new(
            viewport.width / 2.0 - center.x * self.zoom,
            viewport.height / 2.0 - center.y * self.zoom,
        );
    }

    /// Canvas-space rectangle currently on screen
    pub fn visible_rect(&self, viewport: Size) -> Rectangle {
        Rectangle::from_origin_size(
            self.to_canvas(Position::ORIGIN),
            Size::new(viewport.width / self.zoom, viewport.height / self.zoom),
        )
    }

    /// Round to the nearest grid intersection when snapping is on
    pub fn snap(&self, position: Position) -> Position {
        if !self.grid.snap || self.grid.size <= 0.0 {
            return position;
        }
        let size = self.grid.size;
        Position::new(
            (position.x / size).round() * size,
            (position.y / size).round() * size,
        )
    }

    pub fn reset(&mut self) {
        self.pan = Position::ORIGIN;
        self.zoom = 1.0_f32.max(self.min_zoom).min(self.max_zoom);
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(&DesignerConfig::default())
    }
}
