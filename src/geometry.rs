//! Geometry kernel: positions, rectangles and edge routing.
//!
//! Everything here is a pure function of its inputs. The same positions
//! always produce the same [`PathSpec`], which is what lets the render layer
//! memoise edge paths.

use crate::{ConnectionPoint, EdgeId, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Sub};

/// A point in canvas (model) space or screen space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn is_non_negative(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0
    }

    /// Clamp both coordinates to `>= 0`
    pub fn clamped_non_negative(self) -> Self {
        Self::new(self.x.max(0.0), self.y.max(0.0))
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn distance_to(self, other: Position) -> f32 {
        let d = other - self;
        (d.x * d.x + d.y * d.y).sqrt()
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height of a node on the canvas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// Rectangle representing position and size on canvas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Position, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Normalised rectangle spanning two arbitrary corners
    pub fn from_corners(a: Position, b: Position) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Get the right edge of the rectangle
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom edge of the rectangle
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if this rectangle intersects with another
    pub fn intersects(&self, other: &Rectangle) -> bool {
        !(self.right() < other.x
            || other.right() < self.x
            || self.bottom() < other.y
            || other.bottom() < self.y)
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains_point(&self, point: Position) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rectangle::new(x, y, right - x, bottom - y)
    }
}

// ========== Node geometry ==========

/// Canvas-space position of a connection point.
///
/// Mapping the result to the screen is the viewport's job
/// ([`CanvasState::to_screen`](crate::CanvasState::to_screen)).
pub fn connection_point_world_position(node: &Node, point: &ConnectionPoint) -> Position {
    node.position + point.offset
}

/// Min/max reduction over node rectangles. An empty input yields a zero-area
/// rectangle at the origin.
pub fn bounding_box_of<'a, I>(nodes: I) -> Rectangle
where
    I: IntoIterator<Item = &'a Node>,
{
    nodes
        .into_iter()
        .map(Node::bounds)
        .reduce(|acc, bounds| acc.union(&bounds))
        .unwrap_or_default()
}

// ========== Edge routing ==========

/// Tunables for the bump/curve/bump edge shape
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EdgeStyle {
    /// Length of the straight segment leaving and entering a port
    pub bump_length: f32,
    /// Control-point offset as a fraction of the horizontal distance
    pub curve_factor: f32,
    pub min_control_offset: f32,
    pub max_control_offset: f32,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            bump_length: 20.0,
            curve_factor: 0.5,
            min_control_offset: 30.0,
            max_control_offset: 150.0,
        }
    }
}

/// Render-ready description of one edge.
///
/// The shape is: straight segment `start -> bump_out`, cubic curve
/// `bump_out -> bump_in` through the two control points, straight segment
/// `bump_in -> end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    pub start: Position,
    pub bump_out: Position,
    pub control_out: Position,
    pub control_in: Position,
    pub bump_in: Position,
    pub end: Position,
}

const CURVE_SAMPLES: usize = 24;

impl PathSpec {
    /// SVG path data, two decimals per coordinate
    pub fn to_svg(&self) -> String {
        format!(
            "M {:.2} {:.2} L {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2} L {:.2} {:.2}",
            self.start.x,
            self.start.y,
            self.bump_out.x,
            self.bump_out.y,
            self.control_out.x,
            self.control_out.y,
            self.control_in.x,
            self.control_in.y,
            self.bump_in.x,
            self.bump_in.y,
            self.end.x,
            self.end.y,
        )
    }

    /// Point on the cubic section, `t` in `[0, 1]`
    pub fn curve_point(&self, t: f32) -> Position {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        Position::new(
            b0 * self.bump_out.x + b1 * self.control_out.x + b2 * self.control_in.x + b3 * self.bump_in.x,
            b0 * self.bump_out.y + b1 * self.control_out.y + b2 * self.control_in.y + b3 * self.bump_in.y,
        )
    }

    /// Polyline approximation of the whole path, start to end
    pub fn sample(&self) -> Vec<Position> {
        let mut points = Vec::with_capacity(CURVE_SAMPLES + 3);
        points.push(self.start);
        for i in 0..=CURVE_SAMPLES {
            points.push(self.curve_point(i as f32 / CURVE_SAMPLES as f32));
        }
        points.push(self.end);
        points
    }

    /// Shortest distance from `point` to the (sampled) path
    pub fn distance_to(&self, point: Position) -> f32 {
        self.sample()
            .windows(2)
            .map(|seg| distance_to_segment(point, seg[0], seg[1]))
            .fold(f32::INFINITY, f32::min)
    }

    pub fn bounds(&self) -> Rectangle {
        self.sample()
            .into_iter()
            .map(|p| Rectangle::new(p.x, p.y, 0.0, 0.0))
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or_default()
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_svg())
    }
}

fn distance_to_segment(p: Position, a: Position, b: Position) -> f32 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance_to(a + ab.scale(t))
}

/// Edge path between an output port at `source` and an input port at
/// `target`, using the default [`EdgeStyle`]
pub fn edge_path(source: Position, target: Position) -> PathSpec {
    edge_path_with(&EdgeStyle::default(), source, target)
}

/// Edge path with explicit style.
///
/// The path always leaves the source to the right and enters the target from
/// the left, so it never doubles back through either node body.
pub fn edge_path_with(style: &EdgeStyle, source: Position, target: Position) -> PathSpec {
    let bump_out = Position::new(source.x + style.bump_length, source.y);
    let bump_in = Position::new(target.x - style.bump_length, target.y);

    let dx = (bump_in.x - bump_out.x).abs();
    // An inverted min/max pair resolves to max_control_offset
    let offset = (dx * style.curve_factor)
        .max(style.min_control_offset)
        .min(style.max_control_offset);

    PathSpec {
        start: source,
        bump_out,
        control_out: Position::new(bump_out.x + offset, bump_out.y),
        control_in: Position::new(bump_in.x - offset, bump_in.y),
        bump_in,
        end: target,
    }
}

// ========== Path cache ==========

#[derive(Debug, Clone)]
struct CachedPath {
    source: Position,
    target: Position,
    path: PathSpec,
}

/// Memoised edge paths keyed by edge id; recomputed only when an endpoint
/// moved
#[derive(Debug, Clone, Default)]
pub struct EdgePathCache {
    style: EdgeStyle,
    paths: HashMap<EdgeId, CachedPath>,
}

impl EdgePathCache {
    pub fn new(style: EdgeStyle) -> Self {
        Self {
            style,
            paths: HashMap::new(),
        }
    }

    pub fn style(&self) -> &EdgeStyle {
        &self.style
    }

    pub fn get_or_compute(&mut self, id: EdgeId, source: Position, target: Position) -> PathSpec {
        let style = self.style;
        let entry = self.paths.entry(id).or_insert_with(|| CachedPath {
            source,
            target,
            path: edge_path_with(&style, source, target),
        });

        if entry.source != source || entry.target != target {
            entry.source = source;
            entry.target = target;
            entry.path = edge_path_with(&style, source, target);
        }

        entry.path
    }

    /// Drop entries for edges that no longer exist
    pub fn retain(&mut self, mut keep: impl FnMut(&EdgeId) -> bool) {
        self.paths.retain(|id, _| keep(id));
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataType, Node, Port, PortDirection};

    fn node_at(x: f32, y: f32, w: f32, h: f32) -> Node {
        Node::new("n", "prog", Position::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_rectangle_operations() {
        let rect1 = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        let rect2 = Rectangle::new(50.0, 50.0, 100.0, 100.0);
        let rect3 = Rectangle::new(200.0, 200.0, 100.0, 100.0);

        assert!(rect1.intersects(&rect2));
        assert!(!rect1.intersects(&rect3));

        assert!(rect1.contains_point(Position::new(50.0, 50.0)));
        assert!(!rect1.contains_point(Position::new(150.0, 150.0)));

        assert_eq!(rect1.right(), 100.0);
        assert_eq!(rect1.bottom(), 100.0);
        assert_eq!(rect1.union(&rect3), Rectangle::new(0.0, 0.0, 300.0, 300.0));
    }

    #[test]
    fn test_from_corners_normalises() {
        let rect = Rectangle::from_corners(Position::new(10.0, 40.0), Position::new(-5.0, 0.0));
        assert_eq!(rect, Rectangle::new(-5.0, 0.0, 15.0, 40.0));
    }

    #[test]
    fn test_bounding_box_empty_is_zero_area() {
        let nodes: Vec<Node> = Vec::new();
        let bounds = bounding_box_of(&nodes);
        assert_eq!(bounds, Rectangle::default());
        assert!(bounds.is_empty());
    }

    #[test]
    fn test_bounding_box_of_nodes() {
        let nodes = vec![node_at(10.0, 20.0, 100.0, 50.0), node_at(300.0, 0.0, 80.0, 40.0)];
        assert_eq!(bounding_box_of(&nodes), Rectangle::new(10.0, 0.0, 370.0, 70.0));
    }

    #[test]
    fn test_connection_point_world_position() {
        let node = node_at(100.0, 50.0, 200.0, 80.0)
            .with_input(Port::required("in", DataType::new("string")))
            .with_output(Port::optional("out", DataType::any()));

        let input = node.connection_point(PortDirection::Input, "in").unwrap();
        let output = node.connection_point(PortDirection::Output, "out").unwrap();

        assert_eq!(
            connection_point_world_position(&node, &input),
            Position::new(100.0, 90.0)
        );
        assert_eq!(
            connection_point_world_position(&node, &output),
            Position::new(300.0, 90.0)
        );
    }

    #[test]
    fn test_edge_path_shape() {
        let path = edge_path(Position::new(0.0, 0.0), Position::new(300.0, 100.0));

        assert_eq!(path.bump_out, Position::new(20.0, 0.0));
        assert_eq!(path.bump_in, Position::new(280.0, 100.0));
        // dx = 260, offset = 130
        assert_eq!(path.control_out, Position::new(150.0, 0.0));
        assert_eq!(path.control_in, Position::new(150.0, 100.0));
        assert_eq!(
            path.to_svg(),
            "M 0.00 0.00 L 20.00 0.00 C 150.00 0.00, 150.00 100.00, 280.00 100.00 L 300.00 100.00"
        );
    }

    #[test]
    fn test_edge_path_offset_is_capped() {
        let path = edge_path(Position::new(0.0, 0.0), Position::new(2000.0, 0.0));
        assert_eq!(path.control_out.x - path.bump_out.x, 150.0);
        assert_eq!(path.bump_in.x - path.control_in.x, 150.0);
    }

    #[test]
    fn test_inverted_offset_range_uses_max() {
        let style = EdgeStyle {
            min_control_offset: 200.0,
            max_control_offset: 50.0,
            ..EdgeStyle::default()
        };
        let path = edge_path_with(&style, Position::new(0.0, 0.0), Position::new(300.0, 0.0));
        assert_eq!(path.control_out.x - path.bump_out.x, 50.0);
    }

    #[test]
    fn test_backward_edge_bows_outwards() {
        // Target left of the source: the curve must still leave rightwards
        let path = edge_path(Position::new(300.0, 0.0), Position::new(0.0, 50.0));
        assert!(path.bump_out.x > path.start.x);
        assert!(path.control_out.x > path.bump_out.x);
        assert!(path.bump_in.x < path.end.x);
        assert!(path.control_in.x < path.bump_in.x);
    }

    #[test]
    fn test_edge_path_deterministic() {
        let a = Position::new(12.5, 7.25);
        let b = Position::new(410.0, -33.0);
        assert_eq!(edge_path(a, b).to_svg(), edge_path(a, b).to_svg());
    }

    #[test]
    fn test_path_distance() {
        let path = edge_path(Position::new(0.0, 0.0), Position::new(300.0, 0.0));
        assert!(path.distance_to(Position::new(150.0, 0.0)) < 0.01);
        assert!((path.distance_to(Position::new(150.0, 40.0)) - 40.0).abs() < 0.01);
    }

    #[test]
    fn test_path_cache_recomputes_on_move() {
        let mut cache = EdgePathCache::new(EdgeStyle::default());
        let id = EdgeId::new();

        let first = cache.get_or_compute(id, Position::ORIGIN, Position::new(100.0, 0.0));
        let again = cache.get_or_compute(id, Position::ORIGIN, Position::new(100.0, 0.0));
        assert_eq!(first, again);

        let moved = cache.get_or_compute(id, Position::ORIGIN, Position::new(100.0, 60.0));
        assert_ne!(first, moved);
        assert_eq!(cache.len(), 1);

        cache.retain(|_| false);
        assert!(cache.is_empty());
    }
}
