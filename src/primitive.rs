//! # Primitives
//!
//! Drawable geometric units stored in the [`DrawManager`](crate::DrawManager). A primitive knows
//! its byte size, can flatten itself into the vertex wire format and can be recolored.
//!
//! Primitive kinds form a closed sum type. Only [`Line`] exists today; further kinds (triangles,
//! polygons) become new variants of [`Primitive`] and get their arm in each `match` below.

use crate::vertex::Vertex;

/// A line segment between two independently colorable vertices.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Line {
    pub start: Vertex,
    pub end: Vertex,
}

impl Line {
    /// Number of vertices in a line.
    pub const VERTEX_COUNT: usize = 2;

    /// Number of floats a line flattens to.
    pub const FLOAT_LEN: usize = Self::VERTEX_COUNT * Vertex::STRIDE;

    pub fn new(start: Vertex, end: Vertex) -> Self {
        Self { start, end }
    }

    /// Creates a zero-length line at `point`, both ends colored `color`.
    ///
    /// This is the shape of a segment right after the pointer goes down.
    pub fn degenerate(point: [f32; 3], color: [f32; 4]) -> Self {
        let vertex = Vertex::with_color(point, color);
        Self::new(vertex, vertex)
    }

    /// Returns a copy of this line whose end point is moved to `point`.
    pub fn with_end(mut self, point: [f32; 3]) -> Self {
        self.end.set_position(point);
        self
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.start.set_color(color);
        self.end.set_color(color);
    }

    pub fn write_floats(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.start.to_floats());
        out.extend_from_slice(&self.end.to_floats());
    }

    /// Rebuilds a line from the first [`Line::FLOAT_LEN`] floats of `floats`.
    pub fn from_floats(floats: &[f32]) -> Option<Self> {
        let floats = floats.get(..Self::FLOAT_LEN)?;
        let (start, end) = floats.split_at(Vertex::STRIDE);
        Some(Self::new(Vertex::from_floats(start)?, Vertex::from_floats(end)?))
    }
}

/// A drawable primitive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Primitive {
    Line(Line),
}

impl Primitive {
    pub fn vertex_count(&self) -> usize {
        match self {
            Primitive::Line(_) => Line::VERTEX_COUNT,
        }
    }

    pub fn float_len(&self) -> usize {
        self.vertex_count() * Vertex::STRIDE
    }

    /// Size of the flattened primitive in bytes.
    pub fn byte_size(&self) -> usize {
        self.vertex_count() * Vertex::BYTE_SIZE
    }

    /// Appends the flattened vertex data of this primitive to `out`.
    pub fn write_floats(&self, out: &mut Vec<f32>) {
        match self {
            Primitive::Line(line) => line.write_floats(out),
        }
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        match self {
            Primitive::Line(line) => line.set_color(color),
        }
    }

    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Primitive::Line(line) => Some(line),
        }
    }
}

impl From<Line> for Primitive {
    fn from(line: Line) -> Self {
        Primitive::Line(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_sizes() {
        let primitive = Primitive::from(Line::degenerate([1.0, 2.0, 0.0], [1.0; 4]));
        assert_eq!(primitive.vertex_count(), 2);
        assert_eq!(primitive.float_len(), 24);
        assert_eq!(primitive.byte_size(), 96);

        let mut floats = Vec::new();
        primitive.write_floats(&mut floats);
        assert_eq!(floats.len(), primitive.float_len());
    }

    #[test]
    fn set_color_reaches_both_ends() {
        let mut primitive = Primitive::from(Line::new(
            Vertex::new([0.0, 0.0, 0.0]),
            Vertex::new([1.0, 1.0, 0.0]),
        ));
        primitive.set_color([0.0, 0.0, 1.0, 1.0]);

        let line = primitive.as_line().copied().unwrap();
        assert_eq!(line.start.color(), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(line.end.color(), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn with_end_keeps_start() {
        let line = Line::degenerate([3.0, 4.0, 0.0], [1.0; 4]).with_end([10.0, -2.0, 0.0]);
        assert_eq!(line.start.position(), [3.0, 4.0, 0.0]);
        assert_eq!(line.end.position(), [10.0, -2.0, 0.0]);
    }
}
