//! # Draw Manager
//!
//! The geometry store behind the vertex buffer. The `DrawManager` owns an ordered list of
//! [`Primitive`]s and exposes it as one contiguous float array, which is the exact byte image
//! the renderer uploads.
//!
//! ## Invariants
//!
//! - `to_float_array().len() == byte_size() / 4`, and after every upload the renderer's
//!   resident vertex count equals [`DrawManager::vertex_count`].
//! - Mutation happens at the tail only: [`DrawManager::add_last`], [`DrawManager::del_last`]
//!   and the atomic [`DrawManager::replace_last`] used while a segment is being dragged.
//!
//! ## Sharing
//!
//! One store is created at start-up and handed to both the renderer and the line tool as a
//! [`SharedDrawManager`]. Writers are funneled through the line tool; the renderer only reads
//! when it uploads.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::primitive::Primitive;

/// The store as shared between the renderer and the interaction layer.
pub type SharedDrawManager = Arc<RwLock<DrawManager>>;

/// Ordered, tail-mutable collection of drawable primitives.
#[derive(Debug, Default, Clone)]
pub struct DrawManager {
    primitives: Vec<Primitive>,
}

impl DrawManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh, empty store for sharing.
    pub fn shared() -> SharedDrawManager {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Appends `primitive` to the end of the store.
    pub fn add_last(&mut self, primitive: impl Into<Primitive>) {
        self.primitives.push(primitive.into());
    }

    /// Removes and returns the last primitive.
    ///
    /// On an empty store this is a no-op and returns `None`; a stray removal is an ordinary
    /// event race, not an error.
    pub fn del_last(&mut self) -> Option<Primitive> {
        let removed = self.primitives.pop();
        if removed.is_none() {
            log::debug!("del_last on an empty draw manager ignored");
        }
        removed
    }

    /// Replaces the last primitive with `primitive` and returns the one it replaced.
    ///
    /// Length and vertex count are unchanged when the store is non-empty. On an empty store
    /// the primitive is simply appended.
    pub fn replace_last(&mut self, primitive: impl Into<Primitive>) -> Option<Primitive> {
        let primitive = primitive.into();
        match self.primitives.last_mut() {
            Some(last) => Some(std::mem::replace(last, primitive)),
            None => {
                self.primitives.push(primitive);
                None
            }
        }
    }

    pub fn last(&self) -> Option<&Primitive> {
        self.primitives.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Primitive> {
        self.primitives.iter()
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Number of vertex records across all primitives.
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(Primitive::vertex_count).sum()
    }

    /// Size in bytes of the flattened vertex data.
    pub fn byte_size(&self) -> usize {
        self.primitives.iter().map(Primitive::byte_size).sum()
    }

    /// Flattens the whole store into `out`, replacing its previous contents.
    pub fn write_floats(&self, out: &mut Vec<f32>) {
        out.clear();
        out.reserve(self.byte_size() / std::mem::size_of::<f32>());
        for primitive in &self.primitives {
            primitive.write_floats(out);
        }
    }

    /// Returns the flattened vertex data in store order.
    pub fn to_float_array(&self) -> Vec<f32> {
        let mut floats = Vec::new();
        self.write_floats(&mut floats);
        floats
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }
}

impl<'a> IntoIterator for &'a DrawManager {
    type Item = &'a Primitive;
    type IntoIter = std::slice::Iter<'a, Primitive>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Line;
    use crate::vertex::Vertex;

    fn line(i: usize) -> Line {
        let f = i as f32;
        Line::new(
            Vertex::full([f, -f, 0.5], [0.0, 0.0, -1.0], [0.25, f], [f / 10.0, 0.2, 0.3, 1.0]),
            Vertex::with_color([f * 2.0, f + 1.0, 0.0], [0.9, 0.8, f / 100.0, 0.5]),
        )
    }

    #[test]
    fn flatten_round_trip() {
        let mut store = DrawManager::new();
        for i in 0..7 {
            store.add_last(line(i));
        }

        let floats = store.to_float_array();
        assert_eq!(floats.len(), 7 * 2 * Vertex::STRIDE);
        assert_eq!(floats.len(), store.byte_size() / 4);
        assert_eq!(store.vertex_count(), 14);

        for (i, chunk) in floats.chunks(Line::FLOAT_LEN).enumerate() {
            assert_eq!(Line::from_floats(chunk), Some(line(i)));
        }
    }

    #[test]
    fn flatten_is_deterministic() {
        let mut store = DrawManager::new();
        store.add_last(line(1));
        store.add_last(line(2));
        assert_eq!(store.to_float_array(), store.to_float_array());

        let mut reused = vec![42.0; 3];
        store.write_floats(&mut reused);
        assert_eq!(reused, store.to_float_array());
    }

    #[test]
    fn tail_replace_keeps_length() {
        let mut store = DrawManager::new();
        store.add_last(line(0));
        store.add_last(line(1));

        let replacement = Primitive::from(line(9));
        store.del_last();
        store.add_last(replacement);
        assert_eq!(store.len(), 2);
        assert_eq!(store.last(), Some(&replacement));

        let previous = store.replace_last(line(5));
        assert_eq!(previous, Some(replacement));
        assert_eq!(store.len(), 2);
        assert_eq!(store.vertex_count(), 4);
        assert_eq!(store.last(), Some(&Primitive::from(line(5))));
    }

    #[test]
    fn del_last_on_empty_is_noop() {
        let mut store = DrawManager::new();
        assert_eq!(store.del_last(), None);
        assert_eq!(store.len(), 0);
        assert!(store.to_float_array().is_empty());
    }

    #[test]
    fn replace_last_on_empty_appends() {
        let mut store = DrawManager::new();
        assert_eq!(store.replace_last(line(3)), None);
        assert_eq!(store.len(), 1);
    }
}
