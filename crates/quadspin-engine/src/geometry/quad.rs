use std::fmt;

use crate::coords::ColorRgba;
use crate::gfx::IndexType;

use super::Vertex;

/// Indexed triangle geometry.
///
/// Indices are `u8`: enough for any geometry with at most 256 vertices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geometry<const V: usize, const I: usize> {
    pub vertices: [Vertex; V],
    pub indices: [u8; I],
}

/// The sample's square: corners at (±1, ±1, 0), two triangles sharing the
/// 0–2 diagonal.
pub const QUAD: Geometry<4, 6> = Geometry {
    vertices: [
        Vertex::new([1.0, -1.0, 0.0], ColorRgba::RED),
        Vertex::new([1.0, 1.0, 0.0], ColorRgba::GREEN),
        Vertex::new([-1.0, 1.0, 0.0], ColorRgba::BLUE),
        Vertex::new([-1.0, -1.0, 0.0], ColorRgba::BLACK),
    ],
    indices: [0, 1, 2, 2, 3, 0],
};

impl<const V: usize, const I: usize> Geometry<V, I> {
    pub const INDEX_TYPE: IndexType = IndexType::U8;

    #[inline]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    #[inline]
    pub fn index_bytes(&self) -> &[u8] {
        &self.indices
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        I as u32
    }

    /// Checks that the index type can address every vertex, that indices
    /// describe whole triangles, and that no index is out of range.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if V > Self::INDEX_TYPE.max_vertices() {
            return Err(GeometryError::IndexTypeTooNarrow { vertex_count: V });
        }
        if I % 3 != 0 {
            return Err(GeometryError::PartialTriangle { index_count: I });
        }
        if let Some((position, &index)) =
            self.indices.iter().enumerate().find(|(_, i)| usize::from(**i) >= V)
        {
            return Err(GeometryError::IndexOutOfRange { position, index, vertex_count: V });
        }
        Ok(())
    }
}

/// Geometry that cannot be uploaded as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    IndexTypeTooNarrow { vertex_count: usize },
    PartialTriangle { index_count: usize },
    IndexOutOfRange { position: usize, index: u8, vertex_count: usize },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexTypeTooNarrow { vertex_count } => {
                write!(f, "{vertex_count} vertices cannot be addressed by u8 indices")
            }
            Self::PartialTriangle { index_count } => {
                write!(f, "{index_count} indices do not form whole triangles")
            }
            Self::IndexOutOfRange { position, index, vertex_count } => write!(
                f,
                "index {index} at position {position} is out of range for {vertex_count} vertices"
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_valid() {
        assert_eq!(QUAD.validate(), Ok(()));
    }

    #[test]
    fn quad_indices_reference_all_four_corners() {
        assert_eq!(QUAD.indices.len(), 6);
        assert!(QUAD.indices.iter().all(|&i| i < 4));
        for corner in 0..4u8 {
            assert!(QUAD.indices.contains(&corner), "corner {corner} unused");
        }
    }

    #[test]
    fn quad_byte_views_match_layout() {
        assert_eq!(QUAD.vertex_bytes().len(), 4 * Vertex::STRIDE as usize);
        assert_eq!(QUAD.index_bytes(), &[0, 1, 2, 2, 3, 0]);
        assert_eq!(QUAD.index_count(), 6);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut g = QUAD;
        g.indices[4] = 4;
        assert_eq!(
            g.validate(),
            Err(GeometryError::IndexOutOfRange { position: 4, index: 4, vertex_count: 4 })
        );
    }

    #[test]
    fn partial_triangle_is_rejected() {
        let g = Geometry { vertices: QUAD.vertices, indices: [0u8, 1, 2, 3] };
        assert_eq!(g.validate(), Err(GeometryError::PartialTriangle { index_count: 4 }));
    }

    #[test]
    fn too_many_vertices_for_u8() {
        let g = Geometry { vertices: [QUAD.vertices[0]; 300], indices: [0u8, 1, 2] };
        assert_eq!(g.validate(), Err(GeometryError::IndexTypeTooNarrow { vertex_count: 300 }));
    }
}
