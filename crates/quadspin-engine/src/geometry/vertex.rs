use bytemuck::{Pod, Zeroable};

use crate::coords::ColorRgba;
use crate::gfx::{AttribFormat, VertexAttrib};

/// Interleaved vertex: position followed by straight RGBA color.
///
/// The layout is tightly packed and must match [`Vertex::ATTRIBS`].
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    /// Byte offset of `color` within a vertex.
    pub const COLOR_OFFSET: u32 = std::mem::offset_of!(Vertex, color) as u32;

    pub const POSITION_LOCATION: u32 = 0;
    pub const COLOR_LOCATION: u32 = 1;

    /// Attribute bindings configured on the vertex array.
    pub const ATTRIBS: [VertexAttrib; 2] = [
        VertexAttrib {
            location: Self::POSITION_LOCATION,
            format: AttribFormat::Float32x3,
            stride: Self::STRIDE,
            offset: 0,
        },
        VertexAttrib {
            location: Self::COLOR_LOCATION,
            format: AttribFormat::Float32x4,
            stride: Self::STRIDE,
            offset: Self::COLOR_OFFSET,
        },
    ];

    #[inline]
    pub const fn new(position: [f32; 3], color: ColorRgba) -> Self {
        Self { position, color: color.to_array() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 28);
        assert_eq!(Vertex::COLOR_OFFSET, 12);
    }

    #[test]
    fn attribs_cover_the_whole_vertex() {
        let covered: u32 = Vertex::ATTRIBS.iter().map(|a| a.format.size_in_bytes()).sum();
        assert_eq!(covered, Vertex::STRIDE);
        assert_eq!(Vertex::ATTRIBS[1].offset, Vertex::ATTRIBS[0].format.size_in_bytes());
    }
}
