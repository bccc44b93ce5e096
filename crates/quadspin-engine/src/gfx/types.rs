/// Buffer binding points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data. The binding is part of the bound vertex array.
    ElementArray,
}

impl BufferTarget {
    pub(crate) fn label(self) -> &'static str {
        match self {
            BufferTarget::Array => "array buffer",
            BufferTarget::ElementArray => "element array buffer",
        }
    }
}

/// Vertex attribute component layout. Only float attributes are needed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttribFormat {
    Float32x3,
    Float32x4,
}

impl AttribFormat {
    #[inline]
    pub const fn components(self) -> u32 {
        match self {
            AttribFormat::Float32x3 => 3,
            AttribFormat::Float32x4 => 4,
        }
    }

    #[inline]
    pub const fn size_in_bytes(self) -> u32 {
        self.components() * 4
    }
}

/// One vertex attribute binding: where it lives in an interleaved buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttrib {
    pub location: u32,
    pub format: AttribFormat,
    pub stride: u32,
    pub offset: u32,
}

/// Width of one index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IndexType {
    U8,
    U16,
}

impl IndexType {
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            IndexType::U8 => 1,
            IndexType::U16 => 2,
        }
    }

    /// Largest vertex count every vertex of which is addressable.
    #[inline]
    pub const fn max_vertices(self) -> usize {
        match self {
            IndexType::U8 => u8::MAX as usize + 1,
            IndexType::U16 => u16::MAX as usize + 1,
        }
    }

    /// Decodes little-endian index data.
    pub fn decode(self, bytes: &[u8]) -> Vec<u32> {
        match self {
            IndexType::U8 => bytes.iter().map(|&b| u32::from(b)).collect(),
            IndexType::U16 => bytes
                .chunks_exact(2)
                .map(|c| u32::from(u16::from_le_bytes([c[0], c[1]])))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u8_addresses_256_vertices() {
        assert_eq!(IndexType::U8.max_vertices(), 256);
    }

    #[test]
    fn decode_u16_little_endian() {
        assert_eq!(IndexType::U16.decode(&[1, 0, 0, 1]), vec![1, 256]);
    }
}
