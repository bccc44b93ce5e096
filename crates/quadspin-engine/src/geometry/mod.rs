//! Geometry store.
//!
//! CPU-side description of the quad: four colored corners and the six `u8`
//! indices that stitch them into two triangles. Data is `const` and never
//! mutated after definition.

mod quad;
mod vertex;

pub use quad::{Geometry, GeometryError, QUAD};
pub use vertex::Vertex;
