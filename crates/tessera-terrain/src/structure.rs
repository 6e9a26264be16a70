//! Structures placed on the home tile and the falloff mask that flattens
//! terrain around them.
//!
//! Shapes only matter to renderers; masking looks at grid cells alone.

mod kind;
mod layer;
mod mask;

pub use kind::{StructureDimensions, StructureKind, StructurePlacement};
pub use layer::{PlacementOutcome, StructureLayer};
pub use mask::{MaskCell, MaskGrid, StructureMask, flatten};
