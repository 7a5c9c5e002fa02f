#![deny(missing_docs)]

//! Region geometry for dimer coverings: the bipartite cell graph, elementary
//! faces, holes with their cuts, dense dimer configurations, heights and
//! double-dimer loops.

mod face;
mod generators;
mod hash;
mod height;
mod holes;
pub mod lattice;
mod loops;
mod matching;
mod region;

pub use face::{Face, FaceId, FaceState};
pub use generators::{aztec_diamond, hexagon, rectangle, square_annulus};
pub use hash::{canonical_hash, configuration_hash};
pub use height::{heights, HeightMap};
pub use holes::{CutCrossing, Hole};
pub use loops::{double_dimer_loops, loop_size_counts, DoubleDimerLoop};
pub use matching::{DimerConfiguration, UNMATCHED};
pub use region::{CellId, RegionGraph, RegionSpec};
