#![deny(missing_docs)]
#![doc = "Core value types, error taxonomy and deterministic randomness shared by the dimer sampler crates."]

pub mod control;
pub mod errors;
pub mod rng;
mod types;

pub use control::{checkpoint, CancelToken, Monitor, NoopMonitor, ProgressEvent};
pub use errors::{ErrorInfo, TilingError};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{Cell, Color, Dimer, LatticeKind, Point};
