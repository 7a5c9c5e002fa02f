#![deny(missing_docs)]

//! Perfect matchings for region graphs: Dinic's maximum flow for the initial
//! cover and bounded augmenting paths for local repair.

mod augment;
mod dinic;
mod initializer;

pub use augment::{augment_within, neighborhood};
pub use initializer::{initialize, initialize_with_stats, FlowStats};
