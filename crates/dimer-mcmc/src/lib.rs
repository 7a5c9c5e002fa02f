#![deny(missing_docs)]

//! Exact and approximate sampling of weighted dimer coverings.
//!
//! [`Session`] bundles a region with its configuration and randomness. The
//! pieces it is made of are usable on their own: [`DynamicsEngine`] runs
//! heat-bath face flips, [`CftpCoupler`] couples the extremal chains from the
//! past until they meet, and [`TopologyTracker`] reads and changes hole
//! windings and repairs edited regions.

/// Monotone coupling from the past.
pub mod cftp;
/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Heat-bath face-flip dynamics.
pub mod dynamics;
/// Height fluctuations over independent exact samples.
pub mod fluctuations;
/// Flip counters and session diagnostics.
pub mod metrics;
mod parallel;
/// Caller-owned sampler instances.
pub mod session;
/// Hole windings and local repair.
pub mod topology;
/// Per-face orientation weights.
pub mod weights;

pub use cftp::{CftpCoupler, CftpOptions, CftpState, Coupling, EpochBlock, EpochReport, ExactSample};
pub use config::{BiasConfig, CftpConfig, SamplerConfig, SamplingMode, SeedPolicy};
pub use dynamics::{heat_bath, DynamicsEngine, FlipOutcome};
pub use fluctuations::{FluctuationField, PointFluctuation};
pub use metrics::{Diagnostics, FlipStats};
pub use session::Session;
pub use topology::{HoleStatus, RegionEdit, RepairOutcome, TopologyTracker};
pub use weights::FaceWeights;
