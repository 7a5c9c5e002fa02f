use std::collections::BTreeMap;

use dimer_core::{ErrorInfo, Point, TilingError};
use dimer_graph::{heights, DimerConfiguration, RegionGraph};
use serde::{Deserialize, Serialize};

/// Height statistics of one lattice point across independent samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointFluctuation {
    /// Lattice point.
    pub point: Point,
    /// Mean height.
    pub mean: f64,
    /// Unbiased sample variance of the height.
    pub variance: f64,
    /// `(h_0 - h_1) / sqrt(2)` for the first two samples.
    pub difference: f64,
}

/// Height fluctuation field of a set of independent samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluctuationField {
    /// Number of samples the field was built from.
    pub samples: usize,
    /// Per-point statistics in lattice order.
    pub points: Vec<PointFluctuation>,
}

impl FluctuationField {
    /// Builds the field from at least two configurations of `graph`.
    pub fn from_samples(
        graph: &RegionGraph,
        samples: &[DimerConfiguration],
    ) -> Result<Self, TilingError> {
        if samples.len() < 2 {
            return Err(TilingError::InvalidInput(
                ErrorInfo::new("too-few-samples", "fluctuations need at least two samples")
                    .with_context("samples", samples.len()),
            ));
        }
        let mut columns: BTreeMap<Point, Vec<f64>> = BTreeMap::new();
        for config in samples {
            config.validate(graph)?;
            for (point, height) in heights(graph, config).iter() {
                columns.entry(point).or_default().push(f64::from(height));
            }
        }
        let count = samples.len() as f64;
        let points = columns
            .into_iter()
            .map(|(point, values)| {
                let mean = values.iter().sum::<f64>() / count;
                let variance =
                    values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / (count - 1.0);
                PointFluctuation {
                    point,
                    mean,
                    variance,
                    difference: (values[0] - values[1]) / std::f64::consts::SQRT_2,
                }
            })
            .collect();
        Ok(Self {
            samples: samples.len(),
            points,
        })
    }

    /// Statistics at `point`.
    pub fn get(&self, point: Point) -> Option<&PointFluctuation> {
        self.points
            .binary_search_by(|entry| entry.point.cmp(&point))
            .ok()
            .map(|idx| &self.points[idx])
    }

    /// Largest variance over all points.
    pub fn max_variance(&self) -> f64 {
        self.points
            .iter()
            .map(|entry| entry.variance)
            .fold(0.0, f64::max)
    }
}
