use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::time::Instant;

use crate::error::FinkitError;
use crate::explain::monte_carlo_explanation;
use crate::guardrails::risk_warnings;
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::FinkitResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compounded annual-return paths from a single starting value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloInput {
    pub initial_value: f64,
    /// Mean annual return in percent
    pub mean_return: f64,
    /// Standard deviation of the annual return, in percent
    pub volatility: f64,
    /// Annual steps per path
    pub years: u32,
    pub simulations: u32,
    /// Same seed and parameters give bit-identical output
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloOutput {
    pub mean: f64,
    pub median: f64,
    /// 5th percentile, nearest rank
    pub p5: f64,
    /// 95th percentile, nearest rank
    pub p95: f64,
    /// Terminal values, ascending
    pub values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate `simulations` paths of `years` annual steps each.
///
/// All paths share one seeded stream and are generated in order. Each step
/// draws `mean + volatility * z` with `z` standard normal and compounds the
/// value by `1 + draw / 100`.
pub fn run_monte_carlo(
    input: &MonteCarloInput,
) -> FinkitResult<ComputationOutput<MonteCarloOutput>> {
    let start = Instant::now();
    validate_input(input)?;

    let standard = Normal::new(0.0, 1.0).map_err(|e| FinkitError::InvalidInput {
        field: "volatility".into(),
        reason: format!("Invalid Normal parameters: {e}"),
    })?;
    let mut rng = StdRng::seed_from_u64(input.seed);

    let mut values = Vec::with_capacity(input.simulations as usize);
    for _ in 0..input.simulations {
        let mut value = input.initial_value;
        for _ in 0..input.years {
            let z: f64 = rng.sample(standard);
            let draw = input.mean_return + input.volatility * z;
            value *= 1.0 + draw / 100.0;
        }
        values.push(value);
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let output = MonteCarloOutput {
        mean: values.iter().sum::<f64>() / values.len() as f64,
        median: median_sorted(&values),
        p5: nearest_rank(&values, 0.05),
        p95: nearest_rank(&values, 0.95),
        values,
    };
    let warnings = risk_warnings(
        Some(input.mean_return),
        Some(input.volatility),
        Some(input.simulations),
    );
    let explanation = monte_carlo_explanation(
        input.simulations,
        output.mean,
        output.median,
        output.p5,
        output.p95,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Monte Carlo simulation of compounded normal annual returns",
        input,
        warnings,
        elapsed,
        output,
    )
    .with_explanation(explanation))
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

fn median_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Element at `floor(q * (n - 1))`, no interpolation.
fn nearest_rank(sorted: &[f64], q: f64) -> f64 {
    let idx = (q * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx]
}

fn validate_input(input: &MonteCarloInput) -> FinkitResult<()> {
    if input.simulations == 0 {
        return Err(FinkitError::invalid("simulations", "Must be at least 1"));
    }
    if input.years == 0 {
        return Err(FinkitError::invalid("years", "Must be at least 1"));
    }
    if input.volatility.is_nan() || input.volatility < 0.0 {
        return Err(FinkitError::invalid("volatility", "Cannot be negative"));
    }
    if input.initial_value.is_nan() || input.initial_value < 0.0 {
        return Err(FinkitError::invalid("initial_value", "Cannot be negative"));
    }
    if !input.mean_return.is_finite() {
        return Err(FinkitError::invalid("mean_return", "Must be finite"));
    }
    Ok(())
}
