use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::types::{with_metadata_f64, ComputationOutput};
use crate::FinkitResult;

/// Parallel lists of maturities (years) and amounts invested at each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondLadderInput {
    pub maturities: Vec<u32>,
    pub amounts: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderRung {
    pub maturity: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondLadderOutput {
    pub total_invested: f64,
    /// Amount-weighted average maturity in years
    pub weighted_maturity: f64,
    /// Rungs ordered by ascending maturity
    pub schedule: Vec<LadderRung>,
}

pub fn build_ladder(input: &BondLadderInput) -> FinkitResult<ComputationOutput<BondLadderOutput>> {
    let start = Instant::now();

    if input.maturities.is_empty() {
        return Err(FinkitError::invalid("maturities", "At least one rung is required"));
    }
    if input.maturities.len() != input.amounts.len() {
        return Err(FinkitError::invalid(
            "amounts",
            "maturities and amounts must have the same length",
        ));
    }

    let total: f64 = input.amounts.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(FinkitError::invalid("amounts", "total invested must be positive"));
    }

    let mut schedule: Vec<LadderRung> = input
        .maturities
        .iter()
        .zip(&input.amounts)
        .map(|(&maturity, &amount)| LadderRung { maturity, amount })
        .collect();
    // stable: equal maturities keep input order
    schedule.sort_by_key(|rung| rung.maturity);

    let weighted: f64 = schedule
        .iter()
        .map(|rung| rung.maturity as f64 * rung.amount)
        .sum();

    let output = BondLadderOutput {
        total_invested: total,
        weighted_maturity: weighted / total,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Amount-weighted maturity of a bond ladder",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}
