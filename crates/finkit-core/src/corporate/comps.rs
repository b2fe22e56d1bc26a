use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinkitError;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple};
use crate::FinkitResult;

/// A company metric (e.g. EBITDA) and peer multiples to apply to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompsInput {
    pub metric: Money,
    pub multiples: Vec<Multiple>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompsOutput {
    pub low: Money,
    pub median: Money,
    pub high: Money,
}

/// Implied value range from sorted peer multiples.
///
/// The median is the element at index `len / 2` of the sorted multiples, so
/// an even-length list takes the upper of the two middle values.
pub fn calculate_comps(input: &CompsInput) -> FinkitResult<ComputationOutput<CompsOutput>> {
    let start = Instant::now();

    if input.metric < Decimal::ZERO {
        return Err(FinkitError::invalid("metric", "Cannot be negative"));
    }
    if input.multiples.is_empty() {
        return Err(FinkitError::invalid("multiples", "At least one multiple is required"));
    }

    let mut multiples = input.multiples.clone();
    multiples.sort();
    let n = multiples.len();

    let output = CompsOutput {
        low: multiples[0] * input.metric,
        median: multiples[n / 2] * input.metric,
        high: multiples[n - 1] * input.metric,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Trading comparables: metric times peer multiples",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_comps_range() {
        let input = CompsInput {
            metric: dec!(10),
            multiples: vec![dec!(9), dec!(5), dec!(7)],
        };
        let out = calculate_comps(&input).unwrap().result;
        assert_eq!(out.low, dec!(50));
        assert_eq!(out.median, dec!(70));
        assert_eq!(out.high, dec!(90));
    }

    #[test]
    fn test_even_length_takes_upper_middle() {
        let input = CompsInput {
            metric: dec!(2),
            multiples: vec![dec!(4), dec!(1), dec!(3), dec!(2)],
        };
        assert_eq!(calculate_comps(&input).unwrap().result.median, dec!(6));
    }

    #[test]
    fn test_empty_multiples_rejected() {
        let input = CompsInput {
            metric: dec!(2),
            multiples: vec![],
        };
        assert!(calculate_comps(&input).is_err());
    }
}
