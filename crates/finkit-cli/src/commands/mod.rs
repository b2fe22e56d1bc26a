pub mod bonds;
pub mod corporate;
pub mod lending;
pub mod planning;
pub mod risk;
pub mod stocks;

/// Error for a flag that is required when no JSON input was supplied.
pub(crate) fn required(flag: &str) -> String {
    format!("--{} is required (or provide --input)", flag)
}
