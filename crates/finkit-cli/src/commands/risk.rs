use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use finkit_core::risk::{
    self, MonteCarloInput, ScenarioInput, SensitivityInput, StressTestInput,
};

use super::required;
use crate::config::CliConfig;
use crate::input;

/// Arguments for percent-shock scenarios
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScenarioArgs {
    #[arg(long)]
    pub base: Option<Decimal>,

    /// Percent shocks, comma separated (e.g. -10,0,10)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub shocks: Option<Vec<Decimal>>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a single percent change
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SensitivityArgs {
    #[arg(long)]
    pub base: Option<Decimal>,

    /// Percent change applied to the base
    #[arg(long, allow_hyphen_values = true)]
    pub change: Option<Decimal>,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a drawdown stress test
#[derive(Args)]
pub struct StressTestArgs {
    #[arg(long)]
    pub base: Option<Decimal>,

    /// Peak-to-trough loss as a fraction (0.2 for 20%)
    #[arg(long)]
    pub drawdown: Option<Decimal>,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for Monte Carlo simulation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct MonteCarloArgs {
    /// Starting value
    #[arg(long)]
    pub initial: Option<f64>,

    /// Mean annual return in percent
    #[arg(long, allow_hyphen_values = true)]
    pub mean: Option<f64>,

    /// Annual volatility in percent
    #[arg(long)]
    pub volatility: Option<f64>,

    #[arg(long)]
    pub years: Option<u32>,

    /// Number of simulated paths
    #[arg(long, default_value = "1000")]
    pub sims: u32,

    /// RNG seed (defaults to the configured seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Include every simulated terminal value in the output
    #[arg(long)]
    pub keep_values: bool,

    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_scenario(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario_input: ScenarioInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => ScenarioInput {
            base_value: args.base.ok_or_else(|| required("base"))?,
            shocks: args.shocks.ok_or_else(|| required("shocks"))?,
        },
    };
    Ok(serde_json::to_value(risk::run_scenarios(&scenario_input)?)?)
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: SensitivityInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => SensitivityInput {
            base_value: args.base.ok_or_else(|| required("base"))?,
            change: args.change.ok_or_else(|| required("change"))?,
        },
    };
    Ok(serde_json::to_value(risk::run_sensitivity(&sens_input)?)?)
}

pub fn run_stress_test(args: StressTestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let stress_input: StressTestInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => StressTestInput {
            base_value: args.base.ok_or_else(|| required("base"))?,
            drawdown: args.drawdown.ok_or_else(|| required("drawdown"))?,
        },
    };
    Ok(serde_json::to_value(risk::run_stress_test(&stress_input)?)?)
}

pub fn run_monte_carlo(
    args: MonteCarloArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mc_input: MonteCarloInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => MonteCarloInput {
            initial_value: args.initial.ok_or_else(|| required("initial"))?,
            mean_return: args.mean.ok_or_else(|| required("mean"))?,
            volatility: args.volatility.ok_or_else(|| required("volatility"))?,
            years: args.years.ok_or_else(|| required("years"))?,
            simulations: args.sims,
            seed: args.seed.unwrap_or(config.default_seed),
        },
    };

    let mut value = serde_json::to_value(risk::run_monte_carlo(&mc_input)?)?;
    if !args.keep_values {
        if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
            result.remove("values");
        }
    }
    Ok(value)
}
