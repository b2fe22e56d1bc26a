use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;

use finkit_core::afford::{self, AffordInput};
use finkit_core::comparison::{self, ComparisonCase, ComparisonRequest};
use finkit_core::goals::{self, InvestmentGoalInput, LoanPayoffGoalInput};
use finkit_core::timeline::{self, TimelineRequest};

use super::required;
use crate::config::CliConfig;
use crate::input;

/// Arguments for solving an investment goal
#[derive(Args)]
pub struct GoalInvestArgs {
    /// Value to reach
    #[arg(long)]
    pub target: Option<f64>,

    #[arg(long, default_value = "0")]
    pub initial: f64,

    #[arg(long)]
    pub years: Option<u32>,

    /// Known monthly contribution (solves for the rate)
    #[arg(long, conflicts_with = "rate")]
    pub monthly: Option<f64>,

    /// Known annual return in percent (solves for the contribution)
    #[arg(long)]
    pub rate: Option<f64>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the extra payment that meets a payoff target
#[derive(Args)]
pub struct GoalPayoffArgs {
    #[arg(long)]
    pub principal: Option<f64>,

    /// Annual rate in percent
    #[arg(long)]
    pub rate: Option<f64>,

    /// Contractual term in years
    #[arg(long)]
    pub current_years: Option<u32>,

    /// Desired payoff horizon in years
    #[arg(long)]
    pub target_years: Option<u32>,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for comparing two parameter sets
#[derive(Args)]
pub struct CompareArgs {
    /// loan, invest or risk
    #[arg(long)]
    pub calculator: Option<String>,

    /// Base case as key=value pairs (e.g. amount=200000,rate=6,years=30)
    #[arg(long, value_delimiter = ',')]
    pub base: Option<Vec<String>>,

    /// Alternative case as key=value pairs
    #[arg(long, value_delimiter = ',')]
    pub alt: Option<Vec<String>>,

    #[arg(long, default_value = "base")]
    pub base_label: String,

    #[arg(long, default_value = "alt")]
    pub alt_label: String,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the unified cash-flow timeline
#[derive(Args)]
pub struct TimelineArgs {
    /// Path to JSON input file with the timeline request
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a debt-to-income check
#[derive(Args)]
pub struct AffordArgs {
    /// Gross monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Other monthly debt payments
    #[arg(long, default_value = "0")]
    pub debts: Decimal,

    /// Proposed monthly housing cost
    #[arg(long)]
    pub housing: Option<Decimal>,

    /// Debt-to-income ceiling as a fraction
    #[arg(long, default_value = "0.36")]
    pub max_dti: Decimal,

    /// Percent increase in housing cost for the stressed case
    #[arg(long, default_value = "0")]
    pub stress_rate: Decimal,

    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_goal_invest(args: GoalInvestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let goal: InvestmentGoalInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => InvestmentGoalInput {
            target_value: args.target.ok_or_else(|| required("target"))?,
            initial: args.initial,
            years: args.years.ok_or_else(|| required("years"))?,
            monthly: args.monthly,
            annual_rate: args.rate,
        },
    };
    Ok(serde_json::to_value(goals::solve_investment_goal(&goal)?)?)
}

pub fn run_goal_payoff(args: GoalPayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let goal: LoanPayoffGoalInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => LoanPayoffGoalInput {
            principal: args.principal.ok_or_else(|| required("principal"))?,
            annual_rate: args.rate.ok_or_else(|| required("rate"))?,
            current_years: args.current_years.ok_or_else(|| required("current-years"))?,
            target_years: args.target_years.ok_or_else(|| required("target-years"))?,
        },
    };
    Ok(serde_json::to_value(goals::solve_loan_payoff_goal(&goal)?)?)
}

pub fn run_compare(
    args: CompareArgs,
    config: &CliConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: ComparisonRequest = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => ComparisonRequest {
            calculator: args.calculator.ok_or_else(|| required("calculator"))?,
            base: ComparisonCase {
                label: args.base_label,
                inputs: parse_pairs(&args.base.ok_or_else(|| required("base"))?)?,
            },
            alt: ComparisonCase {
                label: args.alt_label,
                inputs: parse_pairs(&args.alt.ok_or_else(|| required("alt"))?)?,
            },
        },
    };

    seed_risk_cases(&mut request, config.default_seed);
    Ok(serde_json::to_value(comparison::compare_scenarios(&request)?)?)
}

pub fn run_timeline(args: TimelineArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: TimelineRequest = input::load(args.input.as_deref())?
        .ok_or("--input file (or JSON on stdin) is required for timeline")?;
    Ok(serde_json::to_value(timeline::build_timeline(&request)?)?)
}

pub fn run_afford(args: AffordArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => AffordInput {
            income_monthly: args.income.ok_or_else(|| required("income"))?,
            debts_monthly: args.debts,
            housing_cost: args.housing.ok_or_else(|| required("housing"))?,
            max_dti: args.max_dti,
            stress_rate: args.stress_rate,
        },
    };
    Ok(serde_json::to_value(afford::calculate_affordability(&afford_input)?)?)
}

/// Risk comparisons without an explicit seed use the configured one.
fn seed_risk_cases(request: &mut ComparisonRequest, seed: u64) {
    if !request.calculator.trim().eq_ignore_ascii_case("risk") {
        return;
    }
    for case in [&mut request.base, &mut request.alt] {
        case.inputs
            .entry("seed".to_string())
            .or_insert_with(|| Value::from(seed));
    }
}

/// `key=value` pairs into a comparison input map. Values stay strings; the
/// comparison coerces numeric strings itself.
fn parse_pairs(pairs: &[String]) -> Result<BTreeMap<String, Value>, Box<dyn std::error::Error>> {
    let mut map = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{}'", pair))?;
        map.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
    }
    Ok(map)
}
