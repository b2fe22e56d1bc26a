use clap::Args;
use serde_json::Value;

use finkit_core::investments::{self, InvestmentInput};
use finkit_core::loans::{self, LoanInput};

use super::required;
use crate::input;

/// Arguments for loan summaries and amortization schedules
#[derive(Args)]
pub struct LoanArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<f64>,

    /// Annual interest rate in percent (6.5 for 6.5%)
    #[arg(long)]
    pub rate: Option<f64>,

    /// Contractual term in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Extra principal paid every month
    #[arg(long, default_value = "0")]
    pub extra: f64,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for investment growth
#[derive(Args)]
pub struct InvestArgs {
    /// Starting balance
    #[arg(long, default_value = "0")]
    pub initial: f64,

    /// Contribution at the end of every month
    #[arg(long, default_value = "0")]
    pub monthly: f64,

    /// Expected annual return in percent
    #[arg(long)]
    pub rate: Option<f64>,

    /// Horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn loan_input(args: &LoanArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    if let Some(loaded) = input::load(args.input.as_deref())? {
        return Ok(loaded);
    }
    Ok(LoanInput {
        principal: args.principal.ok_or_else(|| required("principal"))?,
        annual_rate: args.rate.ok_or_else(|| required("rate"))?,
        years: args.years.ok_or_else(|| required("years"))?,
        extra_payment: args.extra,
    })
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_input(&args)?;
    let result = loans::calculate_loan(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_amortize(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_input(&args)?;
    let result = loans::calculate_amortization(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_invest(args: InvestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let invest: InvestmentInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => InvestmentInput {
            initial: args.initial,
            monthly: args.monthly,
            annual_rate: args.rate.ok_or_else(|| required("rate"))?,
            years: args.years.ok_or_else(|| required("years"))?,
        },
    };
    let result = investments::calculate_investment(&invest)?;
    Ok(serde_json::to_value(result)?)
}
