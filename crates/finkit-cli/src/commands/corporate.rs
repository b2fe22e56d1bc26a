use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use finkit_core::corporate::{
    self, CapmInput, CompsInput, DcfInput, IrrInput, NpvInput, WaccInput,
};

use super::required;
use crate::input;

/// Arguments for WACC calculation
#[derive(Args)]
pub struct WaccArgs {
    /// Cost of equity in percent
    #[arg(long)]
    pub cost_of_equity: Option<Decimal>,

    /// Pre-tax cost of debt in percent
    #[arg(long)]
    pub cost_of_debt: Option<Decimal>,

    /// Marginal tax rate as a fraction (0.25 for 25%)
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Market value of equity
    #[arg(long)]
    pub equity_value: Option<Decimal>,

    /// Market value of debt
    #[arg(long)]
    pub debt_value: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for CAPM cost of equity
#[derive(Args)]
pub struct CapmArgs {
    /// Risk-free rate in percent
    #[arg(long)]
    pub risk_free_rate: Option<Decimal>,

    /// Levered beta
    #[arg(long)]
    pub beta: Option<Decimal>,

    /// Expected market return in percent
    #[arg(long)]
    pub market_return: Option<Decimal>,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for NPV
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct NpvArgs {
    /// Discount rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Cash flows starting at t = 0, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for IRR
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct IrrArgs {
    /// Cash flows starting at t = 0, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<f64>>,

    /// Starting rate for Newton-Raphson as a decimal
    #[arg(long, default_value = "0.1")]
    pub guess: f64,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a discounted cash flow valuation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct DcfArgs {
    /// Discount rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Forecast cash flows for years 1..n, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Perpetual growth after the forecast, as a fraction
    #[arg(long)]
    pub terminal_growth: Option<Decimal>,

    /// Exit multiple on the final cash flow (replaces perpetual growth)
    #[arg(long)]
    pub terminal_multiple: Option<Decimal>,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for comparable company valuation
#[derive(Args)]
pub struct CompsArgs {
    /// The subject's metric (e.g. EBITDA)
    #[arg(long)]
    pub metric: Option<Decimal>,

    /// Peer multiples, comma separated
    #[arg(long, value_delimiter = ',')]
    pub multiples: Option<Vec<Decimal>>,

    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_wacc(args: WaccArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let wacc_input: WaccInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => WaccInput {
            cost_of_equity: args.cost_of_equity.ok_or_else(|| required("cost-of-equity"))?,
            cost_of_debt: args.cost_of_debt.ok_or_else(|| required("cost-of-debt"))?,
            tax_rate: args.tax_rate.ok_or_else(|| required("tax-rate"))?,
            equity_value: args.equity_value.ok_or_else(|| required("equity-value"))?,
            debt_value: args.debt_value.ok_or_else(|| required("debt-value"))?,
        },
    };
    Ok(serde_json::to_value(corporate::calculate_wacc(&wacc_input)?)?)
}

pub fn run_capm(args: CapmArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let capm_input: CapmInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => CapmInput {
            risk_free_rate: args.risk_free_rate.ok_or_else(|| required("risk-free-rate"))?,
            beta: args.beta.unwrap_or(dec!(1.0)),
            market_return: args.market_return.ok_or_else(|| required("market-return"))?,
        },
    };
    Ok(serde_json::to_value(corporate::calculate_capm(&capm_input)?)?)
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let npv_input: NpvInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => NpvInput {
            discount_rate: args.rate.ok_or_else(|| required("rate"))?,
            cash_flows: args.cash_flows.ok_or_else(|| required("cash-flows"))?,
        },
    };
    Ok(serde_json::to_value(corporate::calculate_npv(&npv_input)?)?)
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let irr_input: IrrInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => IrrInput {
            cash_flows: args.cash_flows.ok_or_else(|| required("cash-flows"))?,
            guess: args.guess,
        },
    };
    Ok(serde_json::to_value(corporate::calculate_irr(&irr_input)?)?)
}

pub fn run_dcf(args: DcfArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dcf_input: DcfInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => DcfInput {
            discount_rate: args.rate.ok_or_else(|| required("rate"))?,
            cash_flows: args.cash_flows.ok_or_else(|| required("cash-flows"))?,
            terminal_growth: args.terminal_growth.unwrap_or(Decimal::ZERO),
            terminal_multiple: args.terminal_multiple,
        },
    };
    Ok(serde_json::to_value(corporate::calculate_dcf(&dcf_input)?)?)
}

pub fn run_comps(args: CompsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comps_input: CompsInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => CompsInput {
            metric: args.metric.ok_or_else(|| required("metric"))?,
            multiples: args.multiples.ok_or_else(|| required("multiples"))?,
        },
    };
    Ok(serde_json::to_value(corporate::calculate_comps(&comps_input)?)?)
}
