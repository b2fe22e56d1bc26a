use clap::Args;
use serde_json::Value;

use finkit_core::bonds::{self, BondLadderInput, BondPriceInput, BondYtmInput};

use super::required;
use crate::input;

/// Bond terms shared by pricing, duration and convexity
#[derive(Args)]
pub struct BondArgs {
    /// Face (par) value
    #[arg(long, default_value = "1000")]
    pub face: f64,

    /// Annual coupon rate in percent
    #[arg(long)]
    pub coupon: Option<f64>,

    /// Annual yield to maturity in percent
    #[arg(long, alias = "ytm")]
    pub yield_rate: Option<f64>,

    /// Years to maturity
    #[arg(long)]
    pub years: Option<u32>,

    /// Coupon payments per year
    #[arg(long, default_value = "2")]
    pub frequency: u32,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for solving yield from price
#[derive(Args)]
pub struct BondYtmArgs {
    #[arg(long, default_value = "1000")]
    pub face: f64,

    /// Annual coupon rate in percent
    #[arg(long)]
    pub coupon: Option<f64>,

    /// Quoted price
    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub years: Option<u32>,

    #[arg(long, default_value = "2")]
    pub frequency: u32,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a bond ladder
#[derive(Args)]
pub struct LadderArgs {
    /// Rung maturities in years, comma separated
    #[arg(long, value_delimiter = ',')]
    pub maturities: Option<Vec<u32>>,

    /// Amount per rung, comma separated, same order as maturities
    #[arg(long, value_delimiter = ',')]
    pub amounts: Option<Vec<f64>>,

    #[arg(long)]
    pub input: Option<String>,
}

fn bond_input(args: &BondArgs) -> Result<BondPriceInput, Box<dyn std::error::Error>> {
    if let Some(loaded) = input::load(args.input.as_deref())? {
        return Ok(loaded);
    }
    Ok(BondPriceInput {
        face_value: args.face,
        coupon_rate: args.coupon.ok_or_else(|| required("coupon"))?,
        yield_rate: args.yield_rate.ok_or_else(|| required("yield-rate"))?,
        years: args.years.ok_or_else(|| required("years"))?,
        payments_per_year: args.frequency,
    })
}

pub fn run_bond_price(args: BondArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bond = bond_input(&args)?;
    Ok(serde_json::to_value(bonds::bond_price(&bond)?)?)
}

pub fn run_bond_duration(args: BondArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bond = bond_input(&args)?;
    Ok(serde_json::to_value(bonds::calculate_duration(&bond)?)?)
}

pub fn run_bond_convexity(args: BondArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bond = bond_input(&args)?;
    Ok(serde_json::to_value(bonds::calculate_convexity(&bond)?)?)
}

pub fn run_bond_ytm(args: BondYtmArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ytm_input: BondYtmInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => BondYtmInput {
            face_value: args.face,
            coupon_rate: args.coupon.ok_or_else(|| required("coupon"))?,
            price: args.price.ok_or_else(|| required("price"))?,
            years: args.years.ok_or_else(|| required("years"))?,
            payments_per_year: args.frequency,
            guess: 0.05,
        },
    };
    Ok(serde_json::to_value(bonds::bond_ytm(&ytm_input)?)?)
}

pub fn run_bond_ladder(args: LadderArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ladder: BondLadderInput = match input::load(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => BondLadderInput {
            maturities: args.maturities.ok_or_else(|| required("maturities"))?,
            amounts: args.amounts.ok_or_else(|| required("amounts"))?,
        },
    };
    Ok(serde_json::to_value(bonds::build_ladder(&ladder)?)?)
}
