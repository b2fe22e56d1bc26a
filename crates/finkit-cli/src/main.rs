mod commands;
mod config;
mod input;
mod output;
mod prices;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::bonds::{BondArgs, BondYtmArgs, LadderArgs};
use commands::corporate::{CapmArgs, CompsArgs, DcfArgs, IrrArgs, NpvArgs, WaccArgs};
use commands::lending::{InvestArgs, LoanArgs};
use commands::planning::{AffordArgs, CompareArgs, GoalInvestArgs, GoalPayoffArgs, TimelineArgs};
use commands::risk::{MonteCarloArgs, ScenarioArgs, SensitivityArgs, StressTestArgs};
use commands::stocks::{StockBacktestArgs, StockHistoryArgs, StockProjectArgs};
use config::CliConfig;

/// Personal and corporate finance calculations
#[derive(Parser)]
#[command(
    name = "finkit",
    version,
    about = "Personal and corporate finance calculations",
    long_about = "Loans, investments, bonds, corporate finance metrics, risk scenarios, \
                  goal solving, comparisons, cash-flow timelines, affordability and \
                  historical stock backtests. Every command accepts --input <file.json> \
                  or JSON on stdin in place of its flags."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// TOML config file (defaults to ./finkit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Loan payment, total interest and payoff time
    Loan(LoanArgs),
    /// Month-by-month amortization schedule
    Amortize(LoanArgs),
    /// Growth of an initial balance plus monthly contributions
    Invest(InvestArgs),
    /// Price a level-coupon bond from its yield
    BondPrice(BondArgs),
    /// Solve a bond's yield to maturity from its price
    BondYtm(BondYtmArgs),
    /// Macaulay and modified duration
    BondDuration(BondArgs),
    /// Bond convexity
    BondConvexity(BondArgs),
    /// Summarize a ladder of bond maturities
    BondLadder(LadderArgs),
    /// Weighted average cost of capital
    Wacc(WaccArgs),
    /// CAPM cost of equity
    Capm(CapmArgs),
    /// Net present value of a cash-flow series
    Npv(NpvArgs),
    /// Internal rate of return
    Irr(IrrArgs),
    /// Discounted cash flow valuation with a terminal value
    Dcf(DcfArgs),
    /// Valuation range from peer multiples
    Comps(CompsArgs),
    /// Apply percent shocks to a base value
    Scenario(ScenarioArgs),
    /// Apply one percent change to a base value
    Sensitivity(SensitivityArgs),
    /// Seeded Monte Carlo simulation of compounded returns
    MonteCarlo(MonteCarloArgs),
    /// Apply a drawdown to a base value
    StressTest(StressTestArgs),
    /// Required contribution or return to reach a target
    GoalInvest(GoalInvestArgs),
    /// Extra monthly payment to pay a loan off early
    GoalPayoff(GoalPayoffArgs),
    /// Compare two parameter sets for one calculator
    Compare(CompareArgs),
    /// Monthly cash-flow timeline across products
    Timeline(TimelineArgs),
    /// Debt-to-income affordability check
    Afford(AffordArgs),
    /// Fee-adjusted projection for a single ticker
    StockProject(StockProjectArgs),
    /// Normalized price history and portfolio series
    StockHistory(StockHistoryArgs),
    /// Backtest lump-sum and periodic contributions
    StockBacktest(StockBacktestArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(e),
    };
    let config = &config;

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Loan(args) => commands::lending::run_loan(args),
        Commands::Amortize(args) => commands::lending::run_amortize(args),
        Commands::Invest(args) => commands::lending::run_invest(args),
        Commands::BondPrice(args) => commands::bonds::run_bond_price(args),
        Commands::BondYtm(args) => commands::bonds::run_bond_ytm(args),
        Commands::BondDuration(args) => commands::bonds::run_bond_duration(args),
        Commands::BondConvexity(args) => commands::bonds::run_bond_convexity(args),
        Commands::BondLadder(args) => commands::bonds::run_bond_ladder(args),
        Commands::Wacc(args) => commands::corporate::run_wacc(args),
        Commands::Capm(args) => commands::corporate::run_capm(args),
        Commands::Npv(args) => commands::corporate::run_npv(args),
        Commands::Irr(args) => commands::corporate::run_irr(args),
        Commands::Dcf(args) => commands::corporate::run_dcf(args),
        Commands::Comps(args) => commands::corporate::run_comps(args),
        Commands::Scenario(args) => commands::risk::run_scenario(args),
        Commands::Sensitivity(args) => commands::risk::run_sensitivity(args),
        Commands::MonteCarlo(args) => commands::risk::run_monte_carlo(args, config),
        Commands::StressTest(args) => commands::risk::run_stress_test(args),
        Commands::GoalInvest(args) => commands::planning::run_goal_invest(args),
        Commands::GoalPayoff(args) => commands::planning::run_goal_payoff(args),
        Commands::Compare(args) => commands::planning::run_compare(args, config),
        Commands::Timeline(args) => commands::planning::run_timeline(args),
        Commands::Afford(args) => commands::planning::run_afford(args),
        Commands::StockProject(args) => commands::stocks::run_stock_project(args),
        Commands::StockHistory(args) => commands::stocks::run_stock_history(args, config),
        Commands::StockBacktest(args) => commands::stocks::run_stock_backtest(args, config),
        Commands::Version => {
            println!("finkit {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(e),
    }
}

fn fail(e: Box<dyn std::error::Error>) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}
