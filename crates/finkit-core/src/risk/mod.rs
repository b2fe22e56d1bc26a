pub mod monte_carlo;
pub mod scenario;

pub use monte_carlo::{run_monte_carlo, MonteCarloInput, MonteCarloOutput};
pub use scenario::{
    run_scenarios, run_sensitivity, run_stress_test, ScenarioInput, ScenarioOutput,
    SensitivityInput, SensitivityOutput, StressTestInput, StressTestOutput,
};
