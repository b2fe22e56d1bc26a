pub mod comps;
pub mod dcf;
pub mod irr;
pub mod wacc;

pub use comps::{calculate_comps, CompsInput, CompsOutput};
pub use dcf::{calculate_dcf, calculate_npv, DcfInput, DcfOutput, NpvInput, NpvOutput};
pub use irr::{calculate_irr, IrrInput, IrrMethod, IrrOutput};
pub use wacc::{calculate_capm, calculate_wacc, CapmInput, CapmOutput, WaccInput, WaccOutput};
