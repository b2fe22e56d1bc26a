pub mod duration;
pub mod ladder;
pub mod pricing;

pub use duration::{calculate_convexity, calculate_duration, BondConvexityOutput, BondDurationOutput};
pub use ladder::{build_ladder, BondLadderInput, BondLadderOutput, LadderRung};
pub use pricing::{
    bond_price, bond_ytm, BondPriceInput, BondPriceOutput, BondYtmInput, BondYtmOutput,
};
