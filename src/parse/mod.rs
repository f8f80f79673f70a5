//! One parser per upstream payload shape (§4.B).
//!
//! Contract shared by every parser in this module: never fail fatally on
//! unknown fields (log and drop them), and degrade a missing required
//! field to a skipped record rather than a propagated error.

pub mod gamma;
pub mod numeric;
pub mod open_interest;
pub mod orderbook;
pub mod trades;
