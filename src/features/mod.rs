//! Feature derivation and encoding
//!
//! Converts raw team identifiers and dates into model-ready features.

pub mod deriver;
pub mod encoding;
pub mod match_repr;
pub mod temporal;

pub use deriver::FeatureDeriver;
pub use encoding::TeamEncoding;
pub use match_repr::FeatureVector;
pub use temporal::{day_code, parse_game_date};
