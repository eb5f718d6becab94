mod credits;
mod helpers;
mod secret;

pub mod op;

pub use credits::{Credits, CreditsConversionError, CREDIT_SCALE};
pub use helpers::{parse_boolean_flag, parse_list};
pub use secret::Secret;
