//! Formatting and fixed-point helpers

pub mod helper;

pub use helper::{format_address, format_usd, from_units, hex_prefix, parse_address, payment_amount, progress_percent, to_units, u256_to_f64};
