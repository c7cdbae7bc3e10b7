//! Pure codecs for the Trestle bridge engine.
//!
//! Two concerns live here, both free of I/O:
//!
//! - [`address`]: conversion between the three address representations in
//!   play — a chain-native SS58-encoded address, a raw hex-encoded public
//!   key, and a plain home-ledger account id string.
//! - [`amount`]: conversion between human-readable decimal amounts and
//!   chain-native fixed-point integers, parameterized by a per-asset,
//!   per-side decimals value.

pub mod address;
pub mod amount;

pub use address::{from_hex, to_hex, to_native_bytes, to_ss58};
pub use amount::{sub_decimal_floor, to_chain_integer, to_decimal};
