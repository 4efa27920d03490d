//! Outbound (driven) adapters.

pub mod persistence;
pub mod sms;
pub mod token;
