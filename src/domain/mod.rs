//! Domain types, selection policies, and the ports a settlement run talks through.

pub mod affiliate;
pub mod payout;
pub mod policy;
pub mod ports;
