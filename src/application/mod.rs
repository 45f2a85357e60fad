//! Application layer orchestrating a settlement run.
//!
//! This module defines `Settlement`, the pipeline that moves affiliate balances
//! through filtering, enrichment, submission and write-back. It only talks to
//! the outside world through the ports in `domain::ports`.

pub mod settlement;
