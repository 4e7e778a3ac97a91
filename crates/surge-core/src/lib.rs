//! Surge Core
//!
//! Core types, errors, and configuration for the surge flash-sale service.
//!
//! # Overview
//!
//! Surge sells a fixed, small stock of a single product under adversarial
//! concurrency. The crates split as follows:
//!
//! - `surge-core` (this crate): errors, configuration, named limits,
//!   user-id normalization, time abstraction
//! - `surge-store`: the atomic store that serializes every stock/ledger
//!   mutation through a single execution slot
//! - `surge-server`: inventory, purchase ledger, sale coordinator, and the
//!   HTTP surface

pub mod config;
pub mod constants;
pub mod error;
pub mod time;
pub mod user;

pub use config::SaleConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use time::{TimeProvider, WallClockTime};
pub use user::UserId;
