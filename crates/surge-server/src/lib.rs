//! Surge Server
//!
//! The flash-sale purchase service: a fixed, small stock of a single
//! product sold under adversarial concurrency, with two guarantees that
//! hold for any interleaving of requests:
//!
//! - **No overselling**: successful purchases never exceed the configured
//!   stock.
//! - **One item per user**: each normalized user id succeeds at most once.
//!
//! Both rest on the combined purchase script executing indivisibly inside
//! the store's single execution slot (`surge-store`); this crate derives
//! the sale window from the clock, orchestrates the commit, and maps
//! outcomes onto the HTTP surface.

pub mod api;
pub mod inventory;
pub mod ledger;
pub mod models;
pub mod sale;
pub mod state;

pub use sale::{PurchaseOutcome, SaleService, SaleState, SaleWindow};
pub use state::AppState;
