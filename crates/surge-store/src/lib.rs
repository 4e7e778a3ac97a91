//! Surge Store
//!
//! The Atomic Store: every stock/ledger mutation flows through a single
//! execution slot, so the multi-step purchase script is indivisible no
//! matter how many requests contend for it.
//!
//! # Overview
//!
//! - [`SaleStore`] is the boundary contract: integer ops on the counter key,
//!   hash ops on the ledger key, and [`Script`] evaluation.
//! - [`script`] holds the three scripts (INIT, DEC, PURCHASE) as pure
//!   functions over [`StoreState`]; the PURCHASE script is the commit the
//!   no-overselling and one-item-per-user guarantees rest on.
//! - [`ActorStore`] is the production backend: one spawned task owns the
//!   state and drains a bounded mailbox one command at a time.
//! - [`SimStore`] is the test backend: same semantics, plus switchable
//!   fault injection for exercising the outage path.

pub mod actor;
pub mod script;
pub mod sim;
pub mod state;
pub mod store;

pub use actor::ActorStore;
pub use script::{Script, ScriptReply};
pub use sim::SimStore;
pub use state::StoreState;
pub use store::SaleStore;
