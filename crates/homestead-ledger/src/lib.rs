//! Barn ledger, capacity gate, and coin balance for the Homestead simulation.
//!
//! Every resource unit in the farm economy is tracked through the [`Ledger`]:
//! producers credit it on collection, crafting stations debit it to fill
//! their slots and credit it when flushing stacks back, and the marketplace
//! debits it on every sale. The ledger is the single source of truth for
//! "how much of X exists."
//!
//! # Invariants
//!
//! 1. No count is ever negative (unsigned storage plus checked arithmetic).
//! 2. After every successful credit, the sum of all counts is at most the
//!    configured storage capacity. The [`CapacityGate`] is consulted strictly
//!    before any mutation -- there is no rollback path, so nothing is ever
//!    applied that would need rolling back.
//! 3. A mutation and the listener notifications it triggers are atomic with
//!    respect to any other simulation step: the simulation is single-threaded
//!    and notifications run synchronously inside `credit`/`debit`.
//!
//! # Architecture
//!
//! - [`store`] -- The [`Ledger`] itself: counts, mutation, notification fan-out.
//! - [`capacity`] -- The [`CapacityGate`] storage-ceiling check.
//! - [`balance`] -- The [`Balance`] coin purse.
//! - [`notify`] -- [`StockChange`] records and the [`StockListener`] trait.

pub mod balance;
pub mod capacity;
pub mod notify;
pub mod store;

// Re-export primary types at crate root.
pub use balance::{Balance, BalanceError};
pub use capacity::CapacityGate;
pub use notify::{StockChange, StockDirection, StockListener};
pub use store::Ledger;

use homestead_types::Resource;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when mutating the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Credit and debit amounts must be strictly positive.
    #[error("ledger amount must be positive")]
    ZeroAmount,

    /// The credit would push total stock past the storage capacity.
    #[error(
        "storage full: adding {attempted} of {resource:?} would exceed capacity (stored: {stored}, capacity: {capacity})"
    )]
    CapacityExceeded {
        /// The resource being credited.
        resource: Resource,
        /// The quantity the caller attempted to add.
        attempted: u32,
        /// The total quantity currently stored.
        stored: u32,
        /// The storage capacity ceiling.
        capacity: u32,
    },

    /// The debit asked for more of a resource than is stored.
    #[error("insufficient stock: wanted {requested} of {resource:?} but only have {available}")]
    InsufficientStock {
        /// The resource being debited.
        resource: Resource,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity actually stored.
        available: u32,
    },

    /// Arithmetic overflow during a checked ledger calculation.
    #[error("arithmetic overflow in ledger calculation")]
    ArithmeticOverflow,
}
