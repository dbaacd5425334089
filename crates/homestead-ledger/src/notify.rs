//! Stock-change notifications pushed to registered listeners.
//!
//! The presentation layer (barn panel, open station storage rows, shop list)
//! registers a [`StockListener`] on the ledger and receives a [`StockChange`]
//! after every successful mutation. This replaces the delegate/event wiring
//! of a typical engine with an explicit handle-based registry so tests can
//! assert both delivery and order.

use serde::{Deserialize, Serialize};

use homestead_types::Resource;

// ---------------------------------------------------------------------------
// StockChange
// ---------------------------------------------------------------------------

/// Which way a ledger mutation moved stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockDirection {
    /// Stock was added to the ledger.
    Credited,
    /// Stock was removed from the ledger.
    Debited,
}

/// A record of one successful ledger mutation.
///
/// Carries enough state for a display to refresh without reading the ledger
/// back: the resource touched, the direction and size of the change, and the
/// post-mutation count and total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    /// The resource whose count changed.
    pub resource: Resource,
    /// Whether stock was credited or debited.
    pub direction: StockDirection,
    /// The quantity moved.
    pub amount: u32,
    /// The resource's count after the mutation.
    pub new_count: u32,
    /// The sum of all counts after the mutation.
    pub new_total: u32,
}

// ---------------------------------------------------------------------------
// StockListener
// ---------------------------------------------------------------------------

/// A callback invoked synchronously after every successful ledger mutation.
///
/// Listeners are invoked in registration order, once per mutation. A failed
/// credit or debit notifies nobody.
pub trait StockListener {
    /// React to one committed stock change.
    fn on_stock_changed(&mut self, change: &StockChange);
}

impl<F> StockListener for F
where
    F: FnMut(&StockChange),
{
    fn on_stock_changed(&mut self, change: &StockChange) {
        self(change);
    }
}
