//! The barn ledger: authoritative per-resource quantity store.
//!
//! The [`Ledger`] maps every [`Resource`] to a non-negative count and is the
//! only place those counts are mutated. Every successful mutation fans out a
//! [`StockChange`] to the registered listeners, synchronously and in
//! registration order, before the mutating call returns.

use std::collections::BTreeMap;

use tracing::debug;

use homestead_types::{ListenerId, Resource};

use crate::capacity::CapacityGate;
use crate::notify::{StockChange, StockDirection, StockListener};
use crate::LedgerError;

/// A listener registration held by the ledger.
struct RegisteredListener {
    /// Handle returned to the registrant, used to unregister.
    id: ListenerId,
    /// The callback itself.
    listener: Box<dyn StockListener>,
}

/// The authoritative resource-quantity store for the farmstead.
///
/// Created once by the simulation root at startup with every resource
/// initialized to zero, and never destroyed during the session. All
/// mutation goes through [`credit`](Ledger::credit) and
/// [`debit`](Ledger::debit).
pub struct Ledger {
    /// Count per resource. Every variant is present from construction.
    counts: BTreeMap<Resource, u32>,
    /// The storage-ceiling check applied before every credit.
    gate: CapacityGate,
    /// Listeners notified after each successful mutation, in order.
    listeners: Vec<RegisteredListener>,
}

impl core::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ledger")
            .field("counts", &self.counts)
            .field("gate", &self.gate)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(CapacityGate::default())
    }
}

impl Ledger {
    /// Create an empty ledger guarded by `gate`, with every resource
    /// initialized to a zero count.
    pub fn new(gate: CapacityGate) -> Self {
        let counts = Resource::ALL.iter().map(|r| (*r, 0)).collect();
        Self {
            counts,
            gate,
            listeners: Vec::new(),
        }
    }

    /// Return the stored count for `resource`.
    pub fn count(&self, resource: Resource) -> u32 {
        self.counts.get(&resource).copied().unwrap_or(0)
    }

    /// Return the sum of all stored counts.
    ///
    /// The capacity invariant keeps this within `u32`, so saturation here is
    /// unreachable in a consistent ledger.
    pub fn total(&self) -> u32 {
        self.counts
            .values()
            .fold(0u32, |acc, qty| acc.saturating_add(*qty))
    }

    /// Return the storage capacity ceiling.
    pub const fn capacity(&self) -> u32 {
        self.gate.capacity()
    }

    /// Whether `amount` more units would fit under the capacity ceiling.
    pub fn can_accept(&self, amount: u32) -> bool {
        self.gate.can_accept(self.total(), amount)
    }

    /// Raise the capacity ceiling by `additional` units, returning the new
    /// ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ArithmeticOverflow`] if the ceiling would
    /// exceed `u32::MAX`.
    pub fn expand_capacity(&mut self, additional: u32) -> Result<u32, LedgerError> {
        let new_capacity = self.gate.expand(additional)?;
        debug!(new_capacity, "barn capacity expanded");
        Ok(new_capacity)
    }

    /// Add `amount` units of `resource` to the barn.
    ///
    /// The capacity gate is consulted before anything changes; a rejected
    /// credit leaves the ledger untouched. On success every registered
    /// listener is notified before this method returns.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroAmount`] for a zero amount, or
    /// [`LedgerError::CapacityExceeded`] if the barn cannot absorb the delta.
    pub fn credit(&mut self, resource: Resource, amount: u32) -> Result<StockChange, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let stored = self.total();
        if !self.gate.can_accept(stored, amount) {
            return Err(LedgerError::CapacityExceeded {
                resource,
                attempted: amount,
                stored,
                capacity: self.gate.capacity(),
            });
        }

        // The gate bounds both sums by the capacity, so neither add can
        // overflow; checked arithmetic still guards the invariant.
        let new_count = self
            .count(resource)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let new_total = stored
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.counts.insert(resource, new_count);
        debug_assert!(new_total <= self.gate.capacity());

        let change = StockChange {
            resource,
            direction: StockDirection::Credited,
            amount,
            new_count,
            new_total,
        };
        debug!(?resource, amount, new_count, new_total, "stock credited");
        self.notify(&change);
        Ok(change)
    }

    /// Remove `amount` units of `resource` from the barn.
    ///
    /// Succeeds only if the stored count covers the full amount; a rejected
    /// debit leaves the ledger untouched. On success every registered
    /// listener is notified before this method returns.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ZeroAmount`] for a zero amount, or
    /// [`LedgerError::InsufficientStock`] if fewer than `amount` units are
    /// stored.
    pub fn debit(&mut self, resource: Resource, amount: u32) -> Result<StockChange, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }

        let available = self.count(resource);
        if available < amount {
            return Err(LedgerError::InsufficientStock {
                resource,
                requested: amount,
                available,
            });
        }

        let new_count = available
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.counts.insert(resource, new_count);

        let change = StockChange {
            resource,
            direction: StockDirection::Debited,
            amount,
            new_count,
            new_total: self.total(),
        };
        debug!(?resource, amount, new_count, "stock debited");
        self.notify(&change);
        Ok(change)
    }

    /// Register a listener, returning the handle needed to unregister it.
    ///
    /// Listeners are invoked in registration order.
    pub fn register_listener(&mut self, listener: Box<dyn StockListener>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.push(RegisteredListener { id, listener });
        id
    }

    /// Remove a previously registered listener.
    ///
    /// Returns `false` if the handle is unknown (already removed).
    pub fn unregister_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|reg| reg.id != id);
        self.listeners.len() < before
    }

    /// Fan one committed change out to every listener, in order.
    fn notify(&mut self, change: &StockChange) {
        for reg in &mut self.listeners {
            reg.listener.on_stock_changed(change);
        }
    }
}
