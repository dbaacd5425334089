//! The marketplace: fixed per-type prices and all-or-nothing sales.
//!
//! The sellable set is exactly the price table's key set. A sale debits the
//! barn ledger and credits the coin balance in one step; there is never a
//! partial sale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use homestead_ledger::{Balance, BalanceError, Ledger};
use homestead_types::Resource;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when selling at the marketplace.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Sale amounts must be strictly positive.
    #[error("sale amount must be positive")]
    ZeroAmount,

    /// The resource has no price and cannot be sold here.
    #[error("{resource:?} is not sellable at the marketplace")]
    NotSellable {
        /// The unsellable resource.
        resource: Resource,
    },

    /// The barn holds fewer units than the sale asks for.
    #[error("insufficient stock: wanted to sell {requested} of {resource:?} but only have {available}")]
    InsufficientStock {
        /// The resource being sold.
        resource: Resource,
        /// The amount offered for sale.
        requested: u32,
        /// The units actually stored.
        available: u32,
    },

    /// Arithmetic overflow during a checked price calculation.
    #[error("arithmetic overflow in sale calculation")]
    ArithmeticOverflow,
}

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

/// The shop: a fixed price table keyed by sellable resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marketplace {
    /// Coins earned per unit, per sellable resource.
    prices: BTreeMap<Resource, u32>,
}

impl Default for Marketplace {
    fn default() -> Self {
        Self {
            prices: default_prices(),
        }
    }
}

/// The stock price list: confectionery goods only.
pub fn default_prices() -> BTreeMap<Resource, u32> {
    BTreeMap::from([
        (Resource::Bun, 10),
        (Resource::Cupcake, 15),
        (Resource::Cake, 30),
        (Resource::AppleCake, 50),
        (Resource::RaspberryCake, 60),
        (Resource::StrawberryCake, 60),
    ])
}

impl Marketplace {
    /// Create a marketplace with the given price table.
    pub const fn new(prices: BTreeMap<Resource, u32>) -> Self {
        Self { prices }
    }

    /// The unit price for `resource`, or `None` if it is not sellable.
    pub fn price(&self, resource: Resource) -> Option<u32> {
        self.prices.get(&resource).copied()
    }

    /// Whether `resource` can be sold here.
    pub fn is_sellable(&self, resource: Resource) -> bool {
        self.prices.contains_key(&resource)
    }

    /// The full price table, for display.
    pub const fn prices(&self) -> &BTreeMap<Resource, u32> {
        &self.prices
    }

    /// Sell `amount` units of `resource`, crediting the proceeds.
    ///
    /// All-or-nothing: every failure leaves both the ledger and the balance
    /// untouched. Returns the coins earned.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ZeroAmount`], [`MarketError::NotSellable`],
    /// or [`MarketError::InsufficientStock`].
    pub fn sell(
        &self,
        resource: Resource,
        amount: u32,
        ledger: &mut Ledger,
        balance: &mut Balance,
    ) -> Result<u32, MarketError> {
        if amount == 0 {
            return Err(MarketError::ZeroAmount);
        }
        let unit_price = self
            .price(resource)
            .ok_or(MarketError::NotSellable { resource })?;

        let available = ledger.count(resource);
        if available < amount {
            return Err(MarketError::InsufficientStock {
                resource,
                requested: amount,
                available,
            });
        }

        let coins = unit_price
            .checked_mul(amount)
            .ok_or(MarketError::ArithmeticOverflow)?;
        // Confirm the purse can take the proceeds before touching the barn.
        if balance.coins().checked_add(coins).is_none() {
            return Err(MarketError::ArithmeticOverflow);
        }

        ledger
            .debit(resource, amount)
            .map_err(|_err| MarketError::InsufficientStock {
                resource,
                requested: amount,
                available,
            })?;
        balance.credit(coins).map_err(|err| match err {
            BalanceError::ZeroAmount
            | BalanceError::InsufficientFunds { .. }
            | BalanceError::ArithmeticOverflow => MarketError::ArithmeticOverflow,
        })?;

        info!(?resource, amount, coins, "sale completed");
        Ok(coins)
    }
}
