//! Paddocks: purchasable groups of producers of one kind.
//!
//! A paddock is a pen of animals or a field of beds. It starts with a
//! configured number of producers and can be expanded, one producer at a
//! time, for coins -- up to a hard cap. Every producer in a paddock shares
//! the same parameter set.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use homestead_ledger::{Balance, BalanceError};
use homestead_types::{ProducerId, Resource};

use crate::producer::{Producer, ProducerParams};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when expanding a paddock.
#[derive(Debug, thiserror::Error)]
pub enum PaddockError {
    /// The paddock already holds its maximum number of producers.
    #[error("paddock is full: {count} of {max} producers")]
    PaddockFull {
        /// Producers currently in the paddock.
        count: u32,
        /// The configured cap.
        max: u32,
    },

    /// The balance cannot cover the expansion cost.
    #[error("cannot afford expansion: costs {cost} coins but only {available} held")]
    InsufficientFunds {
        /// The expansion cost.
        cost: u32,
        /// The coins actually held.
        available: u32,
    },

    /// Arithmetic overflow during a checked paddock calculation.
    #[error("arithmetic overflow in paddock calculation")]
    ArithmeticOverflow,
}

// ---------------------------------------------------------------------------
// PaddockParams
// ---------------------------------------------------------------------------

/// Static parameters for a paddock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddockParams {
    /// Display name ("Chicken Coop", "Wheat Field").
    pub name: String,
    /// Producers present at construction.
    pub initial_count: u32,
    /// Hard cap on producers.
    pub max_count: u32,
    /// Coin cost of adding one producer.
    pub expansion_cost: u32,
    /// Parameter set shared by every producer in this paddock.
    pub producer: ProducerParams,
}

// ---------------------------------------------------------------------------
// Paddock
// ---------------------------------------------------------------------------

/// A group of identical producers, expandable by purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddock {
    /// Static parameters.
    params: PaddockParams,
    /// Producers keyed by ID; iteration order is creation order (UUID v7).
    producers: BTreeMap<ProducerId, Producer>,
}

impl Paddock {
    /// Create a paddock populated with its initial producers.
    pub fn new<R: Rng>(params: PaddockParams, rng: &mut R) -> Self {
        let mut producers = BTreeMap::new();
        for _ in 0..params.initial_count {
            producers.insert(ProducerId::new(), Producer::new(params.producer.clone(), rng));
        }
        Self { params, producers }
    }

    /// The paddock's display name.
    pub fn name(&self) -> &str {
        &self.params.name
    }

    /// The resource every producer in this paddock yields.
    pub const fn resource(&self) -> Resource {
        self.params.producer.resource
    }

    /// Number of producers currently in the paddock.
    pub fn producer_count(&self) -> u32 {
        u32::try_from(self.producers.len()).unwrap_or(u32::MAX)
    }

    /// Iterate over producers in creation order.
    pub fn producers(&self) -> impl Iterator<Item = (&ProducerId, &Producer)> {
        self.producers.iter()
    }

    /// Look up one producer.
    pub fn producer(&self, id: ProducerId) -> Option<&Producer> {
        self.producers.get(&id)
    }

    /// Look up one producer mutably.
    pub fn producer_mut(&mut self, id: ProducerId) -> Option<&mut Producer> {
        self.producers.get_mut(&id)
    }

    /// Advance every producer by `delta` seconds, returning the producers
    /// that became ready this tick, in creation order.
    pub fn advance_all(&mut self, delta: f32) -> Vec<(ProducerId, Resource)> {
        let mut ready = Vec::new();
        for (id, producer) in &mut self.producers {
            if let Some(resource) = producer.advance(delta) {
                ready.push((*id, resource));
            }
        }
        ready
    }

    /// Buy one more producer, returning its ID.
    ///
    /// # Errors
    ///
    /// Returns [`PaddockError::PaddockFull`] at the cap, or
    /// [`PaddockError::InsufficientFunds`] (balance untouched) if the
    /// balance cannot cover the expansion cost.
    pub fn expand<R: Rng>(
        &mut self,
        balance: &mut Balance,
        rng: &mut R,
    ) -> Result<ProducerId, PaddockError> {
        let count = self.producer_count();
        if count >= self.params.max_count {
            return Err(PaddockError::PaddockFull {
                count,
                max: self.params.max_count,
            });
        }

        balance
            .debit(self.params.expansion_cost)
            .map_err(|err| match err {
                BalanceError::InsufficientFunds { available, .. } => {
                    PaddockError::InsufficientFunds {
                        cost: self.params.expansion_cost,
                        available,
                    }
                }
                BalanceError::ZeroAmount | BalanceError::ArithmeticOverflow => {
                    PaddockError::ArithmeticOverflow
                }
            })?;

        let id = ProducerId::new();
        self.producers
            .insert(id, Producer::new(self.params.producer.clone(), rng));
        info!(paddock = %self.params.name, producer = %id, "paddock expanded");
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn coop() -> PaddockParams {
        PaddockParams {
            name: "Chicken Coop".to_owned(),
            initial_count: 2,
            max_count: 10,
            expansion_cost: 25,
            producer: ProducerParams {
                resource: Resource::Eggs,
                base_interval: 30.0,
                step_reduction: 5.0,
                min_interval: 5.0,
                max_upgrades: 7,
                upgrade_cost: 25,
                jitter: 0.0,
            },
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn starts_with_initial_producers() {
        let paddock = Paddock::new(coop(), &mut rng());
        assert_eq!(paddock.producer_count(), 2);
        assert_eq!(paddock.resource(), Resource::Eggs);
    }

    #[test]
    fn expand_adds_producer_and_charges() {
        let mut paddock = Paddock::new(coop(), &mut rng());
        let mut balance = Balance::new(30);

        let id = paddock.expand(&mut balance, &mut rng()).unwrap();
        assert_eq!(paddock.producer_count(), 3);
        assert_eq!(balance.coins(), 5);
        assert!(paddock.producer(id).is_some());
    }

    #[test]
    fn expand_without_funds_rejected() {
        let mut paddock = Paddock::new(coop(), &mut rng());
        let mut balance = Balance::new(24);

        assert!(matches!(
            paddock.expand(&mut balance, &mut rng()),
            Err(PaddockError::InsufficientFunds {
                cost: 25,
                available: 24
            })
        ));
        assert_eq!(paddock.producer_count(), 2);
        assert_eq!(balance.coins(), 24);
    }

    #[test]
    fn expand_at_cap_rejected() {
        let mut paddock = Paddock::new(coop(), &mut rng());
        let mut balance = Balance::new(1000);

        for _ in 0..8 {
            paddock.expand(&mut balance, &mut rng()).unwrap();
        }
        assert_eq!(paddock.producer_count(), 10);
        assert!(matches!(
            paddock.expand(&mut balance, &mut rng()),
            Err(PaddockError::PaddockFull { count: 10, max: 10 })
        ));
    }

    #[test]
    fn advance_all_reports_ready_producers() {
        let mut paddock = Paddock::new(coop(), &mut rng());

        assert!(paddock.advance_all(29.0).is_empty());
        let ready = paddock.advance_all(1.0);
        assert_eq!(ready.len(), 2);
        assert!(ready.iter().all(|(_, r)| *r == Resource::Eggs));

        // Already ready: no duplicate yields.
        assert!(paddock.advance_all(30.0).is_empty());
    }
}
