//! The simulation root: one object owning all farm state.
//!
//! The [`Farmstead`] constructs and owns the ledger, balance, paddocks,
//! stations, marketplace, clock, and RNG, passing references (never global
//! lookups) into the components that need them. Everything the presentation
//! layer may do to the farm goes through the methods here, one discrete
//! step at a time on a single logical thread.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use homestead_ledger::{
    Balance, BalanceError, CapacityGate, Ledger, LedgerError, StockListener,
};
use homestead_types::{ListenerId, PaddockId, ProducerId, Resource, StationId};
use homestead_world::{
    CraftOutcome, CraftingStation, MarketError, Marketplace, Paddock, PaddockError,
    PaddockParams, ProducerError, ProducerParams, ProducerState, Recipe, RecipeError,
    StationError,
};

use crate::clock::{ClockError, SimClock};
use crate::config::{HomesteadConfig, PaddockConfig, StationConfig, StorageConfig};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by farmstead operations.
#[derive(Debug, thiserror::Error)]
pub enum FarmsteadError {
    /// No paddock exists with the given ID.
    #[error("unknown paddock: {0}")]
    UnknownPaddock(PaddockId),

    /// No producer exists with the given ID in the addressed paddock.
    #[error("unknown producer: {0}")]
    UnknownProducer(ProducerId),

    /// No station exists with the given ID.
    #[error("unknown station: {0}")]
    UnknownStation(StationId),

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A ledger operation failed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// A balance operation failed.
    #[error("balance error: {source}")]
    Balance {
        /// The underlying balance error.
        #[from]
        source: BalanceError,
    },

    /// A producer upgrade failed.
    #[error("producer error: {source}")]
    Producer {
        /// The underlying producer error.
        #[from]
        source: ProducerError,
    },

    /// A paddock expansion failed.
    #[error("paddock error: {source}")]
    Paddock {
        /// The underlying paddock error.
        #[from]
        source: PaddockError,
    },

    /// A station operation failed.
    #[error("station error: {source}")]
    Station {
        /// The underlying station error.
        #[from]
        source: StationError,
    },

    /// A marketplace sale failed.
    #[error("market error: {source}")]
    Market {
        /// The underlying market error.
        #[from]
        source: MarketError,
    },

    /// A configured recipe failed validation.
    #[error("recipe error: {source}")]
    Recipe {
        /// The underlying recipe error.
        #[from]
        source: RecipeError,
    },
}

// ---------------------------------------------------------------------------
// TickSummary
// ---------------------------------------------------------------------------

/// A producer that finished its cycle during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadyProduct {
    /// The paddock owning the producer.
    pub paddock: PaddockId,
    /// The producer that became ready.
    pub producer: ProducerId,
    /// The resource it is holding.
    pub resource: Resource,
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Producers that became ready during this tick, in paddock order.
    pub ready: Vec<ReadyProduct>,
}

// ---------------------------------------------------------------------------
// Farmstead
// ---------------------------------------------------------------------------

/// The whole farm: ledger, balance, paddocks, stations, marketplace, clock.
pub struct Farmstead {
    /// Display name from configuration.
    name: String,
    /// The simulation clock.
    clock: SimClock,
    /// The barn ledger.
    ledger: Ledger,
    /// The coin purse.
    balance: Balance,
    /// All paddocks, keyed by ID (iteration order = creation order).
    paddocks: BTreeMap<PaddockId, Paddock>,
    /// All crafting stations, keyed by ID.
    stations: BTreeMap<StationId, CraftingStation>,
    /// The marketplace.
    market: Marketplace,
    /// Barn expansion parameters.
    storage: StorageConfig,
    /// Seeded RNG driving producer timer jitter.
    rng: StdRng,
}

impl core::fmt::Debug for Farmstead {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Farmstead")
            .field("name", &self.name)
            .field("tick", &self.clock.tick())
            .field("coins", &self.balance.coins())
            .field("stored", &self.ledger.total())
            .field("paddocks", &self.paddocks.len())
            .field("stations", &self.stations.len())
            .finish()
    }
}

impl Farmstead {
    /// Build a farmstead from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`FarmsteadError`] if a configured recipe or station fails
    /// validation.
    pub fn from_config(config: &HomesteadConfig) -> Result<Self, FarmsteadError> {
        let mut rng = StdRng::seed_from_u64(config.world.seed);

        let ledger = Ledger::new(CapacityGate::new(config.storage.capacity));
        let balance = Balance::new(config.economy.starting_coins);

        let mut paddocks = BTreeMap::new();
        for paddock_config in &config.paddocks {
            paddocks.insert(
                PaddockId::new(),
                Paddock::new(paddock_params(paddock_config), &mut rng),
            );
        }

        let mut stations = BTreeMap::new();
        for station_config in &config.stations {
            stations.insert(
                StationId::new(),
                build_station(station_config, config.crafting.max_stack)?,
            );
        }

        info!(
            name = %config.world.name,
            seed = config.world.seed,
            capacity = config.storage.capacity,
            paddocks = paddocks.len(),
            stations = stations.len(),
            "farmstead created"
        );

        Ok(Self {
            name: config.world.name.clone(),
            clock: SimClock::new(),
            ledger,
            balance,
            paddocks,
            stations,
            market: Marketplace::new(config.market.prices.clone()),
            storage: config.storage.clone(),
            rng,
        })
    }

    // -- tick driver --------------------------------------------------------

    /// Run one simulation step of `delta` seconds.
    ///
    /// Advances the clock, then every producer. Producers that finish their
    /// cycle hold their product until [`collect`](Farmstead::collect) is
    /// called; nothing is credited automatically.
    ///
    /// # Errors
    ///
    /// Returns a [`ClockError`] for a negative delta or tick overflow.
    pub fn tick(&mut self, delta: f32) -> Result<TickSummary, FarmsteadError> {
        let tick = self.clock.advance(delta)?;

        let mut ready = Vec::new();
        for (paddock_id, paddock) in &mut self.paddocks {
            for (producer_id, resource) in paddock.advance_all(delta) {
                ready.push(ReadyProduct {
                    paddock: *paddock_id,
                    producer: producer_id,
                    resource,
                });
            }
        }

        if !ready.is_empty() {
            debug!(tick, count = ready.len(), "producers became ready");
        }
        Ok(TickSummary { tick, ready })
    }

    // -- producers ----------------------------------------------------------

    /// Collect a ready producer's product into the barn.
    ///
    /// Returns `Ok(None)` without changing anything if the producer is idle
    /// (nothing to collect). If the barn cannot take one more unit the
    /// product stays with the producer and the error reports the full barn.
    ///
    /// # Errors
    ///
    /// Returns [`FarmsteadError::UnknownPaddock`]/[`FarmsteadError::UnknownProducer`]
    /// for bad IDs, or the ledger's `CapacityExceeded`.
    pub fn collect(
        &mut self,
        paddock_id: PaddockId,
        producer_id: ProducerId,
    ) -> Result<Option<Resource>, FarmsteadError> {
        let paddock = self
            .paddocks
            .get_mut(&paddock_id)
            .ok_or(FarmsteadError::UnknownPaddock(paddock_id))?;
        let producer = paddock
            .producer_mut(producer_id)
            .ok_or(FarmsteadError::UnknownProducer(producer_id))?;

        if producer.state() == ProducerState::Idle {
            return Ok(None);
        }

        // Check the barn BEFORE collecting so a full barn leaves the
        // product waiting rather than dropping it.
        if !self.ledger.can_accept(1) {
            return Err(LedgerError::CapacityExceeded {
                resource: producer.resource(),
                attempted: 1,
                stored: self.ledger.total(),
                capacity: self.ledger.capacity(),
            }
            .into());
        }

        let Some(resource) = producer.collect(&mut self.rng) else {
            return Ok(None);
        };
        self.ledger.credit(resource, 1)?;
        Ok(Some(resource))
    }

    /// Purchase one upgrade for a producer, returning its new level.
    ///
    /// # Errors
    ///
    /// Returns ID-lookup errors or the producer's `MaxLevelReached` /
    /// `InsufficientFunds`.
    pub fn upgrade_producer(
        &mut self,
        paddock_id: PaddockId,
        producer_id: ProducerId,
    ) -> Result<u32, FarmsteadError> {
        let paddock = self
            .paddocks
            .get_mut(&paddock_id)
            .ok_or(FarmsteadError::UnknownPaddock(paddock_id))?;
        let producer = paddock
            .producer_mut(producer_id)
            .ok_or(FarmsteadError::UnknownProducer(producer_id))?;
        Ok(producer.upgrade(&mut self.balance)?)
    }

    /// Buy one more producer for a paddock, returning its ID.
    ///
    /// # Errors
    ///
    /// Returns [`FarmsteadError::UnknownPaddock`] or the paddock's
    /// `PaddockFull` / `InsufficientFunds`.
    pub fn expand_paddock(&mut self, paddock_id: PaddockId) -> Result<ProducerId, FarmsteadError> {
        let paddock = self
            .paddocks
            .get_mut(&paddock_id)
            .ok_or(FarmsteadError::UnknownPaddock(paddock_id))?;
        Ok(paddock.expand(&mut self.balance, &mut self.rng)?)
    }

    // -- stations -----------------------------------------------------------

    /// Move stock from the barn into a station's ingredient slot.
    ///
    /// # Errors
    ///
    /// Returns [`FarmsteadError::UnknownStation`] or the station's loading
    /// errors.
    pub fn load_station_slot(
        &mut self,
        station_id: StationId,
        slot_index: usize,
        resource: Resource,
        amount: u32,
    ) -> Result<(), FarmsteadError> {
        let station = self
            .stations
            .get_mut(&station_id)
            .ok_or(FarmsteadError::UnknownStation(station_id))?;
        Ok(station.load_slot(slot_index, resource, amount, &mut self.ledger)?)
    }

    /// Return an ingredient slot's stack to the barn.
    ///
    /// # Errors
    ///
    /// Returns [`FarmsteadError::UnknownStation`] or the station's unloading
    /// errors (including a full barn).
    pub fn unload_station_slot(
        &mut self,
        station_id: StationId,
        slot_index: usize,
    ) -> Result<u32, FarmsteadError> {
        let station = self
            .stations
            .get_mut(&station_id)
            .ok_or(FarmsteadError::UnknownStation(station_id))?;
        Ok(station.unload_slot(slot_index, &mut self.ledger)?)
    }

    /// Return a station's result stack to the barn.
    ///
    /// # Errors
    ///
    /// Returns [`FarmsteadError::UnknownStation`] or the station's errors.
    pub fn collect_station_result(
        &mut self,
        station_id: StationId,
    ) -> Result<u32, FarmsteadError> {
        let station = self
            .stations
            .get_mut(&station_id)
            .ok_or(FarmsteadError::UnknownStation(station_id))?;
        Ok(station.collect_result(&mut self.ledger)?)
    }

    /// Run one craft at a station.
    ///
    /// # Errors
    ///
    /// Returns [`FarmsteadError::UnknownStation`] or the station's craft
    /// errors (`NoMatchingRecipe`, `InsufficientIngredients`,
    /// `ResultSlotBlocked`).
    pub fn craft(&mut self, station_id: StationId) -> Result<CraftOutcome, FarmsteadError> {
        let station = self
            .stations
            .get_mut(&station_id)
            .ok_or(FarmsteadError::UnknownStation(station_id))?;
        Ok(station.attempt_craft(&mut self.ledger)?)
    }

    // -- marketplace and storage --------------------------------------------

    /// Sell stock at the marketplace, returning the coins earned.
    ///
    /// # Errors
    ///
    /// Returns the marketplace's `NotSellable` / `InsufficientStock`.
    pub fn sell(&mut self, resource: Resource, amount: u32) -> Result<u32, FarmsteadError> {
        Ok(self
            .market
            .sell(resource, amount, &mut self.ledger, &mut self.balance)?)
    }

    /// Buy one barn expansion, returning the new capacity.
    ///
    /// # Errors
    ///
    /// Returns the balance's `InsufficientFunds`; the coin debit and the
    /// ceiling raise happen together or not at all.
    pub fn expand_storage(&mut self) -> Result<u32, FarmsteadError> {
        // Confirm the ceiling arithmetic before taking any coins.
        self.ledger
            .capacity()
            .checked_add(self.storage.expansion_increment)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.balance.debit(self.storage.expansion_cost)?;
        let new_capacity = self.ledger.expand_capacity(self.storage.expansion_increment)?;
        info!(new_capacity, "barn expansion purchased");
        Ok(new_capacity)
    }

    // -- read views ---------------------------------------------------------

    /// The farm's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticks completed so far.
    pub const fn tick_count(&self) -> u64 {
        self.clock.tick()
    }

    /// Read view of the barn ledger.
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Coins currently held.
    pub const fn coins(&self) -> u32 {
        self.balance.coins()
    }

    /// Read view of the marketplace.
    pub const fn market(&self) -> &Marketplace {
        &self.market
    }

    /// Iterate paddocks in creation order.
    pub fn paddocks(&self) -> impl Iterator<Item = (&PaddockId, &Paddock)> {
        self.paddocks.iter()
    }

    /// Look up one paddock.
    pub fn paddock(&self, id: PaddockId) -> Option<&Paddock> {
        self.paddocks.get(&id)
    }

    /// Iterate stations in creation order.
    pub fn stations(&self) -> impl Iterator<Item = (&StationId, &CraftingStation)> {
        self.stations.iter()
    }

    /// Look up one station.
    pub fn station(&self, id: StationId) -> Option<&CraftingStation> {
        self.stations.get(&id)
    }

    /// Register a display listener on the barn ledger.
    pub fn register_stock_listener(&mut self, listener: Box<dyn StockListener>) -> ListenerId {
        self.ledger.register_listener(listener)
    }

    /// Remove a previously registered display listener.
    pub fn unregister_stock_listener(&mut self, id: ListenerId) -> bool {
        self.ledger.unregister_listener(id)
    }
}

// ---------------------------------------------------------------------------
// Config conversion
// ---------------------------------------------------------------------------

/// Convert a paddock config entry into runtime parameters.
fn paddock_params(config: &PaddockConfig) -> PaddockParams {
    PaddockParams {
        name: config.name.clone(),
        initial_count: config.initial_count,
        max_count: config.max_count,
        expansion_cost: config.expansion_cost,
        producer: ProducerParams {
            resource: config.resource,
            base_interval: config.base_interval,
            step_reduction: config.step_reduction,
            min_interval: config.min_interval,
            max_upgrades: config.max_upgrades,
            upgrade_cost: config.upgrade_cost,
            jitter: config.jitter,
        },
    }
}

/// Build a validated station from its config entry.
fn build_station(
    config: &StationConfig,
    max_stack: u32,
) -> Result<CraftingStation, FarmsteadError> {
    let mut recipes = Vec::with_capacity(config.recipes.len());
    for recipe_config in &config.recipes {
        let ingredients = recipe_config
            .ingredients
            .iter()
            .map(|ingredient| (ingredient.resource, ingredient.amount))
            .collect();
        recipes.push(Recipe::new(
            recipe_config.name.clone(),
            recipe_config.result,
            ingredients,
        )?);
    }

    let allowed: BTreeSet<Resource> = config.allowed.iter().copied().collect();
    Ok(CraftingStation::new(
        config.name.clone(),
        allowed,
        config.slot_count,
        max_stack,
        recipes,
    )?)
}
