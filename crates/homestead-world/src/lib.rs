//! Producers, crafting stations, and the marketplace for the Homestead
//! simulation.
//!
//! This crate models everything on the farm that creates, converts, or sells
//! resources. Producers yield raw goods on upgrade-scaled timers, crafting
//! stations turn slot contents into higher-value goods via recipes, and the
//! marketplace converts goods into coins. All stock movement flows through
//! the `homestead-ledger` crate; nothing here holds authoritative counts
//! except the slots a player has explicitly filled.
//!
//! # Modules
//!
//! - [`producer`] -- The [`Producer`] timer state machine (animals and beds)
//!   with its upgrade track.
//! - [`paddock`] -- The [`Paddock`] registry owning a group of producers,
//!   expandable by purchase.
//! - [`recipe`] -- Validated [`Recipe`] definitions and the pure matcher with
//!   first-match-wins resolution.
//! - [`slot`] -- The [`CraftingSlot`] bounded stack.
//! - [`station`] -- The [`CraftingStation`]: ingredient slots, result slot,
//!   and the craft operation.
//! - [`market`] -- The [`Marketplace`] price table and all-or-nothing sales.

pub mod market;
pub mod paddock;
pub mod producer;
pub mod recipe;
pub mod slot;
pub mod station;

// Re-export primary types at crate root.
pub use market::{Marketplace, MarketError};
pub use paddock::{Paddock, PaddockError, PaddockParams};
pub use producer::{Producer, ProducerError, ProducerParams, ProducerState};
pub use recipe::{first_match, Recipe, RecipeError};
pub use slot::{CraftingSlot, SlotError, Stack};
pub use station::{CraftOutcome, CraftingStation, StationError};
