//! Configuration, simulation clock, and the farmstead root for the
//! Homestead simulation.
//!
//! This crate wires the farm together: it loads the typed YAML
//! configuration, builds every paddock, station, and the marketplace from
//! it, and drives them all from a single [`Farmstead`] object that owns the
//! ledger, balance, clock, and RNG outright. There are no globals and no
//! singletons; everything reaches shared state through references handed
//! down from the root.
//!
//! # Modules
//!
//! - [`config`] -- Typed configuration structs and the YAML loader.
//! - [`clock`] -- The [`SimClock`] tick counter and elapsed-time tracker.
//! - [`farmstead`] -- The [`Farmstead`] simulation root and tick driver.

pub mod clock;
pub mod config;
pub mod farmstead;

// Re-export primary types at crate root.
pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, HomesteadConfig};
pub use farmstead::{Farmstead, FarmsteadError, ReadyProduct, TickSummary};
