//! The producer timer state machine.
//!
//! A producer is anything that yields one unit of a fixed resource on a
//! countdown: a chicken laying eggs, a cow giving milk, a wheat bed growing
//! grain. The countdown runs only while no product is held; a finished
//! product waits until it is explicitly collected, and collection restarts
//! the cycle with a jittered interval so producers drift out of phase.
//!
//! Timers are advanced by a pure [`advance`](Producer::advance) call from
//! the tick driver rather than by a coroutine, which makes the state machine
//! testable without simulated frame waits.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use homestead_ledger::{Balance, BalanceError};
use homestead_types::Resource;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when upgrading a producer.
#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    /// The producer is already at its maximum upgrade level.
    #[error("producer already at maximum upgrade level {max}")]
    MaxLevelReached {
        /// The configured upgrade cap.
        max: u32,
    },

    /// The balance cannot cover the upgrade cost.
    #[error("cannot afford upgrade: costs {cost} coins but only {available} held")]
    InsufficientFunds {
        /// The upgrade cost.
        cost: u32,
        /// The coins actually held.
        available: u32,
    },

    /// Arithmetic overflow during a checked upgrade calculation.
    #[error("arithmetic overflow in upgrade calculation")]
    ArithmeticOverflow,
}

// ---------------------------------------------------------------------------
// ProducerParams
// ---------------------------------------------------------------------------

/// Static parameters for one kind of producer.
///
/// The derived production interval at upgrade level `n` is
/// `max(min_interval, base_interval - n * step_reduction)`; the floor keeps
/// heavily upgraded producers from collapsing to instant production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerParams {
    /// The resource this producer yields, one unit per cycle.
    pub resource: Resource,
    /// Production interval at upgrade level zero, in seconds.
    pub base_interval: f32,
    /// Seconds shaved off the interval per upgrade level.
    pub step_reduction: f32,
    /// Lower bound the interval can never drop below, in seconds.
    pub min_interval: f32,
    /// Maximum number of upgrades this producer accepts.
    pub max_upgrades: u32,
    /// Coin cost of one upgrade.
    pub upgrade_cost: u32,
    /// Half-width of the uniform jitter applied on each timer reset,
    /// in seconds.
    pub jitter: f32,
}

// ---------------------------------------------------------------------------
// Producer
// ---------------------------------------------------------------------------

/// Observable state of a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProducerState {
    /// No product held; the timer is counting down.
    Idle,
    /// A product is held and waiting to be collected.
    Ready,
}

/// A timed producer of one resource.
///
/// Invariants: the held-product flag is true only while an uncollected unit
/// exists, and the timer counts down only while the flag is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    /// Static parameters for this producer kind.
    params: ProducerParams,
    /// Whether an uncollected unit is waiting.
    has_product: bool,
    /// Seconds until the next unit, meaningful only while idle.
    timer: f32,
    /// Upgrades purchased so far.
    upgrade_level: u32,
    /// Interval applied at the next timer reset.
    current_interval: f32,
}

impl Producer {
    /// Create an idle producer with a freshly jittered first timer.
    pub fn new<R: Rng>(params: ProducerParams, rng: &mut R) -> Self {
        let current_interval = params.base_interval.max(params.min_interval);
        let timer = jittered(current_interval, params.jitter, rng);
        Self {
            params,
            has_product: false,
            timer,
            upgrade_level: 0,
            current_interval,
        }
    }

    /// The resource this producer yields.
    pub const fn resource(&self) -> Resource {
        self.params.resource
    }

    /// Current state: [`ProducerState::Ready`] iff a product is waiting.
    pub const fn state(&self) -> ProducerState {
        if self.has_product {
            ProducerState::Ready
        } else {
            ProducerState::Idle
        }
    }

    /// Seconds until the next unit; zero while a product is waiting.
    pub const fn time_remaining(&self) -> f32 {
        if self.has_product {
            0.0
        } else {
            self.timer
        }
    }

    /// Upgrades purchased so far.
    pub const fn upgrade_level(&self) -> u32 {
        self.upgrade_level
    }

    /// The interval that will be used at the next timer reset, in seconds.
    pub const fn current_interval(&self) -> f32 {
        self.current_interval
    }

    /// Advance the countdown by `delta` seconds.
    ///
    /// Returns the yielded resource exactly once, on the tick where the
    /// timer reaches zero. Further calls return `None` until the product is
    /// collected -- a waiting product is held, not stacked.
    pub fn advance(&mut self, delta: f32) -> Option<Resource> {
        if self.has_product {
            return None;
        }
        self.timer -= delta;
        if self.timer <= 0.0 {
            self.timer = 0.0;
            self.has_product = true;
            debug!(resource = ?self.params.resource, "producer ready");
            return Some(self.params.resource);
        }
        None
    }

    /// Collect the waiting product, restarting the countdown.
    ///
    /// Returns `None` (and changes nothing) if no product is waiting. On
    /// success the timer resets to the current interval plus a bounded
    /// random jitter, clamped to never start negative, and the product is
    /// returned for the caller to credit wherever it belongs.
    pub fn collect<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        if !self.has_product {
            return None;
        }
        self.has_product = false;
        self.timer = jittered(self.current_interval, self.params.jitter, rng);
        Some(self.params.resource)
    }

    /// Purchase one upgrade, shortening the production interval.
    ///
    /// The shortened interval applies from the next timer reset onward; an
    /// in-flight countdown keeps its remaining time. Returns the new
    /// upgrade level.
    ///
    /// # Errors
    ///
    /// Returns [`ProducerError::MaxLevelReached`] at the upgrade cap, or
    /// [`ProducerError::InsufficientFunds`] (balance untouched) if the
    /// balance cannot cover the cost.
    pub fn upgrade(&mut self, balance: &mut Balance) -> Result<u32, ProducerError> {
        if self.upgrade_level >= self.params.max_upgrades {
            return Err(ProducerError::MaxLevelReached {
                max: self.params.max_upgrades,
            });
        }

        balance
            .debit(self.params.upgrade_cost)
            .map_err(|err| match err {
                BalanceError::InsufficientFunds { available, .. } => {
                    ProducerError::InsufficientFunds {
                        cost: self.params.upgrade_cost,
                        available,
                    }
                }
                BalanceError::ZeroAmount | BalanceError::ArithmeticOverflow => {
                    ProducerError::ArithmeticOverflow
                }
            })?;

        self.upgrade_level = self
            .upgrade_level
            .checked_add(1)
            .ok_or(ProducerError::ArithmeticOverflow)?;

        // Equivalent to max(min_interval, base_interval - level * step):
        // one step down from the previous interval, floored.
        self.current_interval = (self.current_interval - self.params.step_reduction)
            .max(self.params.min_interval);

        debug!(
            resource = ?self.params.resource,
            level = self.upgrade_level,
            interval = self.current_interval,
            "producer upgraded"
        );
        Ok(self.upgrade_level)
    }
}

/// Sample `interval` plus uniform jitter in `[-jitter, +jitter]`, clamped to
/// never go below zero.
fn jittered<R: Rng>(interval: f32, jitter: f32, rng: &mut R) -> f32 {
    if jitter <= 0.0 {
        return interval.max(0.0);
    }
    let offset = rng.random_range(-jitter..=jitter);
    (interval + offset).max(0.0)
}
