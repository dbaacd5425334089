//! Crafting stations: ingredient slots, a result slot, and the craft
//! operation.
//!
//! A station owns its slots exclusively. Players move stock from the barn
//! into ingredient slots (debiting the ledger), trigger a craft, and collect
//! the result back into the barn. The craft itself never touches the barn
//! except when evicting a stale result stack -- and that eviction is checked
//! against the capacity gate BEFORE anything is consumed, so a craft either
//! completes in full or changes nothing.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use homestead_ledger::{Ledger, LedgerError};
use homestead_types::Resource;

use crate::recipe::{first_match, Recipe};
use crate::slot::{CraftingSlot, SlotError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when operating a crafting station.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Amounts must be strictly positive.
    #[error("station amount must be positive")]
    ZeroAmount,

    /// No recipe matches the current slot contents.
    #[error("no recipe matches the loaded ingredients")]
    NoMatchingRecipe,

    /// A recipe matched but re-validation found a shortfall.
    #[error("insufficient ingredients for recipe '{recipe}'")]
    InsufficientIngredients {
        /// The recipe that failed re-validation.
        recipe: String,
    },

    /// The result slot cannot take the new unit: it is full, or it holds a
    /// different stack the barn cannot absorb.
    #[error("result slot blocked: holds {held:?}")]
    ResultSlotBlocked {
        /// The resource occupying the result slot.
        held: Resource,
    },

    /// The station does not accept this resource in its slots.
    #[error("resource {resource:?} is not accepted by this station")]
    NotAllowed {
        /// The rejected resource.
        resource: Resource,
    },

    /// No slot exists at the given index.
    #[error("no slot at index {index}")]
    UnknownSlot {
        /// The out-of-range index.
        index: usize,
    },

    /// A slot-level operation failed.
    #[error("slot error: {source}")]
    Slot {
        /// The underlying slot error.
        #[from]
        source: SlotError,
    },

    /// A ledger operation failed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// Station construction failed validation.
    #[error("invalid station '{name}': {reason}")]
    InvalidStation {
        /// The station name.
        name: String,
        /// What was wrong.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// CraftOutcome
// ---------------------------------------------------------------------------

/// The report of one successful craft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CraftOutcome {
    /// Name of the recipe that ran.
    pub recipe: String,
    /// The resource deposited into the result slot.
    pub result: Resource,
    /// Units of the result now stacked in the result slot.
    pub result_count: u32,
}

// ---------------------------------------------------------------------------
// CraftingStation
// ---------------------------------------------------------------------------

/// A station converting slot contents into crafted goods.
///
/// Recipes are tried in declaration order (first-match-wins); the allowed
/// set restricts what players may load into ingredient slots.
#[derive(Debug, Serialize)]
pub struct CraftingStation {
    /// Display name ("Bakery", "Confectionery").
    name: String,
    /// Resources accepted in ingredient slots.
    allowed: BTreeSet<Resource>,
    /// Ingredient slots, drained in index order during a craft.
    slots: Vec<CraftingSlot>,
    /// The single result slot.
    result: CraftingSlot,
    /// Recipes in priority order.
    recipes: Vec<Recipe>,
}

impl CraftingStation {
    /// Build a station.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidStation`] if there are no ingredient
    /// slots, no recipes, or a recipe requires an ingredient the station
    /// does not accept (it could never be loaded, so the recipe would be
    /// dead).
    pub fn new(
        name: impl Into<String>,
        allowed: BTreeSet<Resource>,
        slot_count: usize,
        max_stack: u32,
        recipes: Vec<Recipe>,
    ) -> Result<Self, StationError> {
        let name = name.into();

        if slot_count == 0 {
            return Err(StationError::InvalidStation {
                name,
                reason: "station needs at least one ingredient slot".to_owned(),
            });
        }
        if max_stack == 0 {
            return Err(StationError::InvalidStation {
                name,
                reason: "slot stack size must be at least 1".to_owned(),
            });
        }
        if recipes.is_empty() {
            return Err(StationError::InvalidStation {
                name,
                reason: "station needs at least one recipe".to_owned(),
            });
        }
        for recipe in &recipes {
            for (resource, _) in recipe.ingredients() {
                if !allowed.contains(resource) {
                    return Err(StationError::InvalidStation {
                        name,
                        reason: format!(
                            "recipe '{}' needs {resource:?}, which the station does not accept",
                            recipe.name()
                        ),
                    });
                }
            }
        }

        Ok(Self {
            name,
            allowed,
            slots: (0..slot_count).map(|_| CraftingSlot::new(max_stack)).collect(),
            result: CraftingSlot::new(max_stack),
            recipes,
        })
    }

    /// The station's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resources accepted in ingredient slots.
    pub const fn allowed(&self) -> &BTreeSet<Resource> {
        &self.allowed
    }

    /// Read view of the ingredient slots.
    pub fn slots(&self) -> &[CraftingSlot] {
        &self.slots
    }

    /// Read view of the result slot.
    pub const fn result_slot(&self) -> &CraftingSlot {
        &self.result
    }

    /// The recipes in priority order.
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Move stock from the barn into an ingredient slot.
    ///
    /// Validates the slot first, then debits the ledger, then fills the
    /// slot -- so a failed debit leaves the slot untouched and a failed
    /// slot check leaves the ledger untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::NotAllowed`], [`StationError::UnknownSlot`],
    /// a [`SlotError`] for type or headroom conflicts, or the ledger's
    /// `InsufficientStock`.
    pub fn load_slot(
        &mut self,
        index: usize,
        resource: Resource,
        amount: u32,
        ledger: &mut Ledger,
    ) -> Result<(), StationError> {
        if amount == 0 {
            return Err(StationError::ZeroAmount);
        }
        if !self.allowed.contains(&resource) {
            return Err(StationError::NotAllowed { resource });
        }
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(StationError::UnknownSlot { index })?;

        if let Some(held) = slot.resource() {
            if held != resource {
                return Err(StationError::Slot {
                    source: SlotError::TypeMismatch {
                        held,
                        offered: resource,
                    },
                });
            }
        }
        if slot.headroom_for(resource) < amount {
            return Err(StationError::Slot {
                source: SlotError::StackFull {
                    count: slot.count(),
                    capacity: slot.max_stack(),
                    attempted: amount,
                },
            });
        }

        ledger.debit(resource, amount)?;
        slot.add(resource, amount)?;
        debug!(station = %self.name, index, ?resource, amount, "slot loaded");
        Ok(())
    }

    /// Return an ingredient slot's whole stack to the barn.
    ///
    /// Capacity-gated: if the barn cannot absorb the stack, the slot is
    /// left unchanged. Returns the number of units returned.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::UnknownSlot`], [`SlotError::Empty`], or the
    /// ledger's `CapacityExceeded`.
    pub fn unload_slot(&mut self, index: usize, ledger: &mut Ledger) -> Result<u32, StationError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(StationError::UnknownSlot { index })?;
        let stack = *slot.contents().ok_or(SlotError::Empty)?;

        // Credit first: if the barn is full the slot keeps its stack.
        ledger.credit(stack.resource, stack.count)?;
        slot.take_all();
        debug!(station = %self.name, index, resource = ?stack.resource, count = stack.count, "slot unloaded");
        Ok(stack.count)
    }

    /// Return the result slot's whole stack to the barn.
    ///
    /// Same contract as [`unload_slot`](CraftingStation::unload_slot).
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::Empty`] or the ledger's `CapacityExceeded`.
    pub fn collect_result(&mut self, ledger: &mut Ledger) -> Result<u32, StationError> {
        let stack = *self.result.contents().ok_or(SlotError::Empty)?;
        ledger.credit(stack.resource, stack.count)?;
        self.result.take_all();
        debug!(station = %self.name, resource = ?stack.resource, count = stack.count, "result collected");
        Ok(stack.count)
    }

    /// Attempt one craft against the loaded ingredients.
    ///
    /// Resolution is first-match-wins over the declared recipe order. The
    /// craft is all-or-nothing: every failure path leaves the slots, the
    /// result slot, and the barn exactly as they were.
    ///
    /// # Errors
    ///
    /// - [`StationError::NoMatchingRecipe`] -- nothing matched.
    /// - [`StationError::InsufficientIngredients`] -- the defensive
    ///   re-validation found a shortfall.
    /// - [`StationError::ResultSlotBlocked`] -- the result slot is full of
    ///   the same resource, or holds a different stack the barn cannot
    ///   absorb. Evicting a stack the barn cannot take would destroy it, so
    ///   the whole craft refuses instead.
    pub fn attempt_craft(&mut self, ledger: &mut Ledger) -> Result<CraftOutcome, StationError> {
        let available = self.aggregate_ingredients();

        let Some(recipe) = first_match(&self.recipes, &available) else {
            debug!(station = %self.name, "no matching recipe");
            return Err(StationError::NoMatchingRecipe);
        };

        // Defensive double-check of the matched recipe.
        if !recipe.is_satisfied_by(&available) {
            return Err(StationError::InsufficientIngredients {
                recipe: recipe.name().to_owned(),
            });
        }

        // Eviction check before any mutation: the craft must be able to
        // deposit its result, or nothing may be consumed.
        match self.result.resource() {
            Some(held) if held == recipe.result() => {
                if self.result.headroom_for(held) == 0 {
                    return Err(StationError::ResultSlotBlocked { held });
                }
            }
            Some(held) => {
                if !ledger.can_accept(self.result.count()) {
                    return Err(StationError::ResultSlotBlocked { held });
                }
            }
            None => {}
        }

        let recipe = recipe.clone();

        // Consume: drain each required amount across slots in index order,
        // never over-draining.
        for (resource, needed) in recipe.ingredients() {
            let mut remaining = *needed;
            for slot in &mut self.slots {
                if remaining == 0 {
                    break;
                }
                if slot.resource() != Some(*resource) {
                    continue;
                }
                let take = slot.count().min(remaining);
                slot.remove(take)?;
                remaining = remaining.saturating_sub(take);
            }
            // The aggregate covered every requirement, so the drain cannot
            // come up short.
            debug_assert_eq!(remaining, 0);
        }

        // Deposit: stack onto a same-type result, or flush the old stack to
        // the barn (pre-checked above) and place the new unit.
        match self.result.resource() {
            Some(held) if held == recipe.result() => {
                self.result.add(recipe.result(), 1)?;
            }
            Some(_) => {
                if let Some(stale) = self.result.take_all() {
                    ledger.credit(stale.resource, stale.count)?;
                }
                self.result.place(recipe.result(), 1)?;
            }
            None => {
                self.result.place(recipe.result(), 1)?;
            }
        }

        let outcome = CraftOutcome {
            recipe: recipe.name().to_owned(),
            result: recipe.result(),
            result_count: self.result.count(),
        };
        info!(
            station = %self.name,
            recipe = %outcome.recipe,
            result = ?outcome.result,
            stacked = outcome.result_count,
            "craft succeeded"
        );
        Ok(outcome)
    }

    /// Sum the ingredient slots into one multiset (same-type slots add up).
    fn aggregate_ingredients(&self) -> BTreeMap<Resource, u32> {
        let mut aggregate = BTreeMap::new();
        for slot in &self.slots {
            if let Some(stack) = slot.contents() {
                let entry = aggregate.entry(stack.resource).or_insert(0u32);
                *entry = entry.saturating_add(stack.count);
            }
        }
        aggregate
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use homestead_ledger::CapacityGate;

    use super::*;

    fn bread_recipe() -> Recipe {
        Recipe::new(
            "Bread",
            Resource::Bread,
            vec![(Resource::Wheat, 1), (Resource::Eggs, 1)],
        )
        .unwrap()
    }

    fn bakery() -> CraftingStation {
        CraftingStation::new(
            "Bakery",
            BTreeSet::from([Resource::Wheat, Resource::Eggs]),
            2,
            10,
            vec![bread_recipe()],
        )
        .unwrap()
    }

    /// A ledger stocked with wheat and eggs, capacity 50.
    fn stocked_ledger() -> Ledger {
        let mut ledger = Ledger::new(CapacityGate::new(50));
        ledger.credit(Resource::Wheat, 10).unwrap();
        ledger.credit(Resource::Eggs, 10).unwrap();
        ledger
    }

    #[test]
    fn craft_consumes_exactly_and_deposits_one() {
        let mut ledger = stocked_ledger();
        let mut station = bakery();
        station.load_slot(0, Resource::Wheat, 1, &mut ledger).unwrap();
        station.load_slot(1, Resource::Eggs, 1, &mut ledger).unwrap();

        let outcome = station.attempt_craft(&mut ledger).unwrap();
        assert_eq!(outcome.recipe, "Bread");
        assert_eq!(outcome.result, Resource::Bread);
        assert_eq!(outcome.result_count, 1);

        // Both slots drained to empty; result slot holds one bread.
        assert!(station.slots().iter().all(CraftingSlot::is_empty));
        assert_eq!(station.result_slot().resource(), Some(Resource::Bread));
        assert_eq!(station.result_slot().count(), 1);
    }

    #[test]
    fn craft_without_match_changes_nothing() {
        let mut ledger = stocked_ledger();
        let mut station = bakery();
        station.load_slot(0, Resource::Wheat, 1, &mut ledger).unwrap();

        assert!(matches!(
            station.attempt_craft(&mut ledger),
            Err(StationError::NoMatchingRecipe)
        ));
        assert_eq!(station.slots().first().unwrap().count(), 1);
        assert!(station.result_slot().is_empty());
    }

    #[test]
    fn craft_stacks_same_result() {
        let mut ledger = stocked_ledger();
        let mut station = bakery();
        station.load_slot(0, Resource::Wheat, 2, &mut ledger).unwrap();
        station.load_slot(1, Resource::Eggs, 2, &mut ledger).unwrap();

        station.attempt_craft(&mut ledger).unwrap();
        let outcome = station.attempt_craft(&mut ledger).unwrap();
        assert_eq!(outcome.result_count, 2);
        assert_eq!(station.result_slot().count(), 2);
    }

    #[test]
    fn craft_drains_across_slots_of_same_type() {
        let mut ledger = stocked_ledger();
        let thick_bread_recipe = Recipe::new(
            "Thick Bread",
            Resource::Bread,
            vec![(Resource::Wheat, 3)],
        )
        .unwrap();
        let mut station = CraftingStation::new(
            "Bakery",
            BTreeSet::from([Resource::Wheat]),
            2,
            10,
            vec![thick_bread_recipe],
        )
        .unwrap();

        station.load_slot(0, Resource::Wheat, 2, &mut ledger).unwrap();
        station.load_slot(1, Resource::Wheat, 2, &mut ledger).unwrap();

        station.attempt_craft(&mut ledger).unwrap();

        // First slot fully drained, second slot partially: 2 + 1 = 3 taken.
        assert!(station.slots().first().unwrap().is_empty());
        assert_eq!(station.slots().get(1).unwrap().count(), 1);
    }

    #[test]
    fn craft_evicts_stale_result_to_barn() {
        let mut ledger = stocked_ledger();
        let butter_recipe =
            Recipe::new("Butter", Resource::Butter, vec![(Resource::Milk, 2)]).unwrap();
        let cream_recipe =
            Recipe::new("Cream", Resource::Cream, vec![(Resource::Milk, 3)]).unwrap();
        let mut station = CraftingStation::new(
            "Dairy",
            BTreeSet::from([Resource::Milk]),
            1,
            10,
            vec![cream_recipe, butter_recipe],
        )
        .unwrap();
        ledger.credit(Resource::Milk, 10).unwrap();

        // Craft cream first (3 milk, priority match).
        station.load_slot(0, Resource::Milk, 3, &mut ledger).unwrap();
        station.attempt_craft(&mut ledger).unwrap();
        assert_eq!(station.result_slot().resource(), Some(Resource::Cream));

        // Load only 2 milk: butter matches now. The cream stack is flushed
        // to the barn and butter takes the result slot.
        station.load_slot(0, Resource::Milk, 2, &mut ledger).unwrap();
        station.attempt_craft(&mut ledger).unwrap();
        assert_eq!(station.result_slot().resource(), Some(Resource::Butter));
        assert_eq!(station.result_slot().count(), 1);
        assert_eq!(ledger.count(Resource::Cream), 1);
    }

    #[test]
    fn craft_fails_hard_when_eviction_cannot_fit() {
        // Tiny barn: after loading, the barn is packed completely full, so
        // the stale cream stack cannot be flushed back.
        let mut ledger = Ledger::new(CapacityGate::new(6));
        ledger.credit(Resource::Milk, 5).unwrap();
        ledger.credit(Resource::Wheat, 1).unwrap();

        let butter_recipe =
            Recipe::new("Butter", Resource::Butter, vec![(Resource::Milk, 2)]).unwrap();
        let cream_recipe =
            Recipe::new("Cream", Resource::Cream, vec![(Resource::Milk, 3)]).unwrap();
        let mut station = CraftingStation::new(
            "Dairy",
            BTreeSet::from([Resource::Milk]),
            1,
            10,
            vec![cream_recipe, butter_recipe],
        )
        .unwrap();

        station.load_slot(0, Resource::Milk, 3, &mut ledger).unwrap();
        station.attempt_craft(&mut ledger).unwrap();
        assert_eq!(station.result_slot().resource(), Some(Resource::Cream));

        station.load_slot(0, Resource::Milk, 2, &mut ledger).unwrap();
        // Barn now holds 1 wheat with capacity 6 -- but stock the barn back
        // up so the eviction credit of 1 cream would overflow capacity.
        ledger.credit(Resource::Milk, 5).unwrap();

        let result = station.attempt_craft(&mut ledger);
        assert!(matches!(
            result,
            Err(StationError::ResultSlotBlocked {
                held: Resource::Cream
            })
        ));

        // Nothing was consumed, nothing was lost.
        assert_eq!(station.slots().first().unwrap().count(), 2);
        assert_eq!(station.result_slot().resource(), Some(Resource::Cream));
        assert_eq!(station.result_slot().count(), 1);
        assert_eq!(ledger.count(Resource::Cream), 0);
    }

    #[test]
    fn craft_fails_when_result_stack_full() {
        let mut ledger = stocked_ledger();
        let mut station = CraftingStation::new(
            "Bakery",
            BTreeSet::from([Resource::Wheat, Resource::Eggs]),
            2,
            2,
            vec![bread_recipe()],
        )
        .unwrap();

        station.load_slot(0, Resource::Wheat, 2, &mut ledger).unwrap();
        station.load_slot(1, Resource::Eggs, 2, &mut ledger).unwrap();
        station.attempt_craft(&mut ledger).unwrap();
        station.attempt_craft(&mut ledger).unwrap();
        assert_eq!(station.result_slot().count(), 2);

        // Result stack is at its bound of 2; a third craft must not consume.
        station.load_slot(0, Resource::Wheat, 1, &mut ledger).unwrap();
        station.load_slot(1, Resource::Eggs, 1, &mut ledger).unwrap();
        assert!(matches!(
            station.attempt_craft(&mut ledger),
            Err(StationError::ResultSlotBlocked {
                held: Resource::Bread
            })
        ));
        assert_eq!(station.slots().first().unwrap().count(), 1);
    }

    #[test]
    fn first_match_wins_repeatedly() {
        let mut ledger = Ledger::new(CapacityGate::new(100));
        ledger.credit(Resource::Milk, 30).unwrap();

        let butter_recipe =
            Recipe::new("Butter", Resource::Butter, vec![(Resource::Milk, 2)]).unwrap();
        let cream_recipe =
            Recipe::new("Cream", Resource::Cream, vec![(Resource::Milk, 3)]).unwrap();
        // Both recipes are satisfiable by 3+ milk; butter is declared first.
        let mut station = CraftingStation::new(
            "Dairy",
            BTreeSet::from([Resource::Milk]),
            1,
            10,
            vec![butter_recipe, cream_recipe],
        )
        .unwrap();

        for expected_stack in 1..=3 {
            station.load_slot(0, Resource::Milk, 3, &mut ledger).unwrap();
            let outcome = station.attempt_craft(&mut ledger).unwrap();
            assert_eq!(outcome.recipe, "Butter");
            assert_eq!(outcome.result_count, expected_stack);
        }
    }

    #[test]
    fn load_slot_debits_ledger() {
        let mut ledger = stocked_ledger();
        let mut station = bakery();
        station.load_slot(0, Resource::Wheat, 4, &mut ledger).unwrap();
        assert_eq!(ledger.count(Resource::Wheat), 6);
        assert_eq!(station.slots().first().unwrap().count(), 4);
    }

    #[test]
    fn load_slot_rejects_disallowed_resource() {
        let mut ledger = stocked_ledger();
        ledger.credit(Resource::Milk, 5).unwrap();
        let mut station = bakery();
        assert!(matches!(
            station.load_slot(0, Resource::Milk, 1, &mut ledger),
            Err(StationError::NotAllowed {
                resource: Resource::Milk
            })
        ));
        assert_eq!(ledger.count(Resource::Milk), 5);
    }

    #[test]
    fn load_slot_without_stock_leaves_slot_empty() {
        let mut ledger = Ledger::new(CapacityGate::new(50));
        let mut station = bakery();
        assert!(matches!(
            station.load_slot(0, Resource::Wheat, 1, &mut ledger),
            Err(StationError::Ledger {
                source: LedgerError::InsufficientStock { .. }
            })
        ));
        assert!(station.slots().first().unwrap().is_empty());
    }

    #[test]
    fn unload_slot_returns_stack_to_barn() {
        let mut ledger = stocked_ledger();
        let mut station = bakery();
        station.load_slot(0, Resource::Wheat, 4, &mut ledger).unwrap();

        let returned = station.unload_slot(0, &mut ledger).unwrap();
        assert_eq!(returned, 4);
        assert_eq!(ledger.count(Resource::Wheat), 10);
        assert!(station.slots().first().unwrap().is_empty());
    }

    #[test]
    fn unload_slot_blocked_by_full_barn() {
        let mut ledger = Ledger::new(CapacityGate::new(10));
        ledger.credit(Resource::Wheat, 10).unwrap();
        let mut station = bakery();
        station.load_slot(0, Resource::Wheat, 3, &mut ledger).unwrap();

        // Fill the barn back to capacity so the return cannot fit.
        ledger.credit(Resource::Eggs, 3).unwrap();

        assert!(matches!(
            station.unload_slot(0, &mut ledger),
            Err(StationError::Ledger {
                source: LedgerError::CapacityExceeded { .. }
            })
        ));
        assert_eq!(station.slots().first().unwrap().count(), 3);
    }

    #[test]
    fn collect_result_credits_barn() {
        let mut ledger = stocked_ledger();
        let mut station = bakery();
        station.load_slot(0, Resource::Wheat, 1, &mut ledger).unwrap();
        station.load_slot(1, Resource::Eggs, 1, &mut ledger).unwrap();
        station.attempt_craft(&mut ledger).unwrap();

        let collected = station.collect_result(&mut ledger).unwrap();
        assert_eq!(collected, 1);
        assert_eq!(ledger.count(Resource::Bread), 1);
        assert!(station.result_slot().is_empty());
    }

    #[test]
    fn station_rejects_recipe_with_unloadable_ingredient() {
        let result = CraftingStation::new(
            "Bakery",
            BTreeSet::from([Resource::Wheat]),
            2,
            10,
            vec![bread_recipe()],
        );
        assert!(matches!(
            result,
            Err(StationError::InvalidStation { .. })
        ));
    }
}
