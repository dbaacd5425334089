//! Bounded single-type stacks for crafting station slots.
//!
//! A slot holds at most one resource type at a time, up to a configured
//! stack size. Emptiness is `None` -- there is no sentinel resource.

use serde::{Deserialize, Serialize};

use homestead_types::Resource;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when mutating a crafting slot.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlotError {
    /// Amounts must be strictly positive.
    #[error("slot amount must be positive")]
    ZeroAmount,

    /// The slot cannot take that many more units.
    #[error("stack full: {count} of {capacity} held, cannot add {attempted}")]
    StackFull {
        /// Units currently in the slot.
        count: u32,
        /// The stack capacity.
        capacity: u32,
        /// The amount the caller attempted to add.
        attempted: u32,
    },

    /// The slot holds a different resource type.
    #[error("slot holds {held:?}, cannot accept {offered:?}")]
    TypeMismatch {
        /// The resource already in the slot.
        held: Resource,
        /// The resource the caller offered.
        offered: Resource,
    },

    /// The slot is empty.
    #[error("slot is empty")]
    Empty,

    /// The slot holds fewer units than requested.
    #[error("slot holds {available}, cannot remove {requested}")]
    InsufficientContents {
        /// The amount the caller attempted to remove.
        requested: u32,
        /// Units actually in the slot.
        available: u32,
    },
}

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

/// A quantity of one resource sitting in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    /// The resource held.
    pub resource: Resource,
    /// Units held, always at least 1 inside an occupied slot.
    pub count: u32,
}

// ---------------------------------------------------------------------------
// CraftingSlot
// ---------------------------------------------------------------------------

/// One bounded stack owned by a crafting station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingSlot {
    /// The stack, or `None` when empty.
    contents: Option<Stack>,
    /// Maximum units the slot can hold.
    max_stack: u32,
}

impl CraftingSlot {
    /// Create an empty slot with the given stack bound.
    pub const fn new(max_stack: u32) -> Self {
        Self {
            contents: None,
            max_stack,
        }
    }

    /// Whether the slot holds nothing.
    pub const fn is_empty(&self) -> bool {
        self.contents.is_none()
    }

    /// The held resource, if any.
    pub fn resource(&self) -> Option<Resource> {
        self.contents.map(|stack| stack.resource)
    }

    /// Units held; zero when empty.
    pub fn count(&self) -> u32 {
        self.contents.map_or(0, |stack| stack.count)
    }

    /// The held stack, if any.
    pub const fn contents(&self) -> Option<&Stack> {
        self.contents.as_ref()
    }

    /// The stack bound.
    pub const fn max_stack(&self) -> u32 {
        self.max_stack
    }

    /// How many more units of `resource` this slot could take: the full
    /// bound when empty, the remaining headroom for the same type, zero for
    /// a different type.
    pub fn headroom_for(&self, resource: Resource) -> u32 {
        match self.contents {
            None => self.max_stack,
            Some(stack) if stack.resource == resource => {
                self.max_stack.saturating_sub(stack.count)
            }
            Some(_) => 0,
        }
    }

    /// Replace the slot contents outright.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::ZeroAmount`] for a zero count, or
    /// [`SlotError::StackFull`] if `count` exceeds the stack bound.
    pub fn place(&mut self, resource: Resource, count: u32) -> Result<(), SlotError> {
        if count == 0 {
            return Err(SlotError::ZeroAmount);
        }
        if count > self.max_stack {
            return Err(SlotError::StackFull {
                count: 0,
                capacity: self.max_stack,
                attempted: count,
            });
        }
        self.contents = Some(Stack { resource, count });
        Ok(())
    }

    /// Add `amount` units of `resource`, stacking onto same-type contents or
    /// filling an empty slot.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::TypeMismatch`] if a different type is held, or
    /// [`SlotError::StackFull`] if the bound would be exceeded. Either way
    /// the slot is unchanged.
    pub fn add(&mut self, resource: Resource, amount: u32) -> Result<(), SlotError> {
        if amount == 0 {
            return Err(SlotError::ZeroAmount);
        }
        match self.contents {
            None => self.place(resource, amount),
            Some(stack) if stack.resource == resource => {
                let new_count = stack.count.saturating_add(amount);
                if new_count > self.max_stack {
                    return Err(SlotError::StackFull {
                        count: stack.count,
                        capacity: self.max_stack,
                        attempted: amount,
                    });
                }
                self.contents = Some(Stack {
                    resource,
                    count: new_count,
                });
                Ok(())
            }
            Some(stack) => Err(SlotError::TypeMismatch {
                held: stack.resource,
                offered: resource,
            }),
        }
    }

    /// Remove `amount` units, clearing the slot when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::Empty`] or [`SlotError::InsufficientContents`];
    /// either way the slot is unchanged.
    pub fn remove(&mut self, amount: u32) -> Result<(), SlotError> {
        if amount == 0 {
            return Err(SlotError::ZeroAmount);
        }
        let Some(stack) = self.contents else {
            return Err(SlotError::Empty);
        };
        if stack.count < amount {
            return Err(SlotError::InsufficientContents {
                requested: amount,
                available: stack.count,
            });
        }
        let remaining = stack.count.saturating_sub(amount);
        self.contents = if remaining == 0 {
            None
        } else {
            Some(Stack {
                resource: stack.resource,
                count: remaining,
            })
        };
        Ok(())
    }

    /// Empty the slot, returning whatever it held.
    pub const fn take_all(&mut self) -> Option<Stack> {
        self.contents.take()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_slot_is_empty() {
        let slot = CraftingSlot::new(10);
        assert!(slot.is_empty());
        assert_eq!(slot.count(), 0);
        assert_eq!(slot.resource(), None);
    }

    #[test]
    fn place_and_read() {
        let mut slot = CraftingSlot::new(10);
        slot.place(Resource::Wheat, 3).unwrap();
        assert_eq!(slot.resource(), Some(Resource::Wheat));
        assert_eq!(slot.count(), 3);
    }

    #[test]
    fn add_stacks_same_type() {
        let mut slot = CraftingSlot::new(10);
        slot.add(Resource::Wheat, 4).unwrap();
        slot.add(Resource::Wheat, 5).unwrap();
        assert_eq!(slot.count(), 9);
    }

    #[test]
    fn add_rejects_other_type() {
        let mut slot = CraftingSlot::new(10);
        slot.add(Resource::Wheat, 1).unwrap();
        assert_eq!(
            slot.add(Resource::Eggs, 1),
            Err(SlotError::TypeMismatch {
                held: Resource::Wheat,
                offered: Resource::Eggs,
            })
        );
        assert_eq!(slot.count(), 1);
    }

    #[test]
    fn add_respects_stack_bound() {
        let mut slot = CraftingSlot::new(10);
        slot.add(Resource::Wheat, 10).unwrap();
        assert!(matches!(
            slot.add(Resource::Wheat, 1),
            Err(SlotError::StackFull {
                count: 10,
                capacity: 10,
                attempted: 1,
            })
        ));
    }

    #[test]
    fn remove_decrements_and_clears() {
        let mut slot = CraftingSlot::new(10);
        slot.add(Resource::Eggs, 3).unwrap();
        slot.remove(2).unwrap();
        assert_eq!(slot.count(), 1);
        slot.remove(1).unwrap();
        assert!(slot.is_empty());
    }

    #[test]
    fn remove_more_than_held_rejected() {
        let mut slot = CraftingSlot::new(10);
        slot.add(Resource::Eggs, 2).unwrap();
        assert_eq!(
            slot.remove(3),
            Err(SlotError::InsufficientContents {
                requested: 3,
                available: 2,
            })
        );
        assert_eq!(slot.count(), 2);
    }

    #[test]
    fn remove_from_empty_rejected() {
        let mut slot = CraftingSlot::new(10);
        assert_eq!(slot.remove(1), Err(SlotError::Empty));
    }

    #[test]
    fn take_all_empties() {
        let mut slot = CraftingSlot::new(10);
        slot.add(Resource::Milk, 7).unwrap();
        let stack = slot.take_all().unwrap();
        assert_eq!(stack.resource, Resource::Milk);
        assert_eq!(stack.count, 7);
        assert!(slot.is_empty());
        assert_eq!(slot.take_all(), None);
    }

    #[test]
    fn headroom_by_contents() {
        let mut slot = CraftingSlot::new(10);
        assert_eq!(slot.headroom_for(Resource::Wheat), 10);
        slot.add(Resource::Wheat, 4).unwrap();
        assert_eq!(slot.headroom_for(Resource::Wheat), 6);
        assert_eq!(slot.headroom_for(Resource::Eggs), 0);
    }
}
