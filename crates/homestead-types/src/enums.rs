//! Enumeration types for the Homestead simulation.
//!
//! The [`Resource`] enumeration is closed: every quantity tracked anywhere in
//! the simulation is keyed by one of these variants. Identity is nominal --
//! quantities of different resources are never interchangeable.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A resource that exists in the farm economy.
///
/// Resources split into two tiers:
/// - **Raw**: yielded directly by producers (animals, crop beds, fruit beds).
/// - **Crafted**: produced by a crafting station from raw or crafted inputs.
///
/// Absence of a resource is expressed with `Option<Resource>`; there is no
/// sentinel variant, so an "empty" value can never leak into a ledger key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    // --- Raw: field crops ---
    /// Grain harvested from a wheat bed.
    Wheat,

    // --- Raw: animal produce ---
    /// Eggs laid by chickens.
    Eggs,
    /// Milk from cows.
    Milk,

    // --- Raw: fruit ---
    /// Apples from an apple tree.
    Apple,
    /// Raspberries from a raspberry bush.
    Raspberry,
    /// Strawberries from a strawberry bed.
    Strawberry,

    // --- Crafted: bakery ---
    /// Baked from wheat and eggs.
    Bread,

    // --- Crafted: dairy ---
    /// Churned from milk.
    Butter,
    /// Whipped from milk.
    Cream,

    // --- Crafted: confectionery ---
    /// A sweet roll of bread and butter.
    Bun,
    /// A small cake of bread and cream.
    Cupcake,
    /// A plain layer cake.
    Cake,
    /// A layer cake topped with apple.
    AppleCake,
    /// A layer cake topped with raspberry.
    RaspberryCake,
    /// A layer cake topped with strawberry.
    StrawberryCake,
}

impl Resource {
    /// Every resource variant, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Wheat,
        Self::Eggs,
        Self::Milk,
        Self::Apple,
        Self::Raspberry,
        Self::Strawberry,
        Self::Bread,
        Self::Butter,
        Self::Cream,
        Self::Bun,
        Self::Cupcake,
        Self::Cake,
        Self::AppleCake,
        Self::RaspberryCake,
        Self::StrawberryCake,
    ];

    /// Whether this resource is yielded directly by a producer.
    pub const fn is_raw(self) -> bool {
        matches!(
            self,
            Self::Wheat
                | Self::Eggs
                | Self::Milk
                | Self::Apple
                | Self::Raspberry
                | Self::Strawberry
        )
    }

    /// Whether this resource is the output of a crafting recipe.
    pub const fn is_crafted(self) -> bool {
        !self.is_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_every_variant_once() {
        let mut seen = std::collections::BTreeSet::new();
        for resource in Resource::ALL {
            assert!(seen.insert(resource), "duplicate in ALL: {resource:?}");
        }
        assert_eq!(seen.len(), Resource::ALL.len());
    }

    #[test]
    fn raw_and_crafted_partition() {
        for resource in Resource::ALL {
            assert_ne!(
                resource.is_raw(),
                resource.is_crafted(),
                "{resource:?} must be exactly one of raw/crafted"
            );
        }
    }

    #[test]
    fn produce_is_raw() {
        assert!(Resource::Wheat.is_raw());
        assert!(Resource::Eggs.is_raw());
        assert!(Resource::Milk.is_raw());
        assert!(Resource::Strawberry.is_raw());
    }

    #[test]
    fn goods_are_crafted() {
        assert!(Resource::Bread.is_crafted());
        assert!(Resource::Butter.is_crafted());
        assert!(Resource::Cake.is_crafted());
        assert!(Resource::AppleCake.is_crafted());
    }

    #[test]
    fn resource_roundtrip_serde() {
        for resource in Resource::ALL {
            let json = serde_json::to_string(&resource).ok();
            assert!(json.is_some());
            let restored: Result<Resource, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
            assert_eq!(restored.ok(), Some(resource));
        }
    }
}
