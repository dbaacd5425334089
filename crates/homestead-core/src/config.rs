//! Configuration loading and typed config structures for the Homestead
//! simulation.
//!
//! The canonical configuration lives in `homestead-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads the file. Every field
//! has a default matching the stock farm, so a missing or partial file
//! still yields a playable configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use homestead_types::Resource;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `homestead-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HomesteadConfig {
    /// World-level settings (name, seed, tick pacing, run length).
    #[serde(default)]
    pub world: WorldConfig,

    /// Barn storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Coin economy settings.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Crafting settings shared by all stations.
    #[serde(default)]
    pub crafting: CraftingConfig,

    /// The paddocks (pens and fields) present at startup.
    #[serde(default = "default_paddocks")]
    pub paddocks: Vec<PaddockConfig>,

    /// The crafting stations present at startup.
    #[serde(default = "default_stations")]
    pub stations: Vec<StationConfig>,

    /// Marketplace price table.
    #[serde(default)]
    pub market: MarketConfig,
}

impl Default for HomesteadConfig {
    /// The stock farm, identical to parsing an empty configuration.
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            storage: StorageConfig::default(),
            economy: EconomyConfig::default(),
            crafting: CraftingConfig::default(),
            paddocks: default_paddocks(),
            stations: default_stations(),
            market: MarketConfig::default(),
        }
    }
}

impl HomesteadConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducible timer jitter.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds per tick in the engine loop.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Ticks the engine runs before stopping.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
        }
    }
}

/// Barn storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Maximum total units the barn can hold at startup.
    #[serde(default = "default_capacity")]
    pub capacity: u32,

    /// Units added per purchased barn expansion.
    #[serde(default = "default_expansion_increment")]
    pub expansion_increment: u32,

    /// Coin cost of one barn expansion.
    #[serde(default = "default_expansion_cost")]
    pub expansion_cost: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            expansion_increment: default_expansion_increment(),
            expansion_cost: default_expansion_cost(),
        }
    }
}

/// Coin economy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Coins held at startup.
    #[serde(default = "default_starting_coins")]
    pub starting_coins: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_coins: default_starting_coins(),
        }
    }
}

/// Crafting configuration shared by all stations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CraftingConfig {
    /// Maximum units one slot can stack.
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

impl Default for CraftingConfig {
    fn default() -> Self {
        Self {
            max_stack: default_max_stack(),
        }
    }
}

/// One paddock: a pen of animals or a field of beds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaddockConfig {
    /// Display name ("Chicken Coop").
    pub name: String,
    /// The resource its producers yield.
    pub resource: Resource,
    /// Production interval at level zero, in seconds.
    pub base_interval: f32,
    /// Seconds shaved off per upgrade level.
    #[serde(default = "default_step_reduction")]
    pub step_reduction: f32,
    /// Interval floor in seconds.
    #[serde(default = "default_min_interval")]
    pub min_interval: f32,
    /// Maximum upgrades per producer.
    #[serde(default = "default_max_upgrades")]
    pub max_upgrades: u32,
    /// Coin cost of one producer upgrade.
    #[serde(default = "default_upgrade_cost")]
    pub upgrade_cost: u32,
    /// Jitter half-width applied on timer resets, in seconds.
    #[serde(default)]
    pub jitter: f32,
    /// Producers present at startup.
    #[serde(default = "default_initial_count")]
    pub initial_count: u32,
    /// Hard cap on producers in this paddock.
    #[serde(default = "default_max_count")]
    pub max_count: u32,
    /// Coin cost of adding one producer.
    #[serde(default = "default_expansion_cost_paddock")]
    pub expansion_cost: u32,
}

/// One crafting station.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationConfig {
    /// Display name ("Bakery").
    pub name: String,
    /// Resources accepted in ingredient slots.
    pub allowed: Vec<Resource>,
    /// Number of ingredient slots.
    pub slot_count: usize,
    /// Recipes in priority order (first match wins).
    pub recipes: Vec<RecipeConfig>,
}

/// One recipe inside a station's priority list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipeConfig {
    /// Display name ("Apple Cake").
    pub name: String,
    /// The crafted result.
    pub result: Resource,
    /// Required ingredients.
    pub ingredients: Vec<IngredientConfig>,
}

/// One required ingredient of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientConfig {
    /// The ingredient resource.
    pub resource: Resource,
    /// Units consumed per craft, must be positive.
    pub amount: u32,
}

/// Marketplace configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketConfig {
    /// Coins per unit for each sellable resource.
    #[serde(default = "homestead_world::market::default_prices")]
    pub prices: BTreeMap<Resource, u32>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            prices: homestead_world::market::default_prices(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Homestead".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    250
}

const fn default_max_ticks() -> u64 {
    1200
}

const fn default_capacity() -> u32 {
    50
}

const fn default_expansion_increment() -> u32 {
    25
}

const fn default_expansion_cost() -> u32 {
    20
}

const fn default_starting_coins() -> u32 {
    10
}

const fn default_max_stack() -> u32 {
    10
}

const fn default_step_reduction() -> f32 {
    5.0
}

const fn default_min_interval() -> f32 {
    5.0
}

const fn default_max_upgrades() -> u32 {
    7
}

const fn default_upgrade_cost() -> u32 {
    25
}

const fn default_initial_count() -> u32 {
    2
}

const fn default_max_count() -> u32 {
    10
}

const fn default_expansion_cost_paddock() -> u32 {
    25
}

/// The stock farm: two pens of animals, a wheat field, and three fruit
/// plots. Animal timers carry jitter so the pens drift out of phase; beds
/// grow on exact timers.
fn default_paddocks() -> Vec<PaddockConfig> {
    vec![
        PaddockConfig {
            name: "Chicken Coop".to_owned(),
            resource: Resource::Eggs,
            base_interval: 30.0,
            step_reduction: default_step_reduction(),
            min_interval: default_min_interval(),
            max_upgrades: default_max_upgrades(),
            upgrade_cost: 25,
            jitter: 5.0,
            initial_count: 2,
            max_count: 10,
            expansion_cost: 25,
        },
        PaddockConfig {
            name: "Cow Shed".to_owned(),
            resource: Resource::Milk,
            base_interval: 35.0,
            step_reduction: default_step_reduction(),
            min_interval: default_min_interval(),
            max_upgrades: default_max_upgrades(),
            upgrade_cost: 25,
            jitter: 5.0,
            initial_count: 2,
            max_count: 10,
            expansion_cost: 25,
        },
        PaddockConfig {
            name: "Wheat Field".to_owned(),
            resource: Resource::Wheat,
            base_interval: 40.0,
            step_reduction: default_step_reduction(),
            min_interval: default_min_interval(),
            max_upgrades: default_max_upgrades(),
            upgrade_cost: 15,
            jitter: 0.0,
            initial_count: 2,
            max_count: 8,
            expansion_cost: 15,
        },
        PaddockConfig {
            name: "Apple Orchard".to_owned(),
            resource: Resource::Apple,
            base_interval: 40.0,
            step_reduction: default_step_reduction(),
            min_interval: default_min_interval(),
            max_upgrades: default_max_upgrades(),
            upgrade_cost: 15,
            jitter: 0.0,
            initial_count: 1,
            max_count: 4,
            expansion_cost: 15,
        },
        PaddockConfig {
            name: "Raspberry Patch".to_owned(),
            resource: Resource::Raspberry,
            base_interval: 40.0,
            step_reduction: default_step_reduction(),
            min_interval: default_min_interval(),
            max_upgrades: default_max_upgrades(),
            upgrade_cost: 15,
            jitter: 0.0,
            initial_count: 1,
            max_count: 4,
            expansion_cost: 15,
        },
        PaddockConfig {
            name: "Strawberry Beds".to_owned(),
            resource: Resource::Strawberry,
            base_interval: 40.0,
            step_reduction: default_step_reduction(),
            min_interval: default_min_interval(),
            max_upgrades: default_max_upgrades(),
            upgrade_cost: 15,
            jitter: 0.0,
            initial_count: 1,
            max_count: 4,
            expansion_cost: 15,
        },
    ]
}

/// Shorthand for one ingredient entry.
const fn ing(resource: Resource, amount: u32) -> IngredientConfig {
    IngredientConfig { resource, amount }
}

/// The stock stations. Recipe order is the craft priority: the
/// confectionery lists fruit cakes before plain cake so a loaded fruit is
/// never wasted, and the dairy lists cream (3 milk) before butter (2 milk)
/// so cream stays reachable at all.
fn default_stations() -> Vec<StationConfig> {
    vec![
        StationConfig {
            name: "Bakery".to_owned(),
            allowed: vec![Resource::Wheat, Resource::Eggs],
            slot_count: 2,
            recipes: vec![RecipeConfig {
                name: "Bread".to_owned(),
                result: Resource::Bread,
                ingredients: vec![ing(Resource::Wheat, 1), ing(Resource::Eggs, 1)],
            }],
        },
        StationConfig {
            name: "Dairy".to_owned(),
            allowed: vec![Resource::Milk],
            slot_count: 1,
            recipes: vec![
                RecipeConfig {
                    name: "Cream".to_owned(),
                    result: Resource::Cream,
                    ingredients: vec![ing(Resource::Milk, 3)],
                },
                RecipeConfig {
                    name: "Butter".to_owned(),
                    result: Resource::Butter,
                    ingredients: vec![ing(Resource::Milk, 2)],
                },
            ],
        },
        StationConfig {
            name: "Confectionery".to_owned(),
            allowed: vec![
                Resource::Milk,
                Resource::Bread,
                Resource::Butter,
                Resource::Cream,
                Resource::Apple,
                Resource::Raspberry,
                Resource::Strawberry,
            ],
            slot_count: 4,
            recipes: vec![
                RecipeConfig {
                    name: "Apple Cake".to_owned(),
                    result: Resource::AppleCake,
                    ingredients: vec![
                        ing(Resource::Bread, 1),
                        ing(Resource::Butter, 1),
                        ing(Resource::Cream, 1),
                        ing(Resource::Apple, 1),
                    ],
                },
                RecipeConfig {
                    name: "Raspberry Cake".to_owned(),
                    result: Resource::RaspberryCake,
                    ingredients: vec![
                        ing(Resource::Bread, 1),
                        ing(Resource::Butter, 1),
                        ing(Resource::Cream, 1),
                        ing(Resource::Raspberry, 1),
                    ],
                },
                RecipeConfig {
                    name: "Strawberry Cake".to_owned(),
                    result: Resource::StrawberryCake,
                    ingredients: vec![
                        ing(Resource::Bread, 1),
                        ing(Resource::Butter, 1),
                        ing(Resource::Cream, 1),
                        ing(Resource::Strawberry, 1),
                    ],
                },
                RecipeConfig {
                    name: "Cake".to_owned(),
                    result: Resource::Cake,
                    ingredients: vec![
                        ing(Resource::Bread, 1),
                        ing(Resource::Butter, 1),
                        ing(Resource::Cream, 1),
                    ],
                },
                RecipeConfig {
                    name: "Cupcake".to_owned(),
                    result: Resource::Cupcake,
                    ingredients: vec![ing(Resource::Bread, 1), ing(Resource::Cream, 1)],
                },
                RecipeConfig {
                    name: "Bun".to_owned(),
                    result: Resource::Bun,
                    ingredients: vec![ing(Resource::Bread, 1), ing(Resource::Butter, 1)],
                },
            ],
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_playable() {
        let config = HomesteadConfig::default();
        assert_eq!(config.storage.capacity, 50);
        assert_eq!(config.economy.starting_coins, 10);
        assert_eq!(config.crafting.max_stack, 10);
        assert_eq!(config.paddocks.len(), 6);
        assert_eq!(config.stations.len(), 3);
        assert_eq!(config.market.prices.len(), 6);
    }

    #[test]
    fn every_crafted_sellable_has_a_recipe() {
        let config = HomesteadConfig::default();
        let crafted: Vec<Resource> = config
            .stations
            .iter()
            .flat_map(|s| s.recipes.iter().map(|r| r.result))
            .collect();
        for sellable in config.market.prices.keys() {
            assert!(
                crafted.contains(sellable),
                "{sellable:?} is priced but no recipe produces it"
            );
        }
    }

    #[test]
    fn every_recipe_ingredient_is_producible_or_craftable() {
        let config = HomesteadConfig::default();
        let produced: Vec<Resource> = config.paddocks.iter().map(|p| p.resource).collect();
        let crafted: Vec<Resource> = config
            .stations
            .iter()
            .flat_map(|s| s.recipes.iter().map(|r| r.result))
            .collect();
        for station in &config.stations {
            for recipe in &station.recipes {
                for ingredient in &recipe.ingredients {
                    assert!(
                        produced.contains(&ingredient.resource)
                            || crafted.contains(&ingredient.resource),
                        "recipe '{}' needs {:?}, which nothing yields",
                        recipe.name,
                        ingredient.resource
                    );
                }
            }
        }
    }

    #[test]
    fn parse_partial_yaml_keeps_defaults() {
        let config = HomesteadConfig::parse(
            "world:\n  seed: 7\nstorage:\n  capacity: 80\n",
        )
        .unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.storage.capacity, 80);
        // Untouched sections keep their defaults.
        assert_eq!(config.world.name, "Homestead");
        assert_eq!(config.storage.expansion_increment, 25);
        assert_eq!(config.paddocks.len(), 6);
    }

    #[test]
    fn parse_custom_paddock() {
        let yaml = r"
paddocks:
  - name: Goat Pen
    resource: Milk
    base_interval: 20.0
    initial_count: 1
";
        let config = HomesteadConfig::parse(yaml).unwrap();
        assert_eq!(config.paddocks.len(), 1);
        let paddock = config.paddocks.first().unwrap();
        assert_eq!(paddock.name, "Goat Pen");
        assert_eq!(paddock.resource, Resource::Milk);
        // Unspecified fields fall back to defaults.
        assert_eq!(paddock.max_upgrades, 7);
        assert_eq!(paddock.expansion_cost, 25);
    }

    #[test]
    fn parse_rejects_malformed_yaml() {
        assert!(HomesteadConfig::parse("world: [not a map").is_err());
    }

    #[test]
    fn parse_rejects_unknown_resource() {
        assert!(HomesteadConfig::parse(
            "market:\n  prices:\n    Diamond: 100\n"
        )
        .is_err());
    }
}
