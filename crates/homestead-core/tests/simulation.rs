//! End-to-end simulation tests: the full producer -> barn -> craft -> sell
//! loop driven through the public [`Farmstead`] interface, the way a
//! presentation layer would drive it.

#![allow(clippy::unwrap_used, clippy::panic)]

use homestead_core::{Farmstead, FarmsteadError, HomesteadConfig};
use homestead_ledger::LedgerError;
use homestead_types::{PaddockId, Resource, StationId};
use homestead_world::ProducerState;

/// The stock config with jitter zeroed so every timer is exact.
fn deterministic_config() -> HomesteadConfig {
    let mut config = HomesteadConfig::default();
    for paddock in &mut config.paddocks {
        paddock.jitter = 0.0;
    }
    config
}

fn station_named(farm: &Farmstead, name: &str) -> StationId {
    *farm
        .stations()
        .find(|(_, station)| station.name() == name)
        .map(|(id, _)| id)
        .unwrap()
}

fn paddock_for(farm: &Farmstead, resource: Resource) -> PaddockId {
    *farm
        .paddocks()
        .find(|(_, paddock)| paddock.resource() == resource)
        .map(|(id, _)| id)
        .unwrap()
}

/// Tick the farm in 5-second steps, collecting everything that becomes
/// ready, until the barn holds at least the wanted counts (or the step
/// budget runs out).
fn produce_until(farm: &mut Farmstead, wanted: &[(Resource, u32)], max_steps: u32) {
    for _ in 0..max_steps {
        if wanted
            .iter()
            .all(|(resource, count)| farm.ledger().count(*resource) >= *count)
        {
            return;
        }
        let summary = farm.tick(5.0).unwrap();
        for ready in summary.ready {
            // Only collect what the scenario needs; leave the rest waiting
            // so the barn does not fill with fruit.
            if wanted.iter().any(|(resource, _)| *resource == ready.resource) {
                farm.collect(ready.paddock, ready.producer).unwrap();
            }
        }
        // Capacity invariant: never exceeded, no matter the schedule.
        assert!(farm.ledger().total() <= farm.ledger().capacity());
    }
    panic!("production goal not reached within the step budget");
}

#[test]
fn apple_cake_from_soil_to_sale() {
    let mut farm = Farmstead::from_config(&deterministic_config()).unwrap();
    let bakery = station_named(&farm, "Bakery");
    let dairy = station_named(&farm, "Dairy");
    let confectionery = station_named(&farm, "Confectionery");

    // An apple cake needs bread (1 wheat + 1 egg), butter (2 milk),
    // cream (3 milk), and an apple.
    produce_until(
        &mut farm,
        &[
            (Resource::Wheat, 1),
            (Resource::Eggs, 1),
            (Resource::Milk, 5),
            (Resource::Apple, 1),
        ],
        200,
    );

    // Bread.
    farm.load_station_slot(bakery, 0, Resource::Wheat, 1).unwrap();
    farm.load_station_slot(bakery, 1, Resource::Eggs, 1).unwrap();
    assert_eq!(farm.craft(bakery).unwrap().result, Resource::Bread);
    farm.collect_station_result(bakery).unwrap();

    // Cream first (3 milk beats butter's 2 in priority), then butter.
    farm.load_station_slot(dairy, 0, Resource::Milk, 3).unwrap();
    assert_eq!(farm.craft(dairy).unwrap().result, Resource::Cream);
    farm.collect_station_result(dairy).unwrap();
    farm.load_station_slot(dairy, 0, Resource::Milk, 2).unwrap();
    assert_eq!(farm.craft(dairy).unwrap().result, Resource::Butter);
    farm.collect_station_result(dairy).unwrap();

    // Apple cake: the fruit recipe outranks plain cake, so the loaded
    // apple is never wasted.
    farm.load_station_slot(confectionery, 0, Resource::Bread, 1).unwrap();
    farm.load_station_slot(confectionery, 1, Resource::Butter, 1).unwrap();
    farm.load_station_slot(confectionery, 2, Resource::Cream, 1).unwrap();
    farm.load_station_slot(confectionery, 3, Resource::Apple, 1).unwrap();
    let outcome = farm.craft(confectionery).unwrap();
    assert_eq!(outcome.recipe, "Apple Cake");
    assert_eq!(outcome.result, Resource::AppleCake);
    farm.collect_station_result(confectionery).unwrap();

    // Sell it: 50 coins on top of the starting 10.
    let coins = farm.sell(Resource::AppleCake, 1).unwrap();
    assert_eq!(coins, 50);
    assert_eq!(farm.coins(), 60);

    // Spend the proceeds: one hen upgrade and one more hen.
    let coop = paddock_for(&farm, Resource::Eggs);
    let hen = *farm
        .paddock(coop)
        .unwrap()
        .producers()
        .next()
        .map(|(id, _)| id)
        .unwrap();
    farm.upgrade_producer(coop, hen).unwrap();
    farm.expand_paddock(coop).unwrap();
    assert_eq!(farm.coins(), 10);
    assert_eq!(farm.paddock(coop).unwrap().producer_count(), 3);
}

#[test]
fn overfull_barn_blocks_collection_until_expanded() {
    let mut config = deterministic_config();
    config.storage.capacity = 4;
    config.economy.starting_coins = 20;
    let mut farm = Farmstead::from_config(&config).unwrap();
    let coop = paddock_for(&farm, Resource::Eggs);

    // Two cycles of two hens fill the 4-unit barn.
    for _ in 0..2 {
        let summary = farm.tick(30.0).unwrap();
        for ready in summary.ready {
            if ready.resource == Resource::Eggs {
                farm.collect(ready.paddock, ready.producer).unwrap();
            }
        }
    }
    assert_eq!(farm.ledger().count(Resource::Eggs), 4);

    // A third cycle cannot be collected.
    let summary = farm.tick(30.0).unwrap();
    let blocked = summary
        .ready
        .iter()
        .find(|r| r.resource == Resource::Eggs)
        .copied()
        .unwrap();
    assert!(matches!(
        farm.collect(blocked.paddock, blocked.producer),
        Err(FarmsteadError::Ledger {
            source: LedgerError::CapacityExceeded { .. }
        })
    ));
    let held = farm
        .paddock(coop)
        .unwrap()
        .producer(blocked.producer)
        .unwrap();
    assert_eq!(held.state(), ProducerState::Ready);

    // Buying a barn expansion unblocks the same collection.
    farm.expand_storage().unwrap();
    assert_eq!(
        farm.collect(blocked.paddock, blocked.producer).unwrap(),
        Some(Resource::Eggs)
    );
    assert_eq!(farm.ledger().count(Resource::Eggs), 5);
}

#[test]
fn sale_failures_never_move_anything() {
    let mut farm = Farmstead::from_config(&deterministic_config()).unwrap();

    // Nothing in stock: selling 5 cakes fails outright.
    assert!(farm.sell(Resource::Cake, 5).is_err());
    assert_eq!(farm.coins(), 10);
    assert_eq!(farm.ledger().total(), 0);

    // Raw goods are never sellable, stocked or not.
    produce_until(&mut farm, &[(Resource::Wheat, 2)], 40);
    assert!(farm.sell(Resource::Wheat, 1).is_err());
    assert_eq!(farm.ledger().count(Resource::Wheat), 2);
    assert_eq!(farm.coins(), 10);
}
