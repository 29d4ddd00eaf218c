use holdout_core::{ActorId, ActorKind, PlayerId, Position, StatBlock};
use holdout_system_pursuit::{resolve_ranged_hit, retarget, HitResolution};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn marksman(accuracy: f32) -> StatBlock {
    StatBlock {
        health: 40.0,
        damage: 0.25,
        accuracy,
    }
}

#[test]
fn pursuers_chase_listed_players_and_heavies_are_skipped() {
    let players = [
        (PlayerId::new(1), Position::new(10.0, 0.0, 0.0)),
        (PlayerId::new(2), Position::new(-10.0, 0.0, 0.0)),
    ];
    let pursuers = [
        (ActorId::new(1), ActorKind::Melee),
        (ActorId::new(2), ActorKind::Heavy),
        (ActorId::new(3), ActorKind::Ranged),
    ];
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let mut orders = Vec::new();

    retarget(pursuers, &players, &mut rng, &mut orders);

    let actors: Vec<ActorId> = orders.iter().map(|order| order.actor).collect();
    assert_eq!(actors, vec![ActorId::new(1), ActorId::new(3)]);
    for order in &orders {
        assert!(players.contains(&(order.player, order.destination)));
    }
}

#[test]
fn only_ranged_units_are_overridden() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert_eq!(
        resolve_ranged_hit(ActorKind::Melee, &marksman(0.0), 5.0, &mut rng),
        HitResolution::Unmodified
    );
    assert_eq!(
        resolve_ranged_hit(ActorKind::Heavy, &marksman(0.0), 5.0, &mut rng),
        HitResolution::Unmodified
    );
}

#[test]
fn close_range_accuracy_is_used_as_is() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    for _ in 0..200 {
        assert_eq!(
            resolve_ranged_hit(ActorKind::Ranged, &marksman(100.0), 60.0, &mut rng),
            HitResolution::Hit { damage_scale: 0.25 }
        );
        assert_eq!(
            resolve_ranged_hit(ActorKind::Ranged, &marksman(0.0), 60.0, &mut rng),
            HitResolution::Miss
        );
    }
}

#[test]
fn long_range_attenuates_accuracy_and_damage() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut hits = 0;
    let mut misses = 0;
    for _ in 0..500 {
        match resolve_ranged_hit(ActorKind::Ranged, &marksman(100.0), 200.0, &mut rng) {
            HitResolution::Hit { damage_scale } => {
                assert!((damage_scale - 0.125).abs() < f32::EPSILON);
                hits += 1;
            }
            HitResolution::Miss => misses += 1,
            HitResolution::Unmodified => panic!("ranged hits are always resolved"),
        }
    }
    assert!(hits > 150, "hits {hits}");
    assert!(misses > 150, "misses {misses}");
}
