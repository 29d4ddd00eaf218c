use std::time::Duration;

use holdout_core::{
    ActorId, ActorKind, Archetype, Event, HostError, LootRange, Position, SpawnTemplate,
    StatBlock, WaveCatalog, WaveDefinition, WaveIndex,
};
use holdout_system_spawning::{SpawnRequest, SpawnThrottle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn template(display_name: &str, per_player: f32) -> SpawnTemplate {
    SpawnTemplate {
        archetype: Archetype {
            kind: ActorKind::Melee,
            prefab: "murderer".to_owned(),
            display_name: display_name.to_owned(),
            kit: None,
        },
        per_player,
        stats: StatBlock::with_health(30.0),
        loot: LootRange::new(2, 7),
        locations: vec![Position::new(1.0, 0.0, 1.0), Position::new(2.0, 0.0, 2.0)],
        special: None,
    }
}

fn wave(ceiling: u32, templates: Vec<SpawnTemplate>) -> WaveDefinition {
    WaveDefinition {
        countdown: Duration::from_secs(30),
        ceiling,
        templates,
        rewards: Vec::new(),
    }
}

/// Hands out sequential handles and remembers what was created.
#[derive(Default)]
struct Factory {
    next: u64,
    created: Vec<(ActorId, String)>,
}

impl Factory {
    fn create(&mut self, request: &SpawnRequest) -> Result<ActorId, HostError> {
        self.next += 1;
        let actor = ActorId::new(self.next);
        self.created.push((actor, request.archetype.display_name.clone()));
        Ok(actor)
    }
}

#[test]
fn ceiling_defers_overflow_into_backlog() {
    let mut throttle = SpawnThrottle::new();
    let mut factory = Factory::default();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut events = Vec::new();

    throttle.admit_wave(
        WaveIndex::FIRST,
        &wave(3, vec![template("Attack Zombie", 2.0)]),
        2,
        &mut rng,
        |request| factory.create(request),
        &mut events,
    );

    assert_eq!(throttle.live_count(), 3);
    assert_eq!(throttle.backlog_len(), 1);
    assert_eq!(
        events.last(),
        Some(&Event::WaveAdmitted {
            wave: WaveIndex::FIRST,
            requested: 4,
            spawned: 3,
            deferred: 1,
        })
    );

    let (first, _) = factory.created[0].clone();
    assert!(throttle.remove(first).is_some());
    assert_eq!(throttle.live_count(), 2);

    events.clear();
    throttle.drain_backlog(|request| factory.create(request), &mut events);
    assert_eq!(throttle.live_count(), 3);
    assert_eq!(throttle.backlog_len(), 0);
    assert!(matches!(events.as_slice(), [Event::ActorSpawned { .. }]));
}

#[test]
fn backlog_drains_in_admission_order() {
    let mut throttle = SpawnThrottle::new();
    let mut factory = Factory::default();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut events = Vec::new();

    throttle.admit_wave(
        WaveIndex::FIRST,
        &wave(
            1,
            vec![
                template("first", 1.0),
                template("second", 1.0),
                template("third", 1.0),
            ],
        ),
        1,
        &mut rng,
        |request| factory.create(request),
        &mut events,
    );
    assert_eq!(throttle.backlog_len(), 2);

    for _ in 0..2 {
        let (live, _) = factory.created.last().cloned().expect("live actor");
        assert!(throttle.remove(live).is_some());
        throttle.drain_backlog(|request| factory.create(request), &mut events);
        assert!(throttle.live_count() <= throttle.ceiling() as usize);
    }

    let order: Vec<&str> = factory
        .created
        .iter()
        .map(|(_, name)| name.as_str())
        .collect();
    assert_eq!(order, ["first", "second", "third"]);
}

#[test]
fn host_failure_drops_the_unit_without_blocking() {
    let mut throttle = SpawnThrottle::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut events = Vec::new();
    let mut attempts = 0u64;

    throttle.admit_wave(
        WaveIndex::FIRST,
        &wave(5, vec![template("Attack Zombie", 3.0)]),
        1,
        &mut rng,
        |request| {
            attempts += 1;
            if attempts == 2 {
                Err(HostError::ActorCreation {
                    prefab: request.archetype.prefab.clone(),
                    reason: "navmesh unavailable".to_owned(),
                })
            } else {
                Ok(ActorId::new(attempts))
            }
        },
        &mut events,
    );

    assert_eq!(attempts, 3);
    assert_eq!(throttle.live_count(), 2);
    assert_eq!(throttle.backlog_len(), 0);
    assert!(events.contains(&Event::SpawnDropped {
        prefab: "murderer".to_owned(),
    }));
}

#[test]
fn special_templates_are_left_to_the_caller() {
    let catalog = WaveCatalog::standard();
    let boss_wave = WaveIndex::new(6);
    let definition = catalog.wave(boss_wave).expect("boss wave");
    let mut throttle = SpawnThrottle::new();
    let mut factory = Factory::default();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut events = Vec::new();

    throttle.admit_wave(
        boss_wave,
        definition,
        3,
        &mut rng,
        |request| factory.create(request),
        &mut events,
    );

    assert!(factory.created.is_empty());
    assert!(throttle.is_clear());
    assert_eq!(throttle.ceiling(), 1);
}

#[test]
fn over_ceiling_registry_holds_the_backlog() {
    let mut throttle = SpawnThrottle::new();
    let mut factory = Factory::default();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut events = Vec::new();

    throttle.admit_wave(
        WaveIndex::FIRST,
        &wave(4, vec![template("Attack Zombie", 4.0)]),
        1,
        &mut rng,
        |request| factory.create(request),
        &mut events,
    );
    throttle.admit_wave(
        WaveIndex::new(1),
        &wave(2, vec![template("Attack Zombie", 1.0)]),
        1,
        &mut rng,
        |request| factory.create(request),
        &mut events,
    );
    assert_eq!(throttle.live_count(), 4);
    assert_eq!(throttle.backlog_len(), 1);

    let (removed, _) = factory.created[0].clone();
    assert!(throttle.remove(removed).is_some());
    throttle.drain_backlog(|request| factory.create(request), &mut events);
    assert_eq!(throttle.live_count(), 3);
    assert_eq!(throttle.backlog_len(), 1);
}

#[test]
fn clear_returns_live_handles_and_drops_backlog() {
    let mut throttle = SpawnThrottle::new();
    let mut factory = Factory::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();

    throttle.admit_wave(
        WaveIndex::FIRST,
        &wave(2, vec![template("Attack Zombie", 5.0)]),
        1,
        &mut rng,
        |request| factory.create(request),
        &mut events,
    );

    let handles = throttle.clear();
    assert_eq!(handles, vec![ActorId::new(1), ActorId::new(2)]);
    assert!(throttle.is_clear());
    assert_eq!(throttle.remove(ActorId::new(1)), None);
}
