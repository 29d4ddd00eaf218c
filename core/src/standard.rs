//! The stock eight-wave catalog of the Holdout arena.

use std::time::Duration;

use crate::{
    ActorKind, Archetype, BossProfile, DamageScaling, LootRange, Position, RewardLine,
    SpawnTemplate, SpecialPhase, StatBlock, WaveCatalog, WaveDefinition, Waypoint, WeaponProfile,
};

const MURDERER_PREFAB: &str = "assets/prefabs/npc/murderer/murderer.prefab";
const SCIENTIST_PREFAB: &str = "assets/prefabs/npc/scientist/scientist.prefab";
const TANK_PREFAB: &str = "assets/prefabs/npc/m2bradley/bradleyapc.prefab";

const RANGED_DAMAGE: f32 = 0.25;
const LOOT_CONTAINERS: u32 = 10;

const SPAWN_LOCATIONS: [Position; 14] = [
    Position::new(359.9564, 1.098177, -404.7091),
    Position::new(329.6436, 1.007179, -411.355),
    Position::new(274.4064, 1.068121, -427.4938),
    Position::new(318.4145, 0.8991073, -500.3196),
    Position::new(312.2376, 0.894487, -507.4466),
    Position::new(369.9795, 0.910639, -501.6995),
    Position::new(362.4135, 1.051751, -505.571),
    Position::new(412.4794, 1.06821, -453.4566),
    Position::new(347.7139, 1.00712, -449.9561),
    Position::new(341.8737, 1.007139, -422.9041),
    Position::new(385.5122, 0.8629131, -404.7485),
    Position::new(274.6686, 1.007311, -450.486),
    Position::new(376.128, 1.007181, -446.6971),
    Position::new(355.1196, 1.007139, -465.9691),
];

const TANK_SPAWN: Position = Position::new(316.0925, 0.91057, -505.0217);

impl WaveCatalog {
    /// Stock catalog: six infantry waves, a tank boss, and a final infantry wave.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_trusted(vec![
            wave(
                30,
                10,
                vec![
                    melee("Attack Zombie", "ZombieMelee", 2.0, 30.0, (2, 7)),
                    melee("Attack Zombie", "ZombieMelee2", 2.0, 30.0, (2, 7)),
                    melee("Attack Zombie", "ZombieBasicSword", 2.0, 30.0, (2, 7)),
                ],
                vec![RewardLine::new("crossbow", 1).with_skin(856_029_421)],
            ),
            wave(
                30,
                10,
                vec![
                    melee("Elite Attack Zombie", "ZombieChainsaw", 4.0, 50.0, (10, 15)),
                    melee("Eoka Zombie", "ZombieEoka", 3.0, 40.0, (3, 15)),
                    melee("Miner Zombie", "ZombieMiner", 4.0, 40.0, (10, 15)),
                ],
                vec![
                    RewardLine::new("pistol.revolver", 1).with_skin(809_865_395),
                    RewardLine::new("largemedkit", 1),
                ],
            ),
            wave(
                30,
                10,
                vec![
                    ranged("Shotgun Zombie", "ZombieShotgunBasic", 5.0, 40.0, 50.0, (10, 13)),
                    melee("Attack Zombie", "ZombieMelee2", 2.0, 10.0, (1, 5)),
                    melee("Elite Attack Zombie", "ZombieChainsaw", 2.0, 50.0, (10, 15)),
                    melee("Eoka Zombie", "ZombieEoka", 1.0, 40.0, (3, 15)),
                    melee("Miner Zombie", "ZombieMiner", 2.0, 40.0, (10, 15)),
                ],
                vec![RewardLine::new("ammo.pistol", 30)],
            ),
            wave(
                30,
                10,
                vec![
                    ranged("Shotgun Zombie", "ZombieShotgunBasic", 5.0, 40.0, 50.0, (10, 13)),
                    ranged("Pistol Zombie", "ZombieGunBasic", 5.0, 30.0, 12.0, (10, 13)),
                ],
                vec![
                    RewardLine::new("shotgun.waterpipe", 1).with_skin(832_764_933),
                    RewardLine::new("ammo.handmade.shell", 4),
                ],
            ),
            wave(
                30,
                6,
                vec![
                    ranged("Zombie Sniper", "ZombieSniper", 5.0, 20.0, 50.0, (10, 15)),
                    ranged("Hulk Zombie", "ZombieHulk", 1.0, 125.0, 33.0, (18, 42)),
                ],
                vec![
                    RewardLine::new("weapon.mod.simplesight", 1),
                    RewardLine::new("syringe.medical", 2),
                ],
            ),
            wave(
                30,
                5,
                vec![
                    ranged("Gunner Zombie", "ZombieSmg", 6.0, 25.0, 20.0, (10, 15)),
                    ranged("Hulk Zombie", "ZombieHulk", 2.0, 125.0, 33.0, (18, 42)),
                ],
                Vec::new(),
            ),
            wave(10, 1, vec![tank_boss()], Vec::new()),
            wave(
                60,
                10,
                vec![
                    ranged("Gunner Zombie", "ZombieSmg", 6.0, 60.0, 20.0, (10, 15)),
                    ranged("Zombie Sniper", "ZombieSniper", 6.0, 35.0, 50.0, (10, 15)),
                    melee("Eoka Zombie", "ZombieEoka", 10.0, 40.0, (3, 4)),
                ],
                Vec::new(),
            ),
        ])
    }
}

fn wave(
    countdown_secs: u64,
    ceiling: u32,
    templates: Vec<SpawnTemplate>,
    rewards: Vec<RewardLine>,
) -> WaveDefinition {
    WaveDefinition {
        countdown: Duration::from_secs(countdown_secs),
        ceiling,
        templates,
        rewards,
    }
}

fn melee(name: &str, kit: &str, per_player: f32, health: f32, loot: (u32, u32)) -> SpawnTemplate {
    SpawnTemplate {
        archetype: Archetype {
            kind: ActorKind::Melee,
            prefab: MURDERER_PREFAB.to_owned(),
            display_name: name.to_owned(),
            kit: Some(kit.to_owned()),
        },
        per_player,
        stats: StatBlock::with_health(health),
        loot: LootRange::new(loot.0, loot.1),
        locations: SPAWN_LOCATIONS.to_vec(),
        special: None,
    }
}

fn ranged(
    name: &str,
    kit: &str,
    per_player: f32,
    health: f32,
    accuracy: f32,
    loot: (u32, u32),
) -> SpawnTemplate {
    SpawnTemplate {
        archetype: Archetype {
            kind: ActorKind::Ranged,
            prefab: SCIENTIST_PREFAB.to_owned(),
            display_name: name.to_owned(),
            kit: Some(kit.to_owned()),
        },
        per_player,
        stats: StatBlock {
            health,
            damage: RANGED_DAMAGE,
            accuracy,
        },
        loot: LootRange::new(loot.0, loot.1),
        locations: SPAWN_LOCATIONS.to_vec(),
        special: None,
    }
}

fn tank_boss() -> SpawnTemplate {
    SpawnTemplate {
        archetype: Archetype {
            kind: ActorKind::Heavy,
            prefab: TANK_PREFAB.to_owned(),
            display_name: "Zombie Tank".to_owned(),
            kit: None,
        },
        per_player: 1.0,
        stats: StatBlock::with_health(135.0),
        loot: LootRange::new(12, 24),
        locations: vec![TANK_SPAWN],
        special: Some(SpecialPhase::Boss(tank_profile())),
    }
}

fn tank_profile() -> BossProfile {
    BossProfile {
        patrol: tank_route(),
        rapid: WeaponProfile {
            burst: 8,
            fire_interval: Duration::from_micros(66_670),
            cooldown: Duration::from_secs(5),
            min_range: 0.0,
            max_range: Some(40.0),
        },
        heavy: WeaponProfile {
            burst: 1,
            fire_interval: Duration::from_millis(250),
            cooldown: Duration::from_secs(3),
            min_range: 7.0,
            max_range: None,
        },
        aim_tolerance: 0.99,
        turn_rate: 2.094_395_2,
        damage_scaling: DamageScaling {
            melee: 10.0,
            ranged: 1_000.0,
        },
        loot_containers: LOOT_CONTAINERS,
    }
}

// Loops back to the first turning once the far gate is reached.
fn tank_route() -> Vec<Waypoint> {
    vec![
        Waypoint::at(Position::new(316.077, 0.909_399_2, -473.2338)),
        Waypoint::at(Position::new(323.5825, 1.008629, -471.2044)),
        Waypoint::at(Position::new(323.395, 1.09708, -462.1819)),
        Waypoint::at(Position::new(316.0526, 0.907_167_1, -447.1352)),
        Waypoint::at(Position::new(335.4796, 1.088596, -446.8645)),
        Waypoint::at(Position::new(341.1654, 1.096403, -436.6854)),
        Waypoint::at(Position::new(352.08249, 0.899_504_8, -438.5835)),
        Waypoint::at(Position::new(365.126, 0.901_778_1, -450.3417)),
        Waypoint::at(Position::new(367.0446, 0.910_098_1, -472.2078)),
        Waypoint::looping_to(Position::new(317.7645, 0.901_511_6, -460.0943), 3),
    ]
}
