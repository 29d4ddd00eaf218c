#![allow(dead_code)]

use std::{collections::BTreeMap, time::Duration};

use holdout_core::{
    ActorId, ActorKind, Archetype, BossCommand, BossObservation, GameHost, HostError,
    HudSnapshot, LootContainer, LootRange, PlayerId, PlayerSnapshot, Position, RewardLine,
    ScoreboardRow, SessionConfig, SpawnTemplate, StatBlock, WaveDefinition,
};
use holdout_session::{query, Session};

pub const SPAWN: Position = Position::new(315.631, 3.77, -386.8645);

/// Recording stand-in for the game server.
#[derive(Default)]
pub struct FakeHost {
    pub players: BTreeMap<PlayerId, PlayerSnapshot>,
    pub actors: BTreeMap<ActorId, Archetype>,
    pub created: Vec<(ActorId, String)>,
    pub spawn_points: Vec<(ActorId, Position)>,
    pub destroyed: Vec<ActorId>,
    pub grants: Vec<(PlayerId, String, u32)>,
    pub teleports: Vec<(PlayerId, Position)>,
    pub inventory_resets: Vec<PlayerId>,
    pub health_resets: Vec<PlayerId>,
    pub kits: Vec<(PlayerId, String)>,
    pub destinations: Vec<(ActorId, Position)>,
    pub boss_commands: Vec<BossCommand>,
    pub containers: Vec<LootContainer>,
    pub huds: Vec<(PlayerId, HudSnapshot)>,
    pub scoreboards: Vec<Vec<ScoreboardRow>>,
    pub boss_sensors: Option<BossObservation>,
    pub refuse_creation: bool,
    next_actor: u64,
}

impl FakeHost {
    pub fn with_players(ids: &[u64]) -> Self {
        let mut host = Self::default();
        for &id in ids {
            host.join(id);
        }
        host
    }

    pub fn join(&mut self, id: u64) {
        let _ = self.players.insert(
            PlayerId::new(id),
            PlayerSnapshot {
                display_name: format!("survivor-{id}"),
                position: home_of(id),
            },
        );
    }

    pub fn position_of(&self, id: u64) -> Position {
        self.players[&PlayerId::new(id)].position
    }

    pub fn live_actors(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    pub fn kill(&mut self, actor: ActorId) {
        let _ = self.actors.remove(&actor);
    }
}

impl GameHost for FakeHost {
    fn describe_player(&self, player: PlayerId) -> Option<PlayerSnapshot> {
        self.players.get(&player).cloned()
    }

    fn create_actor(
        &mut self,
        archetype: &Archetype,
        location: Position,
        _stats: &StatBlock,
    ) -> Result<ActorId, HostError> {
        if self.refuse_creation {
            return Err(HostError::ActorCreation {
                prefab: archetype.prefab.clone(),
                reason: "refused by test".to_owned(),
            });
        }
        self.next_actor += 1;
        let actor = ActorId::new(self.next_actor);
        let _ = self.actors.insert(actor, archetype.clone());
        self.created.push((actor, archetype.display_name.clone()));
        self.spawn_points.push((actor, location));
        Ok(actor)
    }

    fn destroy_actor(&mut self, actor: ActorId) {
        if self.actors.remove(&actor).is_some() {
            self.destroyed.push(actor);
        }
    }

    fn grant_reward(
        &mut self,
        player: PlayerId,
        item: &str,
        amount: u32,
        _skin: Option<u64>,
    ) -> Result<(), HostError> {
        self.grants.push((player, item.to_owned(), amount));
        Ok(())
    }

    fn teleport(&mut self, player: PlayerId, location: Position) {
        if let Some(snapshot) = self.players.get_mut(&player) {
            snapshot.position = location;
        }
        self.teleports.push((player, location));
    }

    fn reset_inventory(&mut self, player: PlayerId) {
        self.inventory_resets.push(player);
    }

    fn reset_health(&mut self, player: PlayerId) {
        self.health_resets.push(player);
    }

    fn equip_kit(&mut self, player: PlayerId, kit: &str) {
        self.kits.push((player, kit.to_owned()));
    }

    fn set_actor_destination(&mut self, actor: ActorId, destination: Position) {
        self.destinations.push((actor, destination));
    }

    fn observe_boss(&self, actor: ActorId) -> Option<BossObservation> {
        if self.actors.contains_key(&actor) {
            self.boss_sensors.clone()
        } else {
            None
        }
    }

    fn command_boss(&mut self, _actor: ActorId, command: &BossCommand) {
        self.boss_commands.push(*command);
    }

    fn spawn_loot_container(&mut self, container: &LootContainer) -> Result<(), HostError> {
        self.containers.push(*container);
        Ok(())
    }

    fn display_hud(&mut self, player: PlayerId, hud: &HudSnapshot) {
        self.huds.push((player, hud.clone()));
    }

    fn display_scoreboard(&mut self, _audience: &[PlayerId], rows: &[ScoreboardRow]) {
        self.scoreboards.push(rows.to_vec());
    }
}

pub fn home_of(id: u64) -> Position {
    Position::new(id as f32 * 10.0, 2.0, -(id as f32))
}

pub fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

pub fn melee(display_name: &str, per_player: f32, loot: (u32, u32)) -> SpawnTemplate {
    SpawnTemplate {
        archetype: Archetype {
            kind: ActorKind::Melee,
            prefab: "assets/prefabs/npc/murderer/murderer.prefab".to_owned(),
            display_name: display_name.to_owned(),
            kit: None,
        },
        per_player,
        stats: StatBlock::with_health(30.0),
        loot: LootRange::new(loot.0, loot.1),
        locations: vec![Position::new(360.0, 1.0, -404.0), Position::new(330.0, 1.0, -411.0)],
        special: None,
    }
}

pub fn wave(countdown: u64, ceiling: u32, templates: Vec<SpawnTemplate>) -> WaveDefinition {
    WaveDefinition {
        countdown: secs(countdown),
        ceiling,
        templates,
        rewards: vec![RewardLine::new("largemedkit", 1), RewardLine::new("scrap", 25)],
    }
}

pub fn session(waves: Vec<WaveDefinition>) -> Session {
    Session::from_waves(SessionConfig::default(), waves).expect("valid session")
}

pub fn admit_all(session: &mut Session, host: &mut FakeHost, ids: &[u64]) {
    let mut events = Vec::new();
    for &id in ids {
        assert!(session.add_player(PlayerId::new(id), host, &mut events));
    }
}

/// Ticks once per second from `from` to `to` inclusive.
pub fn tick_range(
    session: &mut Session,
    host: &mut FakeHost,
    from: u64,
    to: u64,
    events: &mut Vec<holdout_core::Event>,
) {
    for second in from..=to {
        session.tick(secs(second), host, events);
    }
}

/// Ticks once per second from `from` until a wave has been admitted,
/// returning the second of the admission tick.
pub fn fight(
    session: &mut Session,
    host: &mut FakeHost,
    from: u64,
    events: &mut Vec<holdout_core::Event>,
) -> u64 {
    for second in from..from + 600 {
        session.tick(secs(second), host, events);
        if query::state(session).is_fighting() && query::waiting_since(session).is_some() {
            return second;
        }
    }
    panic!("wave never started");
}
