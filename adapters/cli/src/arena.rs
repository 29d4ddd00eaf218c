//! In-process stand-in for the game server used by the headless simulation.

use std::{collections::BTreeMap, time::Duration};

use holdout_core::{
    ActorId, ActorKind, Archetype, BossCommand, BossObservation, Command, DamageKind, GameHost,
    HostError, HudSnapshot, LootContainer, PlayerId, PlayerSnapshot, Position, ScoreboardRow,
    StatBlock, TargetCandidate, TargetRef, WeaponChannel,
};
use rand::{seq::IteratorRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

const BOSS_SPEED: f32 = 6.0;
const STOPPING_DISTANCE: f32 = 2.0;
const RESPAWN_DELAY: Duration = Duration::from_secs(5);
const RANGED_DAMAGE_PER_PLAYER: f32 = 0.02;

/// Probabilities that drive simulated combat once per second.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Skirmish {
    /// Chance that a standing player kills a unit.
    pub(crate) lethality: f64,
    /// Chance that a live unit downs a standing player.
    pub(crate) threat: f64,
}

#[derive(Clone, Debug)]
struct SimActor {
    kind: ActorKind,
    position: Position,
    destination: Option<Position>,
}

#[derive(Clone, Debug)]
struct SimPlayer {
    snapshot: PlayerSnapshot,
    downed_at: Option<Duration>,
}

/// Simulated world that realises session requests and produces host reports.
#[derive(Debug)]
pub(crate) struct Arena {
    players: BTreeMap<PlayerId, SimPlayer>,
    actors: BTreeMap<ActorId, SimActor>,
    next_actor: u64,
    reports: Vec<Command>,
    objective: Option<String>,
    scoreboard: Vec<ScoreboardRow>,
    containers: usize,
    clock: Duration,
    rng: ChaCha8Rng,
}

impl Arena {
    /// Creates an arena with `players` connected players, each standing at a
    /// distinct home position.
    pub(crate) fn new(players: u64, seed: u64) -> Self {
        let players = (1..=players)
            .map(|id| {
                let snapshot = PlayerSnapshot {
                    display_name: format!("survivor-{id}"),
                    position: Position::new(id as f32 * 4.0, 1.0, 0.0),
                };
                (
                    PlayerId::new(id),
                    SimPlayer {
                        snapshot,
                        downed_at: None,
                    },
                )
            })
            .collect();
        Self {
            players,
            actors: BTreeMap::new(),
            next_actor: 0,
            reports: Vec::new(),
            objective: None,
            scoreboard: Vec::new(),
            containers: 0,
            clock: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
        }
    }

    /// Identifiers of every connected player.
    pub(crate) fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// Rolls one second of combat and queues the resulting host reports.
    ///
    /// `boss` is never picked as a kill target; it only receives ranged
    /// damage from standing players.
    pub(crate) fn skirmish(&mut self, now: Duration, boss: Option<ActorId>, odds: Skirmish) {
        self.clock = now;
        self.respawn_due(now);

        let standing: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|(_, player)| player.downed_at.is_none())
            .map(|(id, _)| *id)
            .collect();

        for &player in &standing {
            if !self.rng.gen_bool(odds.lethality) {
                continue;
            }
            let victim = self
                .actors
                .keys()
                .copied()
                .filter(|actor| Some(*actor) != boss)
                .choose(&mut self.rng);
            if let Some(actor) = victim {
                let _ = self.actors.remove(&actor);
                self.reports.push(Command::ActorRemoved {
                    actor,
                    killer: Some(player),
                });
            }
        }

        if let Some(actor) = boss {
            if !standing.is_empty() {
                self.reports.push(Command::BossDamaged {
                    actor,
                    raw_damage: RANGED_DAMAGE_PER_PLAYER * standing.len() as f32,
                    kind: DamageKind::Ranged,
                });
            }
            self.drive_boss(actor);
        }

        let attackers = self
            .actors
            .iter()
            .filter(|(id, _)| Some(**id) != boss)
            .count();
        for _ in 0..attackers {
            if self.rng.gen_bool(odds.threat) {
                self.down_random_player(now);
            }
        }
    }

    /// Hands over every report queued since the previous call.
    pub(crate) fn take_reports(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.reports)
    }

    /// Scoreboard rows from the most recent refresh.
    pub(crate) fn scoreboard(&self) -> &[ScoreboardRow] {
        &self.scoreboard
    }

    /// Number of loot containers placed so far.
    pub(crate) fn containers(&self) -> usize {
        self.containers
    }

    fn respawn_due(&mut self, now: Duration) {
        for (&id, player) in &mut self.players {
            let Some(downed_at) = player.downed_at else {
                continue;
            };
            if now.saturating_sub(downed_at) >= RESPAWN_DELAY {
                player.downed_at = None;
                self.reports.push(Command::PlayerRespawned { player: id });
            }
        }
    }

    fn down_random_player(&mut self, now: Duration) {
        let victim = self
            .players
            .iter_mut()
            .filter(|(_, player)| player.downed_at.is_none())
            .choose(&mut self.rng);
        if let Some((&id, player)) = victim {
            player.downed_at = Some(now);
            self.reports.push(Command::PlayerDowned { player: id });
        }
    }

    fn down_player(&mut self, id: PlayerId) {
        let Some(player) = self.players.get_mut(&id) else {
            return;
        };
        if player.downed_at.is_none() {
            debug!(player = id.get(), "boss shell landed");
            player.downed_at = Some(self.clock);
            self.reports.push(Command::PlayerDowned { player: id });
        }
    }

    fn drive_boss(&mut self, actor: ActorId) {
        let Some(boss) = self.actors.get_mut(&actor) else {
            return;
        };
        let Some(destination) = boss.destination else {
            return;
        };
        let offset = destination - boss.position;
        if offset.length() <= BOSS_SPEED {
            boss.position = destination;
        } else {
            boss.position += offset.normalize() * BOSS_SPEED;
        }
    }
}

impl GameHost for Arena {
    fn describe_player(&self, player: PlayerId) -> Option<PlayerSnapshot> {
        self.players
            .get(&player)
            .map(|player| player.snapshot.clone())
    }

    fn create_actor(
        &mut self,
        archetype: &Archetype,
        location: Position,
        stats: &StatBlock,
    ) -> Result<ActorId, HostError> {
        self.next_actor += 1;
        let actor = ActorId::new(self.next_actor);
        let _ = self.actors.insert(
            actor,
            SimActor {
                kind: archetype.kind,
                position: location,
                destination: None,
            },
        );
        debug!(
            actor = actor.get(),
            name = %archetype.display_name,
            health = stats.health,
            "actor created"
        );
        Ok(actor)
    }

    fn destroy_actor(&mut self, actor: ActorId) {
        let _ = self.actors.remove(&actor);
    }

    fn grant_reward(
        &mut self,
        player: PlayerId,
        item: &str,
        amount: u32,
        _skin: Option<u64>,
    ) -> Result<(), HostError> {
        if !self.players.contains_key(&player) {
            return Err(HostError::RewardGrant {
                item: item.to_owned(),
                reason: format!("player {} is not connected", player.get()),
            });
        }
        debug!(player = player.get(), item, amount, "reward granted");
        Ok(())
    }

    fn teleport(&mut self, player: PlayerId, location: Position) {
        if let Some(player) = self.players.get_mut(&player) {
            player.snapshot.position = location;
        }
    }

    fn reset_inventory(&mut self, _player: PlayerId) {}

    fn reset_health(&mut self, player: PlayerId) {
        if let Some(player) = self.players.get_mut(&player) {
            player.downed_at = None;
        }
    }

    fn set_actor_destination(&mut self, actor: ActorId, destination: Position) {
        if let Some(actor) = self.actors.get_mut(&actor) {
            if actor.kind != ActorKind::Heavy {
                actor.destination = Some(destination);
            }
        }
    }

    fn observe_boss(&self, actor: ActorId) -> Option<BossObservation> {
        let boss = self.actors.get(&actor)?;
        let candidates = self
            .players
            .iter()
            .map(|(&id, player)| TargetCandidate {
                target: TargetRef::Player(id),
                position: player.snapshot.position,
                visible: true,
                downed: player.downed_at.is_some(),
            })
            .collect();
        Some(BossObservation {
            position: boss.position,
            stopping_distance: STOPPING_DISTANCE,
            candidates,
        })
    }

    fn command_boss(&mut self, actor: ActorId, command: &BossCommand) {
        match *command {
            BossCommand::Drive { destination } => {
                if let Some(boss) = self.actors.get_mut(&actor) {
                    boss.destination = Some(destination);
                }
            }
            BossCommand::Aim { .. } => {}
            BossCommand::Fire {
                channel: WeaponChannel::Heavy,
                target: TargetRef::Player(player),
                ..
            } => self.down_player(player),
            BossCommand::Fire { .. } => {}
        }
    }

    fn spawn_loot_container(&mut self, container: &LootContainer) -> Result<(), HostError> {
        self.containers += 1;
        debug!(currency = container.currency, "loot container placed");
        Ok(())
    }

    fn display_hud(&mut self, _player: PlayerId, hud: &HudSnapshot) {
        if self.objective.as_deref() != Some(hud.objective.as_str()) {
            info!(objective = %hud.objective, "objective changed");
            self.objective = Some(hud.objective.clone());
        }
    }

    fn display_scoreboard(&mut self, _audience: &[PlayerId], rows: &[ScoreboardRow]) {
        self.scoreboard = rows.to_vec();
    }
}
