#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scripted heavy-unit encounter driven on its own cadence.
//!
//! The encounter owns patrol progress, turret aim, both weapon channels and
//! the scaled health pool of a single boss actor. It reads host sensors as a
//! [`BossObservation`] and answers with [`BossCommand`] values pushed into a
//! caller-owned buffer.

use std::time::Duration;

use glam::{Quat, Vec3};
use holdout_core::{
    ActorId, BossCommand, BossObservation, BossProfile, DamageKind, DamageScaling, HostError,
    LootContainer, LootRange, Position, SpawnTemplate, StatBlock, TargetCandidate, TargetRef,
    WeaponChannel, WeaponProfile, Waypoint,
};
use rand::{distributions::Distribution, seq::SliceRandom, Rng};
use rand_distr::UnitSphere;
use tracing::{debug, info};

const LOOT_LIFT: Vec3 = Vec3::new(0.0, 1.5, 0.0);
const LOOT_MIN_SPREAD: f32 = 2.0;
const LOOT_MAX_SPREAD: f32 = 3.0;

/// Outcome of a single encounter tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossStatus {
    /// The boss still stands.
    Alive,
    /// Queued damage brought health to zero.
    Defeated,
}

#[derive(Clone, Copy, Debug)]
struct WeaponState {
    channel: WeaponChannel,
    profile: WeaponProfile,
    fired: u32,
    ready_at: Duration,
}

impl WeaponState {
    fn new(channel: WeaponChannel, profile: WeaponProfile) -> Self {
        Self {
            channel,
            profile,
            fired: 0,
            ready_at: Duration::ZERO,
        }
    }

    fn try_fire(&mut self, clock: Duration, distance: f32) -> bool {
        if clock < self.ready_at || !self.profile.in_range(distance) {
            return false;
        }
        self.fired += 1;
        if self.fired >= self.profile.burst {
            self.fired = 0;
            self.ready_at = clock + self.profile.cooldown;
        } else {
            self.ready_at = clock + self.profile.fire_interval;
        }
        true
    }
}

/// Live boss encounter, created when a boss wave is admitted.
#[derive(Clone, Debug)]
pub struct BossEncounter {
    actor: ActorId,
    display_name: String,
    patrol: Vec<Waypoint>,
    waypoint: usize,
    driving: bool,
    aim: Vec3,
    aim_tolerance: f32,
    turn_rate: f32,
    scaling: DamageScaling,
    weapons: [WeaponState; 2],
    clock: Duration,
    health: f32,
    max_health: f32,
    pending_damage: f32,
    position: Position,
    loot: LootRange,
    loot_containers: u32,
}

impl BossEncounter {
    /// Creates the boss actor through `create` with health scaled by `player_count`.
    ///
    /// The boss spawns at a location picked uniformly from `template`; its
    /// loot range is scaled by the same player count.
    pub fn spawn<R, F>(
        template: &SpawnTemplate,
        profile: &BossProfile,
        player_count: usize,
        rng: &mut R,
        create: F,
    ) -> Result<Self, HostError>
    where
        R: Rng + ?Sized,
        F: FnOnce(Position, &StatBlock) -> Result<ActorId, HostError>,
    {
        let scale = player_count.max(1) as f32;
        let position = template
            .locations
            .choose(rng)
            .copied()
            .unwrap_or(Position::ZERO);
        let stats = StatBlock {
            health: template.stats.health * scale,
            ..template.stats
        };
        let actor = create(position, &stats)?;
        info!(
            actor = actor.get(),
            health = stats.health,
            players = player_count,
            "boss spawned"
        );

        Ok(Self {
            actor,
            display_name: template.archetype.display_name.clone(),
            patrol: profile.patrol.clone(),
            waypoint: 0,
            driving: false,
            aim: Vec3::Z,
            aim_tolerance: profile.aim_tolerance,
            turn_rate: profile.turn_rate,
            scaling: profile.damage_scaling,
            weapons: [
                WeaponState::new(WeaponChannel::Rapid, profile.rapid),
                WeaponState::new(WeaponChannel::Heavy, profile.heavy),
            ],
            clock: Duration::ZERO,
            health: stats.health,
            max_health: stats.health,
            pending_damage: 0.0,
            position,
            loot: template.loot.scaled(scale),
            loot_containers: profile.loot_containers,
        })
    }

    /// Queues raw damage; the scaled amount is applied on the next tick.
    pub fn record_damage(&mut self, raw_damage: f32, kind: DamageKind) {
        if !raw_damage.is_finite() || raw_damage <= 0.0 {
            return;
        }
        self.pending_damage += raw_damage * self.scaling.factor(kind);
    }

    /// Advances the encounter by `dt`.
    ///
    /// Pending damage is settled first. A living boss then updates its patrol,
    /// turret aim and weapons from `observation`; without an observation only
    /// the clock moves.
    pub fn tick(
        &mut self,
        dt: Duration,
        observation: Option<&BossObservation>,
        out: &mut Vec<BossCommand>,
    ) -> BossStatus {
        self.clock += dt;
        if self.pending_damage > 0.0 {
            self.health = (self.health - self.pending_damage).max(0.0);
            debug!(
                damage = self.pending_damage,
                health = self.health,
                "boss damage settled"
            );
            self.pending_damage = 0.0;
        }
        if self.health <= 0.0 {
            return BossStatus::Defeated;
        }

        let Some(observation) = observation else {
            return BossStatus::Alive;
        };
        self.position = observation.position;
        self.patrol(observation, out);
        self.engage(dt, observation, out);
        BossStatus::Alive
    }

    /// Rolls the loot containers dropped around the boss's last known position.
    pub fn drop_loot<R>(&self, rng: &mut R) -> Vec<LootContainer>
    where
        R: Rng + ?Sized,
    {
        (0..self.loot_containers)
            .map(|_| {
                let [x, y, z]: [f32; 3] = UnitSphere.sample(rng);
                let spread = rng.gen_range(LOOT_MIN_SPREAD..LOOT_MAX_SPREAD);
                let currency = if self.loot.min <= self.loot.max {
                    rng.gen_range(self.loot.min..=self.loot.max)
                } else {
                    self.loot.min
                };
                LootContainer {
                    position: self.position + LOOT_LIFT + Vec3::new(x, y, z) * spread,
                    currency,
                }
            })
            .collect()
    }

    /// Boss health as a percentage of its scaled maximum.
    #[must_use]
    pub fn progress_percent(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health * 100.0).clamp(0.0, 100.0)
    }

    /// Handle of the boss actor.
    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Name shown in objective text.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Remaining health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Health at spawn, after player-count scaling.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Loot range per container, after player-count scaling.
    #[must_use]
    pub fn loot(&self) -> LootRange {
        self.loot
    }

    /// Index of the waypoint currently driven toward.
    #[must_use]
    pub fn waypoint(&self) -> usize {
        self.waypoint
    }

    /// Current normalised turret direction.
    #[must_use]
    pub fn aim(&self) -> Vec3 {
        self.aim
    }

    fn patrol(&mut self, observation: &BossObservation, out: &mut Vec<BossCommand>) {
        let Some(current) = self.patrol.get(self.waypoint).copied() else {
            return;
        };
        if current.destination.distance(observation.position) <= observation.stopping_distance {
            let destination = self.advance_waypoint();
            out.push(BossCommand::Drive { destination });
            self.driving = true;
        } else if !self.driving {
            out.push(BossCommand::Drive {
                destination: current.destination,
            });
            self.driving = true;
        }
    }

    /// Moves to the successor waypoint and returns its destination.
    ///
    /// Successor overrides outside the route fall back to the next waypoint.
    fn advance_waypoint(&mut self) -> Position {
        let len = self.patrol.len();
        let next = self.patrol[self.waypoint]
            .next
            .filter(|&next| next < len)
            .unwrap_or((self.waypoint + 1) % len);
        self.waypoint = next;
        debug!(waypoint = next, "boss waypoint reached");
        self.patrol[next].destination
    }

    fn engage(&mut self, dt: Duration, observation: &BossObservation, out: &mut Vec<BossCommand>) {
        let Some(target) = select_target(&observation.candidates) else {
            return;
        };
        let offset = target.position - observation.position;
        let distance = offset.length();
        let desired = offset.normalize_or_zero();
        if desired == Vec3::ZERO {
            return;
        }

        self.aim = rotate_towards(self.aim, desired, self.turn_rate * dt.as_secs_f32());
        out.push(BossCommand::Aim {
            direction: self.aim,
        });

        if !target.visible || self.aim.dot(desired) < self.aim_tolerance {
            return;
        }
        let clock = self.clock;
        for weapon in &mut self.weapons {
            if weapon.try_fire(clock, distance) {
                out.push(BossCommand::Fire {
                    channel: weapon.channel,
                    target: target.target,
                    aim_point: target.position,
                });
            }
        }
    }
}

/// Prefers the first standing player, falling back to the host's first pick.
fn select_target(candidates: &[TargetCandidate]) -> Option<&TargetCandidate> {
    candidates
        .iter()
        .find(|candidate| matches!(candidate.target, TargetRef::Player(_)) && !candidate.downed)
        .or_else(|| candidates.first())
}

/// Rotates `current` toward `desired` by at most `max_angle` radians.
fn rotate_towards(current: Vec3, desired: Vec3, max_angle: f32) -> Vec3 {
    let angle = current.angle_between(desired);
    if !angle.is_finite() || angle <= max_angle {
        return desired;
    }
    let (axis, _) = Quat::from_rotation_arc(current, desired).to_axis_angle();
    (Quat::from_axis_angle(axis, max_angle) * current).normalize()
}
