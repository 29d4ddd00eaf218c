//! Immutable wave catalog supplied at session construction.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ActorKind, DamageKind, Position, WaveIndex};

/// Identity and presentation of a spawnable unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Behavioural family used for dispatch.
    pub kind: ActorKind,
    /// Host prefab path instantiated for the unit.
    pub prefab: String,
    /// Name shown to players.
    pub display_name: String,
    /// Optional equipment kit handed to the unit after spawning.
    pub kit: Option<String>,
}

/// Combat statistics applied to a spawned unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Starting and maximum health.
    pub health: f32,
    /// Damage scale applied to ranged hits.
    pub damage: f32,
    /// Hit chance in percent for ranged hits.
    pub accuracy: f32,
}

impl StatBlock {
    /// Stat block for units whose hits are never overridden.
    #[must_use]
    pub const fn with_health(health: f32) -> Self {
        Self {
            health,
            damage: 0.0,
            accuracy: 0.0,
        }
    }
}

/// Inclusive currency range dropped when a unit is killed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootRange {
    /// Lower bound.
    pub min: u32,
    /// Upper bound.
    pub max: u32,
}

impl LootRange {
    /// Creates a new loot range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Reports whether the range yields any currency at all.
    ///
    /// Ranges with a zero bound on either side never drop anything.
    #[must_use]
    pub const fn drops_anything(&self) -> bool {
        self.min > 0 && self.max > 0
    }

    /// Scales both bounds by `factor`, truncating toward zero.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        let factor = factor.max(0.0);
        Self {
            min: (self.min as f32 * factor) as u32,
            max: (self.max as f32 * factor) as u32,
        }
    }
}

/// Patrol point of a boss route.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Location the boss drives toward.
    pub destination: Position,
    /// Explicit successor; `None` advances to the following waypoint with wrap.
    pub next: Option<usize>,
}

impl Waypoint {
    /// Waypoint that advances to its list successor.
    #[must_use]
    pub const fn at(destination: Position) -> Self {
        Self {
            destination,
            next: None,
        }
    }

    /// Waypoint that jumps to an explicit successor.
    #[must_use]
    pub const fn looping_to(destination: Position, next: usize) -> Self {
        Self {
            destination,
            next: Some(next),
        }
    }
}

/// Fire-control parameters of a single boss weapon channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    /// Shots fired before the channel enters its cooldown.
    pub burst: u32,
    /// Delay between shots within a burst.
    pub fire_interval: Duration,
    /// Delay after a completed burst.
    pub cooldown: Duration,
    /// Closest distance the channel engages at.
    pub min_range: f32,
    /// Farthest distance the channel engages at; `None` is unbounded.
    pub max_range: Option<f32>,
}

impl WeaponProfile {
    /// Reports whether a target at `distance` lies inside the engagement band.
    #[must_use]
    pub fn in_range(&self, distance: f32) -> bool {
        distance >= self.min_range && self.max_range.map_or(true, |max| distance <= max)
    }
}

/// Resistance multipliers applied to damage received by a boss.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageScaling {
    /// Multiplier for melee damage.
    pub melee: f32,
    /// Multiplier for every other damage family.
    pub ranged: f32,
}

impl DamageScaling {
    /// Multiplier matching the provided damage family.
    #[must_use]
    pub const fn factor(&self, kind: DamageKind) -> f32 {
        match kind {
            DamageKind::Melee => self.melee,
            DamageKind::Ranged => self.ranged,
        }
    }
}

/// Scripted behaviour of a boss encounter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossProfile {
    /// Ordered patrol route.
    pub patrol: Vec<Waypoint>,
    /// Fast-firing weapon channel.
    pub rapid: WeaponProfile,
    /// Slow cannon channel.
    pub heavy: WeaponProfile,
    /// Minimum cosine between aim and target direction before firing.
    pub aim_tolerance: f32,
    /// Maximum turret turn rate in radians per second.
    pub turn_rate: f32,
    /// Resistance applied to incoming damage.
    pub damage_scaling: DamageScaling,
    /// Number of loot containers dropped on death.
    pub loot_containers: u32,
}

/// Marker routing a template to a dedicated encounter controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpecialPhase {
    /// Scripted heavy-unit encounter.
    Boss(BossProfile),
}

/// Per-archetype spawn rule of a wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnTemplate {
    /// Unit to create.
    pub archetype: Archetype,
    /// Units per roster player.
    pub per_player: f32,
    /// Stats of each unit.
    pub stats: StatBlock,
    /// Currency dropped per kill.
    pub loot: LootRange,
    /// Candidate spawn locations, picked uniformly.
    pub locations: Vec<Position>,
    /// Optional special-phase routing.
    pub special: Option<SpecialPhase>,
}

/// Slack absorbed before rounding a scaled count up, so that decimal
/// multipliers stored as `f32` (0.3, 1.1) land on whole counts.
const COUNT_TOLERANCE: f64 = 1e-4;

impl SpawnTemplate {
    /// Number of units this template contributes for `player_count` players.
    ///
    /// Counts are `ceil(per_player * player_count)`; special templates are
    /// singleton encounters and always yield one.
    #[must_use]
    pub fn unit_count(&self, player_count: usize) -> u32 {
        if self.special.is_some() {
            return 1;
        }
        let exact = f64::from(self.per_player) * player_count as f64;
        let scaled = (exact - COUNT_TOLERANCE).ceil();
        if scaled <= 0.0 {
            0
        } else {
            scaled.min(f64::from(u32::MAX)) as u32
        }
    }

    /// Boss profile when the template is a boss encounter.
    #[must_use]
    pub fn boss_profile(&self) -> Option<&BossProfile> {
        match &self.special {
            Some(SpecialPhase::Boss(profile)) => Some(profile),
            None => None,
        }
    }
}

/// Item reward granted to surviving players when a wave is cleared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLine {
    /// Host item identifier.
    pub item: String,
    /// Quantity granted.
    pub amount: u32,
    /// Optional cosmetic skin identifier.
    pub skin: Option<u64>,
}

impl RewardLine {
    /// Creates a reward line without a skin.
    #[must_use]
    pub fn new(item: impl Into<String>, amount: u32) -> Self {
        Self {
            item: item.into(),
            amount,
            skin: None,
        }
    }

    /// Attaches a cosmetic skin to the reward.
    #[must_use]
    pub fn with_skin(mut self, skin: u64) -> Self {
        self.skin = Some(skin);
        self
    }
}

/// One difficulty tier of the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Countdown before the wave starts.
    pub countdown: Duration,
    /// Maximum concurrently live actors.
    pub ceiling: u32,
    /// Spawn rules in admission order.
    pub templates: Vec<SpawnTemplate>,
    /// Rewards granted on clearance.
    pub rewards: Vec<RewardLine>,
}

impl WaveDefinition {
    /// Template routed to the boss controller, if the wave has one.
    #[must_use]
    pub fn boss_template(&self) -> Option<&SpawnTemplate> {
        self.templates
            .iter()
            .find(|template| template.special.is_some())
    }

    /// Reports whether the wave is a boss wave.
    #[must_use]
    pub fn is_boss_wave(&self) -> bool {
        self.boss_template().is_some()
    }
}

/// Reasons a wave catalog is rejected at construction.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CatalogError {
    /// The catalog contains no waves.
    #[error("wave catalog is empty")]
    Empty,
    /// A wave allows no live actors at all.
    #[error("{wave} has a live-actor ceiling of zero")]
    ZeroCeiling {
        /// Offending wave.
        wave: WaveIndex,
    },
    /// A template has nowhere to spawn.
    #[error("{wave} template {template} has no spawn locations")]
    NoLocations {
        /// Offending wave.
        wave: WaveIndex,
        /// Position of the template within the wave.
        template: usize,
    },
    /// A template's loot bounds are inverted.
    #[error("{wave} template {template} has loot min {min} above max {max}")]
    InvertedLoot {
        /// Offending wave.
        wave: WaveIndex,
        /// Position of the template within the wave.
        template: usize,
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
    /// A template's multiplier is negative or not finite.
    #[error("{wave} template {template} has invalid per-player multiplier {value}")]
    InvalidMultiplier {
        /// Offending wave.
        wave: WaveIndex,
        /// Position of the template within the wave.
        template: usize,
        /// Configured multiplier.
        value: f32,
    },
    /// A template's health is negative or not finite.
    #[error("{wave} template {template} has invalid health {value}")]
    InvalidHealth {
        /// Offending wave.
        wave: WaveIndex,
        /// Position of the template within the wave.
        template: usize,
        /// Configured health.
        value: f32,
    },
    /// A wave has more than one special template.
    #[error("{wave} has more than one special template")]
    MultipleSpecials {
        /// Offending wave.
        wave: WaveIndex,
    },
    /// A boss profile has no patrol route.
    #[error("{wave} boss has an empty patrol route")]
    EmptyPatrol {
        /// Offending wave.
        wave: WaveIndex,
    },
    /// A boss waypoint points past the end of its route.
    #[error("{wave} boss waypoint {waypoint} continues to missing waypoint {next}")]
    DanglingWaypoint {
        /// Offending wave.
        wave: WaveIndex,
        /// Waypoint carrying the override.
        waypoint: usize,
        /// Requested successor.
        next: usize,
    },
}

/// Ordered, validated list of wave definitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WaveDefinition>", into = "Vec<WaveDefinition>")]
pub struct WaveCatalog {
    waves: Vec<WaveDefinition>,
}

impl WaveCatalog {
    /// Validates and wraps the provided wave definitions.
    pub fn new(waves: Vec<WaveDefinition>) -> Result<Self, CatalogError> {
        if waves.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, wave) in waves.iter().enumerate() {
            validate_wave(WaveIndex::new(index), wave)?;
        }
        Ok(Self { waves })
    }

    /// Wraps built-in data whose validity is covered by tests.
    pub(crate) fn from_trusted(waves: Vec<WaveDefinition>) -> Self {
        Self { waves }
    }

    /// Number of waves in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether the catalog is empty; validated catalogs never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Retrieves the definition of `wave`, if it exists.
    #[must_use]
    pub fn wave(&self, wave: WaveIndex) -> Option<&WaveDefinition> {
        self.waves.get(wave.get())
    }

    /// Reports whether `wave` lies inside the catalog.
    #[must_use]
    pub fn contains(&self, wave: WaveIndex) -> bool {
        wave.get() < self.waves.len()
    }

    /// Iterator over the waves in order.
    pub fn iter(&self) -> impl Iterator<Item = &WaveDefinition> {
        self.waves.iter()
    }
}

impl TryFrom<Vec<WaveDefinition>> for WaveCatalog {
    type Error = CatalogError;

    fn try_from(waves: Vec<WaveDefinition>) -> Result<Self, Self::Error> {
        Self::new(waves)
    }
}

impl From<WaveCatalog> for Vec<WaveDefinition> {
    fn from(catalog: WaveCatalog) -> Self {
        catalog.waves
    }
}

fn validate_wave(wave: WaveIndex, definition: &WaveDefinition) -> Result<(), CatalogError> {
    if definition.ceiling == 0 {
        return Err(CatalogError::ZeroCeiling { wave });
    }

    let mut specials = 0;
    for (template, spawn) in definition.templates.iter().enumerate() {
        if spawn.locations.is_empty() {
            return Err(CatalogError::NoLocations { wave, template });
        }
        if spawn.loot.min > spawn.loot.max {
            return Err(CatalogError::InvertedLoot {
                wave,
                template,
                min: spawn.loot.min,
                max: spawn.loot.max,
            });
        }
        if !spawn.per_player.is_finite() || spawn.per_player < 0.0 {
            return Err(CatalogError::InvalidMultiplier {
                wave,
                template,
                value: spawn.per_player,
            });
        }
        if !spawn.stats.health.is_finite() || spawn.stats.health < 0.0 {
            return Err(CatalogError::InvalidHealth {
                wave,
                template,
                value: spawn.stats.health,
            });
        }
        if let Some(profile) = spawn.boss_profile() {
            specials += 1;
            validate_patrol(wave, &profile.patrol)?;
        }
    }

    if specials > 1 {
        return Err(CatalogError::MultipleSpecials { wave });
    }
    Ok(())
}

fn validate_patrol(wave: WaveIndex, patrol: &[Waypoint]) -> Result<(), CatalogError> {
    if patrol.is_empty() {
        return Err(CatalogError::EmptyPatrol { wave });
    }
    for (waypoint, point) in patrol.iter().enumerate() {
        if let Some(next) = point.next {
            if next >= patrol.len() {
                return Err(CatalogError::DanglingWaypoint {
                    wave,
                    waypoint,
                    next,
                });
            }
        }
    }
    Ok(())
}
