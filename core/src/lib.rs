#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Holdout survival engine.
//!
//! This crate defines the message surface that connects the hosting game, the
//! authoritative session, and pure systems. Hosts submit [`Command`] values
//! describing what happened in the world, the session executes those commands
//! via its `apply` entry point, and then records [`Event`] values describing
//! every decision it made. Systems consume snapshots of session state and
//! respond exclusively through caller-owned output buffers; only the session
//! talks to the [`GameHost`] collaborator.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

mod catalog;
mod config;
mod host;
mod standard;

pub use catalog::{
    Archetype, BossProfile, CatalogError, DamageScaling, LootRange, RewardLine, SpawnTemplate,
    SpecialPhase, StatBlock, WaveCatalog, WaveDefinition, Waypoint, WeaponProfile,
};
pub use config::{CadenceConfig, ConfigError, SessionConfig, StatsRetention};
pub use host::{
    BossCommand, BossObservation, GameHost, HostError, HudSnapshot, LootContainer,
    PlayerSnapshot, ScoreboardRow, TargetCandidate, TargetRef,
};

/// Canonical banner emitted when the simulation boots.
pub const WELCOME_BANNER: &str = "Welcome to Holdout.";

/// World-space coordinate used for spawn points, waypoints and player homes.
pub type Position = glam::Vec3;

/// Unique identifier of a human participant, assigned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u64);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Opaque handle of a hostile actor entity owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates a new actor handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Zero-based index into the [`WaveCatalog`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct WaveIndex(usize);

impl WaveIndex {
    /// First wave of every session.
    pub const FIRST: Self = Self(0);

    /// Creates a new wave index.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// One-based wave number shown to players.
    #[must_use]
    pub const fn number(&self) -> usize {
        self.0 + 1
    }

    /// Index of the wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for WaveIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wave {}", self.number())
    }
}

/// Lifecycle states of a survival session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Roster is below the configured minimum.
    WaitingForPlayers,
    /// Counting down to the next wave.
    CountdownWave,
    /// A regular wave is being spawned and fought.
    RunningWave,
    /// A boss wave is in progress.
    BossWave,
    /// Every wave was cleared; lingering before the session resets.
    PlayersWin,
    /// Every roster player is downed; lingering before the session resets.
    AllPlayersDead,
}

impl SessionState {
    /// Reports whether the state latches a timestamp and waits on it.
    #[must_use]
    pub const fn is_timed(self) -> bool {
        matches!(
            self,
            Self::CountdownWave | Self::PlayersWin | Self::AllPlayersDead
        )
    }

    /// Reports whether hostile actors are being admitted in this state.
    #[must_use]
    pub const fn is_fighting(self) -> bool {
        matches!(self, Self::RunningWave | Self::BossWave)
    }
}

/// Behavioural family of a spawned hostile unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Close-quarters unit that chases players on foot.
    Melee,
    /// Firearm unit whose accuracy and damage are overridden per hit.
    Ranged,
    /// Vehicle-class unit driven by its own controller.
    Heavy,
}

impl ActorKind {
    /// Reports whether units of this kind are re-targeted by the pursuit scheduler.
    #[must_use]
    pub const fn pursues_players(self) -> bool {
        match self {
            Self::Melee | Self::Ranged => true,
            Self::Heavy => false,
        }
    }
}

/// Family of damage dealt to a boss, used to select its resistance multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageKind {
    /// Damage from melee weapons.
    Melee,
    /// Damage from projectiles, explosives and everything else.
    Ranged,
}

/// Weapon channel of a boss encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponChannel {
    /// Fast-firing gun with long bursts.
    Rapid,
    /// Slow main cannon.
    Heavy,
}

/// Reasons a player admission may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdmissionRejection {
    /// The player already belongs to the roster.
    AlreadyPresent,
    /// The host has no live entity for the player.
    UnknownToHost,
}

/// Commands that express every input the session accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests that a player join the session.
    AddPlayer {
        /// Player asking to join.
        player: PlayerId,
    },
    /// Requests that a player leave the session.
    RemovePlayer {
        /// Player leaving.
        player: PlayerId,
    },
    /// Advances the session clock to the provided timestamp.
    Tick {
        /// Host-monotonic timestamp of the tick.
        now: Duration,
    },
    /// Reports that a hostile actor died or was destroyed.
    ActorRemoved {
        /// Handle of the removed actor.
        actor: ActorId,
        /// Player credited with the kill, if any.
        killer: Option<PlayerId>,
    },
    /// Reports that a player became incapacitated.
    PlayerDowned {
        /// Player that went down.
        player: PlayerId,
    },
    /// Reports that a player respawned.
    PlayerRespawned {
        /// Player that respawned.
        player: PlayerId,
    },
    /// Reports raw damage dealt to the boss actor.
    BossDamaged {
        /// Handle of the damaged actor.
        actor: ActorId,
        /// Damage before resistance scaling.
        raw_damage: f32,
        /// Family of the damage source.
        kind: DamageKind,
    },
    /// Operational tooling: jump to the provided wave.
    DebugSetWave {
        /// Wave that should become current.
        wave: WaveIndex,
    },
    /// Zeroes a player's kill and death counters.
    ResetStats {
        /// Player whose counters are cleared.
        player: PlayerId,
    },
    /// Resets the session back to waiting for players.
    Reset,
    /// Tears the session down permanently.
    Shutdown,
}

/// Events recorded by the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a player joined the roster.
    PlayerAdmitted {
        /// Admitted player.
        player: PlayerId,
    },
    /// Reports that a join request was refused.
    PlayerRejected {
        /// Refused player.
        player: PlayerId,
        /// Reason for the refusal.
        reason: AdmissionRejection,
    },
    /// Confirms that a player left the roster and was sent home.
    PlayerRemoved {
        /// Removed player.
        player: PlayerId,
    },
    /// Announces a lifecycle transition.
    StateChanged {
        /// State that was left.
        from: SessionState,
        /// State that became active.
        to: SessionState,
    },
    /// Summarises the admission of a wave.
    WaveAdmitted {
        /// Admitted wave.
        wave: WaveIndex,
        /// Units requested after population scaling.
        requested: u32,
        /// Units created immediately.
        spawned: u32,
        /// Units deferred into the backlog.
        deferred: u32,
    },
    /// Confirms that the host created a hostile actor.
    ActorSpawned {
        /// Handle returned by the host.
        actor: ActorId,
        /// Behavioural family of the unit.
        kind: ActorKind,
        /// Spawn location.
        location: Position,
    },
    /// Reports that a unit was dropped after the host failed to create it.
    SpawnDropped {
        /// Prefab the host failed to create.
        prefab: String,
    },
    /// Confirms that a tracked actor left the live set.
    ActorRemoved {
        /// Removed actor.
        actor: ActorId,
    },
    /// Confirms that a kill was credited to a roster player.
    KillCredited {
        /// Credited player.
        player: PlayerId,
        /// Actor that was killed.
        actor: ActorId,
        /// Currency dropped for the kill.
        loot: u32,
    },
    /// Confirms that a player went down and reports whether a death was counted.
    PlayerDowned {
        /// Downed player.
        player: PlayerId,
        /// `true` when this was a fresh death.
        counted: bool,
    },
    /// Confirms that a player respawned into the session.
    PlayerRespawned {
        /// Respawned player.
        player: PlayerId,
    },
    /// Confirms that a reward line was granted.
    RewardGranted {
        /// Receiving player.
        player: PlayerId,
        /// Item identifier.
        item: String,
        /// Quantity granted.
        amount: u32,
    },
    /// Announces that a wave was cleared.
    WaveCleared {
        /// Cleared wave.
        wave: WaveIndex,
    },
    /// Confirms that the boss actor was created.
    BossSpawned {
        /// Handle of the boss actor.
        actor: ActorId,
        /// Health after player-count scaling.
        health: f32,
    },
    /// Confirms that the boss was destroyed and lists its loot containers.
    BossDefeated {
        /// Handle of the destroyed boss actor.
        actor: ActorId,
        /// Containers placed around the wreck.
        loot: Vec<LootContainer>,
    },
    /// Confirms that operational tooling moved the session to another wave.
    WaveChanged {
        /// Wave that became current.
        wave: WaveIndex,
    },
    /// Announces that the session returned to its initial state.
    SessionReset,
    /// Announces that the session was torn down.
    SessionShutdown,
}
