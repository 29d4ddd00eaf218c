//! Collaborator interface implemented by the hosting game server.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ActorId, Archetype, PlayerId, Position, StatBlock, WeaponChannel};

/// Failures reported by the host while realising a session request.
///
/// The session treats every variant as transient: the affected unit, reward
/// or container is logged and dropped, never retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HostError {
    /// The host could not instantiate an actor.
    #[error("host could not create `{prefab}`: {reason}")]
    ActorCreation {
        /// Prefab that failed to spawn.
        prefab: String,
        /// Host-supplied explanation.
        reason: String,
    },
    /// The host could not hand an item to a player.
    #[error("host could not grant `{item}`: {reason}")]
    RewardGrant {
        /// Item that failed to be granted.
        item: String,
        /// Host-supplied explanation.
        reason: String,
    },
    /// The host could not place a loot container.
    #[error("host could not place loot container: {reason}")]
    LootContainer {
        /// Host-supplied explanation.
        reason: String,
    },
}

/// Host-side facts about a player at admission time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Name shown on the scoreboard.
    pub display_name: String,
    /// Current world position, recorded as the player's home.
    pub position: Position,
}

/// Reference to something a boss may shoot at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRef {
    /// A human player.
    Player(PlayerId),
    /// Another actor.
    Actor(ActorId),
}

/// Target detected by the host around a boss, in host priority order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetCandidate {
    /// Detected entity.
    pub target: TargetRef,
    /// Aim point of the entity.
    pub position: Position,
    /// Line-of-sight result from the host.
    pub visible: bool,
    /// Whether the entity is a downed player.
    pub downed: bool,
}

/// Per-tick sensor readout of a boss actor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BossObservation {
    /// Current position of the boss.
    pub position: Position,
    /// Distance at which a waypoint counts as reached.
    pub stopping_distance: f32,
    /// Detected targets in host priority order.
    pub candidates: Vec<TargetCandidate>,
}

/// Instruction emitted by the boss controller for the host to realise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BossCommand {
    /// Drive toward a patrol destination.
    Drive {
        /// Destination of the current waypoint.
        destination: Position,
    },
    /// Point the turret along a unit direction.
    Aim {
        /// Normalised turret direction.
        direction: glam::Vec3,
    },
    /// Fire a weapon channel at a target.
    Fire {
        /// Channel that fires.
        channel: WeaponChannel,
        /// Target of the shot.
        target: TargetRef,
        /// Aim point of the shot.
        aim_point: Position,
    },
}

/// Reward container dropped by a defeated boss.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LootContainer {
    /// World position of the container.
    pub position: Position,
    /// Currency stored inside.
    pub currency: u32,
}

/// Objective panel contents pushed to every roster player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    /// Whole seconds left on the active timer.
    pub time_remaining: u64,
    /// Current objective line.
    pub objective: String,
    /// Boss health percentage, zero outside boss waves.
    pub progress: f32,
}

/// One scoreboard line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardRow {
    /// Player the row describes.
    pub player: PlayerId,
    /// Name shown to players.
    pub display_name: String,
    /// Currency balance.
    pub currency: u32,
    /// Kills this session.
    pub kills: u32,
    /// Deaths this session.
    pub deaths: u32,
}

/// Fire-and-forget surface of the hosting game.
///
/// Every call is made from the session's single logical thread. Responses
/// that depend on simulation results (deaths, damage) arrive later as
/// commands rather than as return values.
pub trait GameHost {
    /// Looks up a player entity; `None` when the host has no such player.
    fn describe_player(&self, player: PlayerId) -> Option<PlayerSnapshot>;

    /// Instantiates a hostile actor.
    fn create_actor(
        &mut self,
        archetype: &Archetype,
        location: Position,
        stats: &StatBlock,
    ) -> Result<ActorId, HostError>;

    /// Destroys an actor; unknown handles are ignored.
    fn destroy_actor(&mut self, actor: ActorId);

    /// Hands an item to a player.
    fn grant_reward(
        &mut self,
        player: PlayerId,
        item: &str,
        amount: u32,
        skin: Option<u64>,
    ) -> Result<(), HostError>;

    /// Moves a player to `location`.
    fn teleport(&mut self, player: PlayerId, location: Position);

    /// Strips a player's inventory.
    fn reset_inventory(&mut self, player: PlayerId);

    /// Restores a player's health and clears incapacitation.
    fn reset_health(&mut self, player: PlayerId);

    /// Equips a named kit on a player.
    fn equip_kit(&mut self, _player: PlayerId, _kit: &str) {}

    /// Steers a pursuing unit toward `destination`.
    fn set_actor_destination(&mut self, actor: ActorId, destination: Position);

    /// Reads the sensors of a boss actor; `None` once the host lost it.
    fn observe_boss(&self, actor: ActorId) -> Option<BossObservation>;

    /// Realises a boss controller instruction.
    fn command_boss(&mut self, actor: ActorId, command: &BossCommand);

    /// Places a loot container in the world.
    fn spawn_loot_container(&mut self, container: &LootContainer) -> Result<(), HostError>;

    /// Shows the objective panel to a player.
    fn display_hud(&mut self, _player: PlayerId, _hud: &HudSnapshot) {}

    /// Shows the scoreboard to the listed players.
    fn display_scoreboard(&mut self, _audience: &[PlayerId], _rows: &[ScoreboardRow]) {}
}
