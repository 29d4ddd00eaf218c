#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Behaviour of regular hostile units, dispatched by [`ActorKind`].
//!
//! A single scheduler pass steers every pursuing unit toward a random roster
//! player, replacing one repeating timer per actor. Ranged units additionally
//! have their hits resolved against distance-attenuated accuracy and damage.

use holdout_core::{ActorId, ActorKind, PlayerId, Position, StatBlock};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

/// Distance beyond which ranged accuracy and damage fall off linearly.
pub const FALLOFF_DISTANCE: f32 = 100.0;

/// Destination assigned to a pursuing unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PursuitOrder {
    /// Unit being steered.
    pub actor: ActorId,
    /// Player the unit chases.
    pub player: PlayerId,
    /// Position of that player when the order was issued.
    pub destination: Position,
}

/// Result of resolving a hit dealt by a hostile unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitResolution {
    /// The host applies the hit as it is.
    Unmodified,
    /// The hit is cancelled.
    Miss,
    /// The hit lands with its damage multiplied by `damage_scale`.
    Hit {
        /// Multiplier applied to every damage type of the hit.
        damage_scale: f32,
    },
}

/// Assigns each pursuing unit a uniformly chosen player from `players`.
///
/// Heavy units are left to their own controller. Nothing is emitted when no
/// player position is known.
pub fn retarget<I, R>(
    pursuers: I,
    players: &[(PlayerId, Position)],
    rng: &mut R,
    out: &mut Vec<PursuitOrder>,
) where
    I: IntoIterator<Item = (ActorId, ActorKind)>,
    R: Rng + ?Sized,
{
    if players.is_empty() {
        return;
    }
    let before = out.len();
    for (actor, kind) in pursuers {
        if !kind.pursues_players() {
            continue;
        }
        let Some(&(player, destination)) = players.choose(rng) else {
            return;
        };
        out.push(PursuitOrder {
            actor,
            player,
            destination,
        });
    }
    debug!(orders = out.len() - before, "pursuers retargeted");
}

/// Resolves a hit dealt by a unit of `kind` at `distance` metres.
///
/// Only ranged units are overridden: past [`FALLOFF_DISTANCE`] both accuracy
/// and damage are divided by `distance / FALLOFF_DISTANCE`, and the hit lands
/// when the truncated accuracy reaches a roll in `1..100`.
pub fn resolve_ranged_hit<R>(
    kind: ActorKind,
    stats: &StatBlock,
    distance: f32,
    rng: &mut R,
) -> HitResolution
where
    R: Rng + ?Sized,
{
    match kind {
        ActorKind::Ranged => {}
        ActorKind::Melee | ActorKind::Heavy => return HitResolution::Unmodified,
    }

    let falloff = if distance > FALLOFF_DISTANCE {
        distance / FALLOFF_DISTANCE
    } else {
        1.0
    };
    let accuracy = stats.accuracy / falloff;
    let damage_scale = stats.damage / falloff;
    let roll: i32 = rng.gen_range(1..100);
    if (accuracy as i32) < roll {
        HitResolution::Miss
    } else {
        HitResolution::Hit { damage_scale }
    }
}
