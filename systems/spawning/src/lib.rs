#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Population-scaled spawn admission bounded by a live-actor ceiling.
//!
//! The throttle never talks to the host. Callers hand it a creation closure
//! that realises a [`SpawnRequest`] and receive [`Event`] values describing
//! every unit that was spawned or dropped.

use std::collections::{BTreeMap, VecDeque};

use holdout_core::{
    ActorId, ActorKind, Archetype, Event, HostError, LootRange, Position, StatBlock,
    WaveDefinition, WaveIndex,
};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, error, info, warn};

/// Request to realise one hostile unit, either immediately or from the backlog.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    /// Unit to create.
    pub archetype: Archetype,
    /// Location picked from the template's spawn set.
    pub location: Position,
    /// Stats applied to the unit.
    pub stats: StatBlock,
    /// Currency dropped when the unit is killed.
    pub loot: LootRange,
}

/// Bookkeeping retained for an actor while it is alive.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveActor {
    /// Behavioural family of the unit.
    pub kind: ActorKind,
    /// Stats the unit was created with.
    pub stats: StatBlock,
    /// Currency dropped when the unit is killed.
    pub loot: LootRange,
}

/// Registry of live actors plus the FIFO backlog of deferred spawns.
#[derive(Debug, Default)]
pub struct SpawnThrottle {
    ceiling: u32,
    live: BTreeMap<ActorId, LiveActor>,
    backlog: VecDeque<SpawnRequest>,
}

impl SpawnThrottle {
    /// Creates an empty throttle with a ceiling of zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits every regular template of `definition` for `player_count` players.
    ///
    /// Units are created while the live count stays below the wave ceiling and
    /// deferred into the backlog afterwards. Special templates are skipped; the
    /// caller routes them to their encounter controller.
    pub fn admit_wave<R, F>(
        &mut self,
        wave: WaveIndex,
        definition: &WaveDefinition,
        player_count: usize,
        rng: &mut R,
        mut create: F,
        out: &mut Vec<Event>,
    ) where
        R: Rng + ?Sized,
        F: FnMut(&SpawnRequest) -> Result<ActorId, HostError>,
    {
        self.ceiling = definition.ceiling;
        let mut requested = 0u32;
        let mut spawned = 0u32;
        let mut deferred = 0u32;

        for template in definition
            .templates
            .iter()
            .filter(|template| template.special.is_none())
        {
            let count = template.unit_count(player_count);
            requested = requested.saturating_add(count);
            for _ in 0..count {
                let Some(location) = template.locations.choose(rng).copied() else {
                    break;
                };
                let request = SpawnRequest {
                    archetype: template.archetype.clone(),
                    location,
                    stats: template.stats,
                    loot: template.loot,
                };
                if self.has_capacity() {
                    if self.realise(request, &mut create, out) {
                        spawned += 1;
                    }
                } else {
                    debug!(
                        prefab = %request.archetype.prefab,
                        backlog = self.backlog.len() + 1,
                        "deferring spawn"
                    );
                    self.backlog.push_back(request);
                    deferred += 1;
                }
            }
        }

        info!(
            %wave,
            requested,
            spawned,
            deferred,
            ceiling = self.ceiling,
            "wave admitted"
        );
        out.push(Event::WaveAdmitted {
            wave,
            requested,
            spawned,
            deferred,
        });
    }

    /// Realises backlog entries in FIFO order while capacity remains.
    ///
    /// A live count above the ceiling is reported and nothing is spawned until
    /// removals bring it back under.
    pub fn drain_backlog<F>(&mut self, mut create: F, out: &mut Vec<Event>)
    where
        F: FnMut(&SpawnRequest) -> Result<ActorId, HostError>,
    {
        if self.live.len() > self.ceiling as usize {
            error!(
                live = self.live.len(),
                ceiling = self.ceiling,
                "live actors exceed the wave ceiling; holding backlog"
            );
            return;
        }

        while self.has_capacity() {
            let Some(request) = self.backlog.pop_front() else {
                break;
            };
            debug!(
                prefab = %request.archetype.prefab,
                remaining = self.backlog.len(),
                "draining backlog entry"
            );
            let _ = self.realise(request, &mut create, out);
        }
    }

    /// Forgets a live actor, returning its bookkeeping when it was tracked.
    pub fn remove(&mut self, actor: ActorId) -> Option<LiveActor> {
        self.live.remove(&actor)
    }

    /// Drops the backlog and returns the handles of every live actor.
    ///
    /// The registry is emptied before the handles are returned so callers may
    /// destroy them without observing a partially cleared throttle.
    pub fn clear(&mut self) -> Vec<ActorId> {
        self.backlog.clear();
        let live = std::mem::take(&mut self.live);
        live.into_keys().collect()
    }

    /// Looks up a live actor.
    #[must_use]
    pub fn get(&self, actor: ActorId) -> Option<&LiveActor> {
        self.live.get(&actor)
    }

    /// Iterator over live actors in handle order.
    pub fn live(&self) -> impl Iterator<Item = (ActorId, &LiveActor)> {
        self.live.iter().map(|(actor, live)| (*actor, live))
    }

    /// Number of live actors.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of deferred spawn requests.
    #[must_use]
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Units still to be defeated: live actors plus deferred requests.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.live.len() + self.backlog.len()
    }

    /// Reports whether no actor is alive and nothing is deferred.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.live.is_empty() && self.backlog.is_empty()
    }

    /// Ceiling of the most recently admitted wave.
    #[must_use]
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    fn has_capacity(&self) -> bool {
        self.live.len() < self.ceiling as usize
    }

    fn realise<F>(&mut self, request: SpawnRequest, create: &mut F, out: &mut Vec<Event>) -> bool
    where
        F: FnMut(&SpawnRequest) -> Result<ActorId, HostError>,
    {
        match create(&request) {
            Ok(actor) => {
                let kind = request.archetype.kind;
                let previous = self.live.insert(
                    actor,
                    LiveActor {
                        kind,
                        stats: request.stats,
                        loot: request.loot,
                    },
                );
                if previous.is_some() {
                    error!(actor = actor.get(), "host reused a live actor handle");
                }
                debug!(actor = actor.get(), ?kind, "actor spawned");
                out.push(Event::ActorSpawned {
                    actor,
                    kind,
                    location: request.location,
                });
                true
            }
            Err(err) => {
                warn!(%err, "dropping unit after host failure");
                out.push(Event::SpawnDropped {
                    prefab: request.archetype.prefab,
                });
                false
            }
        }
    }
}
