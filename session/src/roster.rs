//! Admitted players and their per-session counters.

use std::collections::BTreeMap;

use holdout_core::{AdmissionRejection, GameHost, PlayerId, Position, ScoreboardRow};
use tracing::{debug, info};

/// Where and how admitted players are prepared for the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Loadout {
    /// Arena entry point.
    pub spawn_position: Position,
    /// Kit equipped after the inventory is stripped.
    pub starting_kit: Option<String>,
}

impl Loadout {
    fn prepare<H>(&self, player: PlayerId, host: &mut H)
    where
        H: GameHost + ?Sized,
    {
        host.teleport(player, self.spawn_position);
        host.reset_inventory(player);
        host.reset_health(player);
        if let Some(kit) = &self.starting_kit {
            host.equip_kit(player, kit);
        }
    }
}

/// Book-keeping for one admitted player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerRecord {
    display_name: String,
    home: Position,
    kills: u32,
    deaths: u32,
    currency: u32,
    downed: bool,
}

impl PlayerRecord {
    /// Name shown on the scoreboard.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Position the player is returned to on removal.
    #[must_use]
    pub fn home(&self) -> Position {
        self.home
    }

    /// Kills credited this session.
    #[must_use]
    pub fn kills(&self) -> u32 {
        self.kills
    }

    /// Deaths counted this session.
    #[must_use]
    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    /// Currency earned this session.
    #[must_use]
    pub fn currency(&self) -> u32 {
        self.currency
    }

    /// Whether the host last reported the player as downed.
    #[must_use]
    pub fn is_downed(&self) -> bool {
        self.downed
    }
}

/// Set of admitted players, keyed and iterated by identifier.
#[derive(Debug)]
pub struct PlayerRoster {
    loadout: Loadout,
    players: BTreeMap<PlayerId, PlayerRecord>,
}

impl PlayerRoster {
    /// Creates an empty roster that prepares players with `loadout`.
    #[must_use]
    pub fn new(loadout: Loadout) -> Self {
        Self {
            loadout,
            players: BTreeMap::new(),
        }
    }

    /// Admits `player`, recording their current position as home.
    ///
    /// The player is then moved into the arena with a fresh inventory, full
    /// health and the starting kit.
    pub fn admit<H>(&mut self, player: PlayerId, host: &mut H) -> Result<(), AdmissionRejection>
    where
        H: GameHost + ?Sized,
    {
        if self.players.contains_key(&player) {
            info!(player = player.get(), "player already in session");
            return Err(AdmissionRejection::AlreadyPresent);
        }
        let Some(snapshot) = host.describe_player(player) else {
            info!(player = player.get(), "player unknown to host");
            return Err(AdmissionRejection::UnknownToHost);
        };

        let _ = self.players.insert(
            player,
            PlayerRecord {
                display_name: snapshot.display_name,
                home: snapshot.position,
                kills: 0,
                deaths: 0,
                currency: 0,
                downed: false,
            },
        );
        self.loadout.prepare(player, host);
        info!(player = player.get(), roster = self.players.len(), "player admitted");
        Ok(())
    }

    /// Sends `player` home with a stripped inventory and forgets their record.
    pub fn remove<H>(&mut self, player: PlayerId, host: &mut H) -> Option<PlayerRecord>
    where
        H: GameHost + ?Sized,
    {
        let record = self.players.remove(&player)?;
        host.reset_inventory(player);
        host.reset_health(player);
        host.teleport(player, record.home);
        info!(player = player.get(), roster = self.players.len(), "player removed");
        Some(record)
    }

    /// Removes every player, returning who was removed.
    pub fn remove_all<H>(&mut self, host: &mut H) -> Vec<PlayerId>
    where
        H: GameHost + ?Sized,
    {
        let snapshot = self.ids();
        snapshot
            .into_iter()
            .filter(|player| self.remove(*player, host).is_some())
            .collect()
    }

    /// Clears the downed flag and prepares the player again after a respawn.
    pub fn respawn<H>(&mut self, player: PlayerId, host: &mut H) -> bool
    where
        H: GameHost + ?Sized,
    {
        let Some(record) = self.players.get_mut(&player) else {
            return false;
        };
        record.downed = false;
        self.loadout.prepare(player, host);
        debug!(player = player.get(), "player respawned");
        true
    }

    /// Marks a player as downed, returning whether they were standing before.
    ///
    /// `None` means the player is not in the roster.
    pub fn mark_downed(&mut self, player: PlayerId) -> Option<bool> {
        let record = self.players.get_mut(&player)?;
        let was_standing = !record.downed;
        record.downed = true;
        Some(was_standing)
    }

    /// Clears the downed flag of every player.
    pub fn stand_all(&mut self) {
        for record in self.players.values_mut() {
            record.downed = false;
        }
    }

    /// Increments the kill counter of a roster player.
    pub fn record_kill(&mut self, player: PlayerId) -> bool {
        self.update(player, |record| record.kills += 1)
    }

    /// Increments the death counter of a roster player.
    pub fn record_death(&mut self, player: PlayerId) -> bool {
        self.update(player, |record| record.deaths += 1)
    }

    /// Adds currency to the balance of a roster player.
    pub fn credit(&mut self, player: PlayerId, amount: u32) -> bool {
        self.update(player, |record| {
            record.currency = record.currency.saturating_add(amount);
        })
    }

    /// Zeroes the kill and death counters of a roster player.
    pub fn reset_stats(&mut self, player: PlayerId) -> bool {
        self.update(player, |record| {
            record.kills = 0;
            record.deaths = 0;
        })
    }

    /// Zeroes the kill and death counters of every player.
    pub fn reset_all_stats(&mut self) {
        for record in self.players.values_mut() {
            record.kills = 0;
            record.deaths = 0;
        }
    }

    /// Looks up a player's record.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&player)
    }

    /// Reports whether `player` is in the roster.
    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.contains_key(&player)
    }

    /// Number of admitted players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Reports whether nobody is admitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Reports whether the roster is non-empty and every player is downed.
    #[must_use]
    pub fn all_downed(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|record| record.downed)
    }

    /// Identifiers of every admitted player, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// Iterator over players and their records.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &PlayerRecord)> {
        self.players.iter().map(|(player, record)| (*player, record))
    }

    /// Top `limit` rows ranked by currency, ties broken by identifier.
    #[must_use]
    pub fn scoreboard(&self, limit: usize) -> Vec<ScoreboardRow> {
        let mut rows: Vec<ScoreboardRow> = self
            .iter()
            .map(|(player, record)| ScoreboardRow {
                player,
                display_name: record.display_name.clone(),
                currency: record.currency,
                kills: record.kills,
                deaths: record.deaths,
            })
            .collect();
        rows.sort_by(|a, b| b.currency.cmp(&a.currency).then(a.player.cmp(&b.player)));
        rows.truncate(limit);
        rows
    }

    fn update(&mut self, player: PlayerId, change: impl FnOnce(&mut PlayerRecord)) -> bool {
        match self.players.get_mut(&player) {
            Some(record) => {
                change(record);
                true
            }
            None => false,
        }
    }
}
