//! Session configuration supplied alongside the wave catalog.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CatalogError, Position};

const DEFAULT_LINGER: Duration = Duration::from_secs(10);

/// Policy for kill and death counters when the session resets with players present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsRetention {
    /// Zero the counters of every remaining player.
    #[default]
    ClearOnReset,
    /// Keep the counters untouched.
    Retain,
}

/// Intervals of the periodic work driven by `Session::advance`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// State machine evaluation.
    pub state: Duration,
    /// Boss movement, aim and fire.
    pub boss: Duration,
    /// Objective, timer and progress refresh.
    pub hud: Duration,
    /// Scoreboard refresh.
    pub scoreboard: Duration,
    /// Re-targeting of pursuing units.
    pub pursuit: Duration,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            state: Duration::from_secs(1),
            boss: Duration::from_millis(100),
            hud: Duration::from_millis(900),
            scoreboard: Duration::from_secs(3),
            pursuit: Duration::from_secs(5),
        }
    }
}

impl CadenceConfig {
    fn first_zero(&self) -> Option<&'static str> {
        [
            ("state", self.state),
            ("boss", self.boss),
            ("hud", self.hud),
            ("scoreboard", self.scoreboard),
            ("pursuit", self.pursuit),
        ]
        .into_iter()
        .find(|(_, interval)| interval.is_zero())
        .map(|(name, _)| name)
    }
}

/// Tunables of a single survival session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Roster size required to leave `WaitingForPlayers`.
    pub required_players: usize,
    /// Where players are placed on admission and respawn.
    pub spawn_position: Position,
    /// Kit equipped on admission and respawn.
    pub starting_kit: Option<String>,
    /// Item identifier that counts toward a player's currency balance.
    pub currency_item: String,
    /// Wait before a finished session force-removes its players.
    pub linger: Duration,
    /// Periodic work intervals.
    pub cadence: CadenceConfig,
    /// Counter policy applied on reset.
    pub stats_retention: StatsRetention,
    /// Seed of the session's deterministic random stream.
    pub rng_seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            required_players: 1,
            spawn_position: Position::new(315.631, 3.77, -386.8645),
            starting_kit: Some("ZombieStart".to_owned()),
            currency_item: "scrap".to_owned(),
            linger: DEFAULT_LINGER,
            cadence: CadenceConfig::default(),
            stats_retention: StatsRetention::default(),
            rng_seed: 0x5eed_4011_d0d0,
        }
    }
}

impl SessionConfig {
    /// Checks the configuration for values that would stall the session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_players == 0 {
            return Err(ConfigError::NoPlayersRequired);
        }
        if let Some(cadence) = self.cadence.first_zero() {
            return Err(ConfigError::ZeroCadence { cadence });
        }
        Ok(())
    }
}

/// Reasons a session cannot be constructed.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The wave catalog failed validation.
    #[error("invalid wave catalog: {0}")]
    Catalog(#[from] CatalogError),
    /// A session that needs no players would start waves for an empty roster.
    #[error("required player count must be at least one")]
    NoPlayersRequired,
    /// A periodic job would fire continuously.
    #[error("{cadence} cadence interval must be non-zero")]
    ZeroCadence {
        /// Name of the offending cadence.
        cadence: &'static str,
    },
}
