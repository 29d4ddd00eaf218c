#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative survival session for Holdout.
//!
//! A [`Session`] owns the roster, the spawn throttle, the boss encounter and
//! the wave index. Hosts drive it with [`apply`] or by calling its methods
//! directly; every decision is reported as an [`Event`].

mod cadence;
mod roster;

use std::time::Duration;

use holdout_core::{
    ActorId, Command, ConfigError, DamageKind, Event, GameHost, HudSnapshot, PlayerId, Position,
    SessionConfig, SessionState, StatsRetention, WaveCatalog, WaveDefinition, WaveIndex,
};
use holdout_system_boss::{BossEncounter, BossStatus};
use holdout_system_pursuit::{self as pursuit, HitResolution};
use holdout_system_rewards::{Recipient, RewardEngine};
use holdout_system_spawning::{LiveActor, SpawnRequest, SpawnThrottle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

use cadence::Cadences;
pub use roster::{Loadout, PlayerRecord, PlayerRoster};

/// Rows published on every scoreboard refresh.
pub const SCOREBOARD_ROWS: usize = 7;

/// One running survival encounter with its own roster and wave index.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    catalog: WaveCatalog,
    state: SessionState,
    wave: WaveIndex,
    waiting_since: Option<Duration>,
    roster: PlayerRoster,
    throttle: SpawnThrottle,
    boss: Option<BossEncounter>,
    rewards: RewardEngine,
    pending_removals: Vec<(ActorId, Option<PlayerId>)>,
    rng: ChaCha8Rng,
    cadences: Option<Cadences>,
}

impl Session {
    /// Creates a session waiting for players.
    pub fn new(config: SessionConfig, catalog: WaveCatalog) -> Result<Self, ConfigError> {
        config.validate()?;
        let roster = PlayerRoster::new(Loadout {
            spawn_position: config.spawn_position,
            starting_kit: config.starting_kit.clone(),
        });
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            cadences: Some(Cadences::new(&config.cadence)),
            config,
            catalog,
            state: SessionState::WaitingForPlayers,
            wave: WaveIndex::FIRST,
            waiting_since: None,
            roster,
            throttle: SpawnThrottle::new(),
            boss: None,
            rewards: RewardEngine::new(),
            pending_removals: Vec::new(),
        })
    }

    /// Validates raw wave definitions and creates a session over them.
    pub fn from_waves(
        config: SessionConfig,
        waves: Vec<WaveDefinition>,
    ) -> Result<Self, ConfigError> {
        let catalog = WaveCatalog::new(waves)?;
        Self::new(config, catalog)
    }

    /// Runs every periodic job that is due at `now`.
    ///
    /// The state machine runs first so boss, pursuit and display jobs observe
    /// the outcome of this tick. Does nothing once the session is shut down.
    pub fn advance<H>(&mut self, now: Duration, host: &mut H, out: &mut Vec<Event>)
    where
        H: GameHost + ?Sized,
    {
        let Some(cadences) = self.cadences.as_mut() else {
            return;
        };
        let due = cadences.poll(now);

        if due.state {
            self.tick(now, host, out);
        }
        if let Some(dt) = due.boss {
            self.tick_boss(dt, host, out);
        }
        if due.pursuit {
            self.retarget_pursuers(host);
        }
        if due.hud {
            self.refresh_hud(now, host);
        }
        if due.scoreboard {
            self.refresh_scoreboard(host);
        }
    }

    /// Evaluates the state machine once.
    ///
    /// Actor removals reported since the previous tick are applied first, so
    /// freed capacity is visible to the backlog drain of this tick.
    pub fn tick<H>(&mut self, now: Duration, host: &mut H, out: &mut Vec<Event>)
    where
        H: GameHost + ?Sized,
    {
        if self.cadences.is_none() {
            return;
        }
        self.apply_removals(host, out);

        if self.roster.is_empty() {
            if !self.is_pristine() {
                info!("roster empty; resetting session");
                self.reset(host, out);
            }
            return;
        }

        match self.state {
            SessionState::WaitingForPlayers => {
                if self.roster.len() >= self.config.required_players {
                    self.transition(SessionState::CountdownWave, out);
                }
            }
            SessionState::CountdownWave => {
                let Some(definition) = self.catalog.wave(self.wave) else {
                    error!(wave = %self.wave, "countdown toward a wave outside the catalog");
                    self.transition(SessionState::PlayersWin, out);
                    return;
                };
                let since = *self.waiting_since.get_or_insert(now);
                if now.saturating_sub(since) >= definition.countdown {
                    let next = if definition.is_boss_wave() {
                        SessionState::BossWave
                    } else {
                        SessionState::RunningWave
                    };
                    self.transition(next, out);
                }
            }
            SessionState::RunningWave | SessionState::BossWave => self.run_wave(now, host, out),
            SessionState::PlayersWin | SessionState::AllPlayersDead => {
                let since = *self.waiting_since.get_or_insert(now);
                if now.saturating_sub(since) >= self.config.linger {
                    info!(state = ?self.state, "linger expired; removing every player");
                    self.remove_all_players(host, out);
                    self.reset(host, out);
                }
            }
        }
    }

    /// Admits a player, returning `false` when they are already present or
    /// unknown to the host.
    pub fn add_player<H>(&mut self, player: PlayerId, host: &mut H, out: &mut Vec<Event>) -> bool
    where
        H: GameHost + ?Sized,
    {
        if self.cadences.is_none() {
            return false;
        }
        match self.roster.admit(player, host) {
            Ok(()) => {
                out.push(Event::PlayerAdmitted { player });
                true
            }
            Err(reason) => {
                out.push(Event::PlayerRejected { player, reason });
                false
            }
        }
    }

    /// Sends a player home and removes them, returning `false` when absent.
    pub fn remove_player<H>(&mut self, player: PlayerId, host: &mut H, out: &mut Vec<Event>) -> bool
    where
        H: GameHost + ?Sized,
    {
        if self.roster.remove(player, host).is_none() {
            return false;
        }
        out.push(Event::PlayerRemoved { player });
        true
    }

    /// Queues an actor removal for the next state tick.
    ///
    /// Returns whether the actor is currently tracked; unknown handles are
    /// accepted and ignored when the queue is applied. Reports after
    /// shutdown are dropped.
    pub fn report_actor_removed(&mut self, actor: ActorId, killer: Option<PlayerId>) -> bool {
        if self.cadences.is_none() {
            return false;
        }
        let tracked = self.throttle.get(actor).is_some() || self.is_boss(actor);
        self.pending_removals.push((actor, killer));
        tracked
    }

    /// Marks a player as downed; a death is counted only when they were standing.
    pub fn report_player_downed(&mut self, player: PlayerId, out: &mut Vec<Event>) -> bool {
        let Some(was_standing) = self.roster.mark_downed(player) else {
            return false;
        };
        if was_standing {
            let _ = self.roster.record_death(player);
        }
        debug!(player = player.get(), counted = was_standing, "player downed");
        out.push(Event::PlayerDowned {
            player,
            counted: was_standing,
        });
        true
    }

    /// Brings a respawned player back into the arena.
    pub fn report_player_respawned<H>(
        &mut self,
        player: PlayerId,
        host: &mut H,
        out: &mut Vec<Event>,
    ) -> bool
    where
        H: GameHost + ?Sized,
    {
        if !self.roster.respawn(player, host) {
            return false;
        }
        out.push(Event::PlayerRespawned { player });
        true
    }

    /// Queues raw damage dealt to the boss; other actors are ignored.
    pub fn report_boss_damaged(
        &mut self,
        actor: ActorId,
        raw_damage: f32,
        kind: DamageKind,
    ) -> bool {
        match self.boss.as_mut() {
            Some(boss) if boss.actor() == actor => {
                boss.record_damage(raw_damage, kind);
                true
            }
            _ => false,
        }
    }

    /// Resolves a hit dealt by `attacker` at `distance` metres.
    pub fn resolve_ranged_hit(&mut self, attacker: ActorId, distance: f32) -> HitResolution {
        match self.throttle.get(attacker) {
            Some(live) => {
                pursuit::resolve_ranged_hit(live.kind, &live.stats, distance, &mut self.rng)
            }
            None => HitResolution::Unmodified,
        }
    }

    /// Zeroes a roster player's kill and death counters.
    pub fn reset_stats(&mut self, player: PlayerId) -> bool {
        self.roster.reset_stats(player)
    }

    /// Makes `wave` the current wave; out-of-catalog indices are refused.
    pub fn debug_set_wave(&mut self, wave: WaveIndex, out: &mut Vec<Event>) -> bool {
        if !self.catalog.contains(wave) {
            warn!(%wave, waves = self.catalog.len(), "refusing to jump outside the catalog");
            return false;
        }
        self.wave = wave;
        self.rewards.reset();
        info!(%wave, "wave changed by operator");
        out.push(Event::WaveChanged { wave });
        true
    }

    /// Returns the session to `WaitingForPlayers` at the first wave.
    ///
    /// Every live actor is destroyed and the backlog dropped. Players stay
    /// admitted; their counters follow the configured retention policy.
    pub fn reset<H>(&mut self, host: &mut H, out: &mut Vec<Event>)
    where
        H: GameHost + ?Sized,
    {
        self.destroy_actors(host);
        self.wave = WaveIndex::FIRST;
        self.rewards.reset();
        if self.config.stats_retention == StatsRetention::ClearOnReset {
            self.roster.reset_all_stats();
        }
        self.transition(SessionState::WaitingForPlayers, out);
        self.waiting_since = None;
        info!("session reset");
        out.push(Event::SessionReset);
    }

    /// Tears the session down: every player and actor is removed and all
    /// periodic jobs stop.
    pub fn shutdown<H>(&mut self, host: &mut H, out: &mut Vec<Event>)
    where
        H: GameHost + ?Sized,
    {
        if self.cadences.is_none() {
            return;
        }
        self.remove_all_players(host, out);
        self.destroy_actors(host);
        self.cadences = None;
        self.waiting_since = None;
        self.state = SessionState::WaitingForPlayers;
        info!("session shut down");
        out.push(Event::SessionShutdown);
    }

    fn run_wave<H>(&mut self, now: Duration, host: &mut H, out: &mut Vec<Event>)
    where
        H: GameHost + ?Sized,
    {
        let Some(definition) = self.catalog.wave(self.wave) else {
            error!(wave = %self.wave, "running a wave outside the catalog");
            self.transition(SessionState::PlayersWin, out);
            return;
        };

        let mut create = |request: &SpawnRequest| {
            host.create_actor(&request.archetype, request.location, &request.stats)
        };
        if self.waiting_since.is_none() {
            self.waiting_since = Some(now);
            self.throttle.admit_wave(
                self.wave,
                definition,
                self.roster.len(),
                &mut self.rng,
                &mut create,
                out,
            );
            if let Some(template) = definition.boss_template() {
                self.boss = template.boss_profile().and_then(|profile| {
                    let spawned = BossEncounter::spawn(
                        template,
                        profile,
                        self.roster.len(),
                        &mut self.rng,
                        |location, stats| host.create_actor(&template.archetype, location, stats),
                    );
                    match spawned {
                        Ok(boss) => {
                            out.push(Event::BossSpawned {
                                actor: boss.actor(),
                                health: boss.max_health(),
                            });
                            Some(boss)
                        }
                        Err(err) => {
                            warn!(%err, "boss could not be created; wave counts as cleared");
                            None
                        }
                    }
                });
            }
        } else {
            self.throttle.drain_backlog(&mut create, out);
        }

        if self.boss.is_none() && self.throttle.is_clear() {
            self.clear_wave(host, out);
        } else if self.roster.all_downed() {
            self.transition(SessionState::AllPlayersDead, out);
        }
    }

    fn clear_wave<H>(&mut self, host: &mut H, out: &mut Vec<Event>)
    where
        H: GameHost + ?Sized,
    {
        let wave = self.wave;
        info!(%wave, "wave cleared");
        out.push(Event::WaveCleared { wave });

        if let Some(definition) = self.catalog.wave(wave) {
            let recipients: Vec<Recipient> = self
                .roster
                .iter()
                .map(|(player, record)| Recipient {
                    player,
                    downed: record.is_downed(),
                })
                .collect();
            let currency_item = &self.config.currency_item;
            let roster = &mut self.roster;
            self.rewards.distribute(
                wave,
                &definition.rewards,
                &recipients,
                |player, line| {
                    host.grant_reward(player, &line.item, line.amount, line.skin)?;
                    if &line.item == currency_item {
                        let _ = roster.credit(player, line.amount);
                    }
                    Ok(())
                },
                out,
            );
        }

        for player in self.roster.ids() {
            host.reset_health(player);
        }
        self.roster.stand_all();

        self.wave = wave.next();
        if self.catalog.contains(self.wave) {
            self.transition(SessionState::CountdownWave, out);
        } else {
            self.transition(SessionState::PlayersWin, out);
        }
    }

    fn apply_removals<H>(&mut self, host: &mut H, out: &mut Vec<Event>)
    where
        H: GameHost + ?Sized,
    {
        for (actor, killer) in std::mem::take(&mut self.pending_removals) {
            if self.is_boss(actor) {
                if let Some(boss) = self.boss.take() {
                    self.defeat_boss(boss, host, out);
                }
                continue;
            }
            let Some(live) = self.throttle.remove(actor) else {
                debug!(actor = actor.get(), "ignoring removal of untracked actor");
                continue;
            };
            out.push(Event::ActorRemoved { actor });
            if let Some(player) = killer {
                self.credit_kill(player, actor, &live, host, out);
            }
        }
    }

    fn credit_kill<H>(
        &mut self,
        player: PlayerId,
        actor: ActorId,
        live: &LiveActor,
        host: &mut H,
        out: &mut Vec<Event>,
    ) where
        H: GameHost + ?Sized,
    {
        if !self.roster.record_kill(player) {
            return;
        }
        let mut loot = 0;
        if live.loot.drops_anything() {
            let amount = self.rng.gen_range(live.loot.min..=live.loot.max);
            match host.grant_reward(player, &self.config.currency_item, amount, None) {
                Ok(()) => {
                    let _ = self.roster.credit(player, amount);
                    loot = amount;
                }
                Err(err) => warn!(player = player.get(), %err, "kill loot grant failed"),
            }
        }
        out.push(Event::KillCredited {
            player,
            actor,
            loot,
        });
    }

    fn tick_boss<H>(&mut self, dt: Duration, host: &mut H, out: &mut Vec<Event>)
    where
        H: GameHost + ?Sized,
    {
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        let actor = boss.actor();
        let observation = host.observe_boss(actor);
        let mut commands = Vec::new();
        let status = boss.tick(dt, observation.as_ref(), &mut commands);
        for command in &commands {
            host.command_boss(actor, command);
        }

        if status == BossStatus::Defeated {
            if let Some(boss) = self.boss.take() {
                host.destroy_actor(actor);
                self.defeat_boss(boss, host, out);
            }
        }
    }

    fn defeat_boss<H>(&mut self, boss: BossEncounter, host: &mut H, out: &mut Vec<Event>)
    where
        H: GameHost + ?Sized,
    {
        let loot = boss.drop_loot(&mut self.rng);
        for container in &loot {
            if let Err(err) = host.spawn_loot_container(container) {
                warn!(%err, "loot container dropped");
            }
        }
        info!(
            actor = boss.actor().get(),
            containers = loot.len(),
            "boss defeated"
        );
        out.push(Event::BossDefeated {
            actor: boss.actor(),
            loot,
        });
    }

    fn retarget_pursuers<H>(&mut self, host: &mut H)
    where
        H: GameHost + ?Sized,
    {
        if self.throttle.live_count() == 0 {
            return;
        }
        let players: Vec<(PlayerId, Position)> = self
            .roster
            .ids()
            .into_iter()
            .filter_map(|player| {
                host.describe_player(player)
                    .map(|snapshot| (player, snapshot.position))
            })
            .collect();
        let mut orders = Vec::new();
        pursuit::retarget(
            self.throttle.live().map(|(actor, live)| (actor, live.kind)),
            &players,
            &mut self.rng,
            &mut orders,
        );
        for order in orders {
            host.set_actor_destination(order.actor, order.destination);
        }
    }

    fn refresh_hud<H>(&self, now: Duration, host: &mut H)
    where
        H: GameHost + ?Sized,
    {
        if self.roster.is_empty() {
            return;
        }
        let hud = HudSnapshot {
            time_remaining: query::time_remaining(self, now),
            objective: query::objective_text(self),
            progress: query::progress_percent(self),
        };
        for player in self.roster.ids() {
            host.display_hud(player, &hud);
        }
    }

    fn refresh_scoreboard<H>(&self, host: &mut H)
    where
        H: GameHost + ?Sized,
    {
        if self.roster.is_empty() {
            return;
        }
        let rows = self.roster.scoreboard(SCOREBOARD_ROWS);
        host.display_scoreboard(&self.roster.ids(), &rows);
    }

    fn remove_all_players<H>(&mut self, host: &mut H, out: &mut Vec<Event>)
    where
        H: GameHost + ?Sized,
    {
        for player in self.roster.remove_all(host) {
            out.push(Event::PlayerRemoved { player });
        }
    }

    fn destroy_actors<H>(&mut self, host: &mut H)
    where
        H: GameHost + ?Sized,
    {
        for actor in self.throttle.clear() {
            host.destroy_actor(actor);
        }
        if let Some(boss) = self.boss.take() {
            host.destroy_actor(boss.actor());
        }
        self.pending_removals.clear();
    }

    fn transition(&mut self, to: SessionState, out: &mut Vec<Event>) {
        let from = self.state;
        if from == to {
            return;
        }
        info!(?from, ?to, wave = %self.wave, "state changed");
        self.state = to;
        self.waiting_since = None;
        out.push(Event::StateChanged { from, to });
    }

    fn is_boss(&self, actor: ActorId) -> bool {
        self.boss.as_ref().is_some_and(|boss| boss.actor() == actor)
    }

    fn is_pristine(&self) -> bool {
        self.state == SessionState::WaitingForPlayers
            && self.wave == WaveIndex::FIRST
            && self.boss.is_none()
            && self.throttle.is_clear()
    }
}

/// Applies a host command to the session.
pub fn apply<H>(session: &mut Session, command: Command, host: &mut H, out: &mut Vec<Event>)
where
    H: GameHost + ?Sized,
{
    match command {
        Command::AddPlayer { player } => {
            let _ = session.add_player(player, host, out);
        }
        Command::RemovePlayer { player } => {
            let _ = session.remove_player(player, host, out);
        }
        Command::Tick { now } => session.advance(now, host, out),
        Command::ActorRemoved { actor, killer } => {
            let _ = session.report_actor_removed(actor, killer);
        }
        Command::PlayerDowned { player } => {
            let _ = session.report_player_downed(player, out);
        }
        Command::PlayerRespawned { player } => {
            let _ = session.report_player_respawned(player, host, out);
        }
        Command::BossDamaged {
            actor,
            raw_damage,
            kind,
        } => {
            let _ = session.report_boss_damaged(actor, raw_damage, kind);
        }
        Command::DebugSetWave { wave } => {
            let _ = session.debug_set_wave(wave, out);
        }
        Command::ResetStats { player } => {
            let _ = session.reset_stats(player);
        }
        Command::Reset => session.reset(host, out),
        Command::Shutdown => session.shutdown(host, out),
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::time::Duration;

    use holdout_core::{ScoreboardRow, SessionState, WaveIndex};
    use holdout_system_boss::BossEncounter;

    use super::{PlayerRoster, Session, SCOREBOARD_ROWS};

    /// Current lifecycle state.
    #[must_use]
    pub fn state(session: &Session) -> SessionState {
        session.state
    }

    /// Current zero-based wave index.
    #[must_use]
    pub fn wave(session: &Session) -> WaveIndex {
        session.wave
    }

    /// Timestamp latched on entry to the current timed or fighting state.
    #[must_use]
    pub fn waiting_since(session: &Session) -> Option<Duration> {
        session.waiting_since
    }

    /// Read-only access to the roster.
    #[must_use]
    pub fn roster(session: &Session) -> &PlayerRoster {
        &session.roster
    }

    /// Number of live regular actors.
    #[must_use]
    pub fn live_actor_count(session: &Session) -> usize {
        session.throttle.live_count()
    }

    /// Number of deferred spawn requests.
    #[must_use]
    pub fn backlog_len(session: &Session) -> usize {
        session.throttle.backlog_len()
    }

    /// The boss encounter, while one is alive.
    #[must_use]
    pub fn boss(session: &Session) -> Option<&BossEncounter> {
        session.boss.as_ref()
    }

    /// Reports whether the session has been shut down.
    #[must_use]
    pub fn is_shut_down(session: &Session) -> bool {
        session.cadences.is_none()
    }

    /// Objective line shown to every player.
    #[must_use]
    pub fn objective_text(session: &Session) -> String {
        let number = session.wave.number();
        match session.state {
            SessionState::WaitingForPlayers => format!(
                "Waiting for players {} / {}",
                session.roster.len(),
                session.config.required_players
            ),
            SessionState::CountdownWave => format!("Time until wave {number}"),
            SessionState::RunningWave => format!(
                "{} zombies remaining on wave {number}",
                session.throttle.outstanding()
            ),
            SessionState::BossWave => {
                let name = session
                    .boss
                    .as_ref()
                    .map(|boss| boss.display_name().to_owned())
                    .or_else(|| {
                        session
                            .catalog
                            .wave(session.wave)
                            .and_then(|wave| wave.boss_template())
                            .map(|template| template.archetype.display_name.clone())
                    })
                    .unwrap_or_default();
                format!("1 {name} remaining on wave {number}")
            }
            SessionState::AllPlayersDead => "Game ending: all players have been killed".to_owned(),
            SessionState::PlayersWin => "Game ending: all waves have been defeated".to_owned(),
        }
    }

    /// Whole seconds left on the active timer, rounded up; zero for untimed states.
    #[must_use]
    pub fn time_remaining(session: &Session, now: Duration) -> u64 {
        let limit = match session.state {
            SessionState::CountdownWave => session
                .catalog
                .wave(session.wave)
                .map_or(Duration::ZERO, |wave| wave.countdown),
            SessionState::PlayersWin | SessionState::AllPlayersDead => session.config.linger,
            SessionState::WaitingForPlayers
            | SessionState::RunningWave
            | SessionState::BossWave => return 0,
        };
        let elapsed = session
            .waiting_since
            .map_or(Duration::ZERO, |since| now.saturating_sub(since));
        let left = limit.saturating_sub(elapsed);
        left.as_secs() + u64::from(left.subsec_nanos() > 0)
    }

    /// Boss health percentage during a boss wave, zero otherwise.
    #[must_use]
    pub fn progress_percent(session: &Session) -> f32 {
        match (session.state, session.boss.as_ref()) {
            (SessionState::BossWave, Some(boss)) => boss.progress_percent(),
            _ => 0.0,
        }
    }

    /// Scoreboard rows as published to players.
    #[must_use]
    pub fn scoreboard(session: &Session) -> Vec<ScoreboardRow> {
        session.roster.scoreboard(SCOREBOARD_ROWS)
    }
}
