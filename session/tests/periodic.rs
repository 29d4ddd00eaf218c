mod support;

use std::time::Duration;

use holdout_core::{ActorId, Command, Event, HudSnapshot, PlayerId, SessionState, WaveIndex};
use holdout_session::{apply, query};
use holdout_system_pursuit::HitResolution;
use support::{admit_all, melee, session, wave, FakeHost, SPAWN};

fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn hud_counts_down_toward_the_next_wave() {
    let mut session = session(vec![wave(5, 3, vec![melee("Attack Zombie", 1.0, (2, 7))])]);
    let mut host = FakeHost::with_players(&[1]);
    let mut events = Vec::new();
    admit_all(&mut session, &mut host, &[1]);

    for now in [0, 1_000, 2_000] {
        session.advance(millis(now), &mut host, &mut events);
    }

    let remaining: Vec<u64> = host.huds.iter().map(|(_, hud)| hud.time_remaining).collect();
    assert_eq!(remaining, vec![5, 5, 4]);
    assert_eq!(
        host.huds[0],
        (
            PlayerId::new(1),
            HudSnapshot {
                time_remaining: 5,
                objective: "Time until wave 1".to_owned(),
                progress: 0.0,
            }
        )
    );
}

#[test]
fn scoreboard_refreshes_on_its_own_interval() {
    let mut session = session(vec![wave(5, 3, vec![melee("Attack Zombie", 1.0, (2, 7))])]);
    let mut host = FakeHost::with_players(&[1, 2]);
    let mut events = Vec::new();
    admit_all(&mut session, &mut host, &[1, 2]);

    for now in (0..=3_000).step_by(500) {
        session.advance(millis(now), &mut host, &mut events);
    }

    assert_eq!(host.scoreboards.len(), 2);
    let names: Vec<&str> = host.scoreboards[0]
        .iter()
        .map(|row| row.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["survivor-1", "survivor-2"]);
    assert_eq!(host.scoreboards[0], query::scoreboard(&session));
}

#[test]
fn pursuers_are_sent_to_player_positions() {
    let mut session = session(vec![wave(5, 10, vec![melee("Attack Zombie", 2.0, (2, 7))])]);
    let mut host = FakeHost::with_players(&[1, 2]);
    let mut events = Vec::new();
    admit_all(&mut session, &mut host, &[1, 2]);

    for second in 0..=10 {
        session.advance(Duration::from_secs(second), &mut host, &mut events);
    }

    assert_eq!(query::state(&session), SessionState::RunningWave);
    assert_eq!(query::live_actor_count(&session), 4);
    let mut ordered: Vec<ActorId> = host.destinations.iter().map(|(actor, _)| *actor).collect();
    ordered.sort();
    assert_eq!(ordered, host.live_actors());
    assert!(host
        .destinations
        .iter()
        .all(|(_, destination)| *destination == SPAWN));
}

#[test]
fn hits_from_untracked_actors_are_left_alone() {
    let mut session = session(vec![wave(5, 3, vec![melee("Attack Zombie", 1.0, (2, 7))])]);
    assert_eq!(
        session.resolve_ranged_hit(ActorId::new(77), 250.0),
        HitResolution::Unmodified
    );
}

#[test]
fn commands_are_dispatched_until_shutdown() {
    let mut session = session(vec![
        wave(5, 3, vec![melee("Attack Zombie", 1.0, (2, 7))]),
        wave(5, 3, vec![melee("Attack Zombie", 1.0, (2, 7))]),
    ]);
    let mut host = FakeHost::with_players(&[1, 2]);
    let mut events = Vec::new();
    let player = PlayerId::new(1);

    apply(&mut session, Command::AddPlayer { player }, &mut host, &mut events);
    apply(&mut session, Command::Tick { now: Duration::ZERO }, &mut host, &mut events);
    apply(
        &mut session,
        Command::DebugSetWave {
            wave: WaveIndex::new(1),
        },
        &mut host,
        &mut events,
    );
    apply(
        &mut session,
        Command::DebugSetWave {
            wave: WaveIndex::new(2),
        },
        &mut host,
        &mut events,
    );
    assert_eq!(
        events,
        vec![
            Event::PlayerAdmitted { player },
            Event::StateChanged {
                from: SessionState::WaitingForPlayers,
                to: SessionState::CountdownWave,
            },
            Event::WaveChanged {
                wave: WaveIndex::new(1),
            },
        ]
    );
    assert_eq!(query::objective_text(&session), "Time until wave 2");

    events.clear();
    apply(&mut session, Command::Shutdown, &mut host, &mut events);
    assert!(query::is_shut_down(&session));
    assert_eq!(
        events,
        vec![Event::PlayerRemoved { player }, Event::SessionShutdown]
    );

    events.clear();
    let huds = host.huds.len();
    apply(
        &mut session,
        Command::AddPlayer {
            player: PlayerId::new(2),
        },
        &mut host,
        &mut events,
    );
    apply(
        &mut session,
        Command::Tick {
            now: Duration::from_secs(30),
        },
        &mut host,
        &mut events,
    );
    apply(&mut session, Command::Shutdown, &mut host, &mut events);
    assert!(events.is_empty());
    assert_eq!(host.huds.len(), huds);
    assert!(query::roster(&session).is_empty());
}
