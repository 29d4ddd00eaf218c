use holdout_core::{Event, HostError, PlayerId, RewardLine, WaveIndex};
use holdout_system_rewards::{Recipient, RewardEngine};

fn recipients() -> Vec<Recipient> {
    vec![
        Recipient {
            player: PlayerId::new(1),
            downed: false,
        },
        Recipient {
            player: PlayerId::new(2),
            downed: true,
        },
        Recipient {
            player: PlayerId::new(3),
            downed: false,
        },
    ]
}

fn rewards() -> Vec<RewardLine> {
    vec![
        RewardLine::new("pistol.revolver", 1).with_skin(809_865_395),
        RewardLine::new("largemedkit", 1),
    ]
}

#[test]
fn downed_players_are_skipped() {
    let mut engine = RewardEngine::new();
    let mut granted = Vec::new();
    let mut events = Vec::new();

    engine.distribute(
        WaveIndex::new(1),
        &rewards(),
        &recipients(),
        |player, line| {
            granted.push((player, line.item.clone(), line.skin));
            Ok(())
        },
        &mut events,
    );

    assert_eq!(granted.len(), 4);
    assert!(granted.iter().all(|(player, _, _)| *player != PlayerId::new(2)));
    assert!(granted.contains(&(
        PlayerId::new(3),
        "pistol.revolver".to_owned(),
        Some(809_865_395)
    )));
    assert_eq!(events.len(), 4);
}

#[test]
fn second_distribution_for_same_wave_is_a_no_op() {
    let mut engine = RewardEngine::new();
    let mut grants = 0;
    let mut events = Vec::new();

    for _ in 0..2 {
        engine.distribute(
            WaveIndex::new(4),
            &rewards(),
            &recipients(),
            |_, _| {
                grants += 1;
                Ok(())
            },
            &mut events,
        );
    }

    assert_eq!(grants, 4);
    assert_eq!(events.len(), 4);

    engine.distribute(
        WaveIndex::new(5),
        &rewards(),
        &recipients(),
        |_, _| {
            grants += 1;
            Ok(())
        },
        &mut events,
    );
    assert_eq!(grants, 8);
}

#[test]
fn failed_grants_are_skipped() {
    let mut engine = RewardEngine::new();
    let mut events = Vec::new();

    engine.distribute(
        WaveIndex::FIRST,
        &rewards(),
        &recipients(),
        |_, line| {
            if line.item == "largemedkit" {
                Err(HostError::RewardGrant {
                    item: line.item.clone(),
                    reason: "inventory full".to_owned(),
                })
            } else {
                Ok(())
            }
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::RewardGranted {
                player: PlayerId::new(1),
                item: "pistol.revolver".to_owned(),
                amount: 1,
            },
            Event::RewardGranted {
                player: PlayerId::new(3),
                item: "pistol.revolver".to_owned(),
                amount: 1,
            },
        ]
    );
}
