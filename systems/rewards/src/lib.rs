#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave-clearance reward distribution.

use holdout_core::{Event, HostError, PlayerId, RewardLine, WaveIndex};
use tracing::{info, warn};

/// Roster member considered for a reward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recipient {
    /// Player that may receive the reward.
    pub player: PlayerId,
    /// Downed players are skipped.
    pub downed: bool,
}

/// Grants the reward list of a cleared wave at most once per wave index.
#[derive(Debug, Default)]
pub struct RewardEngine {
    last_rewarded: Option<WaveIndex>,
}

impl RewardEngine {
    /// Creates an engine that has not rewarded any wave yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants every line of `rewards` to each standing recipient.
    ///
    /// A second call for the wave that was rewarded last does nothing. Failed
    /// grants are logged and skipped.
    pub fn distribute<F>(
        &mut self,
        wave: WaveIndex,
        rewards: &[RewardLine],
        recipients: &[Recipient],
        mut grant: F,
        out: &mut Vec<Event>,
    ) where
        F: FnMut(PlayerId, &RewardLine) -> Result<(), HostError>,
    {
        if self.last_rewarded == Some(wave) {
            warn!(%wave, "rewards already distributed");
            return;
        }
        self.last_rewarded = Some(wave);

        for recipient in recipients.iter().filter(|recipient| !recipient.downed) {
            for line in rewards {
                match grant(recipient.player, line) {
                    Ok(()) => out.push(Event::RewardGranted {
                        player: recipient.player,
                        item: line.item.clone(),
                        amount: line.amount,
                    }),
                    Err(err) => warn!(
                        player = recipient.player.get(),
                        %err,
                        "reward grant failed"
                    ),
                }
            }
        }
        info!(
            %wave,
            lines = rewards.len(),
            recipients = recipients.len(),
            "wave rewards distributed"
        );
    }

    /// Wave most recently rewarded.
    #[must_use]
    pub fn last_rewarded(&self) -> Option<WaveIndex> {
        self.last_rewarded
    }

    /// Forgets the guard so the next clearance of any wave is rewarded.
    pub fn reset(&mut self) {
        self.last_rewarded = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_forgets_guard() {
        let mut engine = RewardEngine::new();
        let mut out = Vec::new();
        engine.distribute(WaveIndex::FIRST, &[], &[], |_, _| Ok(()), &mut out);
        assert_eq!(engine.last_rewarded(), Some(WaveIndex::FIRST));
        engine.reset();
        assert_eq!(engine.last_rewarded(), None);
    }
}
