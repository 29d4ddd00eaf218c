//! Periodic jobs driven from a single host clock.

use std::time::Duration;

use holdout_core::CadenceConfig;

/// Repeating job that becomes due once its interval has elapsed.
#[derive(Clone, Copy, Debug)]
struct Cadence {
    interval: Duration,
    last_run: Option<Duration>,
}

impl Cadence {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    /// Time elapsed since the previous run when the job is due.
    ///
    /// The first poll is always due and reports one full interval.
    fn poll(&mut self, now: Duration) -> Option<Duration> {
        let elapsed = match self.last_run {
            None => self.interval,
            Some(last) => now.saturating_sub(last),
        };
        if elapsed < self.interval {
            return None;
        }
        self.last_run = Some(now);
        Some(elapsed)
    }
}

/// Jobs due on one call to `Session::advance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct DueJobs {
    pub(crate) state: bool,
    pub(crate) boss: Option<Duration>,
    pub(crate) pursuit: bool,
    pub(crate) hud: bool,
    pub(crate) scoreboard: bool,
}

/// Every periodic job owned by a session.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cadences {
    state: Cadence,
    boss: Cadence,
    pursuit: Cadence,
    hud: Cadence,
    scoreboard: Cadence,
}

impl Cadences {
    pub(crate) fn new(config: &CadenceConfig) -> Self {
        Self {
            state: Cadence::new(config.state),
            boss: Cadence::new(config.boss),
            pursuit: Cadence::new(config.pursuit),
            hud: Cadence::new(config.hud),
            scoreboard: Cadence::new(config.scoreboard),
        }
    }

    /// Runs each job at most once for `now`.
    pub(crate) fn poll(&mut self, now: Duration) -> DueJobs {
        DueJobs {
            state: self.state.poll(now).is_some(),
            boss: self.boss.poll(now),
            pursuit: self.pursuit.poll(now).is_some(),
            hud: self.hud.poll(now).is_some(),
            scoreboard: self.scoreboard.poll(now).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_poll_is_due_with_full_interval() {
        let mut cadence = Cadence::new(Duration::from_millis(100));
        assert_eq!(
            cadence.poll(Duration::from_secs(7)),
            Some(Duration::from_millis(100))
        );
        assert_eq!(cadence.poll(Duration::from_millis(7_050)), None);
        assert_eq!(
            cadence.poll(Duration::from_millis(7_250)),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn jobs_fire_on_their_own_intervals() {
        let mut cadences = Cadences::new(&CadenceConfig::default());
        let first = cadences.poll(Duration::ZERO);
        assert!(first.state && first.pursuit && first.hud && first.scoreboard);

        let later = cadences.poll(Duration::from_secs(1));
        assert!(later.state);
        assert!(later.hud);
        assert!(!later.pursuit);
        assert!(!later.scoreboard);
        assert_eq!(later.boss, Some(Duration::from_secs(1)));
    }
}
