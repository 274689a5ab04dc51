use std::time::Duration;

use tokio::time::Instant;

/// Default quiet period before a requested save runs.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(200);

/// Identifies one scheduled save. Only the most recently issued token can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveToken(u64);

/// Single-slot debounce timer.
///
/// Every [`schedule`](Debouncer::schedule) restarts the quiet period and
/// invalidates the previous token, so a burst of requests collapses into one
/// action that runs `delay` after the last request.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: Option<(SaveToken, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, now: Instant) -> SaveToken {
        self.generation += 1;
        let token = SaveToken(self.generation);
        self.pending = Some((token, now + self.delay));
        token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, deadline)| deadline)
    }

    pub fn pending_token(&self) -> Option<SaveToken> {
        self.pending.map(|(token, _)| token)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the pending slot if `token` is current and its deadline has
    /// passed. Returns whether the caller should run the action.
    pub fn fire(&mut self, token: SaveToken, now: Instant) -> bool {
        match self.pending {
            Some((current, deadline)) if current == token && now >= deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending action, if any.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DELAY)
    }
}
