//! Debounced render scheduling (made by FontLab https://www.fontlab.com/)
//!
//! Every parameter change issues a fresh [`RenderToken`]. Only the holder of
//! the latest token may start a render once the quiet period has elapsed;
//! older tokens are stale and their events are ignored. The scheduler knows
//! nothing about clocks, so the transitions are testable on their own.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Quiet period a burst of changes must settle for before rendering.
pub const QUIET_PERIOD: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPhase {
    #[default]
    Idle,
    Debouncing,
    Rendering,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleEvent {
    ParameterChanged,
    QuietPeriodElapsed(RenderToken),
    RenderSucceeded(RenderToken),
    RenderFailed(RenderToken),
}

#[derive(Debug, Default)]
pub struct RenderScheduler {
    phase: RenderPhase,
    issued: u64,
    pending: Option<RenderToken>,
    in_flight: Option<RenderToken>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// True while a render is in flight; drives the preview spinner.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Token waiting for its quiet period, if any.
    pub fn pending(&self) -> Option<RenderToken> {
        self.pending
    }

    /// Restart the quiet period; the previous pending token goes stale.
    pub fn schedule_render(&mut self) -> RenderToken {
        self.issued += 1;
        let token = RenderToken(self.issued);
        self.pending = Some(token);
        if self.in_flight.is_none() {
            self.phase = RenderPhase::Debouncing;
        }
        token
    }

    /// Feed one event. Returns the token of a render that should start now.
    pub fn handle(&mut self, event: ScheduleEvent) -> Option<RenderToken> {
        match event {
            ScheduleEvent::ParameterChanged => {
                self.schedule_render();
                None
            }
            ScheduleEvent::QuietPeriodElapsed(token) => {
                if self.pending != Some(token) || self.in_flight.is_some() {
                    return None;
                }
                self.pending = None;
                self.in_flight = Some(token);
                self.phase = RenderPhase::Rendering;
                Some(token)
            }
            ScheduleEvent::RenderSucceeded(token) => {
                self.finish(token, RenderPhase::Done);
                None
            }
            ScheduleEvent::RenderFailed(token) => {
                self.finish(token, RenderPhase::Failed);
                None
            }
        }
    }

    fn finish(&mut self, token: RenderToken, outcome: RenderPhase) {
        if self.in_flight != Some(token) {
            return;
        }
        self.in_flight = None;
        // A change that arrived mid-render starts its own window now.
        self.phase = if self.pending.is_some() {
            RenderPhase::Debouncing
        } else {
            outcome
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_token_starts_a_render() {
        let mut sched = RenderScheduler::new();
        let first = sched.schedule_render();
        let second = sched.schedule_render();

        assert_eq!(sched.phase(), RenderPhase::Debouncing);
        assert_eq!(sched.handle(ScheduleEvent::QuietPeriodElapsed(first)), None);
        assert_eq!(
            sched.handle(ScheduleEvent::QuietPeriodElapsed(second)),
            Some(second)
        );
        assert!(sched.is_busy());
        assert_eq!(sched.phase(), RenderPhase::Rendering);

        sched.handle(ScheduleEvent::RenderSucceeded(second));
        assert!(!sched.is_busy());
        assert_eq!(sched.phase(), RenderPhase::Done);
    }

    #[test]
    fn change_during_render_queues_next_window() {
        let mut sched = RenderScheduler::new();
        let token = sched.schedule_render();
        sched.handle(ScheduleEvent::QuietPeriodElapsed(token));

        sched.handle(ScheduleEvent::ParameterChanged);
        assert_eq!(sched.phase(), RenderPhase::Rendering);
        let next = sched.pending().expect("pending token");
        assert_eq!(sched.handle(ScheduleEvent::QuietPeriodElapsed(next)), None);

        sched.handle(ScheduleEvent::RenderFailed(token));
        assert_eq!(sched.phase(), RenderPhase::Debouncing);
        assert_eq!(sched.handle(ScheduleEvent::QuietPeriodElapsed(next)), Some(next));
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut sched = RenderScheduler::new();
        let token = sched.schedule_render();
        sched.handle(ScheduleEvent::QuietPeriodElapsed(token));

        sched.handle(ScheduleEvent::RenderSucceeded(RenderToken(99)));
        assert!(sched.is_busy());

        sched.handle(ScheduleEvent::RenderFailed(token));
        assert_eq!(sched.phase(), RenderPhase::Failed);
        assert!(!sched.is_busy());
    }
}
