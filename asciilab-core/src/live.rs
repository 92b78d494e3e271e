//! Live preview event loop (made by FontLab https://www.fontlab.com/)
//!
//! Runs on a single cooperative task: user commands come in over an
//! unbounded channel, renders go out through `watch` channels. Bursts of
//! changes collapse into one render per quiet period. Only parameter changes
//! move the render deadline; other commands are handled without delaying it.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};

use crate::engine::RenderEngine;
use crate::probe::TypefaceProbe;
use crate::scheduler::{RenderPhase, RenderScheduler, RenderToken, ScheduleEvent, QUIET_PERIOD};
use crate::session::{Change, Preview, Session};
use crate::store::KeyValueStore;

/// Input to the live preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Change(Change),
    /// Put a typeface outside the catalog up for selection.
    Offer(String),
    Search(String),
    ToggleFavorite(String),
    ClearHistory,
    /// Render again with unchanged parameters.
    Rerender,
}

/// Receiving ends a presentation layer watches.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    pub preview: watch::Receiver<Preview>,
    /// Encoded parameters, updated on every change.
    pub fragment: watch::Receiver<String>,
}

pub struct LivePreview<P, E, S> {
    session: Session<P, E, S>,
    scheduler: RenderScheduler,
    quiet_period: Duration,
    /// When the pending render may start.
    deadline: Instant,
    preview_tx: watch::Sender<Preview>,
    fragment_tx: watch::Sender<String>,
}

impl<P, E, S> LivePreview<P, E, S>
where
    P: TypefaceProbe,
    E: RenderEngine,
    S: KeyValueStore,
{
    pub fn new(session: Session<P, E, S>) -> (Self, PreviewHandle) {
        let (preview_tx, preview) = watch::channel(session.preview().clone());
        let (fragment_tx, fragment) = watch::channel(session.fragment());
        let live = Self {
            session,
            scheduler: RenderScheduler::new(),
            quiet_period: QUIET_PERIOD,
            deadline: Instant::now(),
            preview_tx,
            fragment_tx,
        };
        (live, PreviewHandle { preview, fragment })
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Drive the session until `commands` closes. A render still pending at
    /// that point is flushed before the session is handed back.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) -> Session<P, E, S> {
        self.scheduler.schedule_render();
        self.restart_quiet_period();
        self.publish_preview();
        let mut open = true;

        loop {
            match (self.scheduler.pending(), open) {
                (Some(token), true) => {
                    tokio::select! {
                        biased;
                        cmd = commands.recv() => match cmd {
                            Some(cmd) => self.handle(cmd).await,
                            None => open = false,
                        },
                        _ = sleep_until(self.deadline) => {
                            self.fire(token, &mut commands).await;
                        }
                    }
                }
                (Some(token), false) => {
                    sleep_until(self.deadline).await;
                    self.fire(token, &mut commands).await;
                }
                (None, true) => match commands.recv().await {
                    Some(cmd) => self.handle(cmd).await,
                    None => open = false,
                },
                (None, false) => break,
            }
        }

        tracing::debug!("live preview stopped");
        self.session
    }

    async fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Change(change) => {
                if self.session.apply(change) {
                    self.parameter_changed();
                    self.publish_fragment();
                }
            }
            Command::Offer(name) => {
                if !self.session.offer_typeface(&name)
                    && !self.session.catalog().is_offered(&name)
                {
                    tracing::warn!(typeface = %name, "typeface is excluded for this session");
                }
            }
            Command::Search(search) => self.session.set_search(&search),
            Command::ToggleFavorite(name) => {
                self.session.toggle_favorite(&name).await;
            }
            Command::ClearHistory => self.session.clear_history().await,
            Command::Rerender => self.parameter_changed(),
        }
        self.publish_preview();
    }

    fn parameter_changed(&mut self) {
        self.scheduler.handle(ScheduleEvent::ParameterChanged);
        self.restart_quiet_period();
    }

    fn restart_quiet_period(&mut self) {
        self.deadline = Instant::now() + self.quiet_period;
    }

    async fn fire(&mut self, token: RenderToken, commands: &mut mpsc::UnboundedReceiver<Command>) {
        let Some(token) = self
            .scheduler
            .handle(ScheduleEvent::QuietPeriodElapsed(token))
        else {
            return;
        };
        self.publish_preview();

        let snapshot = self.session.params().clone();
        let outcome = self.session.render(&snapshot).await;

        // Input that queued up while rendering must land before the commit
        // so history is not written for parameters the user already left.
        while let Ok(cmd) = commands.try_recv() {
            self.handle(cmd).await;
        }

        let event = match self.session.commit(&snapshot, outcome).await {
            RenderPhase::Failed => ScheduleEvent::RenderFailed(token),
            _ => ScheduleEvent::RenderSucceeded(token),
        };
        self.scheduler.handle(event);
        if self.scheduler.pending().is_some() {
            // Changes absorbed mid-render get a full window from here.
            self.restart_quiet_period();
        }
        self.publish_fragment();
        self.publish_preview();
    }

    fn publish_preview(&self) {
        let mut preview = self.session.preview().clone();
        preview.busy = self.scheduler.is_busy();
        preview.phase = self.scheduler.phase();
        self.preview_tx.send_replace(preview);
    }

    fn publish_fragment(&self) {
        let fragment = self.session.fragment();
        self.fragment_tx.send_if_modified(|current| {
            if *current == fragment {
                false
            } else {
                *current = fragment;
                true
            }
        });
    }
}
