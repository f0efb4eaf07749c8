//! The tracker owns the session state and is the only thing allowed to change it. Every change is
//! persisted through a [SessionStorage] before the call returns.

pub mod stats;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use stats::{compute_stats, Stats};
use tracing::{debug, info, instrument};

use crate::{
    storage::{
        entities::{OpenSessionEntity, SessionEntity, SessionState},
        session_storage::SessionStorage,
    },
    utils::clock::Clock,
};

/// Result of a tap. Taps that don't fit the current state are ignored, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    TappedIn(OpenSessionEntity),
    TappedOut(SessionEntity),
    /// Tap in while a session is already open. The open session is kept as is.
    AlreadyTappedIn(OpenSessionEntity),
    /// Tap out without an open session.
    NotTappedIn,
}

pub struct Tracker<S: SessionStorage> {
    storage: S,
    clock: Box<dyn Clock>,
    state: SessionState,
}

impl<S: SessionStorage> Tracker<S> {
    pub async fn load(storage: S, clock: Box<dyn Clock>) -> Self {
        let state = storage.load().await;
        Self {
            storage,
            clock,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_tapped_in(&self) -> bool {
        self.state.is_tapped_in()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.time()
    }

    /// Stats for the current moment, with days and months as seen from `tz`.
    pub fn stats_in<Tz: TimeZone>(&self, tz: &Tz) -> Stats {
        compute_stats(
            &self.state.sessions,
            self.state.open.as_ref(),
            &self.now().with_timezone(tz),
        )
    }

    #[instrument(skip(self))]
    pub async fn tap_in(&mut self) -> Result<TapOutcome> {
        if let Some(open) = &self.state.open {
            debug!("Ignoring tap in, already tapped in since {}", open.tap_in);
            return Ok(TapOutcome::AlreadyTappedIn(open.clone()));
        }

        let open = OpenSessionEntity {
            tap_in: self.clock.time(),
        };
        let state = SessionState {
            sessions: self.state.sessions.clone(),
            open: Some(open.clone()),
        };
        self.commit(state).await?;

        info!("Tapped in at {}", open.tap_in);
        Ok(TapOutcome::TappedIn(open))
    }

    #[instrument(skip(self))]
    pub async fn tap_out(&mut self) -> Result<TapOutcome> {
        let Some(open) = &self.state.open else {
            debug!("Ignoring tap out, not tapped in");
            return Ok(TapOutcome::NotTappedIn);
        };

        let session = open.clone().close(self.clock.time());
        let mut sessions = self.state.sessions.clone();
        sessions.push(session.clone());
        self.commit(SessionState {
            sessions,
            open: None,
        })
        .await?;

        info!(
            "Tapped out at {} after {:.2} hours",
            session.tap_out,
            session.hours()
        );
        Ok(TapOutcome::TappedOut(session))
    }

    /// Drops every session, open or not. Asking the user for confirmation is up to the caller.
    #[instrument(skip(self))]
    pub async fn clear_all(&mut self) -> Result<()> {
        self.storage.clear().await?;
        self.state = SessionState::default();
        info!("Cleared all sessions");
        Ok(())
    }

    /// The new state only replaces the current one once it is on disk.
    async fn commit(&mut self, state: SessionState) -> Result<()> {
        self.storage.save(&state).await?;
        self.state = state;
        Ok(())
    }

    /// Picks up changes another tapclock process might have made.
    pub async fn refresh(&mut self) {
        self.state = self.storage.load().await;
    }
}
