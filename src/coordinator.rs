//! Pause negotiation: the host-authoritative state machine, the client
//! mirror and the resync-command scheduler.

use std::time::Instant;

use crate::config::{Settings, RESYNC_QUIET};
use crate::domain::{GameState, Peer, PeerId};

/// An accepted toggle, ready to broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub by: PeerId,
    pub paused: bool,
}

/// Host-side owner of the authoritative game state. All remote toggle
/// requests funnel through [`handle_toggle_request`], which is also the
/// authorization gate.
///
/// [`handle_toggle_request`]: PauseCoordinator::handle_toggle_request
#[derive(Debug)]
pub struct PauseCoordinator {
    state: GameState,
    last_by: Option<PeerId>,
}

impl PauseCoordinator {
    pub fn new(initial: GameState) -> Self {
        Self {
            state: initial,
            last_by: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Engine-driven transition (map load, return to menu). Does not
    /// produce a broadcast.
    pub fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    /// Peer that caused the most recent accepted toggle, if any.
    pub fn last_changed_by(&self) -> Option<PeerId> {
        self.last_by
    }

    /// Gate and apply a remote toggle request. Returns `None`, changing
    /// nothing, when the requester lacks privilege under the current
    /// settings or the session is in the menu.
    pub fn handle_toggle_request(
        &mut self,
        from: &Peer,
        settings: &Settings,
    ) -> Option<StateChange> {
        if !(from.admin || settings.allow_any_pause) {
            return None;
        }
        if !self.state.is_game() {
            return None;
        }
        Some(self.flip(from.id))
    }

    /// The host's own pause input. Skips the privilege gate but still
    /// refuses in the menu.
    pub fn toggle_local(&mut self, by: PeerId) -> Option<StateChange> {
        if !self.state.is_game() {
            return None;
        }
        Some(self.flip(by))
    }

    fn flip(&mut self, by: PeerId) -> StateChange {
        let paused = !self.state.is_paused();
        self.state = if paused {
            GameState::Paused
        } else {
            GameState::Playing
        };
        self.last_by = Some(by);
        StateChange { by, paused }
    }
}

/// Client-side shadow of the host's state, updated from broadcasts. May
/// lag the authoritative copy; it never leads it.
#[derive(Debug, Clone, Copy)]
pub struct PauseMirror {
    state: GameState,
}

impl PauseMirror {
    pub fn new(initial: GameState) -> Self {
        Self { state: initial }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Engine-driven transition, same as on the host.
    pub fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    /// Apply an authoritative flag from a state broadcast.
    pub fn apply(&mut self, paused: bool) {
        self.state = if paused {
            GameState::Paused
        } else {
            GameState::Playing
        };
    }
}

/// Outcome of a resync request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncDecision {
    /// Outside the quiet window; send the command immediately.
    SendNow,
    /// Inside the window with deferral enabled; a send is now pending at
    /// the given instant.
    ScheduledAt(Instant),
    /// A deferred send is already pending; this request folded into it.
    Coalesced,
    /// Inside the window with deferral disabled; dropped.
    Skipped,
}

/// Rate-limits engine-level resync commands to one per quiet window. At
/// most one deferred send is pending at a time; [`poll`] fires it.
///
/// [`poll`]: ResyncScheduler::poll
#[derive(Debug, Default)]
pub struct ResyncScheduler {
    last: Option<Instant>,
    pending: Option<Instant>,
}

impl ResyncScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instant the pending deferred send will fire, if one is queued.
    pub fn pending(&self) -> Option<Instant> {
        self.pending
    }

    /// Register that a resync is wanted now.
    pub fn request(&mut self, now: Instant, allow_defer: bool) -> ResyncDecision {
        let since = self.last.map(|last| now.saturating_duration_since(last));
        match since {
            None => self.send_now(now),
            Some(since) if since > RESYNC_QUIET => self.send_now(now),
            _ if !allow_defer => ResyncDecision::Skipped,
            _ if self.pending.is_some() => ResyncDecision::Coalesced,
            _ => {
                // self.last is Some here, or `since` would have been None.
                let at = self.last.unwrap_or(now) + RESYNC_QUIET;
                self.pending = Some(at);
                ResyncDecision::ScheduledAt(at)
            }
        }
    }

    /// Per-frame poll. Returns true exactly once when a deferred send
    /// falls due; the caller sends the command then.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(at) if now >= at => {
                self.pending = None;
                self.last = Some(now);
                true
            }
            _ => false,
        }
    }

    fn send_now(&mut self, now: Instant) -> ResyncDecision {
        self.last = Some(now);
        self.pending = None;
        ResyncDecision::SendNow
    }
}
