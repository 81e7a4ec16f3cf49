//! # Timers
//!
//! Animation-completion side effects (focus moves, flag clearing) run after a
//! fixed delay. The scheduler is a virtual clock: the embedding shell calls
//! `advance` with real elapsed time, tests call it with whatever they like.

use serde::Serialize;

/// Work deferred until a transition window has elapsed.
///
/// `generation` ties the timer to the controller instance that scheduled it,
/// so timers left over from a previous page load are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Deferred {
    OverlayFocusFirst { generation: u64 },
    OverlayOpenSettled { generation: u64 },
    OverlayCloseSettled { generation: u64 },
    ThemeTransitionEnd { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending {
    id: TimerId,
    due: u64,
    work: Deferred,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the scheduler was created.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, delay_ms: u64, work: Deferred) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push(Pending {
            id,
            due: self.now + delay_ms,
            work,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        before != self.pending.len()
    }

    /// Moves the clock forward and returns the work that came due, ordered by
    /// due time and then by scheduling order.
    pub fn advance(&mut self, ms: u64) -> Vec<Deferred> {
        self.now += ms;
        let now = self.now;
        let mut due: Vec<Pending> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.due, p.id));
        due.into_iter().map(|p| p.work).collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Milliseconds until the next timer fires, if any.
    pub fn next_due_in(&self) -> Option<u64> {
        self.pending
            .iter()
            .map(|p| p.due.saturating_sub(self.now))
            .min()
    }
}
