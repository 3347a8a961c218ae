//! Query coalescing state machine.
//!
//! The coalescer owns no timers and performs no I/O. The session arms a timer
//! for every [`TimerToken`] it hands out, reports back when the timer fires,
//! and reports every fetch completion with the [`QuerySeq`] it was issued
//! under. Only the latest issued sequence number is ever published. That
//! check, not cancellation, is what keeps stale responses out.
//!
//! ```text
//!   Idle ──edit──▶ Scheduled ──timer──▶ InFlight ──response──▶ Idle
//!                    ▲   │edit                │edit
//!                    └───┘                    ▼
//!                                          Scheduled (in-flight seq is now stale)
//! ```
//!
//! Every transition takes `&mut self`, so the timer path and the response
//! path can never interleave on the shared sequence counter.

use crate::core::criteria::FilterCriteria;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalescerState {
    Idle,
    Scheduled,
    InFlight,
}

/// Identifies one arming of the quiescence timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

/// Monotonically increasing request sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuerySeq(pub u64);

impl fmt::Display for QuerySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
    /// Unfiltered `GET /universities`.
    Listing,
    /// `GET /universities/filter` built from these criteria.
    Filtered(FilterCriteria),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundQuery {
    pub seq: QuerySeq,
    pub kind: QueryKind,
}

/// Result of re-arming the timer after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rearmed {
    pub token: TimerToken,
    /// In-flight request whose response just became stale, if any.
    pub superseded: Option<QuerySeq>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseDisposition {
    Publish,
    Discard,
}

#[derive(Debug, Default)]
pub struct QueryCoalescer {
    next_token: u64,
    armed: Option<TimerToken>,
    pending: Option<FilterCriteria>,
    last_issued: u64,
    awaiting: Option<QuerySeq>,
    torn_down: bool,
}

impl QueryCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CoalescerState {
        if self.armed.is_some() {
            CoalescerState::Scheduled
        } else if self.awaiting.is_some() {
            CoalescerState::InFlight
        } else {
            CoalescerState::Idle
        }
    }

    pub fn last_issued(&self) -> Option<QuerySeq> {
        (self.last_issued > 0).then_some(QuerySeq(self.last_issued))
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Restarts the quiescence window with `criteria` as the query to send.
    /// Any in-flight request is superseded. Returns `None` after teardown.
    pub fn on_criteria_changed(&mut self, criteria: FilterCriteria) -> Option<Rearmed> {
        if self.torn_down {
            return None;
        }

        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let previous = self.state();
        self.armed = Some(token);
        self.pending = Some(criteria);
        let superseded = self.awaiting.take();

        tracing::debug!(
            ?previous,
            ?token,
            superseded = ?superseded,
            "quiescence timer re-armed"
        );
        Some(Rearmed { token, superseded })
    }

    /// Issues the unfiltered listing right away, bypassing the timer.
    pub fn issue_listing(&mut self) -> Option<OutboundQuery> {
        if self.torn_down {
            return None;
        }
        self.armed = None;
        self.pending = None;
        Some(self.issue(QueryKind::Listing))
    }

    /// Timer callback. Tokens from timers that were re-armed since are ignored.
    pub fn on_timer_fired(&mut self, token: TimerToken) -> Option<OutboundQuery> {
        if self.torn_down || self.armed != Some(token) {
            tracing::trace!(?token, "ignoring stale timer");
            return None;
        }
        self.armed = None;
        let criteria = self.pending.take()?;
        Some(self.issue(QueryKind::Filtered(criteria)))
    }

    /// Decides whether the response to `seq` may be applied.
    pub fn on_response(&mut self, seq: QuerySeq) -> ResponseDisposition {
        if !self.torn_down && self.awaiting == Some(seq) {
            self.awaiting = None;
            ResponseDisposition::Publish
        } else {
            tracing::debug!(%seq, latest = ?self.last_issued(), "discarding stale response");
            ResponseDisposition::Discard
        }
    }

    /// Cancels the pending timer and makes any in-flight response ignorable.
    /// Returns the abandoned in-flight sequence number, if any.
    pub fn teardown(&mut self) -> Option<QuerySeq> {
        self.torn_down = true;
        self.armed = None;
        self.pending = None;
        self.awaiting.take()
    }

    fn issue(&mut self, kind: QueryKind) -> OutboundQuery {
        self.last_issued += 1;
        let seq = QuerySeq(self.last_issued);
        self.awaiting = Some(seq);
        tracing::debug!(%seq, "query issued");
        OutboundQuery { seq, kind }
    }
}
