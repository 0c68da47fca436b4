#![forbid(unsafe_code)]

//! Drag session tracking.
//!
//! ```text
//! Idle -> Dragging -> Idle   (end: frozen session handed to the executor)
//!            \-----> Idle    (cancel: no move)
//! ```
//!
//! # Invariants
//!
//! 1. At most one session exists; `begin` while dragging is rejected.
//! 2. The source reference and the payload snapshot never change for the
//!    lifetime of a session.
//! 3. A session is consumed exactly once, by `end` or `cancel`.

use pricedeck_core::{ContainerId, EngineError, ItemId, ItemRef, Point, PricePayload, Result};
use serde::{Deserialize, Serialize};

/// The drop target currently under the pointer.
///
/// `item == None` means "empty space in the container": drop at the end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropCandidate {
    pub container: ContainerId,
    pub item: Option<ItemId>,
}

impl DropCandidate {
    /// Candidate naming a specific item.
    pub fn item(container: impl Into<ContainerId>, item: impl Into<ItemId>) -> Self {
        Self {
            container: container.into(),
            item: Some(item.into()),
        }
    }

    /// Candidate naming the empty space of a container.
    pub fn container(container: impl Into<ContainerId>) -> Self {
        Self {
            container: container.into(),
            item: None,
        }
    }

    /// Whether this candidate is exactly `item_ref`.
    #[must_use]
    pub fn is_item(&self, item_ref: &ItemRef) -> bool {
        self.container == item_ref.container && self.item.as_ref() == Some(&item_ref.item)
    }
}

/// An open drag session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    source: ItemRef,
    payload: PricePayload,
    grab_offset: Point,
    candidate: Option<DropCandidate>,
    sequence: u64,
}

impl DragSession {
    /// Where the dragged item was picked up from.
    #[must_use]
    pub const fn source(&self) -> &ItemRef {
        &self.source
    }

    /// Display payload as of pick-up.
    #[must_use]
    pub const fn payload(&self) -> &PricePayload {
        &self.payload
    }

    /// Pointer position relative to the item's top-left corner at pick-up.
    #[must_use]
    pub const fn grab_offset(&self) -> Point {
        self.grab_offset
    }

    /// Current candidate, if any surface is under the pointer.
    #[must_use]
    pub const fn candidate(&self) -> Option<&DropCandidate> {
        self.candidate.as_ref()
    }

    /// Monotonic id of this session within its tracker.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// A session frozen at release, ready for the move executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedSession {
    pub source: ItemRef,
    pub candidate: Option<DropCandidate>,
    pub sequence: u64,
}

impl ClosedSession {
    pub fn new(source: ItemRef, candidate: Option<DropCandidate>) -> Self {
        Self {
            source,
            candidate,
            sequence: 0,
        }
    }
}

/// Single-session drag state machine.
#[derive(Debug, Clone, Default)]
pub struct DragSessionTracker {
    active: Option<DragSession>,
    sessions_started: u64,
}

impl DragSessionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// The open session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        self.active.as_ref()
    }

    /// Human-readable state name used in errors and logs.
    #[must_use]
    pub const fn state_name(&self) -> &'static str {
        if self.active.is_some() { "dragging" } else { "idle" }
    }

    /// Open a session for `source`.
    pub fn begin(
        &mut self,
        source: ItemRef,
        payload: PricePayload,
        grab_offset: Point,
    ) -> Result<&DragSession> {
        if self.active.is_some() {
            return Err(EngineError::invalid_state("begin", "dragging"));
        }
        self.sessions_started = self.sessions_started.saturating_add(1);
        Ok(&*self.active.insert(DragSession {
            source,
            payload,
            grab_offset,
            candidate: None,
            sequence: self.sessions_started,
        }))
    }

    /// Replace the current candidate. Returns `true` if it changed.
    pub fn update_candidate(&mut self, candidate: Option<DropCandidate>) -> Result<bool> {
        let session = self
            .active
            .as_mut()
            .ok_or(EngineError::invalid_state("update_candidate", "idle"))?;
        if session.candidate == candidate {
            return Ok(false);
        }
        session.candidate = candidate;
        Ok(true)
    }

    /// Close the session and hand its frozen state to the caller.
    pub fn end(&mut self) -> Result<ClosedSession> {
        let session = self
            .active
            .take()
            .ok_or(EngineError::invalid_state("end", "idle"))?;
        Ok(ClosedSession {
            source: session.source,
            candidate: session.candidate,
            sequence: session.sequence,
        })
    }

    /// Abort the session without producing a move.
    pub fn cancel(&mut self) -> Result<DragSession> {
        self.active
            .take()
            .ok_or(EngineError::invalid_state("cancel", "idle"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricedeck_core::ErrorKind;

    fn payload() -> PricePayload {
        PricePayload::new("Oreo", 276, "COOKIES")
    }

    fn source() -> ItemRef {
        ItemRef::new("tierA", "p1")
    }

    #[test]
    fn begin_opens_session_with_empty_candidate() {
        let mut tracker = DragSessionTracker::new();
        let session = tracker.begin(source(), payload(), Point::new(3, 4)).unwrap();
        assert_eq!(session.source(), &source());
        assert_eq!(session.candidate(), None);
        assert_eq!(session.grab_offset(), Point::new(3, 4));
        assert_eq!(session.sequence(), 1);
        assert!(tracker.is_dragging());
        assert_eq!(tracker.state_name(), "dragging");
    }

    #[test]
    fn begin_twice_is_invalid_state() {
        let mut tracker = DragSessionTracker::new();
        tracker.begin(source(), payload(), Point::default()).unwrap();
        let err = tracker
            .begin(ItemRef::new("tierB", "p4"), payload(), Point::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        // The original session survives.
        assert_eq!(tracker.session().unwrap().source(), &source());
    }

    #[test]
    fn update_candidate_reports_changes() {
        let mut tracker = DragSessionTracker::new();
        tracker.begin(source(), payload(), Point::default()).unwrap();
        let over_p3 = Some(DropCandidate::item("tierA", "p3"));
        assert!(tracker.update_candidate(over_p3.clone()).unwrap());
        assert!(!tracker.update_candidate(over_p3).unwrap());
        assert!(tracker.update_candidate(None).unwrap());
        assert_eq!(tracker.session().unwrap().candidate(), None);
    }

    #[test]
    fn update_candidate_while_idle_is_invalid_state() {
        let mut tracker = DragSessionTracker::new();
        let err = tracker
            .update_candidate(Some(DropCandidate::container("tierA")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn end_returns_last_candidate_and_goes_idle() {
        let mut tracker = DragSessionTracker::new();
        tracker.begin(source(), payload(), Point::default()).unwrap();
        tracker
            .update_candidate(Some(DropCandidate::container("tierB")))
            .unwrap();
        let closed = tracker.end().unwrap();
        assert_eq!(closed.source, source());
        assert_eq!(closed.candidate, Some(DropCandidate::container("tierB")));
        assert!(!tracker.is_dragging());
        assert_eq!(tracker.end().unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn cancel_discards_session() {
        let mut tracker = DragSessionTracker::new();
        tracker.begin(source(), payload(), Point::default()).unwrap();
        let dropped = tracker.cancel().unwrap();
        assert_eq!(dropped.source(), &source());
        assert!(!tracker.is_dragging());
        assert_eq!(tracker.cancel().unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn new_session_after_close_gets_fresh_sequence() {
        let mut tracker = DragSessionTracker::new();
        tracker.begin(source(), payload(), Point::default()).unwrap();
        tracker.cancel().unwrap();
        let second = tracker.begin(source(), payload(), Point::default()).unwrap();
        assert_eq!(second.sequence(), 2);
    }

    #[test]
    fn candidate_is_item_uses_composite_identity() {
        let candidate = DropCandidate::item("tierB", "p1");
        assert!(!candidate.is_item(&ItemRef::new("tierA", "p1")));
        assert!(candidate.is_item(&ItemRef::new("tierB", "p1")));
    }
}
