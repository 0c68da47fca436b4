#![forbid(unsafe_code)]

//! Overlay presentation for the item in flight.
//!
//! The overlay is a pure function of (session, registry, pointer): nothing
//! here writes back, and dropping a frame loses no state. The payload shown is
//! the one frozen at pick-up, so edits to the registry during a drag cannot
//! make the floating card flicker.

use pricedeck_core::{ItemRef, Point, PricePayload, Rect, Registry};
use serde::{Deserialize, Serialize};

use crate::session::{DragSession, DropCandidate};

/// Size and dimming for the floating card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub width: u32,
    pub height: u32,
    /// Opacity applied to the slot the item was lifted from.
    pub source_opacity: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            width: 240,
            height: 72,
            source_opacity: 0.5,
        }
    }
}

impl OverlayStyle {
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_source_opacity(mut self, opacity: f32) -> Self {
        self.source_opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// Everything a renderer needs to draw one overlay frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayFrame {
    pub item: ItemRef,
    pub payload: PricePayload,
    pub rect: Rect,
    /// Label of the tier the item came from, if it still exists.
    pub source_label: Option<String>,
    pub price_label: String,
    /// Surface to highlight as the drop target.
    pub candidate: Option<DropCandidate>,
}

/// Builds [`OverlayFrame`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayPresenter {
    style: OverlayStyle,
}

impl OverlayPresenter {
    #[must_use]
    pub const fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    #[must_use]
    pub const fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Frame for the current session, or `None` when idle.
    #[must_use]
    pub fn present(
        &self,
        session: Option<&DragSession>,
        registry: &Registry,
        pointer: Point,
    ) -> Option<OverlayFrame> {
        let session = session?;
        let grab = session.grab_offset();
        let origin = pointer.offset(grab.x.saturating_neg(), grab.y.saturating_neg());
        let source = session.source();
        Some(OverlayFrame {
            item: source.clone(),
            payload: session.payload().clone(),
            rect: Rect::new(origin.x, origin.y, self.style.width, self.style.height),
            source_label: registry
                .tier(&source.container)
                .ok()
                .map(|tier| tier.label.clone()),
            price_label: session.payload().price_label(),
            candidate: session.candidate().cloned(),
        })
    }

    /// Whether `item` is the slot the active session lifted.
    #[must_use]
    pub fn is_drag_source(session: Option<&DragSession>, item: &ItemRef) -> bool {
        session.is_some_and(|session| session.source() == item)
    }

    /// Whether `candidate` is the surface currently under the pointer.
    #[must_use]
    pub fn is_drop_target(session: Option<&DragSession>, candidate: &DropCandidate) -> bool {
        session
            .and_then(DragSession::candidate)
            .is_some_and(|current| current == candidate)
    }

    /// Opacity a renderer should use for `item`'s slot.
    #[must_use]
    pub fn slot_opacity(&self, session: Option<&DragSession>, item: &ItemRef) -> f32 {
        if Self::is_drag_source(session, item) {
            self.style.source_opacity
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DragSessionTracker;
    use pricedeck_core::{Item, Tier};

    fn registry() -> Registry {
        Registry::new(vec![
            Tier::new("tierA", "$2.00 - $2.99").with_items([Item::new(
                "p1",
                PricePayload::new("Oreo", 276, "COOKIES"),
            )]),
            Tier::new("tierB", "$3.00 - $3.99"),
        ])
        .unwrap()
    }

    fn dragging(grab: Point) -> DragSessionTracker {
        let mut tracker = DragSessionTracker::new();
        tracker
            .begin(
                ItemRef::new("tierA", "p1"),
                PricePayload::new("Oreo", 276, "COOKIES"),
                grab,
            )
            .unwrap();
        tracker
    }

    #[test]
    fn idle_has_no_frame() {
        let presenter = OverlayPresenter::default();
        assert!(presenter.present(None, &registry(), Point::new(1, 1)).is_none());
    }

    #[test]
    fn frame_is_anchored_at_pointer_minus_grab_offset() {
        let tracker = dragging(Point::new(10, 20));
        let presenter = OverlayPresenter::new(OverlayStyle::default().with_size(100, 50));
        let frame = presenter
            .present(tracker.session(), &registry(), Point::new(110, 220))
            .unwrap();
        assert_eq!(frame.rect, Rect::new(100, 200, 100, 50));
        assert_eq!(frame.source_label.as_deref(), Some("$2.00 - $2.99"));
        assert_eq!(frame.price_label, "$2.76");
        assert_eq!(frame.candidate, None);
    }

    #[test]
    fn frame_uses_payload_frozen_at_pick_up() {
        let tracker = dragging(Point::default());
        let mut registry = registry();
        registry
            .replace(
                &"tierA".into(),
                vec![Item::new("p1", PricePayload::new("Changed", 999, "COOKIES"))],
            )
            .unwrap();
        let frame = OverlayPresenter::default()
            .present(tracker.session(), &registry, Point::default())
            .unwrap();
        assert_eq!(frame.payload.brand, "Oreo");
    }

    #[test]
    fn source_and_target_highlighting() {
        let mut tracker = dragging(Point::default());
        let over_b = DropCandidate::container("tierB");
        tracker.update_candidate(Some(over_b.clone())).unwrap();

        let source = ItemRef::new("tierA", "p1");
        assert!(OverlayPresenter::is_drag_source(tracker.session(), &source));
        assert!(!OverlayPresenter::is_drag_source(
            tracker.session(),
            &ItemRef::new("tierB", "p1")
        ));
        assert!(OverlayPresenter::is_drop_target(tracker.session(), &over_b));
        assert!(!OverlayPresenter::is_drop_target(None, &over_b));

        let presenter = OverlayPresenter::default();
        assert_eq!(presenter.slot_opacity(tracker.session(), &source), 0.5);
        assert_eq!(presenter.slot_opacity(None, &source), 1.0);
    }
}
