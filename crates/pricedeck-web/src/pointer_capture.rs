#![forbid(unsafe_code)]

//! Pointer-capture adapter mapping browser pointer lifecycles onto the
//! reorder engine's intake.
//!
//! The adapter enforces:
//! - one active pointer at a time,
//! - a drag threshold: pointer-down only *arms* a gesture, and the engine
//!   session opens once the pointer has travelled far enough, so a plain
//!   click never produces a move,
//! - explicit capture acquire/release commands for JS hosts, and
//! - cancellation on interruption paths (pointer-cancel, leave before capture,
//!   blur, visibility-hidden, lost capture) and on release off every drop
//!   surface. Moving off every surface clears the drop candidate.
//!
//! ```text
//!            down (item hit)         move >= threshold
//!   Idle ─────────────────────▶ Armed ─────────────────▶ Dragging
//!    ▲                            │                         │
//!    └──── up / cancel paths ─────┴──── up: release ────────┘
//!                                       cancel paths: on_cancel
//! ```

use pricedeck_core::{EngineError, ItemRef, Point};
use pricedeck_dnd::{
    DropCandidate, DropSurfaces, MoveOutcome, ReorderEngine, StackedLayout, TargetResolver,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Default travel (Manhattan, host pixels) before an armed press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD: u32 = 4;

/// Pointer button as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other(u8),
}

impl PointerButton {
    /// Map a DOM `PointerEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i32) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            other => Self::Other(u8::try_from(other.clamp(0, i32::from(u8::MAX))).unwrap_or(u8::MAX)),
        }
    }
}

/// Adapter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerCaptureConfig {
    /// Travel required before a press opens a drag session. `0` starts the
    /// session on pointer-down.
    pub drag_threshold: u32,
    /// Button required to begin a gesture.
    pub activation_button: PointerButton,
    /// Cancel when the pointer leaves before the host acknowledged capture.
    pub cancel_on_leave: bool,
}

impl Default for PointerCaptureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            activation_button: PointerButton::Primary,
            cancel_on_leave: true,
        }
    }
}

impl PointerCaptureConfig {
    #[must_use]
    pub fn with_drag_threshold(mut self, threshold: u32) -> Self {
        self.drag_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_activation_button(mut self, button: PointerButton) -> Self {
        self.activation_button = button;
        self
    }

    #[must_use]
    pub fn with_cancel_on_leave(mut self, cancel: bool) -> Self {
        self.cancel_on_leave = cancel;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Requested,
    Acquired,
}

impl CaptureState {
    const fn is_acquired(self) -> bool {
        matches!(self, Self::Acquired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GesturePhase {
    Armed,
    Dragging,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActivePointer {
    pointer_id: u32,
    item: ItemRef,
    button: PointerButton,
    origin: Point,
    grab_offset: Point,
    capture_state: CaptureState,
    phase: GesturePhase,
}

impl ActivePointer {
    fn release_command(&self) -> Option<CaptureCommand> {
        self.capture_state
            .is_acquired()
            .then_some(CaptureCommand::Release {
                pointer_id: self.pointer_id,
            })
    }
}

/// Host command for browser pointer-capture control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CaptureCommand {
    Acquire { pointer_id: u32 },
    Release { pointer_id: u32 },
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerLifecyclePhase {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    PointerLeave,
    Blur,
    VisibilityHidden,
    LostPointerCapture,
    CaptureAcquired,
}

/// Why an incoming signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerIgnoredReason {
    InvalidPointerId,
    ButtonNotAllowed,
    ButtonMismatch,
    ActivePointerAlreadyInProgress,
    EngineBusy,
    NoItemUnderPointer,
    NoActivePointer,
    PointerMismatch,
    BelowDragThreshold,
    LeaveWhileCaptured,
    EngineRejected,
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerLogOutcome {
    /// A press landed on an item; waiting for the drag threshold.
    Armed,
    /// An armed press ended without becoming a drag.
    Disarmed,
    EngineForwarded,
    CaptureStateUpdated,
    Ignored(PointerIgnoredReason),
}

/// Structured record of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerLogEntry {
    pub phase: PointerLifecyclePhase,
    pub sequence: Option<u64>,
    pub pointer_id: Option<u32>,
    pub item: Option<ItemRef>,
    pub position: Option<Point>,
    pub capture_command: Option<CaptureCommand>,
    pub outcome: PointerLogOutcome,
}

/// What the engine did in response to a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum PointerEffect {
    DragStarted {
        item: ItemRef,
        candidate: Option<DropCandidate>,
    },
    CandidateUpdated {
        candidate: Option<DropCandidate>,
    },
    Released {
        outcome: MoveOutcome,
    },
    Cancelled {
        item: ItemRef,
    },
}

/// Result of one pointer lifecycle dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerDispatch {
    pub effect: Option<PointerEffect>,
    pub capture_command: Option<CaptureCommand>,
    /// Engine error behind an `EngineRejected` outcome.
    pub error: Option<EngineError>,
    pub log: PointerLogEntry,
}

impl PointerDispatch {
    fn ignored(
        phase: PointerLifecyclePhase,
        reason: PointerIgnoredReason,
        pointer_id: Option<u32>,
        item: Option<ItemRef>,
        position: Option<Point>,
    ) -> Self {
        trace!(?phase, ?reason, pointer_id, "pointer signal ignored");
        Self {
            effect: None,
            capture_command: None,
            error: None,
            log: PointerLogEntry {
                phase,
                sequence: None,
                pointer_id,
                item,
                position,
                capture_command: None,
                outcome: PointerLogOutcome::Ignored(reason),
            },
        }
    }

    /// Whether the adapter acted on the signal.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self.log.outcome, PointerLogOutcome::Ignored(_))
    }
}

#[derive(Debug, Clone)]
struct DispatchContext {
    phase: PointerLifecyclePhase,
    pointer_id: Option<u32>,
    item: Option<ItemRef>,
    position: Option<Point>,
}

/// Pointer-capture adapter owning the engine it drives.
///
/// Surfaces come from the host; with a [`StackedLayout`] attached they are
/// rebuilt from the registry after every committed move.
#[derive(Debug)]
pub struct PointerCaptureAdapter {
    engine: ReorderEngine,
    surfaces: DropSurfaces,
    resolver: TargetResolver,
    layout: Option<StackedLayout>,
    config: PointerCaptureConfig,
    active: Option<ActivePointer>,
    next_sequence: u64,
}

impl PointerCaptureAdapter {
    #[must_use]
    pub fn new(engine: ReorderEngine, surfaces: DropSurfaces, config: PointerCaptureConfig) -> Self {
        Self {
            engine,
            surfaces,
            resolver: TargetResolver::default(),
            layout: None,
            config,
            active: None,
            next_sequence: 1,
        }
    }

    /// Adapter whose surfaces always follow `layout`.
    #[must_use]
    pub fn stacked(engine: ReorderEngine, layout: StackedLayout, config: PointerCaptureConfig) -> Self {
        let surfaces = DropSurfaces::stacked(engine.registry(), &layout);
        let mut adapter = Self::new(engine, surfaces, config);
        adapter.layout = Some(layout);
        adapter
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: TargetResolver) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub const fn config(&self) -> PointerCaptureConfig {
        self.config
    }

    #[must_use]
    pub const fn engine(&self) -> &ReorderEngine {
        &self.engine
    }

    /// Mutable engine access for non-gesture operations (sort, undo, ...).
    /// Surfaces are refreshed by [`Self::refresh_surfaces`].
    pub fn engine_mut(&mut self) -> &mut ReorderEngine {
        &mut self.engine
    }

    #[must_use]
    pub fn into_engine(self) -> ReorderEngine {
        self.engine
    }

    #[must_use]
    pub const fn surfaces(&self) -> &DropSurfaces {
        &self.surfaces
    }

    /// Replace the drop surfaces (host re-layout).
    pub fn set_surfaces(&mut self, surfaces: DropSurfaces) {
        self.surfaces = surfaces;
    }

    /// Rebuild surfaces from the attached layout, if any.
    pub fn refresh_surfaces(&mut self) {
        if let Some(layout) = self.layout.as_ref() {
            self.surfaces = DropSurfaces::stacked(self.engine.registry(), layout);
        }
    }

    #[must_use]
    pub fn active_pointer_id(&self) -> Option<u32> {
        self.active.as_ref().map(|active| active.pointer_id)
    }

    /// `true` between pointer-down on an item and the drag threshold.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.phase == GesturePhase::Armed)
    }

    /// Handle pointer-down.
    pub fn pointer_down(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
    ) -> PointerDispatch {
        let phase = PointerLifecyclePhase::PointerDown;
        let ignore = |reason, item| {
            PointerDispatch::ignored(phase, reason, Some(pointer_id), item, Some(position))
        };
        if pointer_id == 0 {
            return ignore(PointerIgnoredReason::InvalidPointerId, None);
        }
        if button != self.config.activation_button {
            return ignore(PointerIgnoredReason::ButtonNotAllowed, None);
        }
        if self.active.is_some() {
            return ignore(PointerIgnoredReason::ActivePointerAlreadyInProgress, None);
        }
        if self.engine.is_dragging() {
            return ignore(PointerIgnoredReason::EngineBusy, None);
        }
        let Some(hit) = self.surfaces.hit_test_item(position) else {
            return ignore(PointerIgnoredReason::NoItemUnderPointer, None);
        };
        let Some(item) = hit.item_ref() else {
            return ignore(PointerIgnoredReason::NoItemUnderPointer, None);
        };
        let grab_offset = Point::new(
            position.x.saturating_sub(hit.bounds.x),
            position.y.saturating_sub(hit.bounds.y),
        );

        self.active = Some(ActivePointer {
            pointer_id,
            item: item.clone(),
            button,
            origin: position,
            grab_offset,
            capture_state: CaptureState::Requested,
            phase: GesturePhase::Armed,
        });
        let acquire = Some(CaptureCommand::Acquire { pointer_id });
        let context = DispatchContext {
            phase,
            pointer_id: Some(pointer_id),
            item: Some(item),
            position: Some(position),
        };

        if self.config.drag_threshold == 0 {
            let mut dispatch = self.start_drag(context, position);
            if dispatch.error.is_none() {
                dispatch.capture_command = acquire;
                dispatch.log.capture_command = acquire;
            }
            return dispatch;
        }
        self.emit(context, PointerLogOutcome::Armed, None, acquire)
    }

    /// Mark browser pointer capture as acquired.
    pub fn capture_acquired(&mut self, pointer_id: u32) -> PointerDispatch {
        let phase = PointerLifecyclePhase::CaptureAcquired;
        let Some(active) = self.active.as_mut() else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
                None,
            );
        };
        if active.pointer_id != pointer_id {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.item.clone()),
                None,
            );
        }
        active.capture_state = CaptureState::Acquired;
        let item = active.item.clone();
        self.emit(
            DispatchContext {
                phase,
                pointer_id: Some(pointer_id),
                item: Some(item),
                position: None,
            },
            PointerLogOutcome::CaptureStateUpdated,
            None,
            None,
        )
    }

    /// Handle pointer-move for the active pointer.
    pub fn pointer_move(&mut self, pointer_id: u32, position: Point) -> PointerDispatch {
        let phase = PointerLifecyclePhase::PointerMove;
        let active = match self.check_active(phase, pointer_id, Some(position)) {
            Ok(active) => active,
            Err(dispatch) => return *dispatch,
        };
        let context = DispatchContext {
            phase,
            pointer_id: Some(pointer_id),
            item: Some(active.item.clone()),
            position: Some(position),
        };

        match active.phase {
            GesturePhase::Armed => {
                if position.manhattan(active.origin) < self.config.drag_threshold {
                    return PointerDispatch::ignored(
                        phase,
                        PointerIgnoredReason::BelowDragThreshold,
                        Some(pointer_id),
                        Some(active.item),
                        Some(position),
                    );
                }
                self.start_drag(context, position)
            }
            GesturePhase::Dragging => {
                match self.track(position) {
                    Ok(candidate) => self.emit(
                        context,
                        PointerLogOutcome::EngineForwarded,
                        Some(PointerEffect::CandidateUpdated { candidate }),
                        None,
                    ),
                    Err(error) => self.rejected(context, error),
                }
            }
        }
    }

    /// Handle pointer-up: release the drag, or disarm a click.
    pub fn pointer_up(
        &mut self,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
    ) -> PointerDispatch {
        let phase = PointerLifecyclePhase::PointerUp;
        let active = match self.check_active(phase, pointer_id, Some(position)) {
            Ok(active) => active,
            Err(dispatch) => return *dispatch,
        };
        if active.button != button {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::ButtonMismatch,
                Some(pointer_id),
                Some(active.item),
                Some(position),
            );
        }
        let context = DispatchContext {
            phase,
            pointer_id: Some(pointer_id),
            item: Some(active.item.clone()),
            position: Some(position),
        };
        let release = active.release_command();
        self.active = None;

        if active.phase == GesturePhase::Armed {
            return self.emit(context, PointerLogOutcome::Disarmed, None, release);
        }

        if !self.surfaces.covers(position) {
            // Released off every surface: snap back.
            return match self.engine.on_cancel() {
                Ok(()) => self.emit(
                    context,
                    PointerLogOutcome::EngineForwarded,
                    Some(PointerEffect::Cancelled { item: active.item }),
                    release,
                ),
                Err(error) => {
                    let mut dispatch = self.rejected(context, error);
                    dispatch.capture_command = release;
                    dispatch.log.capture_command = release;
                    dispatch
                }
            };
        }

        let released = self
            .track(position)
            .and_then(|_| self.engine.on_release());
        match released {
            Ok(outcome) => {
                if outcome.is_change() {
                    self.refresh_surfaces();
                }
                self.emit(
                    context,
                    PointerLogOutcome::EngineForwarded,
                    Some(PointerEffect::Released { outcome }),
                    release,
                )
            }
            Err(error) => {
                // A failed hover leaves the session open; close it so the
                // engine and adapter agree on being idle.
                if self.engine.is_dragging()
                    && let Err(cancel_error) = self.engine.on_cancel()
                {
                    debug!(
                        error = %cancel_error,
                        "failed to close session after rejected release"
                    );
                }
                let mut dispatch = self.rejected(context, error);
                dispatch.capture_command = release;
                dispatch.log.capture_command = release;
                dispatch
            }
        }
    }

    /// Handle browser pointer-cancel.
    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> PointerDispatch {
        self.cancel_active(PointerLifecyclePhase::PointerCancel, pointer_id, true)
    }

    /// Handle pointer-leave.
    pub fn pointer_leave(&mut self, pointer_id: u32) -> PointerDispatch {
        let phase = PointerLifecyclePhase::PointerLeave;
        let active = match self.check_active(phase, pointer_id, None) {
            Ok(active) => active,
            Err(dispatch) => return *dispatch,
        };
        if active.capture_state == CaptureState::Requested && self.config.cancel_on_leave {
            self.cancel_active(phase, Some(pointer_id), true)
        } else {
            PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::LeaveWhileCaptured,
                Some(pointer_id),
                Some(active.item),
                None,
            )
        }
    }

    /// Handle window blur.
    pub fn blur(&mut self) -> PointerDispatch {
        self.cancel_active(PointerLifecyclePhase::Blur, None, true)
    }

    /// Handle the page becoming hidden.
    pub fn visibility_hidden(&mut self) -> PointerDispatch {
        self.cancel_active(PointerLifecyclePhase::VisibilityHidden, None, true)
    }

    /// Handle `lostpointercapture`. Capture is already gone, so no release
    /// command is emitted.
    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> PointerDispatch {
        self.cancel_active(
            PointerLifecyclePhase::LostPointerCapture,
            Some(pointer_id),
            false,
        )
    }

    fn check_active(
        &self,
        phase: PointerLifecyclePhase,
        pointer_id: u32,
        position: Option<Point>,
    ) -> Result<ActivePointer, Box<PointerDispatch>> {
        let Some(active) = self.active.as_ref() else {
            return Err(Box::new(PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                Some(pointer_id),
                None,
                position,
            )));
        };
        if active.pointer_id != pointer_id {
            return Err(Box::new(PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(active.item.clone()),
                position,
            )));
        }
        Ok(active.clone())
    }

    fn cancel_active(
        &mut self,
        phase: PointerLifecyclePhase,
        pointer_id: Option<u32>,
        release_capture: bool,
    ) -> PointerDispatch {
        let Some(active) = self.active.as_ref() else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                pointer_id,
                None,
                None,
            );
        };
        if let Some(id) = pointer_id
            && id != active.pointer_id
        {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::PointerMismatch,
                Some(id),
                Some(active.item.clone()),
                None,
            );
        }
        let Some(active) = self.active.take() else {
            return PointerDispatch::ignored(
                phase,
                PointerIgnoredReason::NoActivePointer,
                pointer_id,
                None,
                None,
            );
        };
        let command = if release_capture {
            active.release_command()
        } else {
            None
        };
        let context = DispatchContext {
            phase,
            pointer_id: Some(active.pointer_id),
            item: Some(active.item.clone()),
            position: None,
        };

        if active.phase == GesturePhase::Armed {
            return self.emit(context, PointerLogOutcome::Disarmed, None, command);
        }
        match self.engine.on_cancel() {
            Ok(()) => self.emit(
                context,
                PointerLogOutcome::EngineForwarded,
                Some(PointerEffect::Cancelled { item: active.item }),
                command,
            ),
            Err(error) => {
                let mut dispatch = self.rejected(context, error);
                dispatch.capture_command = command;
                dispatch.log.capture_command = command;
                dispatch
            }
        }
    }

    fn start_drag(&mut self, context: DispatchContext, position: Point) -> PointerDispatch {
        let Some(active) = self.active.as_mut() else {
            return PointerDispatch::ignored(
                context.phase,
                PointerIgnoredReason::NoActivePointer,
                context.pointer_id,
                context.item,
                context.position,
            );
        };
        let item = active.item.clone();
        let grab_offset = active.grab_offset;

        if let Err(error) = self.engine.on_pick_up_at(item.clone(), grab_offset) {
            // The pressed item is gone (or the engine is busy): drop the gesture.
            let release = self.active.take().and_then(|active| active.release_command());
            let mut dispatch = self.rejected(context, error);
            dispatch.capture_command = release;
            dispatch.log.capture_command = release;
            return dispatch;
        }
        if !self.engine.is_dragging() {
            // Recovered as a no-op by the engine's contract policy.
            let release = self.active.take().and_then(|active| active.release_command());
            return self.emit(context, PointerLogOutcome::Disarmed, None, release);
        }
        if let Some(active) = self.active.as_mut() {
            active.phase = GesturePhase::Dragging;
        }
        debug!(item = %item, "pointer drag started");

        match self.track(position) {
            Ok(candidate) => self.emit(
                context,
                PointerLogOutcome::EngineForwarded,
                Some(PointerEffect::DragStarted { item, candidate }),
                None,
            ),
            Err(error) => self.rejected(context, error),
        }
    }

    /// Forward the pointer position; off every surface there is no candidate.
    fn track(&mut self, position: Point) -> Result<Option<DropCandidate>, EngineError> {
        if self.surfaces.covers(position) {
            self.engine.hover_at(position, &self.surfaces, &self.resolver)
        } else {
            self.engine.on_hover_nothing().map(|()| None)
        }
    }

    fn rejected(&mut self, context: DispatchContext, error: EngineError) -> PointerDispatch {
        debug!(phase = ?context.phase, error = %error, "engine rejected pointer signal");
        let mut dispatch = PointerDispatch::ignored(
            context.phase,
            PointerIgnoredReason::EngineRejected,
            context.pointer_id,
            context.item,
            context.position,
        );
        dispatch.error = Some(error);
        dispatch
    }

    fn emit(
        &mut self,
        context: DispatchContext,
        outcome: PointerLogOutcome,
        effect: Option<PointerEffect>,
        capture_command: Option<CaptureCommand>,
    ) -> PointerDispatch {
        let sequence = self.next_sequence();
        PointerDispatch {
            effect,
            capture_command,
            error: None,
            log: PointerLogEntry {
                phase: context.phase,
                sequence: Some(sequence),
                pointer_id: context.pointer_id,
                item: context.item,
                position: context.position,
                capture_command,
                outcome,
            },
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        sequence
    }
}
