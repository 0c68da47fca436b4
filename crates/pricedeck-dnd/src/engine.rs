#![forbid(unsafe_code)]

//! The reorder engine: one registry, one drag session, one render fan-out.
//!
//! ```text
//!                 on_pick_up                 on_release
//!   ┌──────┐ ───────────────────▶ ┌──────────┐ ──────────▶ execute ─▶ render
//!   │ Idle │                      │ Dragging │
//!   └──────┘ ◀─────────────────── └──────────┘
//!                 on_cancel        on_hover (candidate updates)
//! ```
//!
//! # Invariants
//!
//! 1. The registry is only mutated by a release, undo/redo, sort or tier
//!    replacement, and never while a session is open. Cancelling therefore
//!    leaves the registry exactly as it was at pick-up.
//! 2. Render listeners run once per actual change, after the change is
//!    complete, and never for no-op releases.
//! 3. Under [`ContractPolicy::Recover`], gesture intake never returns an
//!    error: violations are logged at `warn` and the gesture snaps back.

use std::fmt;

use pricedeck_core::{ContainerId, EngineError, Item, ItemId, ItemRef, Point, Registry, Result, SortOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, trace, warn};

use crate::executor::{MoveExecutor, MoveNoopReason, MoveOutcome};
use crate::history::{DEFAULT_HISTORY_LIMIT, MoveHistory, MoveRecord};
use crate::overlay::{OverlayFrame, OverlayPresenter};
use crate::resolver::TargetResolver;
use crate::session::{DragSession, DragSessionTracker, DropCandidate};
use crate::surfaces::DropSurfaces;

/// How gesture intake reacts to contract violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractPolicy {
    /// Return the error to the caller.
    Strict,
    /// Log at `warn` and treat the call as a no-op.
    Recover,
}

impl Default for ContractPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Recover
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub contract_policy: ContractPolicy,
    /// Undo depth. `0` disables history.
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            contract_policy: ContractPolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_contract_policy(mut self, policy: ContractPolicy) -> Self {
        self.contract_policy = policy;
        self
    }

    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

/// Callback receiving the full registry after every change.
pub type RenderListener = Box<dyn FnMut(&Registry)>;

/// Drag-and-reorder engine over a tiered price ladder.
pub struct ReorderEngine {
    registry: Registry,
    tracker: DragSessionTracker,
    history: MoveHistory,
    presenter: OverlayPresenter,
    config: EngineConfig,
    listeners: Vec<RenderListener>,
    revision: u64,
}

impl fmt::Debug for ReorderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReorderEngine")
            .field("registry", &self.registry)
            .field("tracker", &self.tracker)
            .field("history", &self.history)
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl ReorderEngine {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(registry: Registry, config: EngineConfig) -> Self {
        Self {
            registry,
            tracker: DragSessionTracker::new(),
            history: MoveHistory::new(config.history_limit),
            presenter: OverlayPresenter::default(),
            config,
            listeners: Vec::new(),
            revision: 0,
        }
    }

    #[must_use]
    pub fn with_presenter(mut self, presenter: OverlayPresenter) -> Self {
        self.presenter = presenter;
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn into_registry(self) -> Registry {
        self.registry
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn history(&self) -> &MoveHistory {
        &self.history
    }

    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        self.tracker.session()
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.tracker.is_dragging()
    }

    /// Number of registry changes so far.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a render callback. It is not invoked for the current state.
    pub fn on_render(&mut self, listener: impl FnMut(&Registry) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ── Gesture intake ──────────────────────────────────────────────────

    /// Pick up `item` with the pointer at its top-left corner.
    pub fn on_pick_up(&mut self, item: ItemRef) -> Result<()> {
        self.on_pick_up_at(item, Point::default())
    }

    /// Pick up `item`, remembering where inside the item the pointer grabbed.
    pub fn on_pick_up_at(&mut self, item: ItemRef, grab_offset: Point) -> Result<()> {
        let result = self.begin_session(item, grab_offset);
        self.contract("pick_up", result, ())
    }

    fn begin_session(&mut self, item: ItemRef, grab_offset: Point) -> Result<()> {
        if self.tracker.is_dragging() {
            return Err(EngineError::invalid_state("pick_up", "dragging"));
        }
        let payload = self.registry.locate(&item)?.payload.clone();
        let session = self.tracker.begin(item, payload, grab_offset)?;
        debug!(
            source = %session.source(),
            sequence = session.sequence(),
            "drag session started"
        );
        Ok(())
    }

    /// The pointer is over `container`, and over `item` within it if given.
    pub fn on_hover(&mut self, container: ContainerId, item: Option<ItemId>) -> Result<()> {
        let candidate = DropCandidate { container, item };
        let result = self.update_candidate(Some(candidate));
        self.contract("hover", result, ())
    }

    /// The pointer is over no valid drop target.
    pub fn on_hover_nothing(&mut self) -> Result<()> {
        let result = self.update_candidate(None);
        self.contract("hover", result, ())
    }

    /// Resolve `pointer` against `surfaces` and feed the result to the
    /// session. Returns the resolved candidate.
    pub fn hover_at(
        &mut self,
        pointer: Point,
        surfaces: &DropSurfaces,
        resolver: &TargetResolver,
    ) -> Result<Option<DropCandidate>> {
        let candidate = resolver.resolve(pointer, surfaces);
        let result = self.update_candidate(candidate.clone());
        self.contract("hover", result.map(|()| candidate), None)
    }

    fn update_candidate(&mut self, candidate: Option<DropCandidate>) -> Result<()> {
        let changed = self.tracker.update_candidate(candidate)?;
        if changed {
            let current = self.tracker.session().and_then(DragSession::candidate);
            trace!(
                container = current.map(|c| c.container.as_str()),
                item = current.and_then(|c| c.item.as_ref()).map(ItemId::as_str),
                "drop candidate changed"
            );
        }
        Ok(())
    }

    /// Release the dragged item over its last candidate.
    pub fn on_release(&mut self) -> Result<MoveOutcome> {
        let result = self.release();
        self.contract(
            "release",
            result,
            MoveOutcome::unchanged(MoveNoopReason::Rejected),
        )
    }

    fn release(&mut self) -> Result<MoveOutcome> {
        let closed = self.tracker.end()?;
        let _span = debug_span!(
            "release",
            sequence = closed.sequence,
            source = %closed.source
        )
        .entered();

        let outcome = MoveExecutor::execute(&closed, &mut self.registry)?;
        match MoveRecord::from_outcome(&outcome) {
            Some(record) => {
                debug!(
                    item = %record.item,
                    from = %record.from,
                    from_index = record.from_index,
                    to = %record.to,
                    to_index = record.to_index,
                    "move committed"
                );
                self.history.record(record);
                self.notify();
            }
            None => debug!(?outcome, "release produced no change"),
        }
        Ok(outcome)
    }

    /// Abort the gesture. The registry is left as it was at pick-up.
    pub fn on_cancel(&mut self) -> Result<()> {
        let result = self.tracker.cancel().map(|session| {
            debug!(
                source = %session.source(),
                sequence = session.sequence(),
                "drag session cancelled"
            );
        });
        self.contract("cancel", result, ())
    }

    // ── Registry operations ─────────────────────────────────────────────

    /// Revert the last committed move.
    pub fn undo(&mut self) -> Result<Option<MoveRecord>> {
        self.ensure_idle("undo")?;
        let record = self.history.undo(&mut self.registry)?;
        if record.is_some() {
            self.notify();
        }
        Ok(record)
    }

    /// Re-apply the last undone move.
    pub fn redo(&mut self) -> Result<Option<MoveRecord>> {
        self.ensure_idle("redo")?;
        let record = self.history.redo(&mut self.registry)?;
        if record.is_some() {
            self.notify();
        }
        Ok(record)
    }

    /// Sort one tier. Returns `true` if its order changed.
    pub fn sort_tier(&mut self, container: &ContainerId, order: SortOrder) -> Result<bool> {
        self.ensure_idle("sort_tier")?;
        let changed = self.registry.sort_tier(container, order)?;
        if changed {
            debug!(container = %container, order = order.label(), "tier sorted");
            self.notify();
        }
        Ok(changed)
    }

    /// Swap a tier's contents wholesale. Move history is discarded since its
    /// records may name items that no longer exist.
    pub fn replace_tier(&mut self, container: &ContainerId, items: Vec<Item>) -> Result<Vec<Item>> {
        self.ensure_idle("replace_tier")?;
        let previous = self.registry.replace(container, items)?;
        self.history.clear();
        self.notify();
        Ok(previous)
    }

    // ── Presentation ────────────────────────────────────────────────────

    /// Overlay frame for the item in flight, or `None` when idle.
    #[must_use]
    pub fn overlay(&self, pointer: Point) -> Option<OverlayFrame> {
        self.presenter
            .present(self.tracker.session(), &self.registry, pointer)
    }

    #[must_use]
    pub fn is_drag_source(&self, item: &ItemRef) -> bool {
        OverlayPresenter::is_drag_source(self.tracker.session(), item)
    }

    #[must_use]
    pub fn is_drop_target(&self, candidate: &DropCandidate) -> bool {
        OverlayPresenter::is_drop_target(self.tracker.session(), candidate)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn ensure_idle(&self, operation: &'static str) -> Result<()> {
        if self.tracker.is_dragging() {
            return Err(EngineError::invalid_state(operation, "dragging"));
        }
        Ok(())
    }

    fn contract<T>(&self, operation: &'static str, result: Result<T>, fallback: T) -> Result<T> {
        match (result, self.config.contract_policy) {
            (Ok(value), _) => Ok(value),
            (Err(err), ContractPolicy::Strict) => Err(err),
            (Err(err), ContractPolicy::Recover) => {
                warn!(
                    operation,
                    kind = ?err.kind(),
                    error = %err,
                    state = self.tracker.state_name(),
                    "contract violation recovered as no-op"
                );
                Ok(fallback)
            }
        }
    }

    fn notify(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        for listener in &mut self.listeners {
            listener(&self.registry);
        }
    }
}
