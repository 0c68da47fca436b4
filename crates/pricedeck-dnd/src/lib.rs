#![forbid(unsafe_code)]

//! Drag-and-reorder for PriceDeck price ladders.
//!
//! # Role in PriceDeck
//! `pricedeck-dnd` turns pointer gestures into registry moves. A gesture is a
//! [`DragSession`]: opened on pick-up, fed drop candidates while the pointer
//! moves, and consumed exactly once on release (by the [`MoveExecutor`]) or
//! on cancel.
//!
//! # Primary responsibilities
//! - **Sessions**: [`DragSessionTracker`], a single-session state machine.
//! - **Targets**: [`DropSurfaces`] plus [`TargetResolver`] (closest-center or
//!   pointer-within collision).
//! - **Moves**: [`MoveExecutor`] plans and applies reorders and transfers.
//! - **Presentation**: [`OverlayPresenter`] describes the floating card.
//! - **Engine**: [`ReorderEngine`] ties the above to a registry, render
//!   listeners and an undo/redo [`MoveHistory`].
//!
//! # How it fits in the system
//! Hosts either call the engine's `on_*` intake directly or go through the
//! pointer-capture adapter in `pricedeck-web`, which maps native pointer
//! lifecycles onto the same intake.

pub mod engine;
pub mod executor;
pub mod history;
pub mod overlay;
pub mod resolver;
pub mod session;
pub mod surfaces;

pub use engine::{ContractPolicy, EngineConfig, ReorderEngine, RenderListener};
pub use executor::{MoveExecutor, MoveNoopReason, MoveOutcome, MovePlan};
pub use history::{DEFAULT_HISTORY_LIMIT, MoveHistory, MoveRecord};
pub use overlay::{OverlayFrame, OverlayPresenter, OverlayStyle};
pub use resolver::{CollisionPolicy, TargetResolver};
pub use session::{ClosedSession, DragSession, DragSessionTracker, DropCandidate};
pub use surfaces::{DropSurface, DropSurfaces, StackedLayout};
