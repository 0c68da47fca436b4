#![forbid(unsafe_code)]

//! Core: the price-ladder data model shared by the reorder engine and its hosts.
//!
//! # Role in PriceDeck
//! `pricedeck-core` owns the data the drag-and-reorder engine mutates: priced
//! [`Item`]s grouped into ordered [`Tier`]s inside a single [`Registry`], the
//! pixel [`geometry`] used for hit testing, and the [`EngineError`] contract.
//!
//! # Primary responsibilities
//! - **Registry**: lookup, atomic replace, in-tier reorder, cross-tier transfer.
//! - **Identity**: composite [`ItemRef`] (tier + item id).
//! - **Geometry**: exact integer centers for closest-center resolution.
//!
//! # How it fits in the system
//! `pricedeck-dnd` drives the registry from drag sessions; `pricedeck-web`
//! adapts host pointer events onto that engine. Chart rendering and filter
//! state live outside the workspace and only ever see registry snapshots.

pub mod error;
pub mod geometry;
pub mod item;
pub mod logging;
pub mod registry;

pub use error::{EngineError, ErrorKind, Result};
pub use geometry::{Point, Rect};
pub use item::{ContainerId, Item, ItemId, ItemRef, PricePayload, SortOrder, Tier};
pub use registry::Registry;
