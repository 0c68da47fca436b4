#![forbid(unsafe_code)]

//! `pricedeck-web` connects browser hosts to the PriceDeck reorder engine.
//!
//! Design goals:
//! - **Host-driven input**: the embedding page pushes pointer and lifecycle
//!   events; nothing here touches the DOM.
//! - **One pointer, explicit capture**: [`PointerCaptureAdapter`] tells the
//!   host when to call `setPointerCapture()` / `releasePointerCapture()`.
//! - **JSON at the boundary**: with `host-json` (default), events arrive and
//!   registry snapshots leave as JSON.

#[cfg(feature = "host-json")]
pub mod host_event;
pub mod pointer_capture;

#[cfg(feature = "host-json")]
pub use host_event::{
    HostEvent, HostEventError, RegistrySnapshot, dispatch_host_json, encode_log_entry,
    encode_registry, encode_snapshot, parse_host_event, parse_registry,
};
pub use pointer_capture::{
    CaptureCommand, DEFAULT_DRAG_THRESHOLD, PointerButton, PointerCaptureAdapter,
    PointerCaptureConfig, PointerDispatch, PointerEffect, PointerIgnoredReason,
    PointerLifecyclePhase, PointerLogEntry, PointerLogOutcome,
};
