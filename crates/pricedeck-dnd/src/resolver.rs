#![forbid(unsafe_code)]

//! Target resolution: which surface is the pointer "over"?
//!
//! # Policies
//!
//! - [`CollisionPolicy::ClosestCenter`]: the surface whose geometric center is
//!   nearest the pointer, whether or not the pointer is inside it. Distances
//!   are exact integers, so equidistant surfaces are true ties and go to the
//!   earlier surface in traversal order.
//! - [`CollisionPolicy::PointerWithin`]: the first item surface containing the
//!   pointer, else the first container surface containing it, else nothing.
//!
//! Zero-area surfaces (collapsed or hidden) never match.

use pricedeck_core::Point;
use serde::{Deserialize, Serialize};

use crate::session::DropCandidate;
use crate::surfaces::{DropSurface, DropSurfaces};

/// Collision detection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    #[default]
    ClosestCenter,
    PointerWithin,
}

/// Maps a pointer position onto a drop candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetResolver {
    policy: CollisionPolicy,
}

impl TargetResolver {
    #[must_use]
    pub const fn new(policy: CollisionPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub const fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Resolve `pointer` against `surfaces`. `None` means no valid target.
    #[must_use]
    pub fn resolve(&self, pointer: Point, surfaces: &DropSurfaces) -> Option<DropCandidate> {
        let surface = match self.policy {
            CollisionPolicy::ClosestCenter => closest_center(pointer, surfaces),
            CollisionPolicy::PointerWithin => pointer_within(pointer, surfaces),
        }?;
        Some(DropCandidate {
            container: surface.container.clone(),
            item: surface.item.clone(),
        })
    }
}

fn closest_center(pointer: Point, surfaces: &DropSurfaces) -> Option<&DropSurface> {
    let mut best: Option<(u64, &DropSurface)> = None;
    for surface in surfaces.iter().filter(|s| !s.bounds.is_empty()) {
        let distance = pointer.distance_sq_doubled(&surface.bounds);
        // Strict `<`: the first surface at a given distance keeps the slot.
        if best.is_none_or(|(current, _)| distance < current) {
            best = Some((distance, surface));
        }
    }
    best.map(|(_, surface)| surface)
}

fn pointer_within(pointer: Point, surfaces: &DropSurfaces) -> Option<&DropSurface> {
    let mut container_hit = None;
    for surface in surfaces.iter() {
        if !surface.bounds.contains(pointer) {
            continue;
        }
        if surface.is_item() {
            return Some(surface);
        }
        container_hit.get_or_insert(surface);
    }
    container_hit
}
