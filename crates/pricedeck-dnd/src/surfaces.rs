#![forbid(unsafe_code)]

//! Drop surfaces: the rectangles a dragged item can be released over.
//!
//! Each tier contributes one surface for its full extent followed by one
//! surface per item, so iteration order is the resolver's tie-break order
//! (tier order, then item order within the tier).

use pricedeck_core::{ContainerId, ItemId, ItemRef, Point, Rect, Registry};
use serde::{Deserialize, Serialize};

/// One drop surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSurface {
    pub container: ContainerId,
    /// `None` for the container's own extent.
    pub item: Option<ItemId>,
    pub bounds: Rect,
}

impl DropSurface {
    #[must_use]
    pub const fn is_item(&self) -> bool {
        self.item.is_some()
    }

    /// Composite reference for item surfaces.
    #[must_use]
    pub fn item_ref(&self) -> Option<ItemRef> {
        self.item.as_ref().map(|item| ItemRef {
            container: self.container.clone(),
            item: item.clone(),
        })
    }
}

/// Surfaces in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DropSurfaces {
    surfaces: Vec<DropSurface>,
}

impl DropSurfaces {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out every tier of `registry` with `layout`.
    #[must_use]
    pub fn stacked(registry: &Registry, layout: &StackedLayout) -> Self {
        let mut surfaces = Self::new();
        for (column, tier) in registry.tiers().iter().enumerate() {
            surfaces.push_container(tier.id.clone(), layout.column_rect(column, tier.len()));
            for (row, item) in tier.items.iter().enumerate() {
                surfaces.push_item(tier.id.clone(), item.id.clone(), layout.item_rect(column, row));
            }
        }
        surfaces
    }

    pub fn push_container(&mut self, container: ContainerId, bounds: Rect) {
        self.surfaces.push(DropSurface {
            container,
            item: None,
            bounds,
        });
    }

    pub fn push_item(&mut self, container: ContainerId, item: ItemId, bounds: Rect) {
        self.surfaces.push(DropSurface {
            container,
            item: Some(item),
            bounds,
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DropSurface> {
        self.surfaces.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// The item surface under `point`, used to decide what a pointer-down
    /// picks up. Later surfaces win so an item drawn on top of its container
    /// is found first.
    #[must_use]
    pub fn hit_test_item(&self, point: Point) -> Option<&DropSurface> {
        self.surfaces
            .iter()
            .rev()
            .find(|surface| surface.is_item() && surface.bounds.contains(point))
    }

    /// Union extent check: is `point` over any tracked surface at all?
    #[must_use]
    pub fn covers(&self, point: Point) -> bool {
        self.surfaces
            .iter()
            .any(|surface| surface.bounds.contains(point))
    }
}

impl<'a> IntoIterator for &'a DropSurfaces {
    type Item = &'a DropSurface;
    type IntoIter = std::slice::Iter<'a, DropSurface>;

    fn into_iter(self) -> Self::IntoIter {
        self.surfaces.iter()
    }
}

/// Column-per-tier layout: tiers left to right, items stacked top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackedLayout {
    /// Top-left corner of the first column.
    pub origin: Point,
    pub column_width: u32,
    pub column_gap: u32,
    /// Title band above the first item.
    pub header_height: u32,
    pub item_height: u32,
    pub item_gap: u32,
    /// Minimum column height; columns grow to fit their items.
    pub column_height: u32,
}

impl Default for StackedLayout {
    fn default() -> Self {
        Self {
            origin: Point::new(0, 0),
            column_width: 240,
            column_gap: 24,
            header_height: 48,
            item_height: 72,
            item_gap: 12,
            column_height: 640,
        }
    }
}

impl StackedLayout {
    #[must_use]
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_item_height(mut self, height: u32, gap: u32) -> Self {
        self.item_height = height;
        self.item_gap = gap;
        self
    }

    #[must_use]
    pub fn with_column(mut self, width: u32, gap: u32, min_height: u32) -> Self {
        self.column_width = width;
        self.column_gap = gap;
        self.column_height = min_height;
        self
    }

    #[must_use]
    pub fn with_header_height(mut self, height: u32) -> Self {
        self.header_height = height;
        self
    }

    fn column_x(&self, column: usize) -> i32 {
        let stride = i64::from(self.column_width) + i64::from(self.column_gap);
        clamp_i32(i64::from(self.origin.x) + stride * column as i64)
    }

    fn row_y(&self, row: usize) -> i32 {
        let stride = i64::from(self.item_height) + i64::from(self.item_gap);
        clamp_i32(i64::from(self.origin.y) + i64::from(self.header_height) + stride * row as i64)
    }

    /// Full extent of column `column` holding `items` items.
    #[must_use]
    pub fn column_rect(&self, column: usize, items: usize) -> Rect {
        let stride = u64::from(self.item_height) + u64::from(self.item_gap);
        let needed = u64::from(self.header_height) + stride * items as u64;
        let height = needed.max(u64::from(self.column_height));
        Rect::new(
            self.column_x(column),
            self.origin.y,
            self.column_width,
            u32::try_from(height).unwrap_or(u32::MAX),
        )
    }

    /// Extent of the item at `row` in column `column`.
    #[must_use]
    pub fn item_rect(&self, column: usize, row: usize) -> Rect {
        Rect::new(
            self.column_x(column),
            self.row_y(row),
            self.column_width,
            self.item_height,
        )
    }
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
