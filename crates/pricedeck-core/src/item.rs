#![forbid(unsafe_code)]

//! Priced items and the tiers that hold them.
//!
//! An item never records which tier owns it: ownership is its position in the
//! [`Registry`](crate::registry::Registry). Identity is the composite
//! [`ItemRef`] because item ids are only unique within one tier.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a tier (container).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of an item, unique within its tier only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Composite identity of an item: the tier holding it plus its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub container: ContainerId,
    pub item: ItemId,
}

impl ItemRef {
    pub fn new(container: impl Into<ContainerId>, item: impl Into<ItemId>) -> Self {
        Self {
            container: container.into(),
            item: item.into(),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.item)
    }
}

/// Display attributes of a priced product. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PricePayload {
    pub brand: String,
    pub description: String,
    /// Shelf price in cents.
    pub price_cents: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price_cents: Option<u32>,
    pub category: String,
    /// Brand swatch, e.g. `#3b82f6`.
    #[serde(default)]
    pub color: String,
}

impl PricePayload {
    pub fn new(brand: impl Into<String>, price_cents: u32, category: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            price_cents,
            category: category.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>, unit_price_cents: u32) -> Self {
        self.size = Some(size.into());
        self.unit_price_cents = Some(unit_price_cents);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Price formatted as dollars, e.g. `$2.76`.
    #[must_use]
    pub fn price_label(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

/// One priced product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub payload: PricePayload,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, payload: PricePayload) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}

/// A named, ordered price tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub id: ContainerId,
    pub label: String,
    /// Display-only annotation (e.g. share of market on the left axis).
    pub left_metric: f64,
    /// Display-only annotation (e.g. share of market on the right axis).
    pub right_metric: f64,
    pub items: Vec<Item>,
}

impl Tier {
    pub fn new(id: impl Into<ContainerId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            left_metric: 0.0,
            right_metric: 0.0,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, left: f64, right: f64) -> Self {
        self.left_metric = left;
        self.right_metric = right;
        self
    }

    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of `item` within this tier.
    #[must_use]
    pub fn position(&self, item: &ItemId) -> Option<usize> {
        self.items.iter().position(|candidate| &candidate.id == item)
    }
}

/// Ordering choices offered by the price ladder's sort selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    PriceLowToHigh,
    PriceHighToLow,
    BrandAToZ,
}

impl SortOrder {
    /// Comparator used for a stable sort; equal keys keep their order.
    #[must_use]
    pub fn compare(self, a: &Item, b: &Item) -> Ordering {
        match self {
            Self::PriceLowToHigh => a.payload.price_cents.cmp(&b.payload.price_cents),
            Self::PriceHighToLow => b.payload.price_cents.cmp(&a.payload.price_cents),
            Self::BrandAToZ => a
                .payload
                .brand
                .to_lowercase()
                .cmp(&b.payload.brand.to_lowercase()),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PriceLowToHigh => "Price Low to High",
            Self::PriceHighToLow => "Price High to Low",
            Self::BrandAToZ => "Brand A-Z",
        }
    }
}
