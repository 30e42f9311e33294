//! In-memory catalog filtering and sorting.
//!
//! The catalog is small (tens of products), so the storefront loads it once
//! and filters in memory rather than pushing queries down to the database.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::product::Product;

/// Storefront categories. `All` disables the category filter.
pub const CATEGORIES: [&str; 5] = [
    "All",
    "Large Plants",
    "Small Plants",
    "Hanging Plants",
    "Stems & Branches",
];

/// Product sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SortOrder {
    /// Keep the store order (newest first).
    #[default]
    #[serde(rename = "featured")]
    Featured,
    #[serde(rename = "price-low")]
    PriceLowToHigh,
    #[serde(rename = "price-high")]
    PriceHighToLow,
    /// Highest rated first.
    #[serde(rename = "rating")]
    Rating,
}

/// Filter and sort parameters for a catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    /// Category name; `None` or `"All"` matches everything.
    #[serde(default)]
    pub category: Option<String>,
    /// Case-insensitive search over name, description and tags.
    #[serde(default, rename = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl CatalogQuery {
    fn matches_category(&self, product: &Product) -> bool {
        match self.category.as_deref() {
            None | Some("" | "All") => true,
            Some(category) => product.category == category,
        }
    }

    fn matches_search(&self, product: &Product) -> bool {
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();

        product.name.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle)
            || product
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }

    /// Apply the query to a product list, preserving input order for ties.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut result: Vec<&Product> = products
            .iter()
            .filter(|p| self.matches_category(p) && self.matches_search(p))
            .collect();

        match self.sort {
            SortOrder::Featured => {}
            SortOrder::PriceLowToHigh => result.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceHighToLow => result.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Rating => result.sort_by(|a, b| {
                b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
            }),
        }

        result
    }
}
