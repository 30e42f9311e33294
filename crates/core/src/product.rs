//! Catalog product record and the editable draft staff submit for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CATEGORIES;
use crate::types::{Amount, ProductId};

/// A product in the artificial plants catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Amount,
    /// Pre-discount price, shown struck through when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Amount>,
    pub category: String,
    /// Average review score out of 5.
    pub rating: f32,
    pub reviews: u32,
    pub in_stock: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    /// Public image URLs; the first one is the cover image.
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Cover image, or the placeholder when the product has none.
    #[must_use]
    pub fn cover_image(&self) -> &str {
        self.images.first().map_or("/placeholder.svg", String::as_str)
    }

    /// Percentage saved versus the original price, rounded down.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        use rust_decimal::prelude::ToPrimitive;

        let original = self.original_price?.as_decimal();
        let price = self.price.as_decimal();
        if original <= price || original.is_zero() {
            return None;
        }
        let pct = (original - price) * rust_decimal::Decimal::from(100) / original;
        pct.floor().to_u32()
    }
}

/// Problems with a product as entered by staff.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ProductDraftError {
    #[error("product name is required")]
    MissingName,
    #[error("unknown category {0:?}")]
    UnknownCategory(String),
    #[error("rating must be between 0 and 5 (got {0})")]
    RatingOutOfRange(f32),
}

/// Editable product fields.
///
/// Review counts are not editable; the store keeps them across updates and
/// starts new products at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Amount,
    pub original_price: Option<Amount>,
    pub category: String,
    pub rating: f32,
    pub in_stock: bool,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    /// Image URLs, cover first.
    pub images: Vec<String>,
}

impl ProductDraft {
    /// Trim text fields, drop blank list entries and duplicate tags, then
    /// check the result.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(self) -> Result<Self, ProductDraftError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ProductDraftError::MissingName);
        }
        // "All" is the listing filter, not a real category.
        if self.category == CATEGORIES[0] || !CATEGORIES.contains(&self.category.as_str()) {
            return Err(ProductDraftError::UnknownCategory(self.category));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(ProductDraftError::RatingOutOfRange(self.rating));
        }

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in clean_list(self.tags) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(Self {
            name,
            description: self.description.trim().to_string(),
            tags,
            features: clean_list(self.features),
            images: clean_list(self.images),
            ..self
        })
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            original_price: product.original_price,
            category: product.category.clone(),
            rating: product.rating,
            in_stock: product.in_stock,
            tags: product.tags.clone(),
            features: product.features.clone(),
            images: product.images.clone(),
        }
    }
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::random(),
            name: "Fiddle Leaf Fig".to_string(),
            description: "Tall and leafy".to_string(),
            price: Amount::from_rupees(1500),
            original_price: Some(Amount::from_rupees(2000)),
            category: "Large Plants".to_string(),
            rating: 4.5,
            reviews: 12,
            in_stock: true,
            tags: vec!["indoor".to_string()],
            features: vec![],
            images: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(product().discount_percent(), Some(25));

        let mut p = product();
        p.original_price = None;
        assert_eq!(p.discount_percent(), None);

        p.original_price = Some(Amount::from_rupees(1000));
        assert_eq!(p.discount_percent(), None);
    }

    #[test]
    fn test_draft_validate_cleans_lists() {
        let mut draft = ProductDraft::from(&product());
        draft.name = "  Fiddle Leaf Fig ".to_string();
        draft.tags = vec!["indoor".into(), " ".into(), "indoor ".into(), "tall".into()];
        draft.images = vec![String::new(), "https://cdn.example/fig.jpg".into()];

        let draft = draft.validate().unwrap();
        assert_eq!(draft.name, "Fiddle Leaf Fig");
        assert_eq!(draft.tags, ["indoor", "tall"]);
        assert_eq!(draft.images, ["https://cdn.example/fig.jpg"]);
    }

    #[test]
    fn test_draft_validation_errors() {
        let mut draft = ProductDraft::from(&product());
        draft.name = " ".to_string();
        assert_eq!(draft.validate(), Err(ProductDraftError::MissingName));

        let mut draft = ProductDraft::from(&product());
        draft.category = "All".to_string();
        assert!(matches!(
            draft.validate(),
            Err(ProductDraftError::UnknownCategory(_))
        ));

        let mut draft = ProductDraft::from(&product());
        draft.rating = 5.5;
        assert_eq!(draft.validate(), Err(ProductDraftError::RatingOutOfRange(5.5)));

        let mut draft = ProductDraft::from(&product());
        draft.rating = f32::NAN;
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_cover_image_falls_back_to_placeholder() {
        let mut p = product();
        assert_eq!(p.cover_image(), "/placeholder.svg");
        p.images = vec!["https://cdn.example/fig.jpg".to_string()];
        assert_eq!(p.cover_image(), "https://cdn.example/fig.jpg");
    }
}
