//! Catalog product types and input validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use signal_living_core::{Price, PriceError, ProductCategory, ProductId, ProductStatus};

/// Maximum discount percentage.
pub const MAX_DISCOUNT: u8 = 100;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: ProductCategory,
    pub price: Price,
    pub stock: u32,
    pub status: ProductStatus,
    pub description: String,
    pub image_url: String,
    pub is_new_product: bool,
    pub is_best: bool,
    /// Discount percentage, 0-100.
    pub discount: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("product name is required")]
    MissingName,
    #[error(transparent)]
    Price(#[from] PriceError),
    #[error("stock must be an integer of 0 or greater")]
    InvalidStock,
    #[error("discount must be between 0 and {MAX_DISCOUNT}")]
    InvalidDiscount,
}

/// Create/replace body for `POST /api/admin/products` and `PUT /api/admin/products/{id}`.
///
/// Numeric fields are taken wide so out-of-range values produce a
/// descriptive validation error rather than a generic parse failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub category: ProductCategory,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_new_product: bool,
    #[serde(default)]
    pub is_best: bool,
    #[serde(default)]
    pub discount: i64,
}

/// Validated product fields, ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub category: ProductCategory,
    pub price: Price,
    pub stock: u32,
    pub status: ProductStatus,
    pub description: String,
    pub image_url: String,
    pub is_new_product: bool,
    pub is_best: bool,
    pub discount: u8,
}

impl ProductRequest {
    /// Validate into a [`ProductDraft`].
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(self) -> Result<ProductDraft, ProductError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductError::MissingName);
        }
        let price = Price::new(self.price)?;
        let stock = i32::try_from(self.stock)
            .ok()
            .and_then(|s| u32::try_from(s).ok())
            .ok_or(ProductError::InvalidStock)?;
        let discount = u8::try_from(self.discount)
            .ok()
            .filter(|d| *d <= MAX_DISCOUNT)
            .ok_or(ProductError::InvalidDiscount)?;

        Ok(ProductDraft {
            name: name.to_owned(),
            category: self.category,
            price,
            stock,
            status: self.status,
            description: self.description.trim().to_owned(),
            image_url: self.image_url.trim().to_owned(),
            is_new_product: self.is_new_product,
            is_best: self.is_best,
            discount,
        })
    }
}

/// Listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    /// Products visible in the public catalog.
    #[must_use]
    pub const fn on_sale(category: Option<ProductCategory>) -> Self {
        Self {
            category,
            status: Some(ProductStatus::OnSale),
        }
    }

    /// Whether a product passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category.is_none_or(|c| c == product.category)
            && self.status.is_none_or(|s| s == product.status)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> ProductRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_minimal_request_uses_defaults() {
        let draft = request(serde_json::json!({
            "name": "  린넨 앞치마 ",
            "category": "aprons",
            "price": 45000,
            "stock": 30
        }))
        .validate()
        .unwrap();

        assert_eq!(draft.name, "린넨 앞치마");
        assert_eq!(draft.status, ProductStatus::OnSale);
        assert_eq!(draft.discount, 0);
        assert!(!draft.is_best);
        assert_eq!(draft.price, Price::from_units(45_000));
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = request(serde_json::json!({
            "name": "Slippers",
            "category": "slippers",
            "price": -5,
            "stock": 1
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, ProductError::Price(PriceError::Negative));
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = request(serde_json::json!({
            "name": "   ",
            "category": "bedding",
            "price": 1000
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, ProductError::MissingName);
    }

    #[test]
    fn test_stock_and_discount_bounds() {
        let base = serde_json::json!({ "name": "Set", "category": "pajamas", "price": 1 });

        let mut negative_stock = base.clone();
        negative_stock["stock"] = serde_json::json!(-1);
        assert_eq!(
            request(negative_stock).validate().unwrap_err(),
            ProductError::InvalidStock
        );

        let mut big_discount = base.clone();
        big_discount["discount"] = serde_json::json!(101);
        assert_eq!(
            request(big_discount).validate().unwrap_err(),
            ProductError::InvalidDiscount
        );

        let mut full_discount = base;
        full_discount["discount"] = serde_json::json!(100);
        assert_eq!(request(full_discount).validate().unwrap().discount, 100);
    }

    #[test]
    fn test_unknown_category_fails_to_deserialize() {
        let result = serde_json::from_value::<ProductRequest>(serde_json::json!({
            "name": "Shoes",
            "category": "shoes",
            "price": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_matches() {
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(1),
            name: "호텔식 슬리퍼".to_owned(),
            category: ProductCategory::Slippers,
            price: Price::from_units(35_000),
            stock: 0,
            status: ProductStatus::SoldOut,
            description: String::new(),
            image_url: String::new(),
            is_new_product: false,
            is_best: true,
            discount: 0,
            created_at: now,
            updated_at: now,
        };

        assert!(ProductFilter::default().matches(&product));
        assert!(!ProductFilter::on_sale(None).matches(&product));
        assert!(
            ProductFilter {
                category: Some(ProductCategory::Slippers),
                status: None
            }
            .matches(&product)
        );
    }
}
