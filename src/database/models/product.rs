use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, FieldErrors};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_CATEGORY_LEN: usize = 100;
pub const MAX_IMAGE_URL_LEN: usize = 2048;

/// The document body stored for each product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A stored product: its document plus the system fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: ProductFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Assign a fresh identifier and timestamps to a validated document.
    pub fn create(fields: ProductFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body for `POST /api/products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProduct {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewProduct {
    pub fn validate(self) -> Result<ProductFields, ApiError> {
        let name = self.name.trim().to_string();

        let mut check = FieldCheck::default();
        check.name(&name);
        check.price(&self.price);
        check.optional_fields(
            self.description.as_deref(),
            self.category.as_deref(),
            self.stock,
            self.image_url.as_deref(),
        );
        check.finish("Invalid product")?;

        Ok(ProductFields {
            name,
            price: self.price,
            description: self.description,
            category: self.category,
            stock: self.stock.unwrap_or(0),
            image_url: self.image_url,
        })
    }
}

/// Request body for `PUT /api/products/:id`. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ProductPatch {
    pub fn validate(mut self) -> Result<Self, ApiError> {
        self.name = self.name.map(|n| n.trim().to_string());

        let mut check = FieldCheck::default();
        if let Some(name) = &self.name {
            check.name(name);
        }
        if let Some(price) = &self.price {
            check.price(price);
        }
        check.optional_fields(
            self.description.as_deref(),
            self.category.as_deref(),
            self.stock,
            self.image_url.as_deref(),
        );
        check.finish("Invalid product update")?;

        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.stock.is_none()
            && self.image_url.is_none()
    }

    /// Overwrite the supplied fields, leaving the rest intact.
    pub fn apply(self, fields: &mut ProductFields) {
        if let Some(name) = self.name {
            fields.name = name;
        }
        if let Some(price) = self.price {
            fields.price = price;
        }
        if let Some(description) = self.description {
            fields.description = Some(description);
        }
        if let Some(category) = self.category {
            fields.category = Some(category);
        }
        if let Some(stock) = self.stock {
            fields.stock = stock;
        }
        if let Some(image_url) = self.image_url {
            fields.image_url = Some(image_url);
        }
    }
}

#[derive(Default)]
struct FieldCheck {
    errors: FieldErrors,
}

impl FieldCheck {
    fn fail(&mut self, field: &str, problem: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| problem.into());
    }

    fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.fail(field, format!("must be at most {} characters", max));
        }
    }

    fn name(&mut self, name: &str) {
        if name.is_empty() {
            self.fail("name", "must not be empty");
        }
        self.max_len("name", Some(name), MAX_NAME_LEN);
    }

    fn price(&mut self, price: &Decimal) {
        if price.is_sign_negative() && !price.is_zero() {
            self.fail("price", "must not be negative");
        }
    }

    fn optional_fields(
        &mut self,
        description: Option<&str>,
        category: Option<&str>,
        stock: Option<i64>,
        image_url: Option<&str>,
    ) {
        self.max_len("description", description, MAX_DESCRIPTION_LEN);
        self.max_len("category", category, MAX_CATEGORY_LEN);
        self.max_len("image_url", image_url, MAX_IMAGE_URL_LEN);
        if stock.is_some_and(|s| s < 0) {
            self.fail("stock", "must not be negative");
        }
    }

    fn finish(self, message: &str) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(message, self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_product(body: serde_json::Value) -> Result<ProductFields, ApiError> {
        serde_json::from_value::<NewProduct>(body).unwrap().validate()
    }

    #[test]
    fn minimal_product_gets_defaults() {
        let fields = new_product(json!({ "name": "  Widget ", "price": 9.99 })).unwrap();

        assert_eq!(fields.name, "Widget");
        assert_eq!(fields.price, Decimal::new(999, 2));
        assert_eq!(fields.stock, 0);
        assert_eq!(fields.description, None);
    }

    #[test]
    fn integer_price_is_accepted() {
        let fields = new_product(json!({ "name": "Widget", "price": 10 })).unwrap();
        assert_eq!(fields.price, Decimal::new(10, 0));
    }

    #[test]
    fn invalid_fields_are_all_reported() {
        let err = new_product(json!({ "name": " ", "price": -1, "stock": -5 })).unwrap_err();

        let ApiError::ValidationError { field_errors, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(field_errors.len(), 3);
        assert!(field_errors.contains_key("name"));
        assert!(field_errors.contains_key("price"));
        assert!(field_errors.contains_key("stock"));
    }

    #[test]
    fn unknown_and_system_fields_are_rejected() {
        assert!(serde_json::from_value::<NewProduct>(json!({
            "name": "Widget", "price": 1, "colour": "red"
        }))
        .is_err());
        assert!(serde_json::from_value::<ProductPatch>(json!({ "id": "abc" })).is_err());
    }

    #[test]
    fn missing_required_fields_fail_to_deserialize() {
        assert!(serde_json::from_value::<NewProduct>(json!({ "name": "Widget" })).is_err());
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut fields = new_product(json!({
            "name": "Widget", "price": 9.99, "category": "tools", "stock": 3
        }))
        .unwrap();

        let patch: ProductPatch = serde_json::from_value(json!({ "price": 12.5 })).unwrap();
        patch.validate().unwrap().apply(&mut fields);

        assert_eq!(fields.price, Decimal::new(125, 1));
        assert_eq!(fields.name, "Widget");
        assert_eq!(fields.category.as_deref(), Some("tools"));
        assert_eq!(fields.stock, 3);
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch: ProductPatch = serde_json::from_value(json!({ "price": 12.5 })).unwrap();
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "price": 12.5 }));
        assert!(ProductPatch::default().is_empty());
    }

    #[test]
    fn product_serializes_flat() {
        let product = Product::create(new_product(json!({ "name": "Widget", "price": 9.99 })).unwrap());
        let value = serde_json::to_value(&product).unwrap();

        assert_eq!(value["name"], "Widget");
        assert_eq!(value["price"], json!(9.99));
        assert_eq!(value["id"], json!(product.id));
        assert!(value.get("fields").is_none());
        assert!(value.get("description").is_none());
    }
}
