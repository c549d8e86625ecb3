use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{Product, ProductPatch, User};

/// Errors from the persistence backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// The product collection. Every call is one persistence operation.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products in insertion order.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn insert(&self, product: Product) -> Result<Product, StoreError>;

    /// Apply `patch` to an existing product and return the updated document.
    /// `None` when no product has `id`; never creates one.
    async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, StoreError>;

    /// Remove the product, reporting whether one was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Round trip to the backend for health reporting.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when the email is taken.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
