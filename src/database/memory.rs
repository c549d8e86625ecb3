use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Product, ProductPatch, User};
use super::store::{ProductStore, StoreError, UserStore};

/// Process-local product collection, for `serve --in-memory` and tests.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    // Vec keeps insertion order for `list`
    products: RwLock<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.read().await.clone())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::Conflict(format!("Product {} already exists", product.id)));
        }
        products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.write().await;
        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        patch.apply(&mut product.fields);
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("User already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }
}
