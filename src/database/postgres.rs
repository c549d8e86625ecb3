use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::models::{Product, ProductFields, ProductPatch, User};
use super::store::{ProductStore, StoreError, UserStore};

const PRODUCT_COLUMNS: &str = "id, doc, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, name, password_hash, role, created_at";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    doc: Json<ProductFields>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            fields: row.doc.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Products as JSONB documents in the `products` table.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let sql = format!("SELECT {} FROM products ORDER BY seq", PRODUCT_COLUMNS);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        sqlx::query("INSERT INTO products (id, doc, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(product.id)
            .bind(Json(&product.fields))
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(product)
    }

    async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Option<Product>, StoreError> {
        // jsonb `||` overwrites only the keys present in the patch
        let sql = format!(
            "UPDATE products SET doc = doc || $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(Json(&patch))
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e: String| StoreError::Corrupt(format!("user {}: {}", row.id, e)))?;

        Ok(Self {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, role, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Conflict("User already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}
