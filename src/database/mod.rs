pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::{MemoryProductStore, MemoryUserStore};
pub use postgres::{PgProductStore, PgUserStore};
pub use store::{ProductStore, StoreError, UserStore};
