pub mod product;
pub mod user;

pub use product::{NewProduct, Product, ProductFields, ProductPatch};
pub use user::{PublicUser, User};
