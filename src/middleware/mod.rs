pub mod auth;
pub mod gate;

pub use auth::{authenticate, AuthUser};
pub use gate::{enforce, Capability, Decision, Gate};
