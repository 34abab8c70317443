//! # Tasklane Models
//!
//! Domain models and DTOs for the Tasklane API.
//!
//! - [`auth`]: request/response bodies of the Register, Login and RefreshToken methods
//! - [`users`]: the persisted user row and its public projection
//! - [`sessions`]: the persisted session row
//!
//! # Example
//!
//! ```ignore
//! use tasklane_models::auth::{LoginRequest, RegisterRequest};
//! use validator::Validate;
//!
//! let request = LoginRequest {
//!     login: "alice".to_string(),
//!     password: "pw123".to_string(),
//!     device_id: "device-A".to_string(),
//! };
//! request.validate()?;
//! ```

pub mod auth;
pub mod sessions;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use auth::{
    LoginRequest, RefreshTokenRequest, RegisterRequest, RegisterResponse, TokenPair,
};
pub use sessions::Session;
pub use users::{User, UserResponse};
