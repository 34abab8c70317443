//! # Tasklane Core
//!
//! Core types, errors, and utilities for the Tasklane API.
//!
//! This crate provides foundational types used throughout the Tasklane application:
//!
//! - [`errors`]: The authentication error taxonomy and its HTTP response conversion
//! - [`ids`]: Strongly-typed identifiers for users, sessions and devices
//! - [`methods`]: RPC method names shared by the router and the interceptor
//! - [`password`]: Secure password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use tasklane_core::{AppError, AuthError, hash_password, verify_password};
//!
//! // Domain errors convert into HTTP errors with a stable code
//! let error: AppError = AuthError::SessionNotFound.into();
//! assert_eq!(error.code, "session_not_found");
//!
//! // Hash a password
//! let hash = hash_password("secure_password")?;
//! assert!(verify_password("secure_password", &hash)?);
//! ```

pub mod errors;
pub mod ids;
pub mod methods;
pub mod password;

// Re-export commonly used types at crate root
pub use errors::{AppError, AuthError, ErrorCode};
pub use ids::{DeviceId, SessionId, UserId};
pub use password::{
    MAX_PASSWORD_BYTES, check_password_length, hash_password, hash_password_with_cost,
    verify_password,
};
