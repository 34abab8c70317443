//! Middleware modules for request processing.
//!
//! # Modules
//!
//! - [`auth`]: The request interceptor and the `AuthUser` extractor
//!
//! # Authentication Flow
//!
//! 1. The router matches the request to an RPC method
//! 2. [`auth::auth_interceptor`] lets public methods through untouched
//! 3. Every other call must carry `Authorization: Bearer <access token>`
//! 4. The verified [`AuthIdentity`](tasklane_auth::AuthIdentity) is stored in
//!    the request extensions
//! 5. Handlers receive it through the [`auth::AuthUser`] extractor
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn log_out(State(state): State<AppState>, AuthUser(identity): AuthUser) -> Result<StatusCode, AppError> {
//!     state.auth_service.log_out(&identity).await?;
//!     Ok(StatusCode::NO_CONTENT)
//! }
//! ```

pub mod auth;
