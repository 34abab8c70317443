//! Authentication request and response bodies.
//!
//! Every request type validates its fields before any store access; an
//! empty login, password, name, device id or refresh token is rejected.

use serde::{Deserialize, Serialize};
use tasklane_core::{MAX_PASSWORD_BYTES, UserId};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

// Re-export the token pair from tasklane-auth; it is the response of Login and RefreshToken
pub use tasklane_auth::TokenPair;

/// Register request.
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "login is required"))]
    #[schema(example = "alice")]
    pub login: String,
    /// At most 72 bytes; bcrypt would ignore the rest.
    #[validate(
        length(min = 1, message = "password is required"),
        custom(function = "password_fits_bcrypt")
    )]
    #[schema(example = "pw123")]
    pub password: String,
    #[validate(length(min = 1, max = 128, message = "name is required"))]
    #[schema(example = "Alice")]
    pub name: String,
}

/// Id of the newly registered user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: UserId,
}

/// Login request.
///
/// `device_id` names the client device; one session is opened per login and
/// bound to that device.
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64, message = "login is required"))]
    #[schema(example = "alice")]
    pub login: String,
    #[validate(
        length(min = 1, message = "password is required"),
        custom(function = "password_fits_bcrypt")
    )]
    #[schema(example = "pw123")]
    pub password: String,
    #[validate(length(min = 1, max = 128, message = "device_id is required"))]
    #[schema(example = "device-A")]
    pub device_id: String,
}

/// Request to exchange a refresh token for a new token pair.
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

fn password_fits_bcrypt(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password_too_long")
            .with_message(format!("password must be at most {MAX_PASSWORD_BYTES} bytes").into()));
    }
    Ok(())
}

macro_rules! redacted_debug {
    ($name:ident { $($field:ident),* }) => {
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    $(.field(stringify!($field), &self.$field))*
                    .finish_non_exhaustive()
            }
        }
    };
}

redacted_debug!(RegisterRequest { login, name });
redacted_debug!(LoginRequest { login, device_id });
redacted_debug!(RefreshTokenRequest {});
