//! # Tasklane API
//!
//! The authentication and session core of the Tasklane task service, served
//! over HTTP/JSON with Axum and SQLite.
//!
//! ## Overview
//!
//! Users register with a login and password, log in from any number of
//! devices, and receive a short-lived access token plus a long-lived refresh
//! token per device session. Every method except Register and Login sits
//! behind a request interceptor that verifies the access token.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Request interceptor and AuthUser extractor
//! ├── modules/          # Feature modules
//! │   ├── auth/        # Register, Login, RefreshToken, LogOut; session manager
//! │   └── users/       # GetUser, GetMe
//! ├── docs.rs           # OpenAPI document
//! ├── logging.rs        # Request logging and subscriber setup
//! ├── metrics.rs        # Prometheus recorder and auth counters
//! ├── router.rs         # Route table and layers
//! ├── state.rs          # Configuration and shared application state
//! └── validator.rs      # Validated JSON extractor
//! ```
//!
//! Workspace crates:
//!
//! - `tasklane-core`: `AuthError`, `AppError`, typed ids, password hashing
//! - `tasklane-config`: environment configuration
//! - `tasklane-auth`: the token codec
//! - `tasklane-models`: DTOs and persisted rows
//! - `tasklane-db`: credential store traits, SQLite and in-memory stores
//! - `tasklane-cli`: `migrate` and `create-user`
//!
//! ## Tokens and Sessions
//!
//! Both token kinds carry the user id, session id and device id, and are
//! signed with separate secrets:
//!
//! - **Access Token**: short-lived (default 15 minutes), sent as
//!   `Authorization: Bearer <token>`
//! - **Refresh Token**: long-lived (default 30 days), exchanged exactly once
//!
//! Each login opens a session row holding the current refresh token. A
//! refresh swaps that value in one conditional update, so a replayed refresh
//! token matches nothing and is rejected. Logout deletes the row.
//!
//! Access tokens are verified without touching the store and stay valid until
//! they expire, even after logout.
//!
//! ## Quick Start
//!
//! ```bash
//! JWT_ACCESS_SECRET=change-me-access
//! JWT_REFRESH_SECRET=change-me-refresh
//! DATABASE_URL=sqlite://storage/tasklane.db?mode=rwc
//! ```
//!
//! ```bash
//! cargo run --bin tasklane-cli -- migrate
//! cargo run --bin tasklane
//! ```
//!
//! The OpenAPI document is served at `/api-docs/openapi.json`.

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use tasklane_auth;
pub use tasklane_config;
pub use tasklane_core;
pub use tasklane_db;
pub use tasklane_models;
