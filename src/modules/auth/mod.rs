//! Authentication module: Register, Login, RefreshToken and LogOut.
//!
//! - `controller.rs`: HTTP handlers
//! - `router.rs`: route table keyed by method name
//! - `service.rs`: [`AuthService`](service::AuthService), the orchestration
//! - `session.rs`: [`SessionManager`](session::SessionManager), the session lifecycle

pub mod controller;
pub mod router;
pub mod service;
pub mod session;
