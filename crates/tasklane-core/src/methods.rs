//! Names of the RPC methods exposed over HTTP.
//!
//! The route path doubles as the method name, so the interceptor allow-list
//! and the router agree on a single set of constants.

pub const REGISTER: &str = "/api/auth/register";
pub const LOGIN: &str = "/api/auth/login";
pub const REFRESH_TOKEN: &str = "/api/auth/refresh";
pub const LOG_OUT: &str = "/api/auth/logout";
pub const GET_ME: &str = "/api/users/me";
pub const GET_USER: &str = "/api/users/{user_id}";
