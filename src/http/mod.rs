//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! nginx mail proxy (auth_http request headers)
//!     → server.rs (Axum setup, middleware)
//!     → middleware/auth_key.rs (shared secret)
//!     → request.rs (extract login, split domain)
//!     → [resolver picks backend]
//!     → response.rs (Auth-Status / Auth-Server / Auth-Port headers)
//!     → nginx
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{split_address, AuthRequest};
pub use response::{AuthResponse, Rejection};
pub use server::{AppState, HttpServer};
