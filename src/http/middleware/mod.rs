pub mod auth_key;

pub use auth_key::{auth_key_middleware, AuthKeyState};
