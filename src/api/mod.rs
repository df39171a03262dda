//! REST backend access: the `Backend` seam, its reqwest implementation, wire
//! types and error normalization.

pub mod backend;
pub mod client;
pub mod error;
pub mod types;

pub use backend::Backend;
pub use client::HttpBackend;
pub use error::ApiError;
pub use types::{
    AuthResponse, Product, ProductInput, RecoveryResponse, User, UserInput, changed_fields,
};
