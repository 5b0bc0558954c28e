/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod profile;
pub mod public;
pub mod reports;
pub mod trading;

pub use error::{Result, StexError};

pub use client::{Access, ClientConfig, Credentials, StexClient};
