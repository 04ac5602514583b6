// qubex-api: Async Rust client for the SonarQube Web API

pub mod auth;
pub mod client;
pub mod components;
pub mod error;
pub mod issues;
pub mod measures;
pub mod models;
pub mod rules;
pub mod system;
pub mod transport;

pub use auth::Credentials;
pub use client::SonarClient;
pub use error::Error;
pub use issues::IssueSearch;
pub use transport::{TlsMode, TransportConfig};
