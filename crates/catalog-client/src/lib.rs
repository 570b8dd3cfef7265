#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
pub mod headers;
pub mod session;
pub mod transport;
mod types;

pub use client::ProductClient;
pub use config::{ApiConfig, ApiEndpoint, ClientConfig, ProductRoute};
pub use error::{ClientError, SessionError};
pub use session::{
    FileSessionProvider, IdToken, Session, SessionProvider, StaticSessionProvider, UserClaims,
};
pub use transport::{ApiTransport, RequestInit, RestTransport};
pub use types::*;
