// proxy module - registry signing proxy and web server

pub mod body;
pub mod config;
pub mod forwarder;
pub mod handlers;
pub mod headers;
pub mod server;
pub mod token_issuer;
pub mod upstream;

pub use config::{RegistryConfig, ServerConfig, UiConfig};
pub use forwarder::{ForwardRequest, ProxyError, RegistryProxy};
pub use server::{build_router, AppState, AxumServer};
pub use token_issuer::TokenIssuer;
