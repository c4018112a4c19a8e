//! Admin UI backend for the object registry.
//!
//! Serves the browser console, signs every registry call with a short-lived
//! RS256 token and relays it to the registry API. [`client::RegistryClient`]
//! is the typed view of the same proxy surface.

pub mod client;
pub mod models;
pub mod modules;
pub mod proxy;
