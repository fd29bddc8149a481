//! NSE Website Adapter
//!
//! Implements `OptionsDataPort` against the public NSE website:
//!
//! - `session`: browser-like HTTP session with cookie bootstrap
//! - `api_types`: wire types for the contract-info and option-chain APIs
//! - `client`: the port implementation
//!
//! Every port call opens a fresh session and drops it before returning.

pub mod api_types;
pub mod client;
pub mod session;

pub use client::{NseClient, NseClientConfig};
pub use session::NseSession;
