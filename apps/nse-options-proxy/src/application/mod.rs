//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the application services and port interfaces
//! that define how the domain interacts with the upstream data provider.

/// Port interfaces for external systems (upstream options data).
pub mod ports;

/// Application services for expiry, chain, and market lookups.
pub mod services;
