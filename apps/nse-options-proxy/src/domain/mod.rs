//! Domain Layer - Core option-chain types and transformations.
//!
//! This layer contains the value types and pure transformations for
//! expiry dates and option chains. Nothing here performs I/O; the
//! infrastructure layer feeds it upstream payloads.

/// Expiry date parsing, ordering, and deduplication.
pub mod expiry;

/// Option records, market snapshots, and chain partitioning.
pub mod option_chain;
