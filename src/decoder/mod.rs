//! Tag payload decoding
//!
//! - Family definitions and the compiled-in registry
//! - Codeword tables
//! - Hamming-distance matching of observed payloads

/// Tag families and the name registry
pub mod family;
/// Nearest-codeword search
pub mod matcher;
/// Codeword tables, one per family
pub mod tables;

pub use family::{FamilyRegistry, TagFamily, supported_families};
pub use matcher::{Match, Matcher};
