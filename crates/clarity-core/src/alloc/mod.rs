//! Hash collections.
//!
//! Every lookup table in the Clarity crates (glyph atlases, material caches,
//! glyph key maps) uses AHash.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
