//! Query analysis
//!
//! Turns free text into a typed intent plus facets, then maps those facets
//! onto the PokeAPI resource families to call.

pub mod extractor;
pub mod intent;
pub mod mapper;
