//! Domain models for CRO project intake and matching.

mod matching;
mod provider;
mod requirements;

pub use matching::*;
pub use provider::*;
pub use requirements::*;
