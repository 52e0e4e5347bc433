//! Core ETL (Extract, Transform, Load) abstractions
//!
//! This module provides the trait definitions every harvest is built from:
//! an extractor pulls raw hits, a transformer flattens them, and a loader
//! writes the flattened records out.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::Pipeline;
pub use transform::Transformer;
