//! Data model: sparse instances, sequences, datasets and the feature registry

mod dataset;
mod features;
mod instance;
pub mod io;
mod sequence;

pub use dataset::DataSet;
pub use features::Features;
pub use instance::{Instance, SparseInstance};
pub use sequence::Sequence;
