pub mod error;
pub mod config;
pub mod tokenizer;
pub mod stopwords;
pub mod line;
pub mod similarity;
pub mod sampler;
pub mod index;
pub mod store;
pub mod assigner;
pub mod finalize;
pub mod pipeline;

pub use error::{ClusterError, Result};
pub use pipeline::{run, RunReport};
