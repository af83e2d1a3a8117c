
mod config;
mod dictionary;
mod intmap;
mod pipeline;
mod similarity;
mod vectors;
mod window;

pub use config::{files_handling, load_stoplist, Config, Params};
pub use dictionary::Dictionary;
pub use intmap::IntMap;
pub use pipeline::Pipeline;
pub use similarity::{cosine, format_context, format_neighbors, Similarity};
pub use vectors::{Ingest, VectorStore};
pub use window::{Window, ATTR_NONE, ATTR_STOPWORD};
