pub mod loader;
pub mod validator;

pub use loader::{load_corpus, parse_corpus, Dataset, DatasetStats};
pub use validator::{check, validate, Rejection};
