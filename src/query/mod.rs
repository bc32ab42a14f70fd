pub mod backend;
pub mod executor;
pub mod matcher;
pub mod parser;

pub use backend::{Backend, BackendKind, QueryBackend};
pub use executor::{sort_by_distance, QueryExecutor, QueryResponse};
pub use parser::{parse_query, FuzzyQuery};
