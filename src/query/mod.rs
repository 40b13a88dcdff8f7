pub mod cache;
pub mod executor;
pub mod parser;

pub use cache::MemoCache;
pub use executor::{MatchedItem, RatioResult, SearchEngine, SearchResult};
pub use parser::{parse_query, quote_aware_split, Query, Words};
