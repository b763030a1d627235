pub mod types;
pub mod parser;
pub mod detail;

pub use types::*;
pub use parser::parse_blame_porcelain;
pub use detail::parse_commit_detail;
