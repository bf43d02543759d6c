//! Article retrieval

pub mod charset;
pub mod resolver;

pub use resolver::{ArticleResolver, TITLE_NOT_FOUND, parse_article};
