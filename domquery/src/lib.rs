//! Fetch an HTML page, parse it, and query it by tag name and attribute.
//!
//! ```no_run
//! # async fn run() -> domquery::Result<()> {
//! let url = url::Url::parse("https://example.com/").unwrap();
//! let links = domquery::Query::from_url(&url)
//!     .await?
//!     .elements_by_tag_name("a")
//!     .attr("href");
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod fetcher;
pub mod parser;
pub mod query;
pub mod walker;

pub use document::{Attribute, Document, Node, NodeId, NodeKind};
pub use error::{QueryError, Result};
pub use fetcher::{FetchConfig, Fetcher};
pub use query::Query;
