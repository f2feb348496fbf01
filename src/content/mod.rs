//! Content module - post parsing, loading and the published collection

mod collection;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use collection::PostCollection;
pub use frontmatter::{split_document, FrontMatter};
pub use loader::ContentLoader;
pub use markdown::MarkdownRenderer;
pub use post::{Post, PostParser};
