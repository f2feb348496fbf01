//! Error types for post parsing

use thiserror::Error;

/// Errors raised while turning one post source document into a [`crate::content::Post`]
#[derive(Debug, Error)]
pub enum PostError {
    /// The document does not contain two `---` delimiter lines
    #[error("missing front matter: expected a `---` line before and after the metadata block")]
    MissingFrontMatter,

    /// The metadata block is not a valid YAML mapping
    #[error("invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    /// `published_at` is present but not a recognised date
    #[error("invalid published_at value `{0}`")]
    InvalidDate(String),
}
