//! Front-matter parsing

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::PostError;

/// Front-matter data from a post
///
/// Keys other than the ones below are accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub excerpt: Option<String>,
    #[serde(
        alias = "image",
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub og_image: Option<String>,
    /// Raw publication date; absent means draft
    #[serde(
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<String>,
}

impl FrontMatter {
    /// Split a post document and parse its metadata block
    /// Returns (front_matter, markdown_body)
    pub fn parse(content: &str) -> Result<(Self, &str), PostError> {
        let (metadata, body) = split_document(content)?;
        Ok((Self::parse_yaml(metadata)?, body))
    }

    /// Parse a metadata block on its own
    ///
    /// An empty block, or one holding only comments, yields the empty mapping.
    pub fn parse_yaml(metadata: &str) -> Result<Self, PostError> {
        let has_content = metadata.lines().any(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        });
        if !has_content {
            return Ok(FrontMatter::default());
        }

        let value: Value = serde_yaml::from_str(metadata)?;
        if value.is_null() {
            return Ok(FrontMatter::default());
        }

        Ok(serde_yaml::from_value(value)?)
    }

    /// Serialize back into a post source document with `body` appended
    pub fn to_document(&self, body: &str) -> Result<String, PostError> {
        let yaml = if *self == FrontMatter::default() {
            String::new()
        } else {
            serde_yaml::to_string(self)?
        };
        Ok(format!("{}\n{}{}\n{}", DELIMITER, yaml, DELIMITER, body))
    }
}

/// Accept any YAML scalar as text (`title: 1984`, `excerpt: true`)
///
/// Null is treated as absent; sequences and mappings are rejected.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Tagged(tagged) => Err(de::Error::custom(format!(
            "unexpected tagged value `{}`",
            tagged.tag
        ))),
        Value::Sequence(_) => Err(de::Error::invalid_type(de::Unexpected::Seq, &"a scalar")),
        Value::Mapping(_) => Err(de::Error::invalid_type(de::Unexpected::Map, &"a scalar")),
    }
}

/// The line that opens and closes the metadata block
const DELIMITER: &str = "---";

/// Split a post document into its metadata block and Markdown body
///
/// Only the first two `---` lines are structural: anything before the first is
/// dropped, and any later `---` line is part of the body.
pub fn split_document(content: &str) -> Result<(&str, &str), PostError> {
    let mut delimiters = delimiter_lines(content);

    let (_, metadata_start) = delimiters.next().ok_or(PostError::MissingFrontMatter)?;
    let (metadata_end, body_start) = delimiters.next().ok_or(PostError::MissingFrontMatter)?;

    Ok((
        &content[metadata_start..metadata_end],
        &content[body_start..],
    ))
}

/// Byte ranges `(line_start, next_line_start)` of every delimiter line
///
/// A delimiter line must end in a newline; a `\r` before it is tolerated.
fn delimiter_lines(content: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut offset = 0;
    content.split_inclusive('\n').filter_map(move |line| {
        let start = offset;
        offset += line.len();

        let text = line.strip_suffix('\n')?;
        let text = text.strip_suffix('\r').unwrap_or(text);
        (text == DELIMITER).then_some((start, offset))
    })
}
