use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// A Notion object ID, normalised to 32 lowercase hex characters.
///
/// The marker parameter keeps page, database and block IDs apart at
/// compile time even though Notion uses one format for all of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatabaseMarker;

pub type PageId = Id<PageMarker>;
pub type BlockId = Id<BlockMarker>;
pub type DatabaseId = Id<DatabaseMarker>;

impl<T> Id<T> {
    /// Parses a bare, dashed, or URL-embedded Notion ID.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Ok(Self::from_normalized(normalize_notion_id(input)?))
    }

    fn from_normalized(value: String) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }

    /// Creates a random ID. Useful for fixtures.
    pub fn new_v4() -> Self {
        Self::from_normalized(Uuid::new_v4().as_simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// First eight characters, used when logging.
    pub fn short(&self) -> &str {
        &self.value[..self.value.len().min(8)]
    }

    /// Dashed UUID form used in API paths.
    pub fn to_dashed(&self) -> String {
        if self.value.len() != 32 {
            return self.value.clone();
        }
        format!(
            "{}-{}-{}-{}-{}",
            &self.value[0..8],
            &self.value[8..12],
            &self.value[12..16],
            &self.value[16..20],
            &self.value[20..32]
        )
    }

    /// Reinterprets the ID as another object kind.
    ///
    /// A page is also the root block of its own content, so the block
    /// children endpoint accepts page IDs.
    pub fn retag<U>(&self) -> Id<U> {
        Id::from_normalized(self.value.clone())
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn normalize_notion_id(input: &str) -> Result<String, ValidationError> {
    let input = input.trim().trim_end_matches('/');

    if input.starts_with("http://") || input.starts_with("https://") {
        return match extract_id_from_url(input) {
            Some(id) => normalize_notion_id(id),
            None => Err(ValidationError::InvalidId(format!(
                "Could not extract ID from URL: {}",
                input
            ))),
        };
    }

    let compact = input.replace('-', "");
    if compact.len() != 32 {
        return Err(ValidationError::InvalidId(format!(
            "expected 32 hex characters, got {}",
            compact.len()
        )));
    }
    if !compact.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidId(
            "ID must contain only hexadecimal characters".to_string(),
        ));
    }

    Ok(compact.to_lowercase())
}

/// Pulls the trailing ID out of `notion.so/<title>-<id>` or `notion.so/<id>`.
fn extract_id_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last_segment = path.rsplit('/').next()?;

    if last_segment.len() == 36 && Uuid::parse_str(last_segment).is_ok() {
        return Some(last_segment);
    }
    let split = last_segment.len().checked_sub(32)?;
    if last_segment.is_char_boundary(split) {
        let tail = &last_segment[split..];
        if tail.chars().all(|c| c.is_ascii_hexdigit()) {
            return Some(tail);
        }
    }
    None
}
