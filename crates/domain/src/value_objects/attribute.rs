//! Moderation attribute tags
//!
//! Tags are free-form so moderators can introduce new vocabulary without a
//! release. They are normalized on construction:
//! - Trimmed and lowercased
//! - Non-empty
//! - No whitespace or commas (the list is stored comma-joined)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for a single tag
const MAX_ATTRIBUTE_LENGTH: usize = 64;

/// Tag applied when a moderator adds a player without naming any.
pub const DEFAULT_ATTRIBUTE: &str = "cheater";

// ============================================================================
// Attribute
// ============================================================================

/// A validated, lowercase moderation tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Attribute(String);

impl Attribute {
    /// Create a new normalized attribute.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The tag is empty after trimming
    /// - The tag exceeds 64 characters
    /// - The tag contains whitespace or a comma
    pub fn new(tag: impl AsRef<str>) -> Result<Self, DomainError> {
        let normalized = tag.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("Attribute cannot be empty"));
        }
        if normalized.chars().count() > MAX_ATTRIBUTE_LENGTH {
            return Err(DomainError::validation(format!(
                "Attribute cannot exceed {} characters",
                MAX_ATTRIBUTE_LENGTH
            )));
        }
        if normalized.contains(|c: char| c == ',' || c.is_whitespace()) {
            return Err(DomainError::validation(format!(
                "Invalid attribute: {}",
                normalized
            )));
        }
        Ok(Self(normalized))
    }

    pub fn cheater() -> Self {
        Self(DEFAULT_ATTRIBUTE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Attribute {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Attribute> for String {
    fn from(attribute: Attribute) -> String {
        attribute.0
    }
}

// ============================================================================
// AttributeList
// ============================================================================

/// Ordered, duplicate-free list of attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Attribute>", into = "Vec<Attribute>")]
pub struct AttributeList(Vec<Attribute>);

impl AttributeList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Normalize raw tags, collapsing duplicates (first occurrence wins).
    ///
    /// # Errors
    ///
    /// Fails on the first tag that is not a valid [`Attribute`].
    pub fn parse<I, S>(tags: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for tag in tags {
            list.push(Attribute::new(tag)?);
        }
        Ok(list)
    }

    /// Like [`AttributeList::parse`], but silently skips invalid tags.
    pub fn parse_lenient<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .filter_map(|tag| Attribute::new(tag).ok())
            .collect()
    }

    /// Append unless already present. Returns whether the list changed.
    pub fn push(&mut self, attribute: Attribute) -> bool {
        if self.0.contains(&attribute) {
            return false;
        }
        self.0.push(attribute);
        true
    }

    /// Falls back to `["cheater"]` when empty.
    pub fn or_default_tag(self) -> Self {
        if self.0.is_empty() {
            Self(vec![Attribute::cheater()])
        } else {
            self
        }
    }

    /// Keep only the attributes contained in `allowed`, preserving order.
    pub fn retain_only(&self, allowed: &[Attribute]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|attribute| allowed.contains(attribute))
                .cloned()
                .collect(),
        )
    }

    pub fn contains(&self, attribute: &Attribute) -> bool {
        self.0.contains(attribute)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-joined rendering, e.g. `cheater, racist`.
    pub fn join(&self, separator: &str) -> String {
        self.0
            .iter()
            .map(Attribute::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl FromIterator<Attribute> for AttributeList {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        let mut list = Self::new();
        for attribute in iter {
            list.push(attribute);
        }
        list
    }
}

impl From<Vec<Attribute>> for AttributeList {
    fn from(attributes: Vec<Attribute>) -> Self {
        attributes.into_iter().collect()
    }
}

impl From<AttributeList> for Vec<Attribute> {
    fn from(list: AttributeList) -> Vec<Attribute> {
        list.0
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
