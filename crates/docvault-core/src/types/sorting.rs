//! Sorting types for record listings.
//!
//! `SortKey` is a closed allow-list: anything outside it silently falls
//! back to the upload timestamp so untrusted input can never reach an
//! `ORDER BY` clause as a raw string.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        Self::Desc
    }
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parse a query-string value; anything but `asc` means descending.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// Columns a record listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Server-assigned upload timestamp (the default).
    UploadedAt,
    /// Record description.
    Description,
    /// Derived file type.
    FileType,
    /// User-supplied logical document date.
    FileDate,
}

impl Default for SortKey {
    fn default() -> Self {
        Self::UploadedAt
    }
}

impl SortKey {
    /// The database column backing this key.
    pub fn column(&self) -> &'static str {
        match self {
            Self::UploadedAt => "uploaded_at",
            Self::Description => "description",
            Self::FileType => "file_type",
            Self::FileDate => "file_date",
        }
    }

    /// Parse a query-string value, falling back to `UploadedAt` for
    /// anything outside the allow-list.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("uploadedat") => Self::UploadedAt,
            Some(v) if v.eq_ignore_ascii_case("description") => Self::Description,
            Some(v) if v.eq_ignore_ascii_case("filetype") => Self::FileType,
            Some(v) if v.eq_ignore_ascii_case("filedate") => Self::FileDate,
            _ => Self::UploadedAt,
        }
    }
}

/// A complete sort specification.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SortSpec {
    /// Which column to sort on.
    pub key: SortKey,
    /// Which direction to sort in.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create a new sort specification.
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_falls_back_to_uploaded_at() {
        assert_eq!(SortKey::parse_lenient(Some("id")), SortKey::UploadedAt);
        assert_eq!(
            SortKey::parse_lenient(Some("'; DROP TABLE file_records; --")),
            SortKey::UploadedAt
        );
        assert_eq!(SortKey::parse_lenient(None), SortKey::UploadedAt);
    }

    #[test]
    fn test_known_keys_parse_case_insensitively() {
        assert_eq!(SortKey::parse_lenient(Some("fileDate")), SortKey::FileDate);
        assert_eq!(SortKey::parse_lenient(Some("FILETYPE")), SortKey::FileType);
        assert_eq!(
            SortKey::parse_lenient(Some("description")),
            SortKey::Description
        );
    }

    #[test]
    fn test_direction_defaults_to_desc() {
        assert_eq!(SortDirection::parse_lenient(None), SortDirection::Desc);
        assert_eq!(
            SortDirection::parse_lenient(Some("sideways")),
            SortDirection::Desc
        );
        assert_eq!(
            SortDirection::parse_lenient(Some("ASC")),
            SortDirection::Asc
        );
    }
}
