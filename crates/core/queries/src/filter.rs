//! Caller-supplied filters for composed queries.

use crate::catalog::{LIVE_DATA, QueryName, RECENT_HISTORY};

/// Filter value meaning "no restriction".
pub const ALL_SENTINEL: &str = "All";

/// Maximum accepted length, in bytes, of a single filter value.
pub const MAX_FILTER_VALUE_LEN: usize = 256;

/// Selects the base query wrapped by a composed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataType {
    /// Rolling-window history, backed by [`RECENT_HISTORY`].
    RecentHistory,
    /// Live backlog volume, backed by [`LIVE_DATA`].
    Live,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::RecentHistory => "recent-history",
            DataType::Live => "live",
        }
    }

    /// Name of the catalog entry this data type selects.
    pub fn query_name(&self) -> QueryName {
        match self {
            DataType::RecentHistory => RECENT_HISTORY,
            DataType::Live => LIVE_DATA,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DataType {
    type Err = InvalidDataTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent-history" => Ok(DataType::RecentHistory),
            "live" => Ok(DataType::Live),
            other => Err(InvalidDataTypeError(other.to_string())),
        }
    }
}

/// The data type is not one of `recent-history` or `live`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid data type '{0}', expected one of: recent-history, live")]
pub struct InvalidDataTypeError(pub String);

/// Restriction applied to a single dimension attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldFilter {
    /// Field absent, empty, or set to the `All` sentinel.
    #[default]
    Unrestricted,
    /// Keep only dimension rows whose attribute equals the value.
    Equals(String),
}

impl FieldFilter {
    /// Interprets a raw request value.
    ///
    /// `None`, the empty string and `All` mean no restriction. Concrete values longer than
    /// [`MAX_FILTER_VALUE_LEN`] bytes or containing control characters are rejected.
    pub fn parse(field: &'static str, value: Option<&str>) -> Result<Self, InvalidFilterError> {
        let value = match value {
            None | Some("") | Some(ALL_SENTINEL) => return Ok(FieldFilter::Unrestricted),
            Some(value) => value,
        };

        if value.len() > MAX_FILTER_VALUE_LEN {
            return Err(InvalidFilterError::TooLong {
                field,
                length: value.len(),
            });
        }
        if value.chars().any(char::is_control) {
            return Err(InvalidFilterError::ControlCharacter { field });
        }

        Ok(FieldFilter::Equals(value.to_string()))
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            FieldFilter::Unrestricted => None,
            FieldFilter::Equals(value) => Some(value),
        }
    }
}

/// A filter value failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFilterError {
    #[error("filter '{field}' is {length} bytes long, maximum is {MAX_FILTER_VALUE_LEN}")]
    TooLong { field: &'static str, length: usize },

    #[error("filter '{field}' contains control characters")]
    ControlCharacter { field: &'static str },
}

/// Per-request filters for a composed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    pub data_type: DataType,
    pub state: FieldFilter,
    pub city: FieldFilter,
    pub dop_id: FieldFilter,
}

impl FilterSet {
    /// A filter set that restricts nothing.
    pub fn unrestricted(data_type: DataType) -> Self {
        Self {
            data_type,
            state: FieldFilter::Unrestricted,
            city: FieldFilter::Unrestricted,
            dop_id: FieldFilter::Unrestricted,
        }
    }

    /// Builds a filter set from raw request values, validating each of them.
    pub fn parse(
        data_type: DataType,
        state: Option<&str>,
        city: Option<&str>,
        dop_id: Option<&str>,
    ) -> Result<Self, InvalidFilterError> {
        Ok(Self {
            data_type,
            state: FieldFilter::parse("state", state)?,
            city: FieldFilter::parse("city", city)?,
            dop_id: FieldFilter::parse("dopId", dop_id)?,
        })
    }
}
