use std::{fmt, sync::Arc};

use crate::{check_tag_part, error::TagConstructionError, key::TagKey};

/// A tag value.
///
/// A value bound to a [`TagKey`] for the duration of one logical operation. Values are produced at
/// the moment of an event and attached to an [`ExecutionContext`][crate::ExecutionContext]; they
/// are not stored anywhere global.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TagValue(Arc<str>);

impl TagValue {
    /// Creates a new `TagValue` for the given key.
    ///
    /// # Errors
    ///
    /// If the value is empty, longer than 255 bytes, or contains anything other than printable
    /// ASCII characters, an error is returned.
    pub fn new<S>(key: &TagKey, value: S) -> Result<Self, TagConstructionError>
    where
        S: Into<String>,
    {
        let value = value.into();
        match check_tag_part(&value) {
            Ok(()) => Ok(Self(value.into())),
            Err(reason) => Err(TagConstructionError::InvalidValue {
                key: key.name().to_string(),
                value,
                reason,
            }),
        }
    }

    /// Gets the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TagValue {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
