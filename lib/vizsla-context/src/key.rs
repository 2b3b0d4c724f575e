use std::{fmt, sync::Arc};

use crate::{check_tag_part, error::TagConstructionError};

/// A tag dimension key.
///
/// A key names a dimension that measurements can be sliced by, such as the command being executed.
/// It carries no value by itself: values are bound to a key per-operation, via
/// [`ExecutionContext`][crate::ExecutionContext].
///
/// Keys are validated at construction and immutable afterwards, so a key held in a registry can be
/// shared and cloned cheaply across arbitrarily many call sites.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TagKey(Arc<str>);

impl TagKey {
    /// Creates a new `TagKey` from the given name.
    ///
    /// # Errors
    ///
    /// If the name is empty, longer than 255 bytes, or contains anything other than printable
    /// ASCII characters, an error is returned.
    pub fn new<S>(name: S) -> Result<Self, TagConstructionError>
    where
        S: Into<String>,
    {
        let name = name.into();
        match check_tag_part(&name) {
            Ok(()) => Ok(Self(name.into())),
            Err(reason) => Err(TagConstructionError::InvalidKey { key: name, reason }),
        }
    }

    /// Gets the name of the key.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TagKey {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
