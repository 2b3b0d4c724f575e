use vizsla_context::{TagConstructionError, TagKey};

/// The fixed set of tag keys measurements can be sliced by.
///
/// Four dimensions cover the client's operational surface: the command being executed (`cmd`), the
/// kind and detail of an error (`kind`, `detail`), and the lifecycle state of a pooled connection
/// (`state`). All four have a small, bounded vocabulary -- an enforced constraint, since every
/// distinct value multiplies the exported time-series count.
///
/// The registry is read-only after construction; there is no way to add or remove keys.
#[derive(Clone, Debug)]
pub struct TagKeys {
    command: TagKey,
    kind: TagKey,
    detail: TagKey,
    state: TagKey,
}

impl TagKeys {
    /// Creates the tag key registry.
    ///
    /// # Errors
    ///
    /// If any key name is rejected by the tag system, an error is returned. Callers should treat
    /// this as fatal: an unusable tag key silently disables a whole dimension of observability.
    pub fn new() -> Result<Self, TagConstructionError> {
        Ok(Self {
            command: TagKey::new("cmd")?,
            kind: TagKey::new("kind")?,
            detail: TagKey::new("detail")?,
            state: TagKey::new("state")?,
        })
    }

    /// Gets the command name key (`cmd`).
    pub fn command(&self) -> &TagKey {
        &self.command
    }

    /// Gets the error kind key (`kind`).
    pub fn kind(&self) -> &TagKey {
        &self.kind
    }

    /// Gets the error detail key (`detail`).
    pub fn detail(&self) -> &TagKey {
        &self.detail
    }

    /// Gets the connection state key (`state`).
    pub fn state(&self) -> &TagKey {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_are_stable() {
        let keys = TagKeys::new().expect("registry construction should succeed");
        assert_eq!(keys.command(), "cmd");
        assert_eq!(keys.kind(), "kind");
        assert_eq!(keys.detail(), "detail");
        assert_eq!(keys.state(), "state");
    }
}
