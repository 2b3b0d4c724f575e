use std::sync::Arc;

use crate::{error::TagConstructionError, key::TagKey, value::TagValue};

/// An execution-scoped tag carrier.
///
/// A context carries the tag values that are active for one logical operation, such as a single
/// client call. It is a persistent overlay: inserting tag values produces a *new* context layering
/// the insertion onto the parent, and the parent remains valid and unchanged. This makes it safe
/// for concurrent operations to branch from one shared parent context without locking -- no branch
/// can ever observe another branch's tags.
///
/// Lookup walks layers innermost-first, so a key re-inserted in a child context shadows the
/// parent's mapping for that key. A context is cheap to clone; clones share their layers.
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    head: Option<Arc<Layer>>,
}

#[derive(Debug)]
struct Layer {
    key: TagKey,
    values: Vec<TagValue>,
    parent: Option<Arc<Layer>>,
}

impl ExecutionContext {
    /// Creates a new, empty `ExecutionContext`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns `true` if no tag values are active in this context.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Derives a new context with the given values inserted under the given key.
    ///
    /// The returned context maps `key` to the given values, in order, shadowing any values the
    /// parent held for that key. This context is not modified. If the value sequence is empty, the
    /// derived context is observationally identical to this one: no insertion takes place.
    ///
    /// # Errors
    ///
    /// If any value violates the tag encoding constraints, an error is returned and nothing is
    /// inserted.
    pub fn with_tag_values<I, S>(&self, key: &TagKey, values: I) -> Result<Self, TagConstructionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut validated = Vec::new();
        for value in values {
            validated.push(TagValue::new(key, value)?);
        }

        if validated.is_empty() {
            return Ok(self.clone());
        }

        Ok(Self {
            head: Some(Arc::new(Layer {
                key: key.clone(),
                values: validated,
                parent: self.head.clone(),
            })),
        })
    }

    /// Derives a new context with a single value inserted under the given key.
    ///
    /// # Errors
    ///
    /// If the value violates the tag encoding constraints, an error is returned and nothing is
    /// inserted.
    pub fn with_tag_value<S>(&self, key: &TagKey, value: S) -> Result<Self, TagConstructionError>
    where
        S: Into<String>,
    {
        self.with_tag_values(key, [value])
    }

    /// Gets the values active for the given key, if any.
    ///
    /// If the key was inserted more than once along this context's ancestry, the innermost
    /// insertion wins.
    pub fn get(&self, key: &TagKey) -> Option<&[TagValue]> {
        let mut current = self.head.as_deref();
        while let Some(layer) = current {
            if layer.key == *key {
                return Some(&layer.values);
            }
            current = layer.parent.as_deref();
        }
        None
    }

    /// Returns an iterator over the effective tags of this context.
    ///
    /// Yields each active key exactly once, paired with the first value of its innermost
    /// insertion. Shadowed insertions are skipped. Iteration order is innermost-first.
    pub fn effective_tags(&self) -> EffectiveTags<'_> {
        EffectiveTags {
            current: self.head.as_deref(),
            seen: Vec::new(),
        }
    }
}

/// An iterator over the effective `(key, value)` pairs of an [`ExecutionContext`].
pub struct EffectiveTags<'a> {
    current: Option<&'a Layer>,
    seen: Vec<&'a TagKey>,
}

impl<'a> Iterator for EffectiveTags<'a> {
    type Item = (&'a TagKey, &'a TagValue);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(layer) = self.current {
            self.current = layer.parent.as_deref();

            if self.seen.contains(&&layer.key) {
                continue;
            }
            self.seen.push(&layer.key);

            // Layers are only created from non-empty value sequences.
            return layer.values.first().map(|value| (&layer.key, value));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use proptest::{collection::vec as arb_vec, prelude::*};

    use super::*;

    fn key(name: &str) -> TagKey {
        TagKey::new(name).expect("key should be valid")
    }

    fn values_for<'a>(ctx: &'a ExecutionContext, key: &TagKey) -> Vec<&'a str> {
        ctx.get(key)
            .map(|values| values.iter().map(TagValue::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn insert_reads_back_in_order() {
        let cmd = key("cmd");
        let ctx = ExecutionContext::root()
            .with_tag_values(&cmd, ["GET", "MGET"])
            .expect("insertion should succeed");

        assert_eq!(values_for(&ctx, &cmd), &["GET", "MGET"]);
    }

    #[test]
    fn parent_unaffected_by_child_insertions() {
        let cmd = key("cmd");
        let state = key("state");

        let parent = ExecutionContext::root()
            .with_tag_value(&cmd, "GET")
            .expect("insertion should succeed");
        let child = parent
            .with_tag_value(&state, "reused")
            .expect("insertion should succeed");

        // The parent still reads its own tags, and nothing more.
        assert_eq!(values_for(&parent, &cmd), &["GET"]);
        assert!(parent.get(&state).is_none());

        // The child reads both.
        assert_eq!(values_for(&child, &cmd), &["GET"]);
        assert_eq!(values_for(&child, &state), &["reused"]);
    }

    #[test]
    fn empty_value_sequence_is_a_noop() {
        let cmd = key("cmd");
        let ctx = ExecutionContext::root()
            .with_tag_values(&cmd, Vec::<String>::new())
            .expect("empty insertion should succeed");

        assert!(ctx.is_empty());
        assert!(ctx.get(&cmd).is_none());
        assert_eq!(ctx.effective_tags().count(), 0);
    }

    #[test]
    fn reinsertion_shadows_parent_mapping() {
        let cmd = key("cmd");
        let parent = ExecutionContext::root()
            .with_tag_value(&cmd, "GET")
            .expect("insertion should succeed");
        let child = parent
            .with_tag_value(&cmd, "SET")
            .expect("insertion should succeed");

        assert_eq!(values_for(&parent, &cmd), &["GET"]);
        assert_eq!(values_for(&child, &cmd), &["SET"]);
    }

    #[test]
    fn effective_tags_yield_each_key_once() {
        let cmd = key("cmd");
        let kind = key("kind");

        let ctx = ExecutionContext::root()
            .with_tag_value(&cmd, "GET")
            .and_then(|ctx| ctx.with_tag_value(&kind, "timeout"))
            .and_then(|ctx| ctx.with_tag_value(&cmd, "SET"))
            .expect("insertions should succeed");

        let tags = ctx
            .effective_tags()
            .map(|(key, value)| (key.name().to_string(), value.as_str().to_string()))
            .collect::<Vec<_>>();

        assert_eq!(
            tags,
            &[
                ("cmd".to_string(), "SET".to_string()),
                ("kind".to_string(), "timeout".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_value_surfaces_error_without_inserting() {
        let cmd = key("cmd");
        let ctx = ExecutionContext::root();

        let result = ctx.with_tag_values(&cmd, ["GET", "bad\nvalue"]);
        assert!(matches!(
            result,
            Err(TagConstructionError::InvalidValue { .. })
        ));

        // The original context is still usable and empty.
        assert!(ctx.is_empty());
    }

    #[test]
    fn concurrent_branches_are_isolated() {
        let cmd = key("cmd");
        let parent = ExecutionContext::root()
            .with_tag_value(&cmd, "MULTI")
            .expect("insertion should succeed");

        let handles = (0..8)
            .map(|i| {
                let parent = parent.clone();
                let cmd = cmd.clone();
                thread::spawn(move || {
                    let value = format!("op-{}", i);
                    let branch = parent
                        .with_tag_value(&cmd, value.as_str())
                        .expect("insertion should succeed");
                    assert_eq!(values_for(&branch, &cmd), &[value.as_str()]);
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().expect("branch thread should not panic");
        }

        // The shared parent never saw any branch's value.
        assert_eq!(values_for(&parent, &cmd), &["MULTI"]);
    }

    fn arb_tag_part() -> impl Strategy<Value = String> {
        // Characters between 0x20 (32) and 0x7E (126), which are all printable ASCII characters.
        let char_gen = any::<u8>().prop_map(|c| std::cmp::max(c % 127, 32));
        arb_vec(char_gen, 1..64)
            .prop_map(|bytes| String::from_utf8(bytes).expect("printable ASCII is valid UTF-8"))
    }

    proptest! {
        #[test]
        fn insertion_preserves_parent_and_reads_back(
            parent_value in arb_tag_part(),
            inserted in arb_vec(arb_tag_part(), 1..4),
        ) {
            let k = key("cmd");
            let parent = ExecutionContext::root()
                .with_tag_value(&k, parent_value.as_str())
                .expect("insertion should succeed");
            let child = parent
                .with_tag_values(&k, inserted.iter().map(String::as_str))
                .expect("insertion should succeed");

            prop_assert_eq!(values_for(&parent, &k), &[parent_value.as_str()]);
            let read_back = values_for(&child, &k);
            prop_assert_eq!(read_back, inserted.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
