//! Execution-scoped tag propagation.
//!
//! Measurements recorded for a client operation are sliced by dimensional tags -- the command being
//! run, the kind of error hit, the state of a pooled connection. This crate provides the carrier
//! for those tags: an [`ExecutionContext`] that call sites thread through one logical operation,
//! layering tag values onto it as they become known. Propagation never mutates a context in place,
//! so concurrent operations can branch freely from one shared parent.

mod context;
pub use self::context::{EffectiveTags, ExecutionContext};

mod error;
pub use self::error::TagConstructionError;

mod key;
pub use self::key::TagKey;

mod value;
pub use self::value::TagValue;

const MAX_TAG_PART_LEN: usize = 255;

/// Checks a tag key or value against the wire encoding constraints.
///
/// Keys and values share the same rules: non-empty, no longer than 255 bytes, and printable ASCII
/// only. Returns the violated constraint on failure.
fn check_tag_part(part: &str) -> Result<(), &'static str> {
    if part.is_empty() {
        return Err("must not be empty");
    }

    if part.len() > MAX_TAG_PART_LEN {
        return Err("must not be longer than 255 bytes");
    }

    if !part.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        return Err("must contain only printable ASCII characters");
    }

    Ok(())
}
