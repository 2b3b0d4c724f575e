use snafu::Snafu;

/// A tag construction error.
///
/// Returned when a tag key or tag value does not satisfy the encoding constraints of the tag
/// system. Surfaced to the caller rather than swallowed: a silently dropped tag degrades metric
/// cardinality in a way that is nearly impossible to diagnose after the fact.
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
pub enum TagConstructionError {
    /// The tag key name violates an encoding constraint.
    #[snafu(display("invalid tag key {key:?}: {reason}"))]
    InvalidKey {
        /// The rejected key name.
        key: String,

        /// The violated constraint.
        reason: &'static str,
    },

    /// The tag value violates an encoding constraint.
    #[snafu(display("invalid value {value:?} for tag key {key:?}: {reason}"))]
    InvalidValue {
        /// The key the value was being inserted under.
        key: String,

        /// The rejected value.
        value: String,

        /// The violated constraint.
        reason: &'static str,
    },
}
