use std::{fmt, sync::Arc};

use metrics::{counter, describe_counter, describe_histogram, histogram, Label};
use snafu::{ResultExt as _, Snafu};
use tracing::trace;
use vizsla_context::{ExecutionContext, TagConstructionError};

use crate::{
    keys::TagKeys,
    measure::{self, Measure},
    views::{Aggregation, View, ViewError, Views},
};

/// The lifecycle state of a pooled connection.
///
/// The vocabulary is a closed enum on purpose: connection state is a grouping dimension on the
/// exported connection counters, and a bounded set of states keeps the exported series count
/// bounded too.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    /// A freshly dialed connection.
    New,

    /// A connection handed back out from the pool.
    Reused,

    /// A connection closed for sitting idle past the pool's idle timeout.
    Idle,

    /// A connection closed for exceeding the pool's maximum age.
    Stale,

    /// A connection closed normally after finishing its work.
    Complete,
}

impl ConnectionState {
    /// Gets the state as the tag value it is recorded under.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reused => "reused",
            Self::Idle => "idle",
            Self::Stale => "stale",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A descriptive attribute attached to every trace span produced around client operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    key: String,
    value: String,
}

impl Attribute {
    /// Creates a new `Attribute`.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self { key: key.into(), value: value.into() }
    }

    /// Gets the attribute key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Gets the attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A telemetry construction error.
#[derive(Debug, Snafu)]
pub enum BuildError {
    /// The tag key registry could not be constructed.
    #[snafu(display("failed to construct tag key registry: {source}"))]
    BuildTagKeys {
        /// Error source.
        source: TagConstructionError,
    },

    /// The view registry could not be constructed.
    #[snafu(display("failed to construct view registry: {source}"))]
    BuildViews {
        /// Error source.
        source: ViewError,
    },
}

/// Builder for [`ClientTelemetry`].
#[derive(Debug, Default)]
pub struct TelemetryBuilder {
    default_attributes: Vec<Attribute>,
}

impl TelemetryBuilder {
    /// Adds a descriptive attribute to attach to every trace span produced around client
    /// operations.
    ///
    /// Attributes only influence spans, which are produced by the caller's tracing integration:
    /// they are exposed via [`ClientTelemetry::default_attributes`] and are never added to metric
    /// labels.
    pub fn default_attribute<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.default_attributes.push(Attribute::new(key, value));
        self
    }

    /// Builds the [`ClientTelemetry`].
    ///
    /// Constructs the tag key and view registries and describes every exported metric (name, unit,
    /// description) to the installed metrics recorder.
    ///
    /// # Errors
    ///
    /// If either registry cannot be constructed, an error is returned. This is a fatal startup
    /// condition: proceeding with a partial schema silently truncates the observability surface.
    pub fn build(self) -> Result<ClientTelemetry, BuildError> {
        let keys = TagKeys::new().context(BuildTagKeysSnafu)?;
        let views = Views::new(&keys).context(BuildViewsSnafu)?;

        for view in &views {
            let measure = view.measure();
            match view.aggregation() {
                Aggregation::Count => {
                    describe_counter!(
                        measure.name(),
                        measure.unit().as_metrics_unit(),
                        measure.description()
                    );
                }
                Aggregation::Distribution { .. } => {
                    describe_histogram!(
                        measure.name(),
                        measure.unit().as_metrics_unit(),
                        measure.description()
                    );
                }
            }
        }

        Ok(ClientTelemetry {
            inner: Arc::new(Inner {
                keys,
                views,
                default_attributes: self.default_attributes,
            }),
        })
    }
}

/// The recording surface for a Redis client's operational telemetry.
///
/// Built once at client construction, then shared by reference (or cheap clone) across every call
/// site. All recording is synchronous and lock-free: the registries are immutable, and emission is
/// a fire-and-forget append through the [`metrics`] facade. A recording failure can never alter
/// the outcome of the client operation being measured, because recording cannot fail -- the only
/// fallible step, tag construction, is surfaced to the caller before anything is recorded.
#[derive(Clone)]
pub struct ClientTelemetry {
    inner: Arc<Inner>,
}

struct Inner {
    keys: TagKeys,
    views: Views,
    default_attributes: Vec<Attribute>,
}

impl ClientTelemetry {
    /// Creates a builder for configuring a `ClientTelemetry`.
    pub fn builder() -> TelemetryBuilder {
        TelemetryBuilder::default()
    }

    /// Gets the tag key registry.
    pub fn keys(&self) -> &TagKeys {
        &self.inner.keys
    }

    /// Gets the view registry.
    ///
    /// This is the contract a backend exporter consumes: one exported time-series family per
    /// view, with the view's bucket boundaries and tag keys.
    pub fn views(&self) -> &Views {
        &self.inner.views
    }

    /// Gets the descriptive attributes to attach to every trace span produced around client
    /// operations.
    pub fn default_attributes(&self) -> &[Attribute] {
        &self.inner.default_attributes
    }

    /// Derives a context carrying the given command name under the `cmd` key.
    ///
    /// # Errors
    ///
    /// If the command name is rejected by the tag system, an error is returned and the parent
    /// context is unaffected.
    pub fn command_context(
        &self, parent: &ExecutionContext, command: &str,
    ) -> Result<ExecutionContext, TagConstructionError> {
        parent.with_tag_value(self.inner.keys.command(), command)
    }

    /// Records a value against the given measure.
    ///
    /// The measure's view determines how the value is emitted: count views emit a counter
    /// increment, distribution views emit a histogram observation. Labels are derived from the
    /// view's tag keys, resolved against the context; a tag key with no value in the context is
    /// omitted. Recording against a measure with no view is a no-op -- the view registry is the
    /// closed export schema.
    pub fn record(&self, ctx: &ExecutionContext, measure: &'static Measure, value: f64) {
        let Some(view) = self.inner.views.for_measure(measure) else {
            return;
        };

        let labels = labels_for(view, ctx);
        match view.aggregation() {
            Aggregation::Count => counter!(measure.name(), labels).increment(value as u64),
            Aggregation::Distribution { .. } => histogram!(measure.name(), labels).record(value),
        }
    }

    /// Records a completed read operation.
    ///
    /// Emits one read invocation, the number of bytes read, and the operation's roundtrip latency
    /// in milliseconds. The command name, if present in the context, labels the read count and the
    /// latency observation.
    pub fn record_read(&self, ctx: &ExecutionContext, bytes: u64, elapsed_ms: f64) {
        self.record(ctx, &measure::READS, 1.0);
        self.record(ctx, &measure::BYTES_READ, bytes as f64);
        self.record(ctx, &measure::ROUNDTRIP_LATENCY, elapsed_ms);
    }

    /// Records a completed write operation.
    ///
    /// Emits one write invocation, the number of bytes written, and the operation's roundtrip
    /// latency in milliseconds. The command name, if present in the context, labels the write
    /// count and the latency observation.
    pub fn record_write(&self, ctx: &ExecutionContext, bytes: u64, elapsed_ms: f64) {
        self.record(ctx, &measure::WRITES, 1.0);
        self.record(ctx, &measure::BYTES_WRITTEN, bytes as f64);
        self.record(ctx, &measure::ROUNDTRIP_LATENCY, elapsed_ms);
    }

    /// Records an error encountered during an operation.
    ///
    /// Emits one error, labeled with the given kind and detail plus the command name from the
    /// context. Touches nothing else: an error does not count as a completed read or write.
    ///
    /// # Errors
    ///
    /// If the kind or detail is rejected by the tag system, an error is returned and nothing is
    /// recorded. The caller decides whether to record without the tag or drop the measurement.
    pub fn record_error(
        &self, ctx: &ExecutionContext, kind: &str, detail: &str,
    ) -> Result<(), TagConstructionError> {
        let ctx = ctx
            .with_tag_value(self.inner.keys.kind(), kind)?
            .with_tag_value(self.inner.keys.detail(), detail)?;
        self.record(&ctx, &measure::ERRORS, 1.0);
        Ok(())
    }

    /// Records a connection being opened, labeled with the given state.
    pub fn record_connection_opened(&self, state: ConnectionState) {
        self.record_connection_event(&measure::CONNECTIONS_OPENED, state);
    }

    /// Records a connection being closed, labeled with the given state.
    pub fn record_connection_closed(&self, state: ConnectionState) {
        self.record_connection_event(&measure::CONNECTIONS_CLOSED, state);
    }

    fn record_connection_event(&self, measure: &'static Measure, state: ConnectionState) {
        // State names are drawn from a closed vocabulary of valid tag values, so construction
        // cannot fail in practice; if it somehow does, the pool event must still proceed
        // unmeasured rather than erroring.
        match ExecutionContext::root().with_tag_value(self.inner.keys.state(), state.as_str()) {
            Ok(ctx) => self.record(&ctx, measure, 1.0),
            Err(error) => trace!(%error, "Dropping unrecordable connection state event."),
        }
    }
}

fn labels_for(view: &View, ctx: &ExecutionContext) -> Vec<Label> {
    view.tag_keys()
        .iter()
        .filter_map(|key| {
            let values = ctx.get(key)?;
            let value = values.first()?;
            Some(Label::new(key.name().to_string(), value.as_str().to_string()))
        })
        .collect()
}
