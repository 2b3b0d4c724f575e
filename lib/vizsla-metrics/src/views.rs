use snafu::Snafu;
use tracing::debug;
use vizsla_context::TagKey;

use crate::{keys::TagKeys, measure, measure::Measure};

/// Distribution bucket boundaries for byte-size measures.
///
/// A geometric-ish progression: fine resolution at small payload sizes, where most traffic lands,
/// coarse resolution for large transfers.
pub const BYTE_SIZE_BOUNDARIES: &[f64] = &[
    0.0,
    1024.0,
    2048.0,
    4096.0,
    16384.0,
    65536.0,
    262144.0,
    1048576.0,
    4194304.0,
    16777216.0,
    67108864.0,
    268435456.0,
    1073741824.0,
    4294967296.0,
];

/// Distribution bucket boundaries for latency measures, in milliseconds.
///
/// Sub-millisecond increments up through 1ms resolve fast operations precisely; the tail continues
/// out to 500s so pathological multi-second stalls still land in a bounded bucket.
pub const LATENCY_MS_BOUNDARIES: &[f64] = &[
    0.0, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 1.5, 2.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0,
    200.0, 400.0, 600.0, 800.0, 1000.0, 1500.0, 2500.0, 5000.0, 10000.0, 20000.0, 40000.0,
    100000.0, 200000.0, 500000.0,
];

/// How recorded values of a measure are aggregated for export.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Aggregation {
    /// An exact count of recorded events.
    Count,

    /// A bucketed histogram of recorded values over fixed boundaries.
    Distribution {
        /// The bucket boundaries. Bucket `i` covers `[boundaries[i], boundaries[i + 1])`, with the
        /// final bucket open-ended.
        boundaries: &'static [f64],
    },
}

impl Aggregation {
    /// Gets the bucket boundaries, if this is a distribution aggregation.
    pub fn boundaries(&self) -> Option<&'static [f64]> {
        match self {
            Self::Count => None,
            Self::Distribution { boundaries } => Some(boundaries),
        }
    }

    /// Gets the index of the bucket the given value lands in.
    ///
    /// Returns `None` for count aggregations, or when the value falls below the first boundary.
    pub fn bucket_containing(&self, value: f64) -> Option<usize> {
        let boundaries = self.boundaries()?;
        boundaries
            .iter()
            .rposition(|boundary| *boundary <= value)
    }
}

/// A view construction error.
///
/// Any variant is a fatal startup condition: a half-registered schema silently produces an
/// incomplete observability surface, which is worse than failing outright.
#[derive(Clone, Debug, PartialEq, Snafu)]
pub enum ViewError {
    /// A distribution view has no bucket boundaries.
    #[snafu(display("view {name:?} has a distribution with no bucket boundaries"))]
    EmptyBoundaries {
        /// The offending view.
        name: &'static str,
    },

    /// A distribution view's first bucket boundary is above zero.
    #[snafu(display("view {name:?} has a first bucket boundary above zero: {boundary}"))]
    FirstBoundaryAboveZero {
        /// The offending view.
        name: &'static str,

        /// The first boundary.
        boundary: f64,
    },

    /// A distribution view's bucket boundaries are not strictly increasing.
    #[snafu(display(
        "view {name:?} has non-increasing bucket boundaries at index {index}: {boundary}"
    ))]
    NonIncreasingBoundaries {
        /// The offending view.
        name: &'static str,

        /// The index of the boundary that failed to increase.
        index: usize,

        /// The offending boundary.
        boundary: f64,
    },
}

/// The binding of one measure to an aggregation and a set of tag keys.
///
/// A view defines one exported time-series family: its name and description, the measure whose
/// recorded values feed it, how those values are aggregated, and which tag keys the backend may
/// group the series by.
#[derive(Clone, Debug)]
pub struct View {
    name: &'static str,
    description: &'static str,
    measure: &'static Measure,
    aggregation: Aggregation,
    tag_keys: Vec<TagKey>,
}

impl View {
    fn new(
        name: &'static str, description: &'static str, measure: &'static Measure,
        aggregation: Aggregation, tag_keys: Vec<TagKey>,
    ) -> Result<Self, ViewError> {
        if let Some(boundaries) = aggregation.boundaries() {
            let first = match boundaries.first() {
                Some(first) => *first,
                None => return Err(ViewError::EmptyBoundaries { name }),
            };
            if first > 0.0 {
                return Err(ViewError::FirstBoundaryAboveZero { name, boundary: first });
            }

            for (index, pair) in boundaries.windows(2).enumerate() {
                if pair[1] <= pair[0] {
                    return Err(ViewError::NonIncreasingBoundaries {
                        name,
                        index: index + 1,
                        boundary: pair[1],
                    });
                }
            }
        }

        Ok(Self { name, description, measure, aggregation, tag_keys })
    }

    /// Gets the name of the view.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets the human-readable description of the view.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Gets the measure this view aggregates.
    pub fn measure(&self) -> &'static Measure {
        self.measure
    }

    /// Gets the aggregation applied to recorded values.
    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    /// Gets the tag keys the backend may group this view's series by.
    pub fn tag_keys(&self) -> &[TagKey] {
        &self.tag_keys
    }
}

/// The fixed, ordered collection of views covering the client's operational surface.
///
/// This collection is the outbound contract: a backend exporter reads it to register one exported
/// time-series family per view, using each view's bucket boundaries and tag keys. It is defined
/// once at startup and never changes afterwards.
#[derive(Clone, Debug)]
pub struct Views {
    views: Vec<View>,
}

impl Views {
    /// Creates the view registry.
    ///
    /// # Errors
    ///
    /// If any view definition is malformed, an error is returned. Callers should treat this as
    /// fatal rather than continuing with a partial schema.
    pub fn new(keys: &TagKeys) -> Result<Self, ViewError> {
        let views = vec![
            View::new(
                "redis/client/bytes_written",
                "The distribution of bytes written out to the server",
                &measure::BYTES_WRITTEN,
                Aggregation::Distribution { boundaries: BYTE_SIZE_BOUNDARIES },
                Vec::new(),
            )?,
            View::new(
                "redis/client/bytes_read",
                "The distribution of bytes read from the server",
                &measure::BYTES_READ,
                Aggregation::Distribution { boundaries: BYTE_SIZE_BOUNDARIES },
                Vec::new(),
            )?,
            View::new(
                "redis/client/roundtrip_latency",
                "The distribution of milliseconds of the roundtrip latencies for a method invocation",
                &measure::ROUNDTRIP_LATENCY,
                Aggregation::Distribution { boundaries: LATENCY_MS_BOUNDARIES },
                vec![keys.command().clone()],
            )?,
            View::new(
                "redis/client/writes",
                "The number of write operations",
                &measure::WRITES,
                Aggregation::Count,
                vec![keys.command().clone()],
            )?,
            View::new(
                "redis/client/reads",
                "The number of read operations",
                &measure::READS,
                Aggregation::Count,
                vec![keys.command().clone()],
            )?,
            View::new(
                "redis/client/errors",
                "The number of errors encountered",
                &measure::ERRORS,
                Aggregation::Count,
                vec![keys.command().clone(), keys.detail().clone(), keys.kind().clone()],
            )?,
            View::new(
                "redis/client/connections_closed",
                "The number of connections that have been closed, disambiguated by keys such as stale, idle, complete",
                &measure::CONNECTIONS_CLOSED,
                Aggregation::Count,
                vec![keys.state().clone()],
            )?,
            View::new(
                "redis/client/connections_open",
                "The number of open connections, but disambiguated by different states e.g. new, reused",
                &measure::CONNECTIONS_OPENED,
                Aggregation::Count,
                vec![keys.state().clone()],
            )?,
        ];

        debug!(num_views = views.len(), "Registered client telemetry views.");

        Ok(Self { views })
    }

    /// Returns the number of views in the registry.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Returns `true` if the registry contains no views.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Returns an iterator over the views, in definition order.
    pub fn iter(&self) -> std::slice::Iter<'_, View> {
        self.views.iter()
    }

    /// Gets the view aggregating the given measure, if one is defined.
    pub fn for_measure(&self, measure: &Measure) -> Option<&View> {
        self.views.iter().find(|view| view.measure() == measure)
    }
}

impl<'a> IntoIterator for &'a Views {
    type Item = &'a View;
    type IntoIter = std::slice::Iter<'a, View>;

    fn into_iter(self) -> Self::IntoIter {
        self.views.iter()
    }
}
