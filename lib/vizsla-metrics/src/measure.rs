use std::fmt;

/// A unit of measurement.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Unit {
    /// Bytes (`By`).
    Bytes,

    /// A dimensionless event count (`1`).
    Dimensionless,

    /// Milliseconds (`ms`).
    Milliseconds,
}

impl Unit {
    /// Gets the unit as its canonical string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bytes => "By",
            Self::Dimensionless => "1",
            Self::Milliseconds => "ms",
        }
    }

    /// Gets the equivalent [`metrics::Unit`], for describing metrics to the installed recorder.
    pub const fn as_metrics_unit(self) -> metrics::Unit {
        match self {
            Self::Bytes => metrics::Unit::Bytes,
            Self::Dimensionless => metrics::Unit::Count,
            Self::Milliseconds => metrics::Unit::Milliseconds,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed quantity tracked by the client.
///
/// A measure is pure identity -- name, human description, unit. How recorded values are aggregated
/// is bound separately, by the [`Views`][crate::Views] registry. Measures are defined once, below,
/// and never mutated or removed; the measure names are the compatibility surface that dashboards
/// and alerts key off of, and must not change.
///
/// Which unit a call site records in is part of each measure's contract: recording seconds against
/// a millisecond measure is a bug to catch in review and tests, not something checked at runtime.
#[derive(Debug)]
pub struct Measure {
    name: &'static str,
    description: &'static str,
    unit: Unit,
}

impl Measure {
    const fn new(name: &'static str, description: &'static str, unit: Unit) -> Self {
        Self { name, description, unit }
    }

    /// Gets the name of the measure.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets the human-readable description of the measure.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Gets the unit values of this measure are recorded in.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Gets the full, fixed set of measures, in definition order.
    pub fn all() -> &'static [&'static Measure] {
        static ALL: [&Measure; 8] = [
            &BYTES_READ,
            &BYTES_WRITTEN,
            &ERRORS,
            &WRITES,
            &READS,
            &ROUNDTRIP_LATENCY,
            &CONNECTIONS_CLOSED,
            &CONNECTIONS_OPENED,
        ];
        &ALL
    }
}

#[cfg(test)]
impl Measure {
    pub(crate) const fn for_tests() -> Self {
        Self::new("test/unviewed", "A measure with no view", Unit::Dimensionless)
    }
}

impl PartialEq for Measure {
    fn eq(&self, other: &Self) -> bool {
        // Names are unique across the fixed set, so they are sufficient identity.
        self.name == other.name
    }
}

impl Eq for Measure {}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The number of bytes read from the server.
pub static BYTES_READ: Measure = Measure::new(
    "redis/bytes_read",
    "The number of bytes read from the server",
    Unit::Bytes,
);

/// The number of bytes written out to the server.
pub static BYTES_WRITTEN: Measure = Measure::new(
    "redis/bytes_written",
    "The number of bytes written out to the server",
    Unit::Bytes,
);

/// The number of errors encountered.
pub static ERRORS: Measure = Measure::new(
    "redis/errors",
    "The number of errors encountered",
    Unit::Dimensionless,
);

/// The number of write invocations.
pub static WRITES: Measure = Measure::new(
    "redis/writes",
    "The number of write invocations",
    Unit::Dimensionless,
);

/// The number of read invocations.
pub static READS: Measure = Measure::new(
    "redis/reads",
    "The number of read invocations",
    Unit::Dimensionless,
);

/// The roundtrip latency, in milliseconds, of a method/operation.
pub static ROUNDTRIP_LATENCY: Measure = Measure::new(
    "redis/roundtrip_latency",
    "The latency in milliseconds of a method/operation",
    Unit::Milliseconds,
);

/// The number of connections that have been closed.
pub static CONNECTIONS_CLOSED: Measure = Measure::new(
    "redis/connections_closed",
    "The number of connections that have been closed",
    Unit::Dimensionless,
);

/// The number of connections that have been opened.
pub static CONNECTIONS_OPENED: Measure = Measure::new(
    "redis/connections_new",
    "The number of open connections",
    Unit::Dimensionless,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_names_are_stable() {
        // These names are the export compatibility surface. Changing any of them breaks
        // downstream dashboards and alerts.
        let expected = [
            ("redis/bytes_read", Unit::Bytes),
            ("redis/bytes_written", Unit::Bytes),
            ("redis/errors", Unit::Dimensionless),
            ("redis/writes", Unit::Dimensionless),
            ("redis/reads", Unit::Dimensionless),
            ("redis/roundtrip_latency", Unit::Milliseconds),
            ("redis/connections_closed", Unit::Dimensionless),
            ("redis/connections_new", Unit::Dimensionless),
        ];

        let actual = Measure::all()
            .iter()
            .map(|measure| (measure.name(), measure.unit()))
            .collect::<Vec<_>>();
        assert_eq!(actual, expected);
    }

    #[test]
    fn unit_strings_are_stable() {
        assert_eq!(Unit::Bytes.as_str(), "By");
        assert_eq!(Unit::Dimensionless.as_str(), "1");
        assert_eq!(Unit::Milliseconds.as_str(), "ms");
    }

    #[test]
    fn measure_names_are_unique() {
        let measures = Measure::all();
        for (i, measure) in measures.iter().enumerate() {
            for other in &measures[i + 1..] {
                assert_ne!(measure.name(), other.name());
            }
        }
    }
}
