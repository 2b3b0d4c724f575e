//! Telemetry schema and recording for a Redis client's operational surface.
//!
//! This crate defines the fixed observability schema for a Redis client -- the measures being
//! tracked, the tag keys they can be sliced by, and the views binding each measure to an
//! aggregation -- along with [`ClientTelemetry`], the recording surface instrumented call sites go
//! through. The schema is closed by design: it covers one client's read/write/connection
//! lifecycle, and deliberately offers no registration API for arbitrary metrics.
//!
//! Recording emits through the [`metrics`] facade; whatever recorder the host process installs is
//! responsible for accumulation and export. The [`Views`] registry is the contract an exporter
//! consumes to set up bucket boundaries and grouping.

mod keys;
pub use self::keys::TagKeys;

mod measure;
pub use self::measure::{Measure, Unit};

pub mod time;

mod telemetry;
pub use self::telemetry::{Attribute, BuildError, ClientTelemetry, ConnectionState, TelemetryBuilder};

mod views;
pub use self::views::{
    Aggregation, View, ViewError, Views, BYTE_SIZE_BOUNDARIES, LATENCY_MS_BOUNDARIES,
};
