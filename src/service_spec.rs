//! Which sampler each service type uses.
//!
//! Every service registers a [`ServiceSpec`]. Most database services use
//! the default database spec, which samples in SQL; datalake services
//! sample in memory with [`crate::sampler::Sampler`].

use std::fmt;

use serde::Serialize;

/// How a service samples its tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerKind {
    /// In-memory frame sampling.
    Frames,
    /// Sampling pushed down to the database. Not provided by this crate.
    Sql,
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerKind::Frames => write!(f, "frames"),
            SamplerKind::Sql => write!(f, "sql"),
        }
    }
}

/// Registration of one service type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceSpec {
    pub service_type: &'static str,
    /// Name of the metadata source that ingests this service.
    pub metadata_source: &'static str,
    pub sampler: SamplerKind,
}

impl ServiceSpec {
    /// The generic spec shared by SQL databases.
    pub const fn default_database(
        service_type: &'static str,
        metadata_source: &'static str,
    ) -> Self {
        Self {
            service_type,
            metadata_source,
            sampler: SamplerKind::Sql,
        }
    }

    const fn datalake(service_type: &'static str, metadata_source: &'static str) -> Self {
        Self {
            service_type,
            metadata_source,
            sampler: SamplerKind::Frames,
        }
    }

    pub fn uses_frames(&self) -> bool {
        self.sampler == SamplerKind::Frames
    }
}

static REGISTRY: &[ServiceSpec] = &[
    ServiceSpec::datalake("datalake", "DatalakeSource"),
    ServiceSpec::datalake("gcs", "DatalakeSource"),
    ServiceSpec::datalake("s3", "DatalakeSource"),
    ServiceSpec::datalake("adls", "DatalakeSource"),
    ServiceSpec::default_database("athena", "AthenaSource"),
    ServiceSpec::default_database("bigquery", "BigquerySource"),
    ServiceSpec::default_database("doris", "DorisSource"),
    ServiceSpec::default_database("mssql", "MssqlSource"),
    ServiceSpec::default_database("mysql", "MysqlSource"),
    ServiceSpec::default_database("postgres", "PostgresSource"),
    ServiceSpec::default_database("snowflake", "SnowflakeSource"),
    ServiceSpec::default_database("teradata", "TeradataSource"),
    ServiceSpec::default_database("trino", "TrinoSource"),
];

/// Look up a service type, ignoring case.
pub fn lookup(service_type: &str) -> Option<&'static ServiceSpec> {
    REGISTRY
        .iter()
        .find(|spec| spec.service_type.eq_ignore_ascii_case(service_type))
}

/// Every registered service.
pub fn all() -> &'static [ServiceSpec] {
    REGISTRY
}
