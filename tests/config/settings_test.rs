//! Settings files and sample configs read from TOML.

use std::env;
use std::fs;

use tablesample::config::{
    IntervalUnit, PartitionIntervalType, ProfileSampleType, Settings, SettingsError,
    DEFAULT_SAMPLE_LIMIT,
};
use tablesample::frame::Value;
use tempfile::TempDir;

const SETTINGS: &str = r#"
[sampler]
sample_limit = 25
seed = 42

[tables.orders]
paths = ["${TABLESAMPLE_SETTINGS_DIR}/orders-0.jsonl", "$TABLESAMPLE_SETTINGS_DIR/orders-1.jsonl"]

[tables.orders.sample]
profile_sample_type = "ROW_COUNT"
profile_sample = 1000
sample_query = "status = 'open'"

[tables.events]
paths = ["events.json"]
service_type = "s3"

[tables.events.sample]
profileSampleType = "PERCENTAGE"
profileSample = 12.5

[tables.events.sample.partitionDetails]
partitionColumnName = "created_at"
partitionIntervalType = "TIME-UNIT"
partitionInterval = 7
partitionIntervalUnit = "DAY"

[tables.clicks]
paths = ["clicks.jsonl"]

[tables.clicks.sample.partition_details]
column = "region"
interval_type = "COLUMN-VALUE"
values = ["emea", "apac"]
"#;

#[test]
fn test_parse_tables() {
    let settings = Settings::parse(SETTINGS).unwrap();
    assert_eq!(settings.sampler.sample_limit, 25);
    assert_eq!(settings.sampler.seed, Some(42));

    let orders = settings.get_table("orders").unwrap();
    assert_eq!(orders.service_type, "datalake");
    assert_eq!(orders.sample.profile_sample_type, ProfileSampleType::RowCount);
    assert_eq!(orders.sample.row_quota().unwrap(), 1000);
    assert_eq!(orders.sample.query(), Some("status = 'open'"));

    let events = settings.get_table("events").unwrap();
    assert_eq!(events.service_type, "s3");
    assert_eq!(events.sample.percentage_fraction().unwrap(), 0.125);
    let partition = events.sample.partition().unwrap();
    assert_eq!(partition.interval_type, PartitionIntervalType::Time);
    assert_eq!(partition.time_bounds().unwrap(), (IntervalUnit::Day, 7));

    let clicks = settings.get_table("clicks").unwrap();
    assert!(!clicks.sample.is_sampled());
    assert_eq!(
        clicks.sample.partition().unwrap().values,
        vec![Value::from("emea"), Value::from("apac")]
    );
}

#[test]
fn test_resolved_paths_expand_env() {
    env::set_var("TABLESAMPLE_SETTINGS_DIR", "/data/shop");
    let settings = Settings::parse(SETTINGS).unwrap();
    let paths = settings.get_table("orders").unwrap().resolved_paths().unwrap();
    env::remove_var("TABLESAMPLE_SETTINGS_DIR");

    assert_eq!(
        paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>(),
        vec!["/data/shop/orders-0.jsonl", "/data/shop/orders-1.jsonl"]
    );
}

#[test]
fn test_unknown_table() {
    let settings = Settings::parse(SETTINGS).unwrap();
    assert!(matches!(
        settings.get_table("nope"),
        Err(SettingsError::TableNotFound(name)) if name == "nope"
    ));
}

#[test]
fn test_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tablesample.toml");
    fs::write(&path, "[tables.t]\npaths = [\"t.jsonl\"]\n").unwrap();

    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.sampler.sample_limit, DEFAULT_SAMPLE_LIMIT);
    assert!(settings.get_table("t").is_ok());

    let missing = Settings::from_file(dir.path().join("absent.toml"));
    assert!(matches!(missing, Err(SettingsError::FileNotFound(_))));
}

#[test]
fn test_invalid_settings() {
    assert!(matches!(
        Settings::parse("[tables.t]\npaths = []\n"),
        Err(SettingsError::InvalidConfig(_))
    ));
    assert!(matches!(
        Settings::parse("[sampler]\nsample_limit = \"many\"\n"),
        Err(SettingsError::ParseError(_))
    ));
}
