//! Partition filtering through the sampler.

use chrono::{NaiveDate, NaiveDateTime};
use tablesample::frame::total_rows;
use tablesample::partition::PartitionPredicate;
use tablesample::prelude::*;

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn now() -> NaiveDateTime {
    at(2024, 6, 15, 12)
}

fn events() -> Frame {
    Frame::from_rows(
        ["id", "region", "created_at"],
        vec![
            vec![Value::Int(1), "emea".into(), Value::Timestamp(at(2024, 6, 15, 11))],
            vec![Value::Int(2), "apac".into(), Value::Timestamp(at(2024, 6, 14, 9))],
            vec![Value::Int(3), "amer".into(), Value::from("2024-05-20 08:00:00")],
            vec![Value::Int(4), Value::Null, Value::from("2023-12-31")],
            vec![Value::Int(5), "emea".into(), Value::Int(1_577_836_800_000)],
            vec![Value::Int(6), "apac".into(), Value::from("not a date")],
        ],
    )
    .unwrap()
}

fn sampler(partition: PartitionDetails, frames: FrameSet) -> SamplerResult<Sampler> {
    let entity = EntityRef::table("events");
    let source = InMemorySource::new().with_table(&entity, frames);
    Sampler::builder(source, entity, SampleConfig::default().with_partition(partition))
        .time_window(FixedTimeWindow(now()))
        .seed(9)
        .build()
}

fn ids(sampler: &mut Sampler) -> Vec<Value> {
    sampler
        .fetch_sample_data(None)
        .unwrap()
        .rows
        .into_iter()
        .map(|row| row[0].clone())
        .collect()
}

#[test]
fn test_column_values() {
    let mut sampler = sampler(
        PartitionDetails::column_values("region", ["emea", "apac"]),
        vec![events()],
    )
    .unwrap();
    assert_eq!(
        ids(&mut sampler),
        vec![Value::Int(1), Value::Int(2), Value::Int(5), Value::Int(6)]
    );
}

#[test]
fn test_integer_range_is_closed() {
    let mut sampler = sampler(PartitionDetails::integer_range("id", 2, 4), vec![events()]).unwrap();
    let kept = sampler.select_sample(false).unwrap();
    let ids: Vec<Value> = kept[0].column("id").unwrap().values.clone();
    assert_eq!(ids, vec![Value::Int(2), Value::Int(3), Value::Int(4)]);
}

#[test]
fn test_time_windows() {
    let cases = [
        (IntervalUnit::Hour, 2, vec![1]),
        (IntervalUnit::Day, 1, vec![1, 2]),
        (IntervalUnit::Month, 1, vec![1, 2, 3]),
        (IntervalUnit::Year, 1, vec![1, 2, 3, 4]),
        (IntervalUnit::Year, 5, vec![1, 2, 3, 4, 5]),
    ];

    for (unit, interval, expected) in cases {
        let partition = PartitionDetails::time_window("created_at", unit, interval);
        let mut sampler = sampler(partition, vec![events()]).unwrap();
        let frames = sampler.select_sample(true).unwrap();
        let kept: Vec<Value> = frames[0].column("id").unwrap().values.clone();
        let expected: Vec<Value> = expected.into_iter().map(Value::Int).collect();
        assert_eq!(kept, expected, "{:?} {}", unit, interval);
    }
}

#[test]
fn test_partition_then_sample() {
    let frames = vec![events(), events()];
    let entity = EntityRef::table("events");
    let source = InMemorySource::new().with_table(&entity, frames);
    let config = SampleConfig::percentage(50.0)
        .with_partition(PartitionDetails::column_values("region", ["emea"]));
    let mut sampler = Sampler::builder(source, entity, config).seed(4).build().unwrap();

    let sample = sampler.select_sample(false).unwrap();
    assert_eq!(total_rows(&sample), 2);
    for frame in &sample {
        assert!(frame
            .column("region")
            .unwrap()
            .values
            .iter()
            .all(|v| *v == Value::from("emea")));
    }
}

#[test]
fn test_incomplete_partition_is_fatal() {
    let mut partition = PartitionDetails::integer_range("id", 1, 3);
    partition.integer_range_end = None;
    let err = sampler(partition, vec![events()]).err().unwrap();
    assert!(err.is_configuration());

    let mut partition = PartitionDetails::time_window("created_at", IntervalUnit::Day, 1);
    partition.interval_unit = None;
    assert!(sampler(partition, vec![events()]).err().unwrap().is_configuration());
}

#[test]
fn test_missing_partition_column() {
    let err = sampler(PartitionDetails::integer_range("nope", 1, 3), vec![events()])
        .err()
        .unwrap();
    assert_eq!(err, SamplerError::ColumnNotFound("nope".to_string()));

    // Zero-row frames pass through without the column.
    let sampler = sampler(
        PartitionDetails::integer_range("nope", 1, 3),
        vec![Frame::default()],
    );
    assert!(sampler.is_ok());
}

#[test]
fn test_partition_filter_single_frame() {
    let sampler = sampler(
        PartitionDetails::column_values("region", ["amer"]),
        vec![events()],
    )
    .unwrap();
    let filtered = sampler.partition_filter(&events()).unwrap();
    assert_eq!(filtered.num_rows(), 1);
    assert_eq!(filtered.row(0)[0], Value::Int(3));
}

#[test]
fn test_predicate_resolution() {
    let details = PartitionDetails::time_window("created_at", IntervalUnit::Day, 1);
    let predicate = PartitionPredicate::resolve(&details, &FixedTimeWindow(now())).unwrap();
    assert_eq!(
        predicate,
        PartitionPredicate::Since {
            column: "created_at".to_string(),
            threshold: at(2024, 6, 14, 0),
        }
    );
    assert!(!predicate.matches(&Value::Null));
    assert!(predicate.matches(&Value::Date(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap())));
}
