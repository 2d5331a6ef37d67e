//! Sampler behaviour through the public API.

use std::cell::Cell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tablesample::frame::total_rows;
use tablesample::prelude::*;

fn entity() -> EntityRef {
    EntityRef::new("lake", "raw", "shop", "orders")
}

fn orders(start: i64, n: i64) -> Frame {
    Frame::from_rows(
        ["id", "status", "amount"],
        (start..start + n)
            .map(|i| {
                let status = if i % 3 == 0 { "open" } else { "closed" };
                vec![Value::Int(i), Value::from(status), Value::Float(i as f64 * 1.5)]
            })
            .collect(),
    )
    .unwrap()
}

fn source(frames: FrameSet) -> InMemorySource {
    InMemorySource::new().with_table(&entity(), frames)
}

#[test]
fn test_source_fetched_once() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let source = move |_: &EntityRef, _: &SampleConfig| -> SamplerResult<FrameSet> {
        counter.set(counter.get() + 1);
        Ok(vec![orders(0, 10)])
    };

    let mut sampler = Sampler::builder(source, entity(), SampleConfig::percentage(50.0))
        .seed(1)
        .build()
        .unwrap();
    sampler.select_sample(false).unwrap();
    sampler.select_sample(false).unwrap();
    sampler.fetch_sample_data(None).unwrap();
    sampler.describe_columns();

    assert_eq!(calls.get(), 1);
}

#[test]
fn test_rows_never_exceed_limit() {
    let frames = vec![orders(0, 40), orders(40, 40), orders(80, 40)];
    let configs = vec![
        SampleConfig::default(),
        SampleConfig::percentage(100.0),
        SampleConfig::percentage(30.0),
        SampleConfig::row_count(500),
        SampleConfig::row_count(7),
        SampleConfig::default().with_sample_query("status = 'closed'"),
    ];

    for limit in [1, 5, 50] {
        for config in &configs {
            let mut sampler = Sampler::builder(source(frames.clone()), entity(), config.clone())
                .sample_limit(limit)
                .seed(3)
                .build()
                .unwrap();

            let data = sampler.fetch_sample_data(None).unwrap();
            assert!(data.len() <= limit, "{:?} returned {} rows", config, data.len());

            let frames = sampler.select_sample(false).unwrap();
            let statistical = sampler.materialize(&frames, None).unwrap();
            assert!(statistical.len() <= limit);
        }
    }
}

#[test]
fn test_same_seed_same_sample() {
    let frames = vec![orders(0, 30), orders(30, 30), orders(60, 30)];
    let sample = |seeded: Sampler| {
        let mut sampler = seeded;
        sampler.select_sample(false).unwrap()
    };

    let a = Sampler::builder(source(frames.clone()), entity(), SampleConfig::percentage(20.0))
        .seed(11)
        .build()
        .unwrap();
    let b = Sampler::builder(source(frames.clone()), entity(), SampleConfig::percentage(20.0))
        .rng(StdRng::seed_from_u64(11))
        .build()
        .unwrap();

    assert_eq!(sample(a), sample(b));
}

#[test]
fn test_shuffle_keeps_every_frame() {
    let frames = vec![orders(0, 4), orders(4, 4), orders(8, 4)];
    let mut sampler = Sampler::builder(source(frames), entity(), SampleConfig::row_count(6))
        .seed(5)
        .build()
        .unwrap();

    let sample = sampler.select_sample(false).unwrap();
    assert_eq!(sample.len(), 3);
    assert!(sample.iter().all(|f| f.num_rows() == 2));

    let mut firsts: Vec<i64> = sampler
        .fetch_frames()
        .unwrap()
        .iter()
        .map(|f| match f.row(0)[0] {
            Value::Int(id) => id,
            _ => unreachable!(),
        })
        .collect();
    firsts.sort_unstable();
    assert_eq!(firsts, vec![0, 4, 8]);
}

#[test]
fn test_bad_sample_values_recover() {
    let frames = vec![orders(0, 12)];

    let mut over = Sampler::builder(source(frames.clone()), entity(), SampleConfig::percentage(250.0))
        .seed(2)
        .build()
        .unwrap();
    assert_eq!(total_rows(&over.select_sample(false).unwrap()), 12);

    let config: SampleConfig =
        serde_json::from_str(r#"{"profileSampleType": "ROW_COUNT", "profileSample": "many"}"#)
            .unwrap();
    let mut rows = Sampler::builder(source(frames.clone()), entity(), config)
        .seed(2)
        .build()
        .unwrap();
    assert_eq!(rows.select_sample(false).unwrap(), frames);
}

#[test]
fn test_sample_data_ignores_statistical_sample() {
    let frames = vec![orders(0, 20)];
    let mut sampler = Sampler::builder(source(frames), entity(), SampleConfig::percentage(10.0))
        .sample_limit(100)
        .seed(8)
        .build()
        .unwrap();

    assert_eq!(total_rows(&sampler.select_sample(false).unwrap()), 2);
    assert_eq!(sampler.fetch_sample_data(None).unwrap().len(), 20);
}

#[test]
fn test_explicit_columns_select_and_order() {
    let mut sampler = Sampler::builder(source(vec![orders(0, 3)]), entity(), SampleConfig::default())
        .build()
        .unwrap();
    let columns = vec![
        ColumnDescriptor::new("amount", DataType::Float),
        ColumnDescriptor::new("id", DataType::Int),
    ];

    let data = sampler.fetch_sample_data(Some(&columns)).unwrap();
    assert_eq!(data.columns, vec!["amount", "id"]);
    assert_eq!(data.rows[1], vec![Value::Float(1.5), Value::Int(1)]);

    let missing = vec![ColumnDescriptor::new("nope", DataType::Int)];
    assert_eq!(
        sampler.fetch_sample_data(Some(&missing)).unwrap_err(),
        SamplerError::ColumnNotFound("nope".to_string())
    );
}

#[test]
fn test_describe_columns_types() {
    let frame = Frame::from_rows(
        ["id", "status", "amount", "meta_##tags", "meta_##geo_##lat"],
        vec![
            vec![
                Value::Int(1),
                Value::from("open"),
                Value::Int(3),
                Value::List(vec![Value::from("a")]),
                Value::Float(59.9),
            ],
            vec![
                Value::Int(2),
                Value::Null,
                Value::Float(2.5),
                Value::Null,
                Value::Null,
            ],
        ],
    )
    .unwrap();
    let sampler = Sampler::builder(source(vec![frame]), entity(), SampleConfig::percentage(1.0))
        .build()
        .unwrap();

    let described: Vec<(String, DataType)> = sampler
        .describe_columns()
        .iter()
        .map(|c| (c.name.clone(), c.data_type))
        .collect();
    assert_eq!(
        described,
        vec![
            ("id".to_string(), DataType::Int),
            ("status".to_string(), DataType::String),
            ("amount".to_string(), DataType::Float),
            ("tags".to_string(), DataType::Array),
            ("geo.lat".to_string(), DataType::Float),
        ]
    );
}

struct EvenIds;

impl FilterEvaluator for EvenIds {
    fn filter(&self, frame: &Frame, _query: &str) -> SamplerResult<Frame> {
        let ids = frame.require_column("id")?;
        let mask: Vec<bool> = ids
            .values
            .iter()
            .map(|v| matches!(v, Value::Int(i) if i % 2 == 0))
            .collect();
        Ok(frame.filter(&mask))
    }
}

struct Everything(DataType);

impl ColumnTypeInferencer for Everything {
    fn infer(&self, _frame: &Frame, _column: &str) -> DataType {
        self.0
    }
}

#[test]
fn test_injected_capabilities() {
    let config = SampleConfig::default().with_sample_query("anything");
    let mut sampler = Sampler::builder(source(vec![orders(0, 10)]), entity(), config)
        .filter_evaluator(EvenIds)
        .column_inferencer(Everything(DataType::Json))
        .build()
        .unwrap();

    assert_eq!(sampler.fetch_sample_data(None).unwrap().len(), 5);
    assert!(sampler
        .describe_columns()
        .iter()
        .all(|c| c.data_type == DataType::Json));
}

#[test]
fn test_unevaluable_query_fails() {
    let config = SampleConfig::default().with_sample_query("missing_column > 3");
    let result = Sampler::builder(source(vec![orders(0, 3)]), entity(), config).build();
    match result {
        Err(SamplerError::FilterEvaluation { query, .. }) => {
            assert_eq!(query, "missing_column > 3")
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("query should not evaluate"),
    }
}
