//! Sampling tables stored as JSON files.

use std::fs;
use std::path::PathBuf;

use insta::assert_snapshot;
use tablesample::prelude::*;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn customers(dir: &TempDir) -> Vec<PathBuf> {
    vec![
        write(
            dir,
            "part-0.jsonl",
            r#"{"id": 1, "name": "Ada", "address": {"city": "Oslo", "zip": "0150"}}
{"id": 2, "name": "Grace", "address": {"city": "Bergen"}}

{"id": 3, "name": null, "address": {"city": "Oslo", "zip": "0151"}}
"#,
        ),
        write(
            dir,
            "part-1.json",
            r#"[
                {"id": 4, "name": "Linus", "address": {"city": "Trondheim", "zip": "7010"}, "tags": ["vip"]},
                {"id": 5, "name": "Ken", "address": {"city": "Oslo", "zip": "0152"}}
            ]"#,
        ),
    ]
}

#[test]
fn test_reads_one_frame_per_file() {
    let dir = TempDir::new().unwrap();
    let source = JsonFileSource::new(customers(&dir));
    let frames = source
        .fetch_frames(&EntityRef::table("customers"), &SampleConfig::default())
        .unwrap();

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].num_rows(), 3);
    assert_eq!(
        frames[0].column_names(),
        vec!["id", "name", "address_##city", "address_##zip"]
    );
    assert_eq!(frames[0].row(1)[3], Value::Null);
    assert_eq!(
        frames[1].column_names(),
        vec!["id", "name", "address_##city", "address_##zip", "tags"]
    );
}

#[test]
fn test_sample_data_snapshot() {
    let dir = TempDir::new().unwrap();
    let entity = EntityRef::table("customers");
    let mut sampler = Sampler::builder(
        JsonFileSource::new(customers(&dir)),
        entity,
        SampleConfig::default().with_sample_query("\"address_##city\" = 'Oslo'"),
    )
    .build()
    .unwrap();

    let columns: Vec<ColumnDescriptor> = sampler
        .describe_columns()
        .iter()
        .filter(|c| c.name != "tags")
        .cloned()
        .collect();
    let data = sampler.fetch_sample_data(Some(&columns)).unwrap();

    assert_snapshot!(serde_json::to_string(&data).unwrap(), @r#"{"columns":["id","name","city","zip"],"rows":[[1,"Ada","Oslo","0150"],[5,"Ken","Oslo","0152"]]}"#);
}

#[test]
fn test_describe_columns_from_first_file() {
    let dir = TempDir::new().unwrap();
    let sampler = Sampler::builder(
        JsonFileSource::new(customers(&dir)),
        EntityRef::table("customers"),
        SampleConfig::row_count(2),
    )
    .build()
    .unwrap();

    let described: Vec<String> = sampler
        .describe_columns()
        .iter()
        .map(|c| format!("{}:{:?}", c.name, c.data_type))
        .collect();
    assert_eq!(
        described,
        vec!["id:Int", "name:String", "city:String", "zip:String"]
    );
}

#[test]
fn test_malformed_file_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "good.jsonl", "{\"id\": 1}\n");
    let bad = write(&dir, "bad.jsonl", "{\"id\": 1}\n{not json\n");

    let err = JsonFileSource::new([good.clone(), bad])
        .fetch_frames(&EntityRef::new("lake", "", "", "t"), &SampleConfig::default())
        .unwrap_err();
    match err {
        SamplerError::SourceUnavailable { entity, reason } => {
            assert_eq!(entity, "lake.t");
            assert!(reason.contains("bad.jsonl:2"), "{}", reason);
        }
        other => panic!("unexpected error: {}", other),
    }

    let scalar = write(&dir, "scalar.json", "[1, 2]");
    let err = JsonFileSource::new([scalar])
        .fetch_frames(&EntityRef::table("t"), &SampleConfig::default())
        .unwrap_err();
    assert!(matches!(err, SamplerError::SourceUnavailable { .. }));
}

#[test]
fn test_missing_file_fails_build() {
    let dir = TempDir::new().unwrap();
    let result = Sampler::builder(
        JsonFileSource::new([dir.path().join("absent.jsonl")]),
        EntityRef::table("t"),
        SampleConfig::default(),
    )
    .build();
    assert!(matches!(result, Err(SamplerError::SourceUnavailable { .. })));
}
