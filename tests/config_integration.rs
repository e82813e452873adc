//! Integration tests for loading pipeline configuration from disk

mod common;

use common::builders::SourceBuilder;
use common::roi;
use tempfile::TempDir;
use volpipe::{PipelineBuilder, PipelineConfig, PrefetchConfig, Request, ScaleFactor, VolumeType};

const TOML_CONFIG: &str = r#"
[[downsample]]
input = "raw"
factor = 2
output = "raw_2"

[[downsample]]
input = "raw"
factor = [1, 4]
output = "raw_1x4"

[prefetch]
workers = 3
"#;

#[test]
fn test_load_toml_and_build_pipeline() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("pipeline.toml");
    std::fs::write(&path, TOML_CONFIG)?;

    let config = PipelineConfig::load(&path)?;
    assert_eq!(config.prefetch.workers, 3);
    assert_eq!(config.prefetch.cache_size, PrefetchConfig::default().cache_size);

    let node = config.build_downsample()?.expect("entries configured");
    let source = SourceBuilder::new("memory")
        .ramp("raw", roi(&[-16, -16], &[32, 32]))
        .build();
    let pipeline = PipelineBuilder::new(source).node(node).build()?;

    let request = Request::new()
        .with("raw_2", roi(&[0, 0], &[4, 4]))
        .with("raw_1x4", roi(&[0, 0], &[2, 2]));
    let batch = pipeline.request_batch(&request)?;
    batch.verify(&request)?;
    assert_eq!(
        batch.get(&VolumeType::new("raw_1x4")).unwrap().resolution(),
        &volpipe::Coordinate::from([1, 4])
    );
    Ok(())
}

#[test]
fn test_save_and_reload_json() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("pipeline.json");

    let config = PipelineConfig::from_toml_str(TOML_CONFIG)?;
    config.save(&path)?;
    assert!(path.exists());

    let content = std::fs::read_to_string(&path)?;
    assert!(content.contains("\"raw_1x4\""));

    let reloaded = PipelineConfig::load(&path)?;
    assert_eq!(reloaded, config);
    assert_eq!(reloaded.downsample[1].factor, ScaleFactor::PerAxis(vec![1, 4]));
    Ok(())
}

#[test]
fn test_save_toml_by_extension() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("out.toml");

    let config = PipelineConfig::from_toml_str(TOML_CONFIG)?;
    config.save(&path)?;
    let content = std::fs::read_to_string(&path)?;
    assert!(content.contains("[[downsample]]"));
    assert_eq!(PipelineConfig::load(&path)?, config);
    Ok(())
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = PipelineConfig::load(dir.path().join("absent.json")).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_load_rejects_bad_factor() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(
        &path,
        r#"{"downsample": [{"input": "raw", "factor": [2, -1], "output": "raw_2"}]}"#,
    )
    .unwrap();
    let err = PipelineConfig::load(&path).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("bad.json"));
}
