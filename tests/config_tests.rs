use galaxy_generator::config::{GalaxyConfig, DEFAULT_WINDOW_HEIGHT};
use galaxy_generator::error::GalaxyError;
use galaxy_generator::load_config;
use galaxy_generator::params::{Color, ParameterSet};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn test_partial_galaxy_section() {
    let config = GalaxyConfig::from_toml_str(
        r##"
seed = 42

[galaxy]
count = 20000
branches = 3
inside_color = "#00ff00"

[window]
width = 640
"##,
    )
    .unwrap();

    assert_eq!(config.seed, Some(42));
    assert_eq!(config.galaxy.count, 20_000);
    assert_eq!(config.galaxy.branches, 3);
    assert_eq!(config.galaxy.inside_color, Color::new(0.0, 1.0, 0.0));
    assert_eq!(config.galaxy.radius, ParameterSet::default().radius);
    assert_eq!(config.galaxy.outside_color, ParameterSet::default().outside_color);
    assert_eq!(config.window.width, 640);
    assert_eq!(config.window.height, DEFAULT_WINDOW_HEIGHT);
}

#[test]
fn test_out_of_range_value_is_rejected() {
    let result = GalaxyConfig::from_toml_str("[galaxy]\ngravity = 1.0\n");
    match result {
        Err(GalaxyError::OutOfRange { field, value, min, max }) => {
            assert_eq!(field, "gravity");
            assert_eq!(value, 1.0);
            assert_eq!((min, max), (2.0, 10.0));
        }
        other => panic!("expected OutOfRange, got {:?}", other),
    }
}

#[test]
fn test_invalid_color_is_rejected() {
    let result = GalaxyConfig::from_toml_str("[galaxy]\noutside_color = \"blue\"\n");
    assert!(matches!(result, Err(GalaxyError::Config(_))));
}

#[test]
fn test_params_roundtrip_through_toml() {
    let params = ParameterSet {
        inside_color: Color::from_hex("#123456").unwrap(),
        ..Default::default()
    };
    let text = toml::to_string(&params).unwrap();
    assert!(text.contains("inside_color = \"#123456\""), "{}", text);
}

#[test]
fn test_load_from_file() {
    let file = write_config("[galaxy]\ncount = 500\n");
    let config = GalaxyConfig::load(file.path()).unwrap();
    assert_eq!(config.galaxy.count, 500);
}

#[test]
fn test_missing_file_is_io_error() {
    let result = GalaxyConfig::load("/nonexistent/galaxy.toml");
    assert!(matches!(result, Err(GalaxyError::Io(_))));
}

#[test]
fn test_cli_overrides_file() {
    let file = write_config("seed = 1\n[galaxy]\ncount = 500\n");
    let config = load_config(Some(file.path()), Some(9), Some(800)).unwrap();
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.galaxy.count, 800);

    let config = load_config(Some(file.path()), None, None).unwrap();
    assert_eq!(config.seed, Some(1));
    assert_eq!(config.galaxy.count, 500);
}

#[test]
fn test_cli_count_is_validated() {
    assert!(load_config(None, None, Some(5)).is_err());
    assert_eq!(load_config(None, None, None).unwrap(), GalaxyConfig::default());
}
