// tests/config.rs

mod common;
use crate::common::ConfigFileBuilder;

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use sitepipe::config::{ConfigFile, ProjectLayout, RawConfigFile, load_and_validate, load_or_default};
use sitepipe::errors::SitepipeError;
use sitepipe::types::TriggerWhileRunningBehaviour;

#[test]
fn defaults_describe_a_jekyll_style_project() {
    let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();

    assert_eq!(cfg.paths().styles_out, "assets/css");
    assert_eq!(cfg.paths().scripts_bundle, "scripts.min.js");
    assert_eq!(cfg.site().cmd, "bundle exec jekyll build");
    assert_eq!(cfg.server().port, 3000);
    assert!(cfg.styles().source_maps);
    assert_eq!(cfg.styles().browsers, vec!["defaults".to_string()]);
    assert_eq!(cfg.watch().debounce_ms, 100);
    assert_eq!(
        cfg.watch().triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Queue
    );
}

#[test]
fn partial_file_keeps_defaults_for_everything_else() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[paths]
styles = ["styles/**/*.css"]
site_out = "public"

[styles]
source_maps = false
browsers = ["safari 13", "last 2 chrome versions"]

[site]
cmd = "zola build"

[watch]
debounce_ms = 250
triggered_while_running_behaviour = "drop"
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.paths().styles, vec!["styles/**/*.css".to_string()]);
    assert_eq!(cfg.paths().site_out, "public");
    assert_eq!(cfg.paths().scripts_out, "assets/js");
    assert_eq!(cfg.site().cmd, "zola build");
    assert!(!cfg.styles().source_maps);
    assert_eq!(cfg.styles().browsers.len(), 2);
    assert_eq!(cfg.watch().debounce_ms, 250);
    assert_eq!(
        cfg.watch().triggered_while_running_behaviour,
        TriggerWhileRunningBehaviour::Drop
    );
}

#[test]
fn invalid_glob_returns_config_error() {
    let raw = ConfigFileBuilder::new().with_styles("src/[css/*.css").raw();

    match ConfigFile::try_from(raw) {
        Err(SitepipeError::ConfigError(msg)) => {
            assert!(msg.contains("paths.styles"), "{msg}");
        }
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn unknown_browser_query_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_browsers(&["netscape-navigator 4"])
        .raw();

    match ConfigFile::try_from(raw) {
        Err(SitepipeError::ConfigError(msg)) => {
            assert!(msg.contains("[styles].browsers"), "{msg}");
        }
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn shared_output_directory_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.paths.sprite_out = raw.paths.icons_out.clone();

    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(SitepipeError::ConfigError(_))
    ));
}

#[test]
fn project_root_as_output_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.paths.site_out = "./".to_string();

    match ConfigFile::try_from(raw) {
        Err(SitepipeError::ConfigError(msg)) => assert!(msg.contains("project root"), "{msg}"),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn empty_site_command_is_rejected() {
    let raw = ConfigFileBuilder::new().with_site_cmd("  ").raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(SitepipeError::ConfigError(_))
    ));
}

#[test]
fn unknown_behaviour_is_a_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[watch]\ntriggered_while_running_behaviour = \"cancel\"\n").unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(SitepipeError::TomlError(_))
    ));
}

#[test]
fn explicit_missing_config_is_an_io_error() {
    let result = load_or_default(Some(Path::new("/definitely/not/here/Sitepipe.toml")));
    assert!(matches!(result, Err(SitepipeError::IoError(_))));
}

#[test]
fn layout_resolves_paths_against_the_root() {
    let layout: ProjectLayout = ConfigFileBuilder::new().layout(Path::new("/srv/site"));

    assert_eq!(layout.styles_out(), Path::new("/srv/site/assets/css"));
    assert_eq!(layout.server_root(), Path::new("/srv/site/_site"));
    assert_eq!(layout.output_dirs().len(), 5);
    assert!(layout.output_dirs().iter().all(|d| d.starts_with("/srv/site")));
}
