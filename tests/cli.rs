// tests/cli.rs

use clap::Parser;

use sitepipe::cli::{CliArgs, LogLevel};
use sitepipe::logging::filter_directives;
use sitepipe::pipeline::PipelineName;

#[test]
fn no_pipeline_means_default() {
    let args = CliArgs::try_parse_from(["sitepipe"]).unwrap();
    assert_eq!(args.pipeline, PipelineName::Default);
    assert!(!args.dry_run);
    assert!(args.config.is_none());
}

#[test]
fn pipeline_and_flags_are_parsed() {
    let args = CliArgs::try_parse_from([
        "sitepipe",
        "styles-only",
        "--config",
        "site/Sitepipe.toml",
        "--log-level",
        "debug",
        "--dry-run",
    ])
    .unwrap();

    assert_eq!(args.pipeline, PipelineName::StylesOnly);
    assert_eq!(args.config.as_deref(), Some("site/Sitepipe.toml"));
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert!(args.dry_run);
}

#[test]
fn every_pipeline_name_is_accepted_on_the_command_line() {
    for name in PipelineName::ALL {
        let args = CliArgs::try_parse_from(["sitepipe", name.as_str()]).unwrap();
        assert_eq!(args.pipeline, name);
    }
}

#[test]
fn unknown_pipeline_is_rejected() {
    assert!(CliArgs::try_parse_from(["sitepipe", "publish"]).is_err());
}

#[test]
fn log_flag_overrides_the_environment() {
    assert_eq!(
        filter_directives(Some(LogLevel::Debug), Some("sitepipe=trace")),
        "debug,tower_http=warn,hyper=warn"
    );
}

#[test]
fn environment_directives_are_used_verbatim() {
    assert_eq!(
        filter_directives(None, Some(" sitepipe=debug,tower_http=info ")),
        "sitepipe=debug,tower_http=info"
    );
    assert_eq!(filter_directives(None, Some("   ")), "info,tower_http=warn,hyper=warn");
    assert_eq!(filter_directives(None, None), "info,tower_http=warn,hyper=warn");
}
