// src/lib.rs

pub mod assets;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod notifier;
pub mod pipeline;
pub mod server;
pub mod task;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::assets::snapshot::SNAPSHOT_DIR;
use crate::assets::{
    CleanTask, IconsTask, OutputSnapshot, ScriptsTask, SiteTask, SpriteTask, StylesTask,
};
use crate::cli::CliArgs;
use crate::config::{ProjectLayout, load_or_default};
use crate::engine::WatchTask;
use crate::errors::SitepipeError;
use crate::notifier::FailureNotifier;
use crate::pipeline::{Pipeline, PipelineName, PipelineRunner, definitions, validate_pipeline};
use crate::server::{DevServer, LiveServer, ReloadTask, ServeTask};
use crate::task::TaskRegistry;
use crate::types::RunMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and project root resolution
/// - the task registry (asset tasks, site generator, dev server, watch loop)
/// - the one-shot pipeline runner for the selected pipeline
pub async fn run(args: CliArgs) -> Result<()> {
    if args.list {
        print_pipelines();
        return Ok(());
    }

    let config_path = args.config.as_deref().map(PathBuf::from);
    let cfg = load_or_default(config_path.as_deref())?;
    let root = match &config_path {
        Some(path) => config_root_dir(path),
        None => current_dir(),
    };
    let layout = ProjectLayout::new(root, cfg);
    let pipeline = Pipeline::named(args.pipeline);

    if args.dry_run {
        print_dry_run(&pipeline, &layout);
        return Ok(());
    }

    let server = {
        let section = layout.config().server();
        Arc::new(LiveServer::new(
            &section.host,
            section.port,
            layout.server_root(),
        ))
    };

    let watch_notifier = Arc::new(FailureNotifier::new(RunMode::Watch));
    let registry = build_full_registry(&layout, server, watch_notifier);

    info!(pipeline = %pipeline.name, root = %layout.root().display(), "running pipeline");
    // The top-level run is always one-shot; only the watch loop absorbs failures.
    let notifier = Arc::new(FailureNotifier::new(RunMode::OneShot));
    run_pipeline(&pipeline, registry, notifier).await?;
    Ok(())
}

/// Validate `pipeline` against `registry` and run it to completion.
pub async fn run_pipeline(
    pipeline: &Pipeline,
    registry: TaskRegistry,
    notifier: Arc<FailureNotifier>,
) -> errors::Result<()> {
    validate_pipeline(&pipeline.root, &registry)?;

    let runner = PipelineRunner::new(registry, notifier);
    runner
        .run(pipeline.root.clone())
        .await
        .map_err(SitepipeError::Pipeline)
}

/// Every leaf task except `watch`.
///
/// This is also the registry the watch loop rebuilds with, so a rebuild can
/// never start a nested watch.
pub fn build_registry(layout: &ProjectLayout, server: Arc<dyn DevServer>) -> TaskRegistry {
    let root = layout.root();
    let paths = layout.config().paths();
    let styles = layout.config().styles();

    TaskRegistry::new()
        .with(Arc::new(CleanTask::new(layout.output_dirs())))
        .with(Arc::new(
            StylesTask::new(root, paths.styles.clone(), layout.styles_out())
                .with_source_maps(styles.source_maps)
                .with_browsers(styles.browsers.clone()),
        ))
        .with(Arc::new(ScriptsTask::new(
            root,
            paths.scripts.clone(),
            layout.scripts_out(),
            paths.scripts_bundle.clone(),
        )))
        .with(Arc::new(IconsTask::new(
            root,
            paths.icons.clone(),
            layout.icons_out(),
        )))
        .with(Arc::new(SpriteTask::new(
            root,
            paths.icons.clone(),
            layout.sprite_out(),
        )))
        .with(Arc::new(SiteTask::new(
            root,
            layout.config().site().cmd.clone(),
            layout.site_out(),
        )))
        .with(Arc::new(ServeTask::new(Arc::clone(&server))))
        .with(Arc::new(ReloadTask::new(server)))
}

/// [`build_registry`] plus the `watch` task, whose rebuilds report through
/// `watch_notifier` (expected to be in `Watch` mode). A failed rebuild
/// restores the output of the last good one.
pub fn build_full_registry(
    layout: &ProjectLayout,
    server: Arc<dyn DevServer>,
    watch_notifier: Arc<FailureNotifier>,
) -> TaskRegistry {
    let base = build_registry(layout, server);
    let watch_runner = PipelineRunner::new(base.clone(), watch_notifier);
    let watch = WatchTask::new(
        layout.root(),
        layout.config().watch().clone(),
        watch_runner,
        definitions::rebuild(),
    )
    .with_snapshot(OutputSnapshot::new(
        layout.output_dirs(),
        layout.root().join(SNAPSHOT_DIR),
    ));
    base.with(Arc::new(watch))
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "site/Sitepipe.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Sitepipe.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => current_dir(),
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn print_pipelines() {
    println!("pipelines:");
    for pipeline in Pipeline::all() {
        println!("  {:<14} {}", pipeline.name.as_str(), pipeline.description);
    }
}

/// Simple dry-run output: print the task tree and the resolved paths.
fn print_dry_run(pipeline: &Pipeline, layout: &ProjectLayout) {
    let cfg = layout.config();

    println!("sitepipe dry-run");
    println!("  pipeline = {} ({})", pipeline.name, pipeline.description);
    println!("  root = {}", layout.root().display());
    println!();

    println!("tree:");
    for line in pipeline.root.render().lines() {
        println!("  {line}");
    }
    println!();

    println!("outputs:");
    for dir in layout.output_dirs() {
        println!("  - {}", dir.display());
    }
    println!("  site.cmd = {}", cfg.site().cmd);
    println!(
        "  styles.source_maps = {}, styles.browsers = {:?}",
        cfg.styles().source_maps,
        cfg.styles().browsers
    );

    if pipeline.root.leaves().contains(&crate::task::names::START_DEV_SERVER) {
        let server = cfg.server();
        println!(
            "  server = http://{}:{} serving {}",
            server.host,
            server.port,
            layout.server_root().display()
        );
    }

    if matches!(pipeline.name, PipelineName::Dev | PipelineName::Default) {
        let watch = cfg.watch();
        println!("  watch.paths = {:?}", watch.paths);
        if !watch.exclude.is_empty() {
            println!("  watch.exclude = {:?}", watch.exclude);
        }
        println!("  watch.debounce_ms = {}", watch.debounce_ms);
        println!(
            "  watch.triggered_while_running_behaviour = {:?}",
            watch.triggered_while_running_behaviour
        );
    }

    debug!("dry-run complete (no execution)");
}
