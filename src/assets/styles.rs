use std::fs;
use std::path::{Path, PathBuf};

use lightningcss::error::ErrorLocation;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;
use tracing::{debug, info};

use crate::task::{Failure, Task, TaskFuture, names};

use super::{collect_sources, run_blocking, write_output};

/// Minifies every matched stylesheet into the styles output directory,
/// adding vendor prefixes for the configured browsers and, optionally, a
/// `<name>.css.map` beside each output.
///
/// All files are compiled before anything is written, so a syntax error in
/// any one of them leaves the output directory untouched.
#[derive(Debug, Clone)]
pub struct StylesTask {
    root: PathBuf,
    patterns: Vec<String>,
    out_dir: PathBuf,
    source_maps: bool,
    browsers: Vec<String>,
}

impl StylesTask {
    pub fn new(root: impl Into<PathBuf>, patterns: Vec<String>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            patterns,
            out_dir: out_dir.into(),
            source_maps: true,
            browsers: Vec::new(),
        }
    }

    pub fn with_source_maps(mut self, enabled: bool) -> Self {
        self.source_maps = enabled;
        self
    }

    /// Browserslist queries, e.g. `["defaults"]` or `["safari 13"]`.
    pub fn with_browsers(mut self, queries: Vec<String>) -> Self {
        self.browsers = queries;
        self
    }

    fn compile(&self) -> Result<(), Failure> {
        let options = StyleOptions {
            source_maps: self.source_maps,
            browsers: resolve_browsers(&self.browsers)
                .map_err(|e| Failure::io(names::COMPILE_STYLES, e))?,
        };
        let sources = collect_sources(names::COMPILE_STYLES, &self.root, &self.patterns)?;

        let mut compiled = Vec::with_capacity(sources.len());
        for source in &sources {
            let text = fs::read_to_string(&source.path)
                .map_err(|e| Failure::from_io(names::COMPILE_STYLES, &source.path, &e))?;
            let name = source
                .path
                .strip_prefix(&self.root)
                .unwrap_or(source.path.as_path());
            let sheet = compile_stylesheet(&source.path, &name.to_string_lossy(), &text, &options)?;
            compiled.push((self.out_dir.join(&source.rel), sheet));
        }

        for (path, sheet) in &compiled {
            write_output(names::COMPILE_STYLES, path, sheet.css.as_bytes())?;
            if let Some(map) = &sheet.map {
                write_output(names::COMPILE_STYLES, &map_path(path), map.as_bytes())?;
            }
        }

        info!(
            task = names::COMPILE_STYLES,
            files = compiled.len(),
            source_maps = self.source_maps,
            out = %self.out_dir.display(),
            "stylesheets written"
        );
        Ok(())
    }
}

impl Task for StylesTask {
    fn name(&self) -> &str {
        names::COMPILE_STYLES
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.out_dir.clone()]
    }

    fn run(&self) -> TaskFuture<'_> {
        let this = self.clone();
        Box::pin(run_blocking(names::COMPILE_STYLES, move || this.compile()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StyleOptions {
    pub source_maps: bool,
    /// Prefixing targets; `None` leaves declarations unprefixed.
    pub browsers: Option<Browsers>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStylesheet {
    pub css: String,
    /// Version 3 source map JSON.
    pub map: Option<String>,
}

/// Resolve browserslist queries; no queries means no targets.
pub fn resolve_browsers(queries: &[String]) -> Result<Option<Browsers>, String> {
    if queries.is_empty() {
        return Ok(None);
    }
    Browsers::from_browserslist(queries.iter().map(String::as_str))
        .map_err(|e| format!("invalid browsers query {queries:?}: {e}"))
}

/// Parse, prefix and minify one stylesheet.
///
/// `source_name` is how the file appears in error messages and in the
/// source map's `sources`.
pub fn compile_stylesheet(
    path: &Path,
    source_name: &str,
    source: &str,
    options: &StyleOptions,
) -> Result<CompiledStylesheet, Failure> {
    let parser_options = ParserOptions {
        filename: source_name.to_string(),
        ..ParserOptions::default()
    };
    let mut sheet = StyleSheet::parse(source, parser_options)
        .map_err(|e| css_failure(path, e.kind.to_string(), e.loc))?;

    let targets = Targets {
        browsers: options.browsers,
        ..Targets::default()
    };
    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| css_failure(path, e.kind.to_string(), e.loc))?;

    let mut source_map = None;
    if options.source_maps {
        let mut map = SourceMap::new("/");
        let index = map.add_source(source_name);
        map.set_source_content(index as usize, source)
            .map_err(|e| map_failure(path, e))?;
        source_map = Some(map);
    }

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            source_map: source_map.as_mut(),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| css_failure(path, e.kind.to_string(), e.loc))?;

    let Some(mut map) = source_map else {
        return Ok(CompiledStylesheet {
            css: printed.code,
            map: None,
        });
    };

    let json = map.to_json(None).map_err(|e| map_failure(path, e))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!(file = %path.display(), "source map generated");

    Ok(CompiledStylesheet {
        css: format!("{}\n/*# sourceMappingURL={file_name}.map */\n", printed.code),
        map: Some(json),
    })
}

/// `main.css` → `main.css.map`.
pub fn map_path(css: &Path) -> PathBuf {
    let mut path = css.as_os_str().to_owned();
    path.push(".map");
    PathBuf::from(path)
}

// lightningcss lines are 0-based, columns 1-based.
fn css_failure(path: &Path, message: String, loc: Option<ErrorLocation>) -> Failure {
    let failure = Failure::syntax(names::COMPILE_STYLES, message).at_file(path);
    match loc {
        Some(loc) => failure.at_location(loc.line + 1, loc.column),
        None => failure,
    }
}

fn map_failure(path: &Path, err: impl std::fmt::Display) -> Failure {
    Failure::io(names::COMPILE_STYLES, format!("source map failed: {err}")).at_file(path)
}
