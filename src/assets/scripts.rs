use std::fs;
use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use tracing::info;

use crate::task::{Failure, Task, TaskFuture, names};

use super::{collect_sources, run_blocking, write_output};

/// Minifies every matched script and concatenates them into one bundle.
///
/// Every file is parsed first; a syntax error in any of them fails the task
/// before the bundle is touched.
#[derive(Debug, Clone)]
pub struct ScriptsTask {
    root: PathBuf,
    patterns: Vec<String>,
    out_dir: PathBuf,
    bundle: String,
}

impl ScriptsTask {
    pub fn new(
        root: impl Into<PathBuf>,
        patterns: Vec<String>,
        out_dir: impl Into<PathBuf>,
        bundle: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            patterns,
            out_dir: out_dir.into(),
            bundle: bundle.into(),
        }
    }

    pub fn bundle_path(&self) -> PathBuf {
        self.out_dir.join(&self.bundle)
    }

    fn compile(&self) -> Result<(), Failure> {
        let sources = collect_sources(names::COMPILE_SCRIPTS, &self.root, &self.patterns)?;
        if sources.is_empty() {
            info!(task = names::COMPILE_SCRIPTS, "no scripts matched; nothing to bundle");
            return Ok(());
        }

        let mut minified = Vec::with_capacity(sources.len());
        for source in &sources {
            let text = fs::read_to_string(&source.path)
                .map_err(|e| Failure::from_io(names::COMPILE_SCRIPTS, &source.path, &e))?;
            check_script(&source.path, &text)?;
            minified.push(minifier::js::minify(&text).to_string());
        }

        let bundle_path = self.bundle_path();
        write_output(names::COMPILE_SCRIPTS, &bundle_path, minified.join("\n").as_bytes())?;

        info!(
            task = names::COMPILE_SCRIPTS,
            files = sources.len(),
            bundle = %bundle_path.display(),
            "script bundle written"
        );
        Ok(())
    }
}

impl Task for ScriptsTask {
    fn name(&self) -> &str {
        names::COMPILE_SCRIPTS
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.out_dir.clone()]
    }

    fn run(&self) -> TaskFuture<'_> {
        let this = self.clone();
        Box::pin(run_blocking(names::COMPILE_SCRIPTS, move || this.compile()))
    }
}

/// Parse `source` and report the first syntax error, if any.
pub fn check_script(path: &Path, source: &str) -> Result<(), Failure> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_default();
    let parsed = Parser::new(&allocator, source, source_type).parse();

    let Some(error) = parsed.errors.first() else {
        return Ok(());
    };

    let failure = Failure::syntax(names::COMPILE_SCRIPTS, error.to_string()).at_file(path);
    let offset = error
        .labels
        .as_ref()
        .and_then(|labels| labels.first())
        .map(|label| label.offset());
    Err(match offset {
        Some(offset) => {
            let (line, col) = line_col(source, offset);
            failure.at_location(line, col)
        }
        None => failure,
    })
}

// 1-based line and column of a byte offset.
fn line_col(source: &str, offset: usize) -> (u32, u32) {
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let col = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    (line as u32, col as u32)
}
