use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::info;

use crate::task::{Failure, Task, TaskFuture, names};

use super::{collect_sources, run_blocking, write_output};

/// File name of the generated sprite sheet.
pub const SPRITE_FILE: &str = "svg-symbols.svg";

/// Packs every icon into a single sprite of `<symbol>` elements.
///
/// Each symbol gets `id="icon-<slug>"` and a `<title>` of the slug, where the
/// slug is the file stem lowercased with whitespace replaced by `-`. Two
/// icons with the same slug fail the build, since one `<use href>` could
/// not tell them apart.
#[derive(Debug, Clone)]
pub struct SpriteTask {
    root: PathBuf,
    patterns: Vec<String>,
    out_dir: PathBuf,
}

impl SpriteTask {
    pub fn new(root: impl Into<PathBuf>, patterns: Vec<String>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            patterns,
            out_dir: out_dir.into(),
        }
    }

    pub fn sprite_path(&self) -> PathBuf {
        self.out_dir.join(SPRITE_FILE)
    }

    fn build(&self) -> Result<(), Failure> {
        let sources = collect_sources(names::BUILD_SPRITE_SHEET, &self.root, &self.patterns)?;
        if sources.is_empty() {
            info!(task = names::BUILD_SPRITE_SHEET, "no icons matched; sprite not written");
            return Ok(());
        }

        let parser = SymbolParser::new()?;
        let mut seen: BTreeMap<String, &Path> = BTreeMap::new();
        let mut symbols = Vec::with_capacity(sources.len());
        for source in &sources {
            let name = icon_name(&source.path);
            if let Some(first) = seen.insert(name.clone(), &source.path) {
                return Err(Failure::syntax(
                    names::BUILD_SPRITE_SHEET,
                    format!(
                        "duplicate symbol id 'icon-{name}' (also produced by {})",
                        first.display()
                    ),
                )
                .at_file(&source.path));
            }

            let text = fs::read_to_string(&source.path)
                .map_err(|e| Failure::from_io(names::BUILD_SPRITE_SHEET, &source.path, &e))?;
            symbols.push(parser.symbol(&source.path, &name, &text)?);
        }

        let sheet = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" style=\"position:absolute;width:0;height:0;overflow:hidden\">\n  <defs>\n{}\n  </defs>\n</svg>\n",
            symbols.join("\n")
        );
        write_output(names::BUILD_SPRITE_SHEET, &self.sprite_path(), sheet.as_bytes())?;

        info!(
            task = names::BUILD_SPRITE_SHEET,
            symbols = symbols.len(),
            sprite = %self.sprite_path().display(),
            "sprite sheet written"
        );
        Ok(())
    }
}

impl Task for SpriteTask {
    fn name(&self) -> &str {
        names::BUILD_SPRITE_SHEET
    }

    fn outputs(&self) -> Vec<PathBuf> {
        vec![self.out_dir.clone()]
    }

    fn run(&self) -> TaskFuture<'_> {
        let this = self.clone();
        Box::pin(run_blocking(names::BUILD_SPRITE_SHEET, move || this.build()))
    }
}

fn icon_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    slug(&stem)
}

/// Icon file stem turned into an id fragment.
pub fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

struct SymbolParser {
    open: Regex,
    close: Regex,
    view_box: Regex,
    width: Regex,
    height: Regex,
}

impl SymbolParser {
    fn new() -> Result<Self, Failure> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                Failure::io(names::BUILD_SPRITE_SHEET, format!("building svg matcher: {e}"))
            })
        };
        Ok(Self {
            open: compile(r"(?is)<svg\b([^>]*)>")?,
            close: compile(r"(?i)</svg\s*>")?,
            view_box: compile(r#"(?i)\bviewBox\s*=\s*["']([^"']*)["']"#)?,
            width: compile(r#"(?i)\bwidth\s*=\s*["']([0-9.]+)(?:px)?["']"#)?,
            height: compile(r#"(?i)\bheight\s*=\s*["']([0-9.]+)(?:px)?["']"#)?,
        })
    }

    fn symbol(&self, path: &Path, name: &str, text: &str) -> Result<String, Failure> {
        let malformed = |message: &str| {
            Failure::syntax(names::BUILD_SPRITE_SHEET, message.to_string()).at_file(path)
        };

        let open = self
            .open
            .captures(text)
            .ok_or_else(|| malformed("no root <svg> element"))?;
        // Group 0 always exists for a successful match.
        let open_end = open.get(0).map_or(0, |m| m.end());
        let attrs = open.get(1).map_or("", |m| m.as_str());

        let close_start = self
            .close
            .find_iter(text)
            .last()
            .map(|m| m.start())
            .filter(|start| *start >= open_end)
            .ok_or_else(|| malformed("unterminated <svg> element"))?;

        let inner = text[open_end..close_start].trim();

        let view_box = match self.view_box.captures(attrs) {
            Some(caps) => caps.get(1).map(|m| m.as_str().to_string()),
            None => {
                let width = self.width.captures(attrs).and_then(|c| c.get(1));
                let height = self.height.captures(attrs).and_then(|c| c.get(1));
                match (width, height) {
                    (Some(w), Some(h)) => Some(format!("0 0 {} {}", w.as_str(), h.as_str())),
                    _ => None,
                }
            }
        };

        let view_box_attr = view_box
            .map(|vb| format!(" viewBox=\"{}\"", escape_attr(&vb)))
            .unwrap_or_default();

        Ok(format!(
            "    <symbol id=\"icon-{id}\"{view_box_attr}><title>{title}</title>{inner}</symbol>",
            id = escape_attr(name),
            title = escape_text(name),
        ))
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
