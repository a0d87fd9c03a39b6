use crate::error::Result;
use crate::io;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// FunctionOutline
// ---------------------------------------------------------------------------

/// One function found in a source file. This is the interface surface the
/// engine consumes from whatever parser produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionOutline {
    pub name: String,
    /// 1-based line of the declaration.
    pub line: usize,
    /// True when the body is a placeholder (TODO marker, unimplemented stub).
    pub is_stub: bool,
}

// ---------------------------------------------------------------------------
// SourceParser
// ---------------------------------------------------------------------------

/// Seam for the external AST parser. The engine only needs a function outline
/// per file; whether it comes from a real AST or a lexical scan is the
/// implementor's business.
pub trait SourceParser {
    fn outline(&self, path: &Path) -> Result<Vec<FunctionOutline>>;
}

// ---------------------------------------------------------------------------
// RegexSourceParser
// ---------------------------------------------------------------------------

/// Default lexical implementation covering the common function declaration
/// shapes of Rust, JavaScript/TypeScript, Python, and Go.
#[derive(Debug, Default)]
pub struct RegexSourceParser;

fn decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^\s*(?:pub(?:\([a-z]+\))?\s+)?(?:async\s+)?fn\s+(?P<rust>[A-Za-z_][A-Za-z0-9_]*)
            | ^\s*(?:export\s+)?(?:async\s+)?function\s+(?P<js>[A-Za-z_$][A-Za-z0-9_$]*)
            | ^\s*(?:export\s+)?const\s+(?P<arrow>[A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*(?:async\s*)?\(
            | ^\s*(?:async\s+)?def\s+(?P<py>[A-Za-z_][A-Za-z0-9_]*)
            | ^\s*func\s+(?:\([^)]*\)\s+)?(?P<go>[A-Za-z_][A-Za-z0-9_]*)
            ",
        )
        .unwrap()
    })
}

/// Markers that flag a body as a placeholder rather than an implementation.
const STUB_MARKERS: &[&str] = &[
    "todo!",
    "unimplemented!",
    "todo:",
    "fixme:",
    "not implemented",
    "notimplementederror",
    "coming soon",
    "placeholder",
];

/// How far past a declaration we look for stub markers before giving up.
const STUB_WINDOW: usize = 12;

impl SourceParser for RegexSourceParser {
    fn outline(&self, path: &Path) -> Result<Vec<FunctionOutline>> {
        let content = io::read_bounded(path)?;
        Ok(outline_text(&content))
    }
}

fn outline_text(content: &str) -> Vec<FunctionOutline> {
    let lines: Vec<&str> = content.lines().collect();
    let mut outlines = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(caps) = decl_re().captures(line) else {
            continue;
        };
        let name = caps
            .name("rust")
            .or_else(|| caps.name("js"))
            .or_else(|| caps.name("arrow"))
            .or_else(|| caps.name("py"))
            .or_else(|| caps.name("go"))
            .map(|m| m.as_str().to_string());
        let Some(name) = name else { continue };

        let window_end = (idx + 1 + STUB_WINDOW).min(lines.len());
        let is_stub = lines[idx + 1..window_end]
            .iter()
            .take_while(|l| !decl_re().is_match(l))
            .any(|l| {
                let lower = l.to_lowercase();
                STUB_MARKERS.iter().any(|m| lower.contains(m))
            });

        outlines.push(FunctionOutline {
            name,
            line: idx + 1,
            is_stub,
        });
    }

    outlines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
