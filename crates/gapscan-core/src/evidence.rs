use crate::claims::DocumentationClaim;
use crate::source::SourceParser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

// ---------------------------------------------------------------------------
// EvidenceKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvidenceKind {
    ExactFunctionMatch,
    AstSignatureVerified,
    TestFileExists,
    TestFileCoversCase,
    NameSimilarityOnly,
    ReturnsTodoComment,
    ReturnsGuidanceText,
    FunctionNotFound,
    FileNotFound,
    /// Anything produced by a newer provider this build doesn't know about.
    /// Scores as zero weight.
    #[serde(other)]
    Unknown,
}

impl EvidenceKind {
    /// Fixed weight used when the evidence record carries no explicit impact.
    pub fn default_weight(self) -> i32 {
        match self {
            EvidenceKind::ExactFunctionMatch => 50,
            EvidenceKind::AstSignatureVerified => 40,
            EvidenceKind::TestFileExists => 20,
            EvidenceKind::TestFileCoversCase => 15,
            EvidenceKind::NameSimilarityOnly => 10,
            EvidenceKind::ReturnsTodoComment => -30,
            EvidenceKind::ReturnsGuidanceText => -25,
            EvidenceKind::FunctionNotFound => -40,
            EvidenceKind::FileNotFound => -50,
            EvidenceKind::Unknown => 0,
        }
    }

    /// Semantic polarity. Positive kinds support the claim, negative refute it.
    pub fn is_positive(self) -> bool {
        self.default_weight() > 0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvidenceKind::ExactFunctionMatch => "exact-function-match",
            EvidenceKind::AstSignatureVerified => "ast-signature-verified",
            EvidenceKind::TestFileExists => "test-file-exists",
            EvidenceKind::TestFileCoversCase => "test-file-covers-case",
            EvidenceKind::NameSimilarityOnly => "name-similarity-only",
            EvidenceKind::ReturnsTodoComment => "returns-todo-comment",
            EvidenceKind::ReturnsGuidanceText => "returns-guidance-text",
            EvidenceKind::FunctionNotFound => "function-not-found",
            EvidenceKind::FileNotFound => "file-not-found",
            EvidenceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// One observation supporting or refuting an implementation claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: EvidenceKind,
    pub description: String,
    /// Explicit override of the kind's table weight, -100..=100. Sign must
    /// match the kind's polarity; use [`Evidence::with_impact_override`] to
    /// bypass that check deliberately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_impact: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl Evidence {
    pub fn new(kind: EvidenceKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            confidence_impact: None,
            location: None,
            snippet: None,
        }
    }

    /// Attach an explicit impact. An impact whose sign contradicts the kind's
    /// polarity is dropped in favor of the table weight.
    pub fn with_impact(mut self, impact: i32) -> Self {
        let impact = impact.clamp(-100, 100);
        let table = self.kind.default_weight();
        if table == 0 || (impact >= 0) == (table > 0) {
            self.confidence_impact = Some(impact);
        }
        self
    }

    /// Attach an impact without the polarity check. For callers that know
    /// they are inverting the kind's usual meaning.
    pub fn with_impact_override(mut self, impact: i32) -> Self {
        self.confidence_impact = Some(impact.clamp(-100, 100));
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

// ---------------------------------------------------------------------------
// EvidenceProvider
// ---------------------------------------------------------------------------

/// A scanner that turns a claim plus a codebase into evidence records.
/// Providers never fail: anything that goes wrong during a scan degrades to
/// negative evidence rather than an error.
pub trait EvidenceProvider {
    fn name(&self) -> &'static str;
    fn gather(&self, claim: &DocumentationClaim, code_dir: &Path) -> Vec<Evidence>;
}

// ---------------------------------------------------------------------------
// File matching
// ---------------------------------------------------------------------------

const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "py", "go", "java", "rb", "c", "cc", "cpp", "h", "cs",
];

/// Substring match that also tolerates a trailing plural 's' on the keyword.
fn keyword_matches(haystack: &str, keyword: &str) -> bool {
    if haystack.contains(keyword) {
        return true;
    }
    let singular = keyword.trim_end_matches('s');
    singular.len() >= 4 && haystack.contains(singular)
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Files under `code_dir` whose stem contains any claim keyword, up to
/// `limit`. Deterministic: walkdir sorted by file name.
pub fn find_matching_files(
    claim: &DocumentationClaim,
    code_dir: &Path,
    limit: usize,
) -> Vec<PathBuf> {
    let keywords = claim.keywords();
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    let walker = WalkDir::new(code_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || e.file_name()
                    .to_str()
                    .map(|n| !e.file_type().is_dir() || crate::io::is_scannable_dir(n))
                    .unwrap_or(false)
        });

    for entry in walker.flatten() {
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }
        let stem = entry
            .path()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .replace(['-', '_'], "");
        if keywords
            .iter()
            .any(|k| keyword_matches(&stem, &k.replace(['-', '_'], "")))
        {
            matches.push(entry.path().to_path_buf());
            if matches.len() >= limit {
                break;
            }
        }
    }
    matches
}

// ---------------------------------------------------------------------------
// FilenameMatchProvider
// ---------------------------------------------------------------------------

/// Cheapest provider: filename similarity only.
pub struct FilenameMatchProvider {
    pub max_matches: usize,
}

impl Default for FilenameMatchProvider {
    fn default() -> Self {
        Self { max_matches: 25 }
    }
}

impl EvidenceProvider for FilenameMatchProvider {
    fn name(&self) -> &'static str {
        "filename-match"
    }

    fn gather(&self, claim: &DocumentationClaim, code_dir: &Path) -> Vec<Evidence> {
        let matches = find_matching_files(claim, code_dir, self.max_matches);
        if matches.is_empty() {
            debug!(claim = %claim.text, "no files matched claim keywords");
            return vec![Evidence::new(
                EvidenceKind::FileNotFound,
                format!("no source file matches keywords of '{}'", claim.text),
            )];
        }
        matches
            .iter()
            .map(|p| {
                Evidence::new(
                    EvidenceKind::NameSimilarityOnly,
                    format!("file name resembles claim: {}", p.display()),
                )
                .at(p.display().to_string())
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FunctionMatchProvider
// ---------------------------------------------------------------------------

/// Deep verification: outline candidate files and look for a function whose
/// name contains a claim keyword. Stub bodies downgrade the match.
pub struct FunctionMatchProvider<P: SourceParser> {
    parser: P,
    pub max_candidates: usize,
}

impl<P: SourceParser> FunctionMatchProvider<P> {
    pub fn new(parser: P, max_candidates: usize) -> Self {
        Self {
            parser,
            max_candidates,
        }
    }
}

impl<P: SourceParser> EvidenceProvider for FunctionMatchProvider<P> {
    fn name(&self) -> &'static str {
        "function-match"
    }

    fn gather(&self, claim: &DocumentationClaim, code_dir: &Path) -> Vec<Evidence> {
        let candidates = find_matching_files(claim, code_dir, self.max_candidates);
        if candidates.is_empty() {
            return Vec::new();
        }

        let keywords: Vec<String> = claim
            .keywords()
            .iter()
            .map(|k| k.replace(['-', '_'], ""))
            .collect();
        let mut evidence = Vec::new();
        let mut found_any = false;

        for path in &candidates {
            let outline = match self.parser.outline(path) {
                Ok(o) => o,
                Err(e) => {
                    // Unparseable source degrades to negative evidence; the
                    // batch keeps going.
                    debug!(path = %path.display(), error = %e, "outline failed");
                    evidence.push(
                        Evidence::new(
                            EvidenceKind::FileNotFound,
                            format!("could not parse candidate file: {}", path.display()),
                        )
                        .at(path.display().to_string()),
                    );
                    continue;
                }
            };

            for func in &outline {
                let flat = func.name.to_lowercase().replace(['-', '_'], "");
                if !keywords.iter().any(|k| keyword_matches(&flat, k)) {
                    continue;
                }
                found_any = true;
                evidence.push(
                    Evidence::new(
                        EvidenceKind::ExactFunctionMatch,
                        format!("function '{}' matches claim keyword", func.name),
                    )
                    .at(format!("{}:{}", path.display(), func.line)),
                );
                if func.is_stub {
                    evidence.push(
                        Evidence::new(
                            EvidenceKind::ReturnsGuidanceText,
                            format!("function '{}' body is a placeholder", func.name),
                        )
                        .at(format!("{}:{}", path.display(), func.line)),
                    );
                }
            }
        }

        if !found_any {
            evidence.push(Evidence::new(
                EvidenceKind::FunctionNotFound,
                format!("no function in candidate files matches '{}'", claim.text),
            ));
        }
        evidence
    }
}

// ---------------------------------------------------------------------------
// TestPresenceProvider
// ---------------------------------------------------------------------------

/// Looks for test files that reference a claim keyword in their name.
#[derive(Default)]
pub struct TestPresenceProvider;

impl EvidenceProvider for TestPresenceProvider {
    fn name(&self) -> &'static str {
        "test-presence"
    }

    fn gather(&self, claim: &DocumentationClaim, code_dir: &Path) -> Vec<Evidence> {
        let keywords: Vec<String> = claim
            .keywords()
            .iter()
            .map(|k| k.replace(['-', '_'], ""))
            .collect();
        if keywords.is_empty() {
            return Vec::new();
        }

        let mut evidence = Vec::new();
        let walker = WalkDir::new(code_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || e.file_name()
                        .to_str()
                        .map(|n| !e.file_type().is_dir() || crate::io::is_scannable_dir(n))
                        .unwrap_or(false)
            });

        for entry in walker.flatten() {
            if !entry.file_type().is_file() || !is_source_file(entry.path()) {
                continue;
            }
            let stem = entry
                .path()
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_lowercase();
            if !stem.contains("test") && !stem.contains("spec") {
                continue;
            }
            let flat = stem.replace(['-', '_'], "");
            if keywords.iter().any(|k| keyword_matches(&flat, k)) {
                evidence.push(
                    Evidence::new(
                        EvidenceKind::TestFileExists,
                        format!("test file covers claim area: {}", entry.path().display()),
                    )
                    .at(entry.path().display().to_string()),
                );
            }
        }
        evidence
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RegexSourceParser;
    use tempfile::TempDir;

    fn claim(text: &str) -> DocumentationClaim {
        DocumentationClaim {
            text: text.to_string(),
            file: "README.md".to_string(),
            line: 1,
            section: String::new(),
        }
    }

    #[test]
    fn weight_table() {
        assert_eq!(EvidenceKind::ExactFunctionMatch.default_weight(), 50);
        assert_eq!(EvidenceKind::FileNotFound.default_weight(), -50);
        assert_eq!(EvidenceKind::TestFileExists.default_weight(), 20);
        assert_eq!(EvidenceKind::ReturnsTodoComment.default_weight(), -30);
        assert_eq!(EvidenceKind::NameSimilarityOnly.default_weight(), 10);
        assert_eq!(EvidenceKind::AstSignatureVerified.default_weight(), 40);
        assert_eq!(EvidenceKind::FunctionNotFound.default_weight(), -40);
        assert_eq!(EvidenceKind::Unknown.default_weight(), 0);
    }

    #[test]
    fn polarity_guard_drops_contradicting_impact() {
        let e = Evidence::new(EvidenceKind::ExactFunctionMatch, "m").with_impact(-20);
        assert_eq!(e.confidence_impact, None);
        let e = Evidence::new(EvidenceKind::ExactFunctionMatch, "m").with_impact(30);
        assert_eq!(e.confidence_impact, Some(30));
        let e = Evidence::new(EvidenceKind::FileNotFound, "m").with_impact_override(10);
        assert_eq!(e.confidence_impact, Some(10));
    }

    #[test]
    fn impact_clamped_to_range() {
        let e = Evidence::new(EvidenceKind::ExactFunctionMatch, "m").with_impact(500);
        assert_eq!(e.confidence_impact, Some(100));
    }

    #[test]
    fn unknown_kind_deserializes() {
        let e: EvidenceKind = serde_json::from_str("\"quantum-oracle-match\"").unwrap();
        assert_eq!(e, EvidenceKind::Unknown);
    }

    #[test]
    fn filename_provider_finds_similar_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/report_generator.rs"), "fn x() {}").unwrap();

        let provider = FilenameMatchProvider::default();
        let evidence = provider.gather(&claim("Automatically generates a report"), dir.path());
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].kind, EvidenceKind::NameSimilarityOnly);
    }

    #[test]
    fn filename_provider_emits_file_not_found() {
        let dir = TempDir::new().unwrap();
        let provider = FilenameMatchProvider::default();
        let evidence = provider.gather(
            &claim("Automatically generates comprehensive test reports"),
            dir.path(),
        );
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].kind, EvidenceKind::FileNotFound);
    }

    #[test]
    fn function_provider_matches_and_flags_stub() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("reports.rs"),
            "pub fn generate_reports() {\n    // TODO: implement\n}\n",
        )
        .unwrap();

        let provider = FunctionMatchProvider::new(RegexSourceParser, 5);
        let evidence = provider.gather(&claim("Automatically generates reports"), dir.path());
        let kinds: Vec<EvidenceKind> = evidence.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&EvidenceKind::ExactFunctionMatch));
        assert!(kinds.contains(&EvidenceKind::ReturnsGuidanceText));
    }

    #[test]
    fn function_provider_reports_no_match() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("reports.rs"), "pub fn unrelated() {}\n").unwrap();

        let provider = FunctionMatchProvider::new(RegexSourceParser, 5);
        let evidence = provider.gather(&claim("Automatically generates reports"), dir.path());
        assert!(evidence
            .iter()
            .any(|e| e.kind == EvidenceKind::FunctionNotFound));
    }

    #[test]
    fn test_provider_finds_test_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("tests")).unwrap();
        std::fs::write(dir.path().join("tests/report_tests.rs"), "#[test] fn t() {}").unwrap();

        let provider = TestPresenceProvider;
        let evidence = provider.gather(&claim("Automatically generates reports"), dir.path());
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].kind, EvidenceKind::TestFileExists);
    }

    #[test]
    fn matching_respects_limit() {
        let dir = TempDir::new().unwrap();
        for i in 0..10 {
            std::fs::write(
                dir.path().join(format!("report_{i}.rs")),
                "fn x() {}",
            )
            .unwrap();
        }
        let matches = find_matching_files(&claim("Generates reports"), dir.path(), 5);
        assert_eq!(matches.len(), 5);
    }
}
