use crate::claims::{self, DocumentationClaim};
use crate::confidence::{completeness_confidence, ConfidenceScorer};
use crate::config::AnalyzerConfig;
use crate::error::{GapscanError, Result};
use crate::evidence::{
    find_matching_files, Evidence, EvidenceKind, EvidenceProvider, FilenameMatchProvider,
    FunctionMatchProvider, TestPresenceProvider,
};
use crate::gap::{derive_id, CompletenessAssessment, FeatureGap, SpecGap};
use crate::io::{is_scannable_dir, read_bounded};
use crate::source::RegexSourceParser;
use crate::types::{ClaimVerdict, GapStatus, Recommendation};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

// ---------------------------------------------------------------------------
// Claim verification
// ---------------------------------------------------------------------------

/// Accuracy scoring starts from a neutral midpoint; evidence moves it.
const NEUTRAL_SCORE: i32 = 50;

struct ClaimVerification {
    evidence: Vec<Evidence>,
    /// 0-100, neutral base plus evidence weights.
    accuracy: u32,
    has_implementation: bool,
    has_stub: bool,
}

/// Gather evidence for one claim. Pure filesystem reads, no writes;
/// calling it twice yields the same result.
fn verify_claim(
    claim: &DocumentationClaim,
    code_dir: &Path,
    config: &AnalyzerConfig,
) -> ClaimVerification {
    let mut evidence = Vec::new();

    let filename = FilenameMatchProvider {
        max_matches: config.max_filename_matches,
    };
    evidence.extend(filename.gather(claim, code_dir));

    if config.deep_verification {
        let candidates = find_matching_files(claim, code_dir, config.max_filename_matches);
        // Deep parsing is only worth it once the filename pass has narrowed
        // the field; a broad match set would drown the signal in noise.
        if !candidates.is_empty() && candidates.len() <= config.max_deep_candidates {
            let provider = FunctionMatchProvider::new(RegexSourceParser, config.max_deep_candidates);
            evidence.extend(provider.gather(claim, code_dir));
        }
    }

    evidence.extend(TestPresenceProvider.gather(claim, code_dir));

    let evidence_sum: i32 = evidence
        .iter()
        .map(|e| e.confidence_impact.unwrap_or_else(|| e.kind.default_weight()))
        .sum();
    let accuracy = (NEUTRAL_SCORE + evidence_sum).clamp(0, 100) as u32;

    let has_implementation = evidence.iter().any(|e| {
        matches!(
            e.kind,
            EvidenceKind::ExactFunctionMatch | EvidenceKind::AstSignatureVerified
        )
    });
    let has_stub = evidence.iter().any(|e| {
        matches!(
            e.kind,
            EvidenceKind::ReturnsTodoComment | EvidenceKind::ReturnsGuidanceText
        )
    });

    ClaimVerification {
        evidence,
        accuracy,
        has_implementation,
        has_stub,
    }
}

/// Decision table for a verified claim. The 85/30 cutoffs are tunable
/// defaults, not calibrated boundaries.
fn determine_status(accuracy: u32, has_implementation: bool, has_stub: bool) -> ClaimVerdict {
    if accuracy >= 85 && has_implementation && !has_stub {
        ClaimVerdict::Accurate
    } else if accuracy < 30 || (has_stub && !has_implementation) {
        ClaimVerdict::False
    } else {
        ClaimVerdict::Misleading
    }
}

fn status_for_verdict(verdict: ClaimVerdict, has_stub: bool) -> GapStatus {
    match verdict {
        ClaimVerdict::Accurate => GapStatus::Complete,
        ClaimVerdict::False => GapStatus::Missing,
        ClaimVerdict::Misleading if has_stub => GapStatus::Stub,
        ClaimVerdict::Misleading => GapStatus::Partial,
    }
}

/// What the evidence actually showed, as a sentence fragment per fired kind.
fn synthesize_reality(evidence: &[Evidence]) -> String {
    let has = |kinds: &[EvidenceKind]| evidence.iter().any(|e| kinds.contains(&e.kind));

    let mut parts = Vec::new();
    if has(&[
        EvidenceKind::ExactFunctionMatch,
        EvidenceKind::AstSignatureVerified,
    ]) {
        parts.push("matching implementation functions found");
    }
    if has(&[
        EvidenceKind::ReturnsTodoComment,
        EvidenceKind::ReturnsGuidanceText,
    ]) {
        parts.push("matched function bodies are placeholders");
    }
    if has(&[EvidenceKind::NameSimilarityOnly]) {
        parts.push("file names resemble the claim");
    }
    if has(&[
        EvidenceKind::TestFileExists,
        EvidenceKind::TestFileCoversCase,
    ]) {
        parts.push("test files reference the claimed area");
    }
    if has(&[EvidenceKind::FileNotFound, EvidenceKind::FunctionNotFound]) {
        parts.push("no matching implementation located");
    }

    if parts.is_empty() {
        "no evidence gathered".to_string()
    } else {
        parts.join("; ")
    }
}

// ---------------------------------------------------------------------------
// SpecGapAnalyzer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SpecAnalysis {
    pub gaps: Vec<SpecGap>,
    pub total_requirements: usize,
    /// Non-fatal per-file problems; the rest of the run completed.
    pub errors: Vec<String>,
}

pub struct SpecGapAnalyzer {
    config: AnalyzerConfig,
    scorer: ConfidenceScorer,
}

impl SpecGapAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            scorer: ConfidenceScorer::default(),
        }
    }

    /// Scan every Markdown file under `specs_dir` for requirement lines and
    /// verify each against `code_dir`. A missing specs directory is a
    /// configuration error and aborts; a single bad file does not.
    pub fn analyze_specs(&self, specs_dir: &Path, code_dir: &Path) -> Result<SpecAnalysis> {
        if !specs_dir.is_dir() {
            return Err(GapscanError::SpecsDirNotFound(
                specs_dir.display().to_string(),
            ));
        }

        let mut analysis = SpecAnalysis::default();
        if !code_dir.is_dir() {
            analysis.errors.push(
                GapscanError::GapDetection {
                    operation: "analyze_specs".to_string(),
                    message: format!("code directory not found: {}", code_dir.display()),
                }
                .to_string(),
            );
        }

        for path in markdown_files(specs_dir) {
            let rel = path
                .strip_prefix(specs_dir)
                .unwrap_or(&path)
                .display()
                .to_string();
            let content = match read_bounded(&path) {
                Ok(c) => c,
                Err(e) => {
                    analysis.errors.push(
                        GapscanError::SpecParsing {
                            path: rel.clone(),
                            reason: e.to_string(),
                        }
                        .to_string(),
                    );
                    continue;
                }
            };

            let requirements = claims::extract_claims(&content, &rel, claims::is_requirement);
            debug!(file = %rel, count = requirements.len(), "extracted requirements");
            analysis.total_requirements += requirements.len();

            for requirement in requirements {
                let verification = verify_claim(&requirement, code_dir, &self.config);
                let verdict = determine_status(
                    verification.accuracy,
                    verification.has_implementation,
                    verification.has_stub,
                );
                let status = status_for_verdict(verdict, verification.has_stub);
                if status == GapStatus::Complete {
                    continue;
                }

                let confidence = self.scorer.calculate_score(status, &verification.evidence);
                analysis.gaps.push(SpecGap {
                    id: derive_id("gap", &requirement.file, requirement.line),
                    requirement: requirement.text.clone(),
                    source: format_source(&requirement),
                    status,
                    confidence_score: confidence.score,
                    evidence: verification.evidence,
                    recommendation: Recommendation::ImplementFeature,
                });
            }
        }

        Ok(analysis)
    }
}

// ---------------------------------------------------------------------------
// FeatureGapAnalyzer
// ---------------------------------------------------------------------------

const DOC_FILES: &[&str] = &["README.md", "ROADMAP.md", "FEATURES.md", "CHANGELOG.md"];

#[derive(Debug, Clone, Default)]
pub struct FeatureAnalysis {
    pub gaps: Vec<FeatureGap>,
    pub total_claims: usize,
    /// Mean accuracy over all claims, gaps and non-gaps alike (non-gaps
    /// count as 100).
    pub overall_accuracy: u32,
    pub errors: Vec<String>,
}

pub struct FeatureGapAnalyzer {
    config: AnalyzerConfig,
}

impl FeatureGapAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Verify capability claims in the project documentation against the
    /// codebase. A missing docs directory yields an empty result, not an
    /// error: plenty of projects simply have no docs yet.
    pub fn analyze_features(&self, docs_dir: &Path, code_dir: &Path) -> FeatureAnalysis {
        let mut analysis = FeatureAnalysis::default();
        if !docs_dir.is_dir() {
            warn!(path = %docs_dir.display(), "documentation directory not found, skipping claim verification");
            return analysis;
        }

        let mut gap_accuracies: Vec<u32> = Vec::new();

        for path in discover_doc_files(docs_dir) {
            let rel = path
                .strip_prefix(docs_dir)
                .unwrap_or(&path)
                .display()
                .to_string();
            let content = match read_bounded(&path) {
                Ok(c) => c,
                Err(e) => {
                    analysis.errors.push(
                        GapscanError::SpecParsing {
                            path: rel.clone(),
                            reason: e.to_string(),
                        }
                        .to_string(),
                    );
                    continue;
                }
            };

            let doc_claims = claims::extract_claims(&content, &rel, claims::is_feature_claim);
            analysis.total_claims += doc_claims.len();

            for claim in doc_claims {
                let verification = verify_claim(&claim, code_dir, &self.config);
                let verdict = determine_status(
                    verification.accuracy,
                    verification.has_implementation,
                    verification.has_stub,
                );
                if verification.accuracy >= self.config.accuracy_threshold {
                    // Accurate enough; not worth a gap record.
                    continue;
                }

                gap_accuracies.push(verification.accuracy);
                let status = status_for_verdict(verdict, verification.has_stub);
                analysis.gaps.push(FeatureGap {
                    id: derive_id("claim", &claim.file, claim.line),
                    verdict,
                    status,
                    accuracy_score: verification.accuracy,
                    reality: synthesize_reality(&verification.evidence),
                    recommendation: Recommendation::derive(verdict, verification.accuracy),
                    evidence: verification.evidence,
                    claim,
                });
            }
        }

        analysis.overall_accuracy = calculate_accuracy(analysis.total_claims, &gap_accuracies);
        analysis
    }
}

/// Mean per-claim accuracy; claims that did not become gaps count as 100.
fn calculate_accuracy(total_claims: usize, gap_accuracies: &[u32]) -> u32 {
    if total_claims == 0 {
        return 100;
    }
    let non_gaps = (total_claims - gap_accuracies.len()) as u64 * 100;
    let gaps: u64 = gap_accuracies.iter().map(|a| *a as u64).sum();
    ((non_gaps + gaps) as f64 / total_claims as f64).round() as u32
}

// ---------------------------------------------------------------------------
// CompletenessAnalyzer
// ---------------------------------------------------------------------------

pub struct CompletenessAnalyzer;

impl CompletenessAnalyzer {
    /// Fold the spec analysis into headline counts. Requirements that did not
    /// become gaps are counted as implemented.
    pub fn assess(total_requirements: usize, gaps: &[SpecGap]) -> CompletenessAssessment {
        let partial = gaps
            .iter()
            .filter(|g| g.status == GapStatus::Partial)
            .count();
        let missing = gaps
            .iter()
            .filter(|g| matches!(g.status, GapStatus::Missing | GapStatus::Stub))
            .count();
        let implemented = total_requirements.saturating_sub(gaps.len());

        CompletenessAssessment {
            total_requirements,
            implemented,
            partial,
            missing,
            confidence: completeness_confidence(implemented, total_requirements),
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisReport {
    pub spec_gaps: Vec<SpecGap>,
    pub feature_gaps: Vec<FeatureGap>,
    pub completeness: CompletenessAssessment,
    pub overall_accuracy: u32,
    /// Everything the run skipped, one line each. Never silently dropped.
    pub errors: Vec<String>,
}

pub struct GapAnalyzer {
    spec: SpecGapAnalyzer,
    feature: FeatureGapAnalyzer,
}

impl GapAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            spec: SpecGapAnalyzer::new(config.clone()),
            feature: FeatureGapAnalyzer::new(config),
        }
    }

    /// One full pass: spec requirements, documentation claims, completeness.
    /// Only a missing specs directory aborts the run.
    pub fn analyze(
        &self,
        specs_dir: &Path,
        docs_dir: &Path,
        code_dir: &Path,
    ) -> Result<AnalysisReport> {
        let spec_analysis = self.spec.analyze_specs(specs_dir, code_dir)?;
        let feature_analysis = self.feature.analyze_features(docs_dir, code_dir);

        let completeness =
            CompletenessAnalyzer::assess(spec_analysis.total_requirements, &spec_analysis.gaps);

        let mut errors = spec_analysis.errors;
        errors.extend(feature_analysis.errors);

        Ok(AnalysisReport {
            spec_gaps: spec_analysis.gaps,
            feature_gaps: feature_analysis.gaps,
            completeness,
            overall_accuracy: feature_analysis.overall_accuracy,
            errors,
        })
    }
}

// ---------------------------------------------------------------------------
// File discovery
// ---------------------------------------------------------------------------

fn markdown_files(dir: &Path) -> Vec<std::path::PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || e.file_name()
                    .to_str()
                    .map(|n| !e.file_type().is_dir() || is_scannable_dir(n))
                    .unwrap_or(false)
        })
        .flatten()
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|x| x.to_str())
                .map(|x| x.eq_ignore_ascii_case("md"))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Fixed well-known docs at the root, plus everything under `docs/`.
fn discover_doc_files(docs_dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    for name in DOC_FILES {
        let path = docs_dir.join(name);
        if path.is_file() {
            files.push(path);
        }
    }
    let nested = docs_dir.join("docs");
    if nested.is_dir() {
        files.extend(markdown_files(&nested));
    }
    files
}

fn format_source(claim: &DocumentationClaim) -> String {
    if claim.section.is_empty() {
        format!("{}:{}", claim.file, claim.line)
    } else {
        format!("{}:{} ({})", claim.file, claim.line, claim.section)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
