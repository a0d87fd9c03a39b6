use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// DocumentationClaim
// ---------------------------------------------------------------------------

/// One candidate claim pulled out of a documentation or specification file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentationClaim {
    pub text: String,
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// Heading the claim appeared under (empty if before any heading).
    pub section: String,
}

impl DocumentationClaim {
    /// Stopword-filtered keywords, longest first. These drive the codebase
    /// search, so longer (more specific) terms get tried before short ones.
    pub fn keywords(&self) -> Vec<String> {
        let mut words: Vec<String> = self
            .text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 4 && !is_stopword(w))
            .map(|w| w.to_string())
            .collect();
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        words.dedup();
        words.truncate(8);
        words
    }

    /// Capitalized phrases and quoted/backticked spans, used as related
    /// feature names when matching against the codebase.
    pub fn related_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for cap in capitalized_phrase_re().captures_iter(&self.text) {
            let phrase = cap[0].trim().to_string();
            if phrase.len() >= 4 && !names.contains(&phrase) {
                names.push(phrase);
            }
        }
        for cap in quoted_span_re().captures_iter(&self.text) {
            let span = cap
                .get(1)
                .or_else(|| cap.get(2))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            if span.len() >= 3 && !names.contains(&span) {
                names.push(span);
            }
        }
        names
    }
}

// ---------------------------------------------------------------------------
// Regexes
// ---------------------------------------------------------------------------

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#{1,6}\s+(.+?)\s*$").unwrap())
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[-*+]\s+(?:\[[ xX]\]\s+)?(.+?)\s*$").unwrap())
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap())
}

fn date_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap())
}

fn version_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*v?\d+\.\d+(\.\d+)?\b").unwrap())
}

fn capitalized_phrase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z][a-zA-Z]{2,}(?:\s+[A-Z][a-zA-Z]{2,})*\b").unwrap())
}

fn quoted_span_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)"|`([^`]+)`"#).unwrap())
}

// ---------------------------------------------------------------------------
// Claim heuristics
// ---------------------------------------------------------------------------

/// Verbs that mark a line as a capability claim rather than prose.
const FEATURE_VERBS: &[&str] = &[
    "supports",
    "enables",
    "provides",
    "automatically",
    "generates",
    "handles",
    "detects",
    "integrates",
    "allows",
    "includes",
    "performs",
    "built-in",
    "offers",
    "tracks",
];

/// Words with more specific requirement force, used by the spec analyzer.
const REQUIREMENT_VERBS: &[&str] = &["must", "shall", "should", "will", "required"];

const STOPWORDS: &[&str] = &[
    "the", "and", "with", "that", "this", "from", "into", "your", "have", "will", "when", "then",
    "than", "them", "they", "each", "also", "been", "were", "does", "only", "over", "such", "can",
    "all", "any", "for", "are", "not", "you", "its", "via", "supports", "enables", "provides",
    "automatically", "allows", "includes", "using", "used", "uses", "more", "most", "some", "both",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Tunable allow-list heuristic: keep lines with a capability verb, drop
/// changelog dates, version headers, and TODO/NOTE annotations.
pub fn is_feature_claim(text: &str) -> bool {
    let lower = text.to_lowercase();
    let trimmed = lower.trim_start();
    if trimmed.starts_with("todo") || trimmed.starts_with("note") || trimmed.starts_with("fixme") {
        return false;
    }
    if date_line_re().is_match(text) || version_line_re().is_match(text) {
        return false;
    }
    FEATURE_VERBS.iter().any(|v| lower.contains(v))
}

/// Requirement filter for specification files: keeps claim-like lines plus
/// anything carrying explicit requirement language.
pub fn is_requirement(text: &str) -> bool {
    let lower = text.to_lowercase();
    let trimmed = lower.trim_start();
    if trimmed.starts_with("todo") || trimmed.starts_with("note") {
        return false;
    }
    if date_line_re().is_match(text) || version_line_re().is_match(text) {
        return false;
    }
    REQUIREMENT_VERBS
        .iter()
        .any(|v| lower.split_whitespace().any(|w| w == *v))
        || FEATURE_VERBS.iter().any(|v| lower.contains(v))
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Parse one markdown document line-by-line, tracking the current heading as
/// `section`, and collect bullet and bold-text spans that pass `filter`.
pub fn extract_claims(
    content: &str,
    file: &str,
    filter: fn(&str) -> bool,
) -> Vec<DocumentationClaim> {
    let mut claims = Vec::new();
    let mut section = String::new();
    let mut in_code_block = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;

        if raw.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }

        if let Some(cap) = heading_re().captures(raw) {
            section = cap[1].to_string();
            continue;
        }

        if let Some(cap) = bullet_re().captures(raw) {
            let text = strip_markdown(&cap[1]);
            if filter(&text) {
                claims.push(DocumentationClaim {
                    text,
                    file: file.to_string(),
                    line: line_no,
                    section: section.clone(),
                });
                continue;
            }
        }

        for cap in bold_re().captures_iter(raw) {
            let text = cap[1].trim().to_string();
            if filter(&text) {
                claims.push(DocumentationClaim {
                    text,
                    file: file.to_string(),
                    line: line_no,
                    section: section.clone(),
                });
            }
        }
    }

    claims
}

/// Strip inline emphasis and link syntax, keeping the visible text.
fn strip_markdown(text: &str) -> String {
    let no_bold = text.replace("**", "").replace('`', "");
    let link_re = {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap())
    };
    link_re.replace_all(&no_bold, "$1").trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_claim_allow_list() {
        assert!(is_feature_claim("Supports incremental parsing of large files"));
        assert!(is_feature_claim("Automatically generates comprehensive test reports"));
        assert!(!is_feature_claim("TODO: write the parser"));
        assert!(!is_feature_claim("NOTE: see the design doc"));
        assert!(!is_feature_claim("2024-03-01 released v2 with fixes"));
        assert!(!is_feature_claim("1.2.3 supports nothing new"));
        assert!(!is_feature_claim("The weather was nice"));
    }

    #[test]
    fn requirement_filter_accepts_modal_verbs() {
        assert!(is_requirement("The parser must reject oversized inputs"));
        assert!(is_requirement("Output should be deterministic"));
        assert!(!is_requirement("Background reading about parsers"));
    }

    #[test]
    fn extracts_bullets_with_section_tracking() {
        let md = "# Features\n\n- Supports YAML config\n- plain text line\n\n## Internals\n\n- Provides atomic writes\n";
        let claims = extract_claims(md, "README.md", is_feature_claim);
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].section, "Features");
        assert_eq!(claims[0].text, "Supports YAML config");
        assert_eq!(claims[0].line, 3);
        assert_eq!(claims[1].section, "Internals");
    }

    #[test]
    fn extracts_bold_spans() {
        let md = "Some prose with **supports hot reload** inline.\n";
        let claims = extract_claims(md, "README.md", is_feature_claim);
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].text, "supports hot reload");
    }

    #[test]
    fn skips_code_blocks() {
        let md = "```\n- Supports nothing, this is code\n```\n- Supports real things\n";
        let claims = extract_claims(md, "README.md", is_feature_claim);
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].text, "Supports real things");
    }

    #[test]
    fn keywords_longest_first_no_stopwords() {
        let claim = DocumentationClaim {
            text: "Automatically generates comprehensive test reports".to_string(),
            file: "README.md".to_string(),
            line: 1,
            section: String::new(),
        };
        let kw = claim.keywords();
        assert!(kw.contains(&"comprehensive".to_string()));
        assert!(kw.contains(&"reports".to_string()));
        assert!(!kw.contains(&"automatically".to_string()));
        // longest first
        assert!(kw[0].len() >= kw[kw.len() - 1].len());
    }

    #[test]
    fn related_names_capitalized_and_quoted() {
        let claim = DocumentationClaim {
            text: "Integrates with Live Reload via the `watcher` module".to_string(),
            file: "README.md".to_string(),
            line: 1,
            section: String::new(),
        };
        let names = claim.related_names();
        assert!(names.iter().any(|n| n == "Live Reload"));
        assert!(names.iter().any(|n| n == "watcher"));
    }

    #[test]
    fn checkbox_bullets_are_stripped() {
        let md = "- [ ] Supports offline mode\n";
        let claims = extract_claims(md, "ROADMAP.md", is_feature_claim);
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].text, "Supports offline mode");
    }
}
