//! Text extraction over raw curriculum documents.
//!
//! A curriculum document is one flat text blob with positional markers:
//!
//! ```text
//! 3 수학
//! (1) 수와 연산
//! [4수01-01] 10000 이상의 큰 수에 대한 자릿값과 위치적 기수법을 이해하고 수를 읽고 쓸 수 있다.
//! A
//! 큰 수의 자릿값을 설명하고 ...
//! B
//! ...
//! C
//! ...
//! ```
//!
//! These functions slice that blob into subjects, domains and achievement
//! standards. They are run once per document when the curriculum index is
//! built; see [`crate::curriculum`].

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{AchievementStandard, TierDescriptions};

/// Any subject header line: a number, then a one- or two-word subject name.
static SUBJECT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+[ \t]+\w+(?: \w+)?[ \t\r]*$").unwrap());

/// A parenthesized domain marker and its label, e.g. `(2) 변화와 관계`.
static DOMAIN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d+\)\s+([^\n]+)").unwrap());

/// Start of the next domain inside a subject block.
static NEXT_DOMAIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\(\d+\)\s+").unwrap());

/// A line that opens a standard entry.
static STANDARD_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\[").unwrap());

/// One complete standard entry: code line, then A, B and C sections.
static STANDARD_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\A(\[[^\]\n]*\][^\n]+)\n+A[ \t\r]*\n(.*?)\n+B[ \t\r]*\n(.*?)\n+C[ \t\r]*\n(.*)\z",
    )
    .unwrap()
});

static STANDARD_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]\n]*)\]").unwrap());

/// Slice out the text of one subject.
///
/// Finds the header line `N subject` and returns everything after it up to
/// the next subject header or the end of the document. Returns `None` when the
/// subject does not appear in this document.
pub fn subject_block<'a>(content: &'a str, subject: &str) -> Option<&'a str> {
    let header = Regex::new(&format!(
        r"(?m)^\d+[ \t]+{}[ \t\r]*$",
        regex::escape(subject)
    ))
    .ok()?;
    let found = header.find(content)?;

    let mut start = found.end();
    if content[start..].starts_with('\n') {
        start += 1;
    }

    let end = SUBJECT_HEADER
        .find_at(content, start)
        .map(|next| next.start())
        .unwrap_or(content.len());

    Some(&content[start..end])
}

/// Unique domain labels of a subject block, in order of first appearance.
pub fn domains(subject_block: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for caps in DOMAIN_MARKER.captures_iter(subject_block) {
        let label = caps[1].trim();
        if !label.is_empty() && !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    labels
}

/// Standards parsed from one domain, plus the entries that were skipped.
#[derive(Debug, Clone, Default)]
pub struct DomainStandards {
    pub standards: Vec<AchievementStandard>,
    /// First line of every `[...]` entry that was missing a tier section or
    /// had an empty one.
    pub skipped: Vec<String>,
}

/// Parse the achievement standards of one domain.
///
/// The domain's text runs from its `(N) domain` marker to the next domain
/// marker. It is split at every line starting with `[`; each piece must hold
/// the standard line followed by `A`, `B` and `C` sections with non-empty
/// text. Pieces that do not are reported in [`DomainStandards::skipped`] and
/// never produce a partial record.
pub fn parse_standards(subject_block: &str, domain: &str) -> DomainStandards {
    let mut parsed = DomainStandards::default();
    let Some(block) = domain_block(subject_block, domain) else {
        return parsed;
    };

    let starts: Vec<usize> = STANDARD_START.find_iter(block).map(|m| m.start()).collect();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(block.len());
        let segment = block[start..end].trim_end();

        match parse_entry(segment) {
            Some(standard) => parsed.standards.push(standard),
            None => {
                let first_line = segment.lines().next().unwrap_or_default().trim();
                tracing::debug!(domain, entry = first_line, "skipping malformed standard");
                parsed.skipped.push(first_line.to_string());
            }
        }
    }

    parsed
}

/// Well-formed achievement standards of one domain, in document order.
pub fn achievement_standards(subject_block: &str, domain: &str) -> Vec<AchievementStandard> {
    parse_standards(subject_block, domain).standards
}

/// The code inside the first `[...]` of a standard line.
pub fn standard_code(standard_line: &str) -> Option<&str> {
    STANDARD_CODE
        .captures(standard_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|code| !code.is_empty())
}

fn domain_block<'a>(subject_block: &'a str, domain: &str) -> Option<&'a str> {
    let header = Regex::new(&format!(
        r"\(\d+\)\s+{}[ \t\r]*(?:\n|\z)",
        regex::escape(domain)
    ))
    .ok()?;
    let found = header.find(subject_block)?;
    let end = NEXT_DOMAIN
        .find_at(subject_block, found.end())
        .map(|next| next.start())
        .unwrap_or(subject_block.len());
    Some(&subject_block[found.end()..end])
}

fn parse_entry(segment: &str) -> Option<AchievementStandard> {
    let caps = STANDARD_ENTRY.captures(segment)?;
    let standard = caps[1].trim();
    let high = caps[2].trim();
    let mid = caps[3].trim();
    let low = caps[4].trim();

    if [high, mid, low].iter().any(|text| text.is_empty()) {
        return None;
    }

    Some(AchievementStandard {
        standard: standard.to_string(),
        levels: TierDescriptions {
            high: high.to_string(),
            mid: mid.to_string(),
            low: low.to_string(),
        },
    })
}
