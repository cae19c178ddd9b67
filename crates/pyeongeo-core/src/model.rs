//! Core data model types for pyeongeo.
//!
//! These are the types shared by the extractor, the cache, the generation
//! pipeline and the CLI: grades and grade bands, achievement standards,
//! guideline documents, requested counts, and generated sentence sets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CountOutOfRange;
use crate::extract::standard_code;

/// Code used for a standard whose line carries no bracketed code.
pub const FALLBACK_STANDARD_CODE: &str = "selected_std";

/// Smallest number of sentences that may be requested per tier.
pub const MIN_SENTENCES_PER_TIER: u32 = 1;

/// Largest number of sentences that may be requested per tier.
pub const MAX_SENTENCES_PER_TIER: u32 = 25;

/// A raw curriculum document for one grade band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumDocument {
    /// Every subject, domain and standard of the band as one text blob.
    pub content: String,
}

/// An elementary school grade, 1학년 through 6학년.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Grade(u8);

impl Grade {
    /// All six grades in order.
    pub const ALL: [Grade; 6] = [Grade(1), Grade(2), Grade(3), Grade(4), Grade(5), Grade(6)];

    /// Create a grade from its number, if it is between 1 and 6.
    pub fn new(number: u8) -> Option<Self> {
        (1..=6).contains(&number).then_some(Grade(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// The grade band whose document covers this grade.
    pub fn band(self) -> GradeBand {
        match self.0 {
            1 | 2 => GradeBand::Lower,
            3 | 4 => GradeBand::Middle,
            _ => GradeBand::Upper,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}학년", self.0)
    }
}

impl FromStr for Grade {
    type Err = String;

    /// Accepts `"3"` as well as `"3학년"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix("학년").unwrap_or(trimmed).trim();
        digits
            .parse::<u8>()
            .ok()
            .and_then(Grade::new)
            .ok_or_else(|| format!("unknown grade: {s} (expected 1-6)"))
    }
}

/// One of the three curriculum groupings, each with its own document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GradeBand {
    /// Grades 1-2.
    Lower,
    /// Grades 3-4.
    Middle,
    /// Grades 5-6.
    Upper,
}

impl GradeBand {
    pub const ALL: [GradeBand; 3] = [GradeBand::Lower, GradeBand::Middle, GradeBand::Upper];

    /// Subjects taught in this band, in the order they are offered for selection.
    pub fn subjects(self) -> &'static [&'static str] {
        match self {
            GradeBand::Lower => &["국어", "수학", "바른 생활", "슬기로운 생활", "즐거운 생활"],
            GradeBand::Middle => &[
                "국어", "사회", "도덕", "수학", "과학", "체육", "음악", "미술", "영어",
            ],
            GradeBand::Upper => &[
                "국어", "사회", "도덕", "수학", "과학", "실과", "체육", "음악", "미술", "영어",
            ],
        }
    }

    /// File name of the achievement-level document for this band.
    pub fn document_file(self) -> &'static str {
        match self {
            GradeBand::Lower => "1-2학년군_성취수준.json",
            GradeBand::Middle => "3-4학년군_성취수준.json",
            GradeBand::Upper => "5-6학년군_성취수준.json",
        }
    }
}

impl fmt::Display for GradeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeBand::Lower => write!(f, "1-2학년군"),
            GradeBand::Middle => write!(f, "3-4학년군"),
            GradeBand::Upper => write!(f, "5-6학년군"),
        }
    }
}

/// A proficiency tier for which sentences are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// 상, achievement level A.
    High,
    /// 중, achievement level B.
    Mid,
    /// 하, achievement level C.
    Low,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::High, Tier::Mid, Tier::Low];

    /// Korean label used as the key in generated sentence sets.
    pub fn label(self) -> &'static str {
        match self {
            Tier::High => "상",
            Tier::Mid => "중",
            Tier::Low => "하",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptions of what students at each achievement level can do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDescriptions {
    #[serde(rename = "A")]
    pub high: String,
    #[serde(rename = "B")]
    pub mid: String,
    #[serde(rename = "C")]
    pub low: String,
}

impl TierDescriptions {
    pub fn get(&self, tier: Tier) -> &str {
        match tier {
            Tier::High => &self.high,
            Tier::Mid => &self.mid,
            Tier::Low => &self.low,
        }
    }
}

/// A curriculum learning objective with its three tier descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStandard {
    /// The full standard line, e.g. `"[4수01-01] 다섯 자리 이상의 수를 이해한다."`.
    #[serde(rename = "성취기준")]
    pub standard: String,
    #[serde(rename = "성취기준별 성취수준")]
    pub levels: TierDescriptions,
}

impl AchievementStandard {
    /// The bracketed code of this standard, or [`FALLBACK_STANDARD_CODE`].
    pub fn code(&self) -> &str {
        standard_code(&self.standard).unwrap_or(FALLBACK_STANDARD_CODE)
    }
}

/// The sentence-writing guidelines document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Guidelines {
    /// Example remarks keyed by subject.
    #[serde(rename = "3. 작성 예시", default)]
    pub examples: BTreeMap<String, serde_json::Value>,
    /// One-line statement of what a remark should be.
    #[serde(rename = "5. 정리", default)]
    pub summary: Option<String>,
}

/// Number of sentences requested for each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentenceCounts {
    pub high: u32,
    pub mid: u32,
    pub low: u32,
}

impl SentenceCounts {
    /// Create counts, rejecting any tier outside 1..=25.
    pub fn new(high: u32, mid: u32, low: u32) -> Result<Self, CountOutOfRange> {
        let counts = Self { high, mid, low };
        for tier in Tier::ALL {
            let value = counts.get(tier);
            if !(MIN_SENTENCES_PER_TIER..=MAX_SENTENCES_PER_TIER).contains(&value) {
                return Err(CountOutOfRange { tier, value });
            }
        }
        Ok(counts)
    }

    pub fn get(&self, tier: Tier) -> u32 {
        match tier {
            Tier::High => self.high,
            Tier::Mid => self.mid,
            Tier::Low => self.low,
        }
    }
}

impl Default for SentenceCounts {
    fn default() -> Self {
        Self {
            high: 2,
            mid: 2,
            low: 2,
        }
    }
}

/// Generated sentences grouped by tier, as stored in the cache file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSet {
    #[serde(rename = "상", default)]
    pub high: Vec<String>,
    #[serde(rename = "중", default)]
    pub mid: Vec<String>,
    #[serde(rename = "하", default)]
    pub low: Vec<String>,
}

impl SentenceSet {
    pub fn get(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::High => &self.high,
            Tier::Mid => &self.mid,
            Tier::Low => &self.low,
        }
    }

    /// Total number of sentences across all tiers.
    pub fn len(&self) -> usize {
        self.high.len() + self.mid.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Identifies one standard of one subject in one grade.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StandardKey {
    pub grade: Grade,
    pub subject: String,
    pub code: String,
}

impl StandardKey {
    pub fn new(grade: Grade, subject: impl Into<String>, standard: &AchievementStandard) -> Self {
        Self {
            grade,
            subject: subject.into(),
            code: standard.code().to_string(),
        }
    }
}

impl fmt::Display for StandardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.grade, self.subject, self.code)
    }
}

/// Cache key for one generation request: the standard plus the requested counts.
///
/// Renders as `3학년_수학_4수01-01_2_2_2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub standard: StandardKey,
    pub counts: SentenceCounts,
}

impl CacheKey {
    pub fn new(standard: StandardKey, counts: SentenceCounts) -> Self {
        Self { standard, counts }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.standard, self.counts.high, self.counts.mid, self.counts.low
        )
    }
}
