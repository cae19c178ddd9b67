//! Curriculum document loading and the pre-parsed curriculum index.
//!
//! Each grade band document is parsed once, at load time, into a nested
//! subject → domain → standard mapping. Interaction code only queries the
//! index and never rescans raw text.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::DocumentError;
use crate::extract;
use crate::model::{AchievementStandard, CurriculumDocument, GradeBand, Guidelines};

/// File name of the remark-writing guidelines document.
pub const GUIDELINES_FILE: &str = "교과평어_기재요령_정리본.json";

/// One domain of a subject with its parsed standards.
#[derive(Debug, Clone)]
pub struct DomainEntry {
    pub name: String,
    pub standards: Vec<AchievementStandard>,
    /// First lines of entries that could not be parsed.
    pub skipped: Vec<String>,
}

/// One subject of a grade band.
#[derive(Debug, Clone)]
pub struct SubjectEntry {
    pub name: String,
    pub domains: Vec<DomainEntry>,
}

/// A grade band document parsed into subjects, domains and standards.
#[derive(Debug, Clone)]
pub struct CurriculumIndex {
    band: GradeBand,
    subjects: Vec<SubjectEntry>,
    missing_subjects: Vec<String>,
}

impl CurriculumIndex {
    /// Parse every subject of `band` out of its document.
    pub fn build(band: GradeBand, document: &CurriculumDocument) -> Self {
        let mut subjects = Vec::new();
        let mut missing_subjects = Vec::new();

        for &name in band.subjects() {
            let Some(block) = extract::subject_block(&document.content, name) else {
                tracing::warn!(%band, subject = name, "subject not found in document");
                missing_subjects.push(name.to_string());
                continue;
            };

            let domains = extract::domains(block)
                .into_iter()
                .map(|domain| {
                    let parsed = extract::parse_standards(block, &domain);
                    DomainEntry {
                        name: domain,
                        standards: parsed.standards,
                        skipped: parsed.skipped,
                    }
                })
                .collect();

            subjects.push(SubjectEntry {
                name: name.to_string(),
                domains,
            });
        }

        tracing::debug!(
            %band,
            subjects = subjects.len(),
            missing = missing_subjects.len(),
            "built curriculum index"
        );

        Self {
            band,
            subjects,
            missing_subjects,
        }
    }

    pub fn band(&self) -> GradeBand {
        self.band
    }

    /// Subjects found in the document, in the band's subject order.
    pub fn subjects(&self) -> &[SubjectEntry] {
        &self.subjects
    }

    /// Subjects of the band that the document does not contain.
    pub fn missing_subjects(&self) -> &[String] {
        &self.missing_subjects
    }

    pub fn subject(&self, name: &str) -> Option<&SubjectEntry> {
        self.subjects.iter().find(|s| s.name == name)
    }

    /// Domain labels of a subject; empty if the subject is absent.
    pub fn domains(&self, subject: &str) -> Vec<&str> {
        self.subject(subject)
            .map(|s| s.domains.iter().map(|d| d.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Standards of one domain; empty if the subject or domain is absent.
    pub fn standards(&self, subject: &str, domain: &str) -> &[AchievementStandard] {
        self.subject(subject)
            .and_then(|s| s.domains.iter().find(|d| d.name == domain))
            .map(|d| d.standards.as_slice())
            .unwrap_or_default()
    }

    /// Find a standard of a subject by its bracketed code, returning its domain too.
    pub fn find_standard(&self, subject: &str, code: &str) -> Option<(&str, &AchievementStandard)> {
        let code = code.trim().trim_start_matches('[').trim_end_matches(']');
        self.subject(subject)?.domains.iter().find_map(|d| {
            d.standards
                .iter()
                .find(|s| s.code() == code)
                .map(|s| (d.name.as_str(), s))
        })
    }
}

/// All curriculum documents and the guidelines, loaded once per process.
///
/// A document that fails to load does not prevent the others from being
/// used; asking for it returns [`DocumentError::Unavailable`].
#[derive(Debug)]
pub struct CurriculumLibrary {
    bands: BTreeMap<GradeBand, Result<CurriculumIndex, DocumentError>>,
    guidelines: Result<Guidelines, DocumentError>,
}

impl CurriculumLibrary {
    /// Load the three grade band documents and the guidelines from `data_dir`.
    pub fn load(data_dir: &Path) -> Self {
        let bands = GradeBand::ALL
            .into_iter()
            .map(|band| {
                let path = data_dir.join(band.document_file());
                let index = load_json::<CurriculumDocument>(&path)
                    .map(|doc| CurriculumIndex::build(band, &doc));
                if let Err(e) = &index {
                    tracing::error!(%band, "failed to load curriculum document: {e}");
                }
                (band, index)
            })
            .collect();

        let guidelines = load_json::<Guidelines>(&data_dir.join(GUIDELINES_FILE));
        if let Err(e) = &guidelines {
            tracing::error!("failed to load guidelines: {e}");
        }

        Self { bands, guidelines }
    }

    /// Build a library from documents already in memory.
    pub fn from_documents(
        documents: impl IntoIterator<Item = (GradeBand, CurriculumDocument)>,
        guidelines: Guidelines,
    ) -> Self {
        let mut bands: BTreeMap<GradeBand, Result<CurriculumIndex, DocumentError>> = documents
            .into_iter()
            .map(|(band, doc)| (band, Ok(CurriculumIndex::build(band, &doc))))
            .collect();
        for band in GradeBand::ALL {
            bands.entry(band).or_insert_with(|| {
                Err(DocumentError::Unavailable {
                    name: band.document_file().to_string(),
                    reason: "not provided".into(),
                })
            });
        }

        Self {
            bands,
            guidelines: Ok(guidelines),
        }
    }

    /// The parsed index for a grade band.
    pub fn band(&self, band: GradeBand) -> Result<&CurriculumIndex, DocumentError> {
        match self.bands.get(&band) {
            Some(Ok(index)) => Ok(index),
            Some(Err(e)) => Err(unavailable(band.document_file(), e)),
            None => Err(DocumentError::Unavailable {
                name: band.document_file().to_string(),
                reason: "not loaded".into(),
            }),
        }
    }

    pub fn guidelines(&self) -> Result<&Guidelines, DocumentError> {
        self.guidelines
            .as_ref()
            .map_err(|e| unavailable(GUIDELINES_FILE, e))
    }

    /// Every document that failed to load.
    pub fn load_errors(&self) -> Vec<&DocumentError> {
        self.bands
            .values()
            .filter_map(|r| r.as_ref().err())
            .chain(self.guidelines.as_ref().err())
            .collect()
    }

    /// Check the loaded documents for content problems.
    pub fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for index in self.bands.values().filter_map(|r| r.as_ref().ok()) {
            let band = index.band();

            for subject in index.missing_subjects() {
                warnings.push(ValidationWarning {
                    band,
                    subject: Some(subject.clone()),
                    message: "subject not found in document".into(),
                });
            }

            for subject in index.subjects() {
                if subject.domains.is_empty() {
                    warnings.push(ValidationWarning {
                        band,
                        subject: Some(subject.name.clone()),
                        message: "no domains found".into(),
                    });
                }

                for domain in &subject.domains {
                    if domain.standards.is_empty() {
                        warnings.push(ValidationWarning {
                            band,
                            subject: Some(subject.name.clone()),
                            message: format!("domain '{}' has no standards", domain.name),
                        });
                    }
                    for entry in &domain.skipped {
                        warnings.push(ValidationWarning {
                            band,
                            subject: Some(subject.name.clone()),
                            message: format!(
                                "domain '{}': skipped malformed entry {entry}",
                                domain.name
                            ),
                        });
                    }
                }
            }
        }

        warnings
    }
}

/// A content problem found while validating the curriculum.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub band: GradeBand,
    /// The subject (if applicable).
    pub subject: Option<String>,
    pub message: String,
}

/// Read and deserialize one JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
    if !path.exists() {
        return Err(DocumentError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DocumentError::Malformed {
        path: PathBuf::from(path),
        source,
    })
}

fn unavailable(name: &str, cause: &DocumentError) -> DocumentError {
    DocumentError::Unavailable {
        name: name.to_string(),
        reason: cause.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIDDLE_DOC: &str = "\
1 국어
(1) 듣기·말하기
[4국01-01] 대화를 나눈다.
A
적극적으로 대화를 나눈다.
B
대화를 나눈다.
C
도움을 받아 대화를 나눈다.
4 수학
(1) 수와 연산
[4수01-01] 큰 수를 안다.
A
상
B
중
C
하
[4수01-02] 잘못된 항목
A
상
(2) 도형과 측정
5 과학
";

    fn middle_index() -> CurriculumIndex {
        CurriculumIndex::build(
            GradeBand::Middle,
            &CurriculumDocument {
                content: MIDDLE_DOC.into(),
            },
        )
    }

    #[test]
    fn index_queries() {
        let index = middle_index();
        let names: Vec<&str> = index.subjects().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["국어", "수학", "과학"]);
        assert_eq!(index.domains("수학"), vec!["수와 연산", "도형과 측정"]);
        assert_eq!(index.standards("수학", "수와 연산").len(), 1);
        assert!(index.standards("수학", "없는 영역").is_empty());
        assert!(index.domains("영어").is_empty());
        assert!(index.missing_subjects().contains(&"영어".to_string()));
    }

    #[test]
    fn find_standard_by_code() {
        let index = middle_index();
        let (domain, standard) = index.find_standard("수학", "4수01-01").unwrap();
        assert_eq!(domain, "수와 연산");
        assert_eq!(standard.levels.mid, "중");
        assert!(index.find_standard("수학", "[4수01-01]").is_some());
        assert!(index.find_standard("국어", "4수01-01").is_none());
    }

    #[test]
    fn validation_reports_problems() {
        let library = CurriculumLibrary::from_documents(
            [(
                GradeBand::Middle,
                CurriculumDocument {
                    content: MIDDLE_DOC.into(),
                },
            )],
            Guidelines::default(),
        );
        let warnings = library.validate();
        assert!(warnings
            .iter()
            .any(|w| w.subject.as_deref() == Some("과학") && w.message.contains("no domains")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("'도형과 측정' has no standards")));
        assert!(warnings.iter().any(|w| w.message.contains("[4수01-02]")));
        assert!(warnings
            .iter()
            .any(|w| w.subject.as_deref() == Some("도덕") && w.message.contains("not found")));
    }

    #[test]
    fn missing_band_is_unavailable() {
        let library = CurriculumLibrary::from_documents([], Guidelines::default());
        let err = library.band(GradeBand::Upper).unwrap_err();
        assert!(err.to_string().contains("5-6학년군_성취수준.json"));
        assert!(library.guidelines().is_ok());
    }

    #[test]
    fn load_reports_each_failure_separately() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(GradeBand::Middle.document_file()),
            serde_json::json!({ "content": MIDDLE_DOC }).to_string(),
        )
        .unwrap();
        std::fs::write(dir.path().join(GradeBand::Upper.document_file()), "{ not json").unwrap();
        std::fs::write(
            dir.path().join(GUIDELINES_FILE),
            r#"{"3. 작성 예시": {"수학": "예시"}, "5. 정리": "관찰 기반 기록"}"#,
        )
        .unwrap();

        let library = CurriculumLibrary::load(dir.path());
        assert!(library.band(GradeBand::Middle).is_ok());
        assert!(matches!(
            library.band(GradeBand::Lower),
            Err(DocumentError::Unavailable { .. })
        ));
        let upper = library.band(GradeBand::Upper).unwrap_err().to_string();
        assert!(upper.contains("malformed"), "got: {upper}");
        assert_eq!(
            library.guidelines().unwrap().summary.as_deref(),
            Some("관찰 기반 기록")
        );
        assert_eq!(library.load_errors().len(), 2);
    }

    #[test]
    fn load_json_not_found() {
        let err = load_json::<CurriculumDocument>(Path::new("/no/such/file.json")).unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { .. }));
    }
}
