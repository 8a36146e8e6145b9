use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::specification::PolicySpecification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyFormat {
    Pdf,
    Json,
    Text,
}

impl PolicyFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("pdf") => Self::Pdf,
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicySourceError {
    #[error("failed to read policy document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open policy PDF {path}: {source}")]
    Pdf {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
}

/// Extracted policy text plus whatever structure could be recognised.
#[derive(Debug, Clone)]
pub struct PolicyDocument {
    pub format: PolicyFormat,
    pub page_count: usize,
    pub text: String,
    pub specification: Option<PolicySpecification>,
}

impl PolicyDocument {
    /// Loads the policy at `path`. PDF pages are joined with newlines in
    /// document order; a page without extractable text contributes an empty
    /// string instead of failing the load.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PolicySourceError> {
        let path = path.as_ref();
        match PolicyFormat::from_path(path) {
            PolicyFormat::Pdf => Self::load_pdf(path),
            PolicyFormat::Json => Self::load_json(path),
            PolicyFormat::Text => {
                let text = read_to_string(path)?;
                Ok(Self {
                    format: PolicyFormat::Text,
                    page_count: 1,
                    text,
                    specification: None,
                })
            }
        }
    }

    fn load_pdf(path: &Path) -> Result<Self, PolicySourceError> {
        let document = lopdf::Document::load(path).map_err(|source| PolicySourceError::Pdf {
            path: path.to_path_buf(),
            source,
        })?;

        let (page_count, text) = join_pages(
            document
                .get_pages()
                .into_keys()
                .map(|page_number| (page_number, document.extract_text(&[page_number]))),
        );

        Ok(Self {
            format: PolicyFormat::Pdf,
            page_count,
            text,
            specification: None,
        })
    }

    fn load_json(path: &Path) -> Result<Self, PolicySourceError> {
        let text = read_to_string(path)?;
        let specification = match PolicySpecification::from_json(&text) {
            Ok(specification) => {
                for issue in specification.validate() {
                    warn!(%issue, "policy specification issue");
                }
                Some(specification)
            }
            Err(error) => {
                warn!(%error, "policy JSON does not match the policy specification model, sending it as text");
                None
            }
        };

        Ok(Self {
            format: PolicyFormat::Json,
            page_count: 1,
            text,
            specification,
        })
    }
}

fn read_to_string(path: &Path) -> Result<String, PolicySourceError> {
    std::fs::read_to_string(path).map_err(|source| PolicySourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Joins per-page text with newlines. A page whose extraction failed
/// contributes an empty string so later pages keep their position.
fn join_pages<E: std::fmt::Display>(
    pages: impl IntoIterator<Item = (u32, Result<String, E>)>,
) -> (usize, String) {
    let pages: Vec<String> = pages
        .into_iter()
        .map(|(page_number, extracted)| match extracted {
            Ok(text) => text,
            Err(error) => {
                debug!(page_number, %error, "page has no extractable text");
                String::new()
            }
        })
        .collect();

    (pages.len(), pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents).expect("write temp file");
        file
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(PolicyFormat::from_path(Path::new("policy.PDF")), PolicyFormat::Pdf);
        assert_eq!(PolicyFormat::from_path(Path::new("policy.json")), PolicyFormat::Json);
        assert_eq!(PolicyFormat::from_path(Path::new("policy.txt")), PolicyFormat::Text);
        assert_eq!(PolicyFormat::from_path(Path::new("policy")), PolicyFormat::Text);
    }

    #[test]
    fn text_policy_is_returned_verbatim() {
        let file = write_temp(".txt", b"Tier A: 720+ max DTI 43%\nTier B: 650-719 max DTI 36%\n");
        let document = PolicyDocument::load(file.path()).expect("loads");
        assert_eq!(document.format, PolicyFormat::Text);
        assert_eq!(
            document.text,
            "Tier A: 720+ max DTI 43%\nTier B: 650-719 max DTI 36%\n"
        );
        assert!(document.specification.is_none());
    }

    #[test]
    fn json_policy_is_parsed_and_kept_as_text() {
        let raw = br#"{"credit_tiers":[{"min":650,"risk":"medium","max_dti":0.36}],"income_min_annual":40000,"employment_min_months":24,"employment_min_months_self_employed":36,"first_time_buyer_dti_add":0.02}"#;
        let file = write_temp(".json", raw);
        let document = PolicyDocument::load(file.path()).expect("loads");
        assert_eq!(document.text.as_bytes(), raw);
        let specification = document.specification.expect("specification parsed");
        assert_eq!(specification.credit_tiers.len(), 1);
    }

    #[test]
    fn unrecognised_json_policy_still_loads() {
        let file = write_temp(".json", br#"{"tiers": "see attached"}"#);
        let document = PolicyDocument::load(file.path()).expect("loads");
        assert!(document.specification.is_none());
        assert_eq!(document.text, r#"{"tiers": "see attached"}"#);
    }

    #[test]
    fn failed_page_contributes_an_empty_string() {
        let pages: Vec<(u32, Result<String, String>)> = vec![
            (1, Ok("Tier A".to_string())),
            (2, Err("unsupported font encoding".to_string())),
            (3, Ok("Tier B".to_string())),
        ];
        assert_eq!(join_pages(pages), (3, "Tier A\n\nTier B".to_string()));

        let only_failures: Vec<(u32, Result<String, String>)> =
            vec![(1, Err("scan".to_string())), (2, Err("scan".to_string()))];
        assert_eq!(join_pages(only_failures), (2, "\n".to_string()));
    }

    #[test]
    fn corrupt_pdf_fails_the_load() {
        let file = write_temp(".pdf", b"this is not a pdf");
        let error = PolicyDocument::load(file.path()).expect_err("corrupt pdf");
        assert!(matches!(error, PolicySourceError::Pdf { .. }));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let error = PolicyDocument::load("./does-not-exist.txt").expect_err("missing file");
        match error {
            PolicySourceError::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("./does-not-exist.txt"))
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
