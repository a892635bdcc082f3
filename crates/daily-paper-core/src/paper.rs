use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An academic paper as produced by the upstream search stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// arXiv identifier, e.g. "2401.01234v1"
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Abstract page URL
    #[serde(alias = "link")]
    pub url: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub published: DateTime<Utc>,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

impl Paper {
    /// Render the text sent to the summarizer when no full-text rendering is available
    pub fn render_text(&self) -> String {
        format!("标题: {}\n摘要: {}", self.title.trim(), self.abstract_text.trim())
    }
}

/// A paper enriched with its generated summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperWithSummary {
    #[serde(flatten)]
    pub paper: Paper,
    pub summary: String,
}

impl PaperWithSummary {
    pub fn new(paper: Paper, summary: impl Into<String>) -> Self {
        Self {
            paper,
            summary: summary.into(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_paper(id: &str) -> Paper {
    use chrono::TimeZone;

    Paper {
        id: id.to_string(),
        title: format!("Paper {}", id),
        abstract_text: format!("Abstract of paper {}", id),
        url: format!("https://arxiv.org/abs/{}", id),
        authors: vec!["Ada Lovelace".to_string()],
        categories: vec!["cs.CL".to_string()],
        published: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        pdf_url: None,
    }
}
