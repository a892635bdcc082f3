use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Feishu bot webhook used by the delivery stage
    #[serde(default)]
    pub feishu_webhook_url: String,
    /// arXiv categories or keywords to search, e.g. "cs.CL"
    #[serde(default)]
    pub arxiv_topic_list: Vec<String>,
    #[serde(default)]
    pub arxiv_search_offset: u32,
    #[serde(default = "default_arxiv_search_limit")]
    pub arxiv_search_limit: u32,
    /// Run the LLM relevance filter before summarizing
    #[serde(default)]
    pub enable_llm_filter: bool,
    #[serde(default)]
    pub llm_filter_topic: String,
    /// Number of papers handed to the summarizer per batch
    #[serde(default = "default_process_batch_size")]
    pub process_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            storage: StorageConfig::default(),
            feishu_webhook_url: String::new(),
            arxiv_topic_list: Vec::new(),
            arxiv_search_offset: 0,
            arxiv_search_limit: default_arxiv_search_limit(),
            enable_llm_filter: false,
            llm_filter_topic: String::new(),
            process_batch_size: default_process_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API, including the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Upper bound on simultaneous completion requests
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model_name: default_model_name(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding pipeline output (supports ~ expansion)
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_concurrent_requests() -> usize {
    5
}

fn default_base_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_arxiv_search_limit() -> u32 {
    100
}

fn default_process_batch_size() -> usize {
    10
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// Missing files are reported as [`Error::ConfigNotFound`]; malformed YAML,
    /// type mismatches and out-of-range values as [`Error::ConfigParse`].
    pub fn parse(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: format!("failed to read file: {}", e),
        })?;
        let config = Self::from_yaml_str(&content).map_err(|message| Error::ConfigParse {
            path: path.to_path_buf(),
            message,
        })?;

        tracing::debug!(
            path = %path.display(),
            model = %config.llm.model_name,
            max_concurrent_requests = config.llm.max_concurrent_requests,
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Alias for [`Config::parse`]
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(path)
    }

    fn from_yaml_str(content: &str) -> std::result::Result<Self, String> {
        // serde_yaml rejects an empty document, but an empty file means "all defaults"
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| e.to_string())?
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.llm.max_concurrent_requests == 0 {
            return Err("llm.max_concurrent_requests must be at least 1".to_string());
        }
        if self.process_batch_size == 0 {
            return Err("process_batch_size must be at least 1".to_string());
        }
        url::Url::parse(&self.llm.base_url)
            .map_err(|e| format!("llm.base_url '{}' is not a valid URL: {}", self.llm.base_url, e))?;
        Ok(())
    }

    /// Get the default configuration file path
    /// Always uses ~/.config/daily-paper/config.yaml on all platforms
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("daily-paper")
            .join("config.yaml")
    }

    /// Get the storage directory (with tilde expansion)
    pub fn storage_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.base_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        match Config::parse(&path) {
            Err(Error::ConfigNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_applied_for_omitted_fields() {
        let file = write_config(
            "llm:\n  api_key: sk-test\n  model_name: qwen-plus\narxiv_topic_list:\n  - cs.CL\n  - cs.AI\n",
        );

        let config = Config::parse(file.path()).unwrap();

        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.model_name, "qwen-plus");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.max_concurrent_requests, 5);
        assert_eq!(config.arxiv_topic_list, vec!["cs.CL", "cs.AI"]);
        assert_eq!(config.arxiv_search_offset, 0);
        assert_eq!(config.arxiv_search_limit, 100);
        assert!(!config.enable_llm_filter);
        assert_eq!(config.llm_filter_topic, "");
        assert_eq!(config.feishu_webhook_url, "");
        assert_eq!(config.process_batch_size, 10);
        assert_eq!(config.storage.base_path, PathBuf::from("data"));
    }

    #[test]
    fn test_full_document() {
        let file = write_config(
            r#"
llm:
  api_key: sk-abc
  base_url: https://dashscope.aliyuncs.com/compatible-mode/v1
  model_name: qwen-max
  max_concurrent_requests: 3
storage:
  base_path: /var/lib/daily-paper
feishu_webhook_url: https://open.feishu.cn/open-apis/bot/v2/hook/xyz
arxiv_topic_list: [cs.LG]
arxiv_search_offset: 20
arxiv_search_limit: 50
enable_llm_filter: true
llm_filter_topic: large language models
process_batch_size: 4
"#,
        );

        let config = Config::from_yaml(file.path()).unwrap();

        assert_eq!(
            config.llm.base_url,
            "https://dashscope.aliyuncs.com/compatible-mode/v1"
        );
        assert_eq!(config.llm.max_concurrent_requests, 3);
        assert_eq!(config.storage_dir(), PathBuf::from("/var/lib/daily-paper"));
        assert_eq!(config.arxiv_search_offset, 20);
        assert_eq!(config.arxiv_search_limit, 50);
        assert!(config.enable_llm_filter);
        assert_eq!(config.llm_filter_topic, "large language models");
        assert_eq!(config.process_batch_size, 4);
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let file = write_config("");
        let config = Config::parse(file.path()).unwrap();
        assert_eq!(config.process_batch_size, 10);
        assert_eq!(config.llm.max_concurrent_requests, 5);
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let file = write_config("llm: [unterminated\n");
        assert!(matches!(
            Config::parse(file.path()),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let file = write_config("process_batch_size: lots\n");
        assert!(matches!(
            Config::parse(file.path()),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let file = write_config("llm:\n  max_concurrent_requests: 0\n");
        match Config::parse(file.path()) {
            Err(Error::ConfigParse { message, .. }) => {
                assert!(message.contains("max_concurrent_requests"));
            }
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let file = write_config("llm:\n  base_url: not a url\n");
        assert!(matches!(
            Config::parse(file.path()),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_directory_path_is_parse_error_with_path() {
        let dir = tempfile::tempdir().unwrap();

        match Config::parse(dir.path()) {
            Err(Error::ConfigParse { path, message }) => {
                assert_eq!(path, dir.path());
                assert!(message.contains("failed to read file"));
            }
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let file = write_config("process_batch_size: 2\nlegacy_option: true\n");
        let config = Config::parse(file.path()).unwrap();
        assert_eq!(config.process_batch_size, 2);
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~/papers")), home.join("papers"));
            assert_eq!(expand_tilde(Path::new("~")), home);
        }
        assert_eq!(expand_tilde(Path::new("/tmp/papers")), PathBuf::from("/tmp/papers"));
    }
}
