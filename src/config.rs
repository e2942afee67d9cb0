use crate::classes::ClassSettings;
use crate::error::{Result, ScreenError};
use crate::query::{SearchMode, SearchPair, StatusFilter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "X_RAPIDAPI_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pairs: Vec<SearchPair>,
    pub scoring: ScoringSettings,
    pub search: SearchSettings,
    pub pacing: PacingSettings,
    pub output: OutputSettings,
    pub classes: ClassSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// 候補を残す最低類似度（0〜100）
    pub fuzzy_threshold: f64,
    /// 有効な商標がこれ以上なら Blocked
    pub high_risk_cutoff: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub base_url: String,
    pub api_host: String,
    pub mode: SearchMode,
    pub status: StatusFilter,
    /// 1ページの最大件数
    pub page_size: usize,
    pub max_results: usize,
    /// 対象名そのものでも検索する
    pub exact_check: bool,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    /// API呼び出しの間隔
    pub request_delay_ms: u64,
    /// レート制限後、1回だけの再試行までの待ち時間
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub file_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pairs: default_pairs(),
            scoring: ScoringSettings::default(),
            search: SearchSettings::default(),
            pacing: PacingSettings::default(),
            output: OutputSettings::default(),
            classes: ClassSettings::default(),
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 75.0,
            high_risk_cutoff: 90.0,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://uspto-trademark.p.rapidapi.com".into(),
            api_host: "uspto-trademark.p.rapidapi.com".into(),
            mode: SearchMode::default(),
            status: StatusFilter::default(),
            page_size: 100,
            max_results: 250,
            exact_check: true,
            timeout_seconds: 30,
        }
    }
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            request_delay_ms: 2_000,
            retry_delay_ms: 10_000,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            file_prefix: "trademark_fuzzy_matches".into(),
        }
    }
}

impl PacingSettings {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_pairs() -> Vec<SearchPair> {
    [
        ("LEAPWISE", "LEAP"),
        ("LEAPWISE", "WISE"),
        ("LEAPWORKS", "LEAP"),
        ("LEAPWORKS", "WORKS"),
        ("SPRINGIFY", "SPRING"),
        ("SPRYNOVA", "SPRY"),
        ("STRIDEON", "STRIDE"),
        ("MOBILE ERA OF INTENT", "MOBILE"),
        ("MOBILE ERA OF INTENT", "INTENT"),
        ("MOBILE ERA OF INTENT", "ERA"),
        ("EXPERIENCE CONTINUITY", "EXPERIENCE"),
        ("EXPERIENCE CONTINUITY", "CONTINUITY"),
        ("SPRYNETIC", "SPRY"),
    ]
    .into_iter()
    .map(|(target, stem)| SearchPair::new(target, stem))
    .collect()
}

impl Config {
    /// `path` から、`None` なら既定の場所から読み込む
    ///
    /// 既定の場所にファイルが無ければ組み込みの既定値を使う。
    /// 明示したパスが無い場合はエラー。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ScreenError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => {
                let default_path = Self::config_path()?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ScreenError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ScreenError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("tm-screen").join("config.json"))
    }

    /// ペア一覧をJSONファイルの内容で置き換える
    pub fn load_pairs(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let pairs: Vec<SearchPair> = serde_json::from_str(&content)
            .map_err(|e| ScreenError::Config(format!("pairs file {}: {}", path.display(), e)))?;
        self.pairs = pairs;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let scoring = &self.scoring;
        if !(0.0..=100.0).contains(&scoring.fuzzy_threshold) {
            return Err(ScreenError::Config(format!(
                "fuzzy_threshold must be within 0-100, got {}",
                scoring.fuzzy_threshold
            )));
        }
        if !(0.0..=100.0).contains(&scoring.high_risk_cutoff)
            || scoring.high_risk_cutoff < scoring.fuzzy_threshold
        {
            return Err(ScreenError::Config(format!(
                "high_risk_cutoff must be within {}-100, got {}",
                scoring.fuzzy_threshold, scoring.high_risk_cutoff
            )));
        }
        if self.search.page_size == 0 || self.search.max_results == 0 {
            return Err(ScreenError::Config(
                "page_size and max_results must be positive".into(),
            ));
        }
        if self.search.base_url.trim().is_empty() {
            return Err(ScreenError::Config("base_url is empty".into()));
        }
        self.classes.validate()
    }

    /// 重複を除いた対象名（初出順）
    pub fn target_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for pair in &self.pairs {
            if !names.contains(&pair.target_name.as_str()) {
                names.push(&pair.target_name);
            }
        }
        names
    }
}

/// APIキー。表示しない
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// 環境変数から読む（`.env` 読み込み後）
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self(key.trim().to_string())),
            _ => Err(ScreenError::MissingApiKey),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scoring.fuzzy_threshold, 75.0);
        assert_eq!(config.search.max_results, 250);
        assert_eq!(config.pairs.len(), 13);
    }

    #[test]
    fn test_target_names_are_unique() {
        let config = Config::default();
        let names = config.target_names();
        assert_eq!(names[0], "LEAPWISE");
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn test_cutoff_below_threshold_is_rejected() {
        let mut config = Config::default();
        config.scoring.high_risk_cutoff = 60.0;
        assert!(matches!(config.validate(), Err(ScreenError::Config(_))));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "scoring": { "fuzzy_threshold": 80 } }"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.scoring.fuzzy_threshold, 80.0);
        assert_eq!(config.scoring.high_risk_cutoff, 90.0);
        assert_eq!(config.search.page_size, 100);
    }

    #[test]
    fn test_classes_from_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "classes": { "targets": [{ "number": 9, "name": "Apparatus", "keywords": ["app"] }] } }"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.classes.targets.len(), 1);
        assert_eq!(config.classes.targets[0].number, 9);
        assert_eq!(Config::default().classes.targets.len(), 3);
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/tm-screen.json"))).unwrap_err();
        assert!(matches!(err, ScreenError::Config(_)));
    }

    #[test]
    fn test_load_pairs_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("pairs.json");
        std::fs::write(&path, r#"[{ "target_name": "STRIDEON", "stem": "STRIDE" }]"#).unwrap();

        let mut config = Config::default();
        config.load_pairs(&path).unwrap();
        assert_eq!(config.pairs, vec![SearchPair::new("STRIDEON", "STRIDE")]);
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("secret-value");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("secret"));
    }
}
