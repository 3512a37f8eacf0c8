use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api_keys: Option<ApiKeysConfig>,
    pub models: Option<ModelsConfig>,
    pub extraction: Option<ExtractionFileConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeysConfig {
    pub openai_key: Option<String>,
    pub perplexity_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Model used for summarizing and drafting.
    pub drafting_model: Option<String>,
    /// Model used for legal research.
    pub research_model: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionFileConfig {
    pub min_text_length: Option<usize>,
    pub ocr_scale: Option<f32>,
    pub ocr_language: Option<String>,
    pub tessdata_path: Option<String>,
    pub auto_escalate: Option<bool>,
}

/// Platform config directory path: `<config_dir>/taxdraft/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("taxdraft").join("config.toml"))
}

/// Load config by cascading CWD `.taxdraft.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".taxdraft.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_keys = base.api_keys.unwrap_or_default();
    let base_models = base.models.unwrap_or_default();
    let base_extraction = base.extraction.unwrap_or_default();
    let keys = overlay.api_keys.unwrap_or_default();
    let models = overlay.models.unwrap_or_default();
    let extraction = overlay.extraction.unwrap_or_default();

    ConfigFile {
        api_keys: Some(ApiKeysConfig {
            openai_key: keys.openai_key.or(base_keys.openai_key),
            perplexity_key: keys.perplexity_key.or(base_keys.perplexity_key),
        }),
        models: Some(ModelsConfig {
            drafting_model: models.drafting_model.or(base_models.drafting_model),
            research_model: models.research_model.or(base_models.research_model),
            request_timeout_secs: models
                .request_timeout_secs
                .or(base_models.request_timeout_secs),
        }),
        extraction: Some(ExtractionFileConfig {
            min_text_length: extraction
                .min_text_length
                .or(base_extraction.min_text_length),
            ocr_scale: extraction.ocr_scale.or(base_extraction.ocr_scale),
            ocr_language: extraction.ocr_language.or(base_extraction.ocr_language),
            tessdata_path: extraction.tessdata_path.or(base_extraction.tessdata_path),
            auto_escalate: extraction.auto_escalate.or(base_extraction.auto_escalate),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_parses() {
        let toml_str = "[extraction]\nmin_text_length = 80\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let extraction = parsed.extraction.unwrap();
        assert_eq!(extraction.min_text_length, Some(80));
        assert!(extraction.ocr_scale.is_none());
        assert!(parsed.api_keys.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            extraction: Some(ExtractionFileConfig {
                ocr_scale: Some(1.3),
                ocr_language: Some("eng".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            extraction: Some(ExtractionFileConfig {
                ocr_scale: Some(2.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).extraction.unwrap();
        assert_eq!(merged.ocr_scale, Some(2.0));
        assert_eq!(merged.ocr_language.as_deref(), Some("eng"));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            api_keys: Some(ApiKeysConfig {
                openai_key: Some("sk-base".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(
            merged.api_keys.unwrap().openai_key.as_deref(),
            Some("sk-base")
        );
    }

    #[test]
    fn load_from_path_reads_and_rejects() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[models]\nresearch_model = \"sonar\"\n").unwrap();
        let loaded = load_from_path(&good).unwrap();
        assert_eq!(
            loaded.models.unwrap().research_model.as_deref(),
            Some("sonar")
        );

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[models\n").unwrap();
        assert!(load_from_path(&bad).is_none());
        assert!(load_from_path(&dir.path().join("missing.toml")).is_none());
    }
}
