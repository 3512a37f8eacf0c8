//! Settings resolution: CLI flag > environment variable > config file > default.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use taxdraft_assist::{ChatCompletions, DEFAULT_REQUEST_TIMEOUT};
use taxdraft_core::config_file::ConfigFile;
use taxdraft_extract::{EscalationPolicy, ExtractionConfig, ExtractionConfigBuilder, OcrSettings};

/// Environment lookup, injectable for tests.
pub type Env<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(env: Env<'_>, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .with_context(|| format!("invalid value for {name}: {raw:?}"))
        })
        .transpose()
}

/// Extraction-related flags.
#[derive(Debug, Clone, Default)]
pub struct ExtractFlags {
    pub auto_ocr: bool,
    pub min_chars: Option<usize>,
    pub ocr_scale: Option<f32>,
    pub ocr_lang: Option<String>,
}

pub fn resolve_extraction(
    flags: &ExtractFlags,
    file: &ConfigFile,
    env: Env<'_>,
) -> anyhow::Result<(ExtractionConfig, OcrSettings)> {
    let file = file.extraction.clone().unwrap_or_default();
    let mut builder = ExtractionConfigBuilder::from_file(&file);

    let min_chars = match flags.min_chars {
        Some(n) => Some(n),
        None => env_parse(env, "TAXDRAFT_MIN_TEXT_LENGTH")?,
    };
    if let Some(n) = min_chars {
        builder = builder.min_text_length(n);
    }

    let scale = match flags.ocr_scale {
        Some(s) => Some(s),
        None => env_parse(env, "TAXDRAFT_OCR_SCALE")?,
    };
    if let Some(s) = scale {
        builder = builder.ocr_scale(s);
    }

    if flags.auto_ocr {
        builder = builder.escalation(EscalationPolicy::Automatic);
    }

    let config = builder.build().context("invalid extraction settings")?;

    let defaults = OcrSettings::default();
    let ocr = OcrSettings {
        language: flags
            .ocr_lang
            .clone()
            .or(file.ocr_language)
            .unwrap_or(defaults.language),
        tessdata_path: env("TESSDATA_PREFIX").or(file.tessdata_path),
    };

    Ok((config, ocr))
}

/// Flags for the model-backed commands.
#[derive(Debug, Clone, Default)]
pub struct ModelFlags {
    pub openai_key: Option<String>,
    pub perplexity_key: Option<String>,
    pub drafting_model: Option<String>,
    pub research_model: Option<String>,
}

/// The drafting and research clients.
pub fn resolve_models(
    flags: &ModelFlags,
    file: &ConfigFile,
    env: Env<'_>,
) -> anyhow::Result<(ChatCompletions, ChatCompletions)> {
    let keys = file.api_keys.clone().unwrap_or_default();
    let models = file.models.clone().unwrap_or_default();

    let Some(openai_key) = flags
        .openai_key
        .clone()
        .or_else(|| env("OPENAI_API_KEY"))
        .or(keys.openai_key)
    else {
        bail!(
            "OpenAI API key not set. Pass --openai-key, set OPENAI_API_KEY, \
             or add openai_key under [api_keys] in .taxdraft.toml"
        );
    };
    let Some(perplexity_key) = flags
        .perplexity_key
        .clone()
        .or_else(|| env("PERPLEXITY_API_KEY"))
        .or(keys.perplexity_key)
    else {
        bail!(
            "Perplexity API key not set. Pass --perplexity-key, set PERPLEXITY_API_KEY, \
             or add perplexity_key under [api_keys] in .taxdraft.toml"
        );
    };

    let timeout = models
        .request_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

    let mut drafting = ChatCompletions::openai(openai_key).with_timeout(timeout);
    if let Some(model) = flags.drafting_model.clone().or(models.drafting_model) {
        drafting = drafting.with_model(model);
    }
    let mut research = ChatCompletions::perplexity(perplexity_key).with_timeout(timeout);
    if let Some(model) = flags.research_model.clone().or(models.research_model) {
        research = research.with_model(model);
    }

    Ok((drafting, research))
}

/// `@path` reads instructions from a file; anything else is used verbatim.
pub fn read_instructions(arg: &str) -> anyhow::Result<String> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read instructions from {path}"))?,
        None => arg.to_string(),
    };
    if text.trim().is_empty() {
        bail!("instructions are empty");
    }
    Ok(text)
}
