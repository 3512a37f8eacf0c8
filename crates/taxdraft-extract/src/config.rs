use thiserror::Error;

use taxdraft_core::DEFAULT_MIN_TEXT_LENGTH;
use taxdraft_core::config_file::ExtractionFileConfig;

/// Raster magnification used before recognition.
pub const DEFAULT_OCR_SCALE: f32 = 2.0;
/// Upper bound on [`ExtractionConfig::ocr_scale`].
pub const MAX_OCR_SCALE: f32 = 4.0;

/// What the coordinator does when structural extraction comes back short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscalationPolicy {
    /// Report the failure and let the caller decide whether to force OCR.
    #[default]
    Manual,
    /// Run OCR in the same call when structural text is missing or short.
    /// Malformed documents are never escalated.
    Automatic,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("min_text_length must be at least 1")]
    ZeroMinTextLength,
    #[error("ocr_scale must be in (0, {max}], got {0}", max = MAX_OCR_SCALE)]
    OcrScaleOutOfRange(f32),
}

/// Validated settings for an [`Extractor`](crate::Extractor).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub(crate) min_text_length: usize,
    pub(crate) ocr_scale: f32,
    pub(crate) escalation: EscalationPolicy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
            ocr_scale: DEFAULT_OCR_SCALE,
            escalation: EscalationPolicy::Manual,
        }
    }
}

impl ExtractionConfig {
    /// Trimmed character count below which text is not usable.
    pub fn min_text_length(&self) -> usize {
        self.min_text_length
    }

    pub fn ocr_scale(&self) -> f32 {
        self.ocr_scale
    }

    pub fn escalation(&self) -> EscalationPolicy {
        self.escalation
    }
}

/// Builder for [`ExtractionConfig`]. Unset values keep their defaults;
/// [`build()`](Self::build) rejects out-of-range values.
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    min_text_length: Option<usize>,
    ocr_scale: Option<f32>,
    escalation: Option<EscalationPolicy>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder from the `[extraction]` table of a config file.
    pub fn from_file(file: &ExtractionFileConfig) -> Self {
        Self {
            min_text_length: file.min_text_length,
            ocr_scale: file.ocr_scale,
            escalation: file.auto_escalate.map(|auto| {
                if auto {
                    EscalationPolicy::Automatic
                } else {
                    EscalationPolicy::Manual
                }
            }),
        }
    }

    pub fn min_text_length(mut self, chars: usize) -> Self {
        self.min_text_length = Some(chars);
        self
    }

    pub fn ocr_scale(mut self, scale: f32) -> Self {
        self.ocr_scale = Some(scale);
        self
    }

    pub fn escalation(mut self, policy: EscalationPolicy) -> Self {
        self.escalation = Some(policy);
        self
    }

    pub fn build(self) -> Result<ExtractionConfig, ConfigError> {
        let defaults = ExtractionConfig::default();

        let min_text_length = self.min_text_length.unwrap_or(defaults.min_text_length);
        if min_text_length == 0 {
            return Err(ConfigError::ZeroMinTextLength);
        }

        let ocr_scale = self.ocr_scale.unwrap_or(defaults.ocr_scale);
        if !ocr_scale.is_finite() || ocr_scale <= 0.0 || ocr_scale > MAX_OCR_SCALE {
            return Err(ConfigError::OcrScaleOutOfRange(ocr_scale));
        }

        Ok(ExtractionConfig {
            min_text_length,
            ocr_scale,
            escalation: self.escalation.unwrap_or(defaults.escalation),
        })
    }
}
