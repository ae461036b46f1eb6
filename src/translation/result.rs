/*!
 * The single output record of an invocation.
 */

use serde::{Deserialize, Serialize};

use crate::errors::ErrorKind;
use crate::translation::tokenizer::TokenizerMode;

/// Which engine produced the translated text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    /// Primary engine only
    #[serde(rename = "ct2")]
    Ct2,
    /// Fallback engine only
    #[serde(rename = "hf")]
    Hf,
    /// Primary output rejected by the quality gate and replaced by the fallback
    #[serde(rename = "ct2+hf")]
    Ct2Hf,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ct2 => "ct2",
            Self::Hf => "hf",
            Self::Ct2Hf => "ct2+hf",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance attached to the translated text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultMeta {
    Success {
        provider: Provider,
        direction: String,
        tokenizer_mode: Option<TokenizerMode>,
    },
    Failure {
        provider: Provider,
        reason: ErrorKind,
    },
}

/// Output record; on failure `translated` is the input verbatim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationResult {
    pub translated: String,
    pub meta: ResultMeta,
}

impl TranslationResult {
    pub fn success(
        translated: String,
        provider: Provider,
        direction: impl Into<String>,
        tokenizer_mode: Option<TokenizerMode>,
    ) -> Self {
        Self {
            translated,
            meta: ResultMeta::Success {
                provider,
                direction: direction.into(),
                tokenizer_mode,
            },
        }
    }

    /// Error records always carry the primary provider tag
    pub fn failure(input: &str, reason: ErrorKind) -> Self {
        Self {
            translated: input.to_string(),
            meta: ResultMeta::Failure {
                provider: Provider::Ct2,
                reason,
            },
        }
    }

    pub fn provider(&self) -> Provider {
        match &self.meta {
            ResultMeta::Success { provider, .. } | ResultMeta::Failure { provider, .. } => *provider,
        }
    }

    pub fn reason(&self) -> Option<ErrorKind> {
        match &self.meta {
            ResultMeta::Failure { reason, .. } => Some(*reason),
            ResultMeta::Success { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.reason().is_none()
    }

    /// Serialize as one JSON line without a trailing newline
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
