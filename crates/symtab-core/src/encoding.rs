//! Text encoding policy used to turn raw name bytes into symbol names.
//!
//! The locale entry points decode with whatever encoding the process
//! locale names (`LC_ALL`, then `LC_CTYPE`, then `LANG`). Explicit
//! variants decode with a fixed encoding regardless of locale.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SymtabError};

const SUBSTITUTE_CHAR: char = '?';

/// Consulted in this order; the first non-empty one wins.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_CTYPE", "LANG"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Ascii,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Ascii => "ASCII",
        })
    }
}

impl TextEncoding {
    /// Map a locale string such as `en_US.UTF-8` or `de_DE.ISO-8859-1@euro`
    /// to an encoding. Returns `None` for codesets we do not know and for
    /// bare language tags, whose charset depends on the installed locale.
    pub fn for_locale(locale: &str) -> Option<Self> {
        let locale = locale.split('@').next().unwrap_or_default();
        if locale.is_empty() || locale == "C" || locale == "POSIX" {
            return Some(TextEncoding::Ascii);
        }

        let (_, codeset) = locale.split_once('.')?;

        let normalized: String = codeset
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "utf8" => Some(TextEncoding::Utf8),
            "iso88591" | "latin1" | "l1" => Some(TextEncoding::Latin1),
            "ansix341968" | "usascii" | "ascii" => Some(TextEncoding::Ascii),
            _ => None,
        }
    }
}

/// What to do with bytes that are not valid in the active encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStrategy {
    #[default]
    Error,
    Substitute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingPolicy {
    pub encoding: TextEncoding,
    pub strategy: ConversionStrategy,
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self::new(TextEncoding::Utf8)
    }
}

impl EncodingPolicy {
    pub fn new(encoding: TextEncoding) -> Self {
        Self {
            encoding,
            strategy: ConversionStrategy::Error,
        }
    }

    pub fn with_strategy(mut self, strategy: ConversionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Build a policy from the process locale environment.
    pub fn from_locale() -> Self {
        Self::from_locale_vars(|var| std::env::var(var).ok())
    }

    /// Like [`from_locale`](Self::from_locale), reading variables through `lookup`.
    pub fn from_locale_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let locale = LOCALE_VARS
            .iter()
            .filter_map(|var| lookup(*var))
            .find(|value| !value.is_empty())
            .unwrap_or_default();

        let encoding = TextEncoding::for_locale(&locale).unwrap_or_else(|| {
            warn!(locale = %locale, "Unknown locale codeset, decoding names as UTF-8");
            TextEncoding::Utf8
        });
        Self::new(encoding)
    }

    /// Decode `bytes` into a name. Borrows when the input is already valid text.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        match self.encoding {
            TextEncoding::Utf8 => self.decode_utf8(bytes),
            TextEncoding::Latin1 => Ok(decode_latin1(bytes)),
            TextEncoding::Ascii => self.decode_ascii(bytes),
        }
    }

    fn decode_utf8<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(Cow::Borrowed(s)),
            Err(e) => match self.strategy {
                ConversionStrategy::Error => Err(SymtabError::Encoding {
                    encoding: TextEncoding::Utf8,
                    offset: e.valid_up_to(),
                }),
                ConversionStrategy::Substitute => {
                    let mut out = String::with_capacity(bytes.len());
                    for chunk in bytes.utf8_chunks() {
                        out.push_str(chunk.valid());
                        if !chunk.invalid().is_empty() {
                            out.push(SUBSTITUTE_CHAR);
                        }
                    }
                    Ok(Cow::Owned(out))
                }
            },
        }
    }

    fn decode_ascii<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        match bytes.iter().position(|b| !b.is_ascii()) {
            None => Ok(Cow::Borrowed(ascii_str(bytes))),
            Some(offset) => match self.strategy {
                ConversionStrategy::Error => Err(SymtabError::Encoding {
                    encoding: TextEncoding::Ascii,
                    offset,
                }),
                ConversionStrategy::Substitute => Ok(Cow::Owned(
                    bytes
                        .iter()
                        .map(|&b| if b.is_ascii() { b as char } else { SUBSTITUTE_CHAR })
                        .collect(),
                )),
            },
        }
    }
}

fn decode_latin1(bytes: &[u8]) -> Cow<'_, str> {
    if bytes.is_ascii() {
        Cow::Borrowed(ascii_str(bytes))
    } else {
        // Every Latin-1 byte is the Unicode scalar of the same value.
        Cow::Owned(bytes.iter().map(|&b| b as char).collect())
    }
}

fn ascii_str(bytes: &[u8]) -> &str {
    // ASCII is a subset of UTF-8, so this cannot fail for checked input.
    std::str::from_utf8(bytes).unwrap_or_default()
}
