use thiserror::Error;

use crate::config::ConfigError;
use crate::encoding::TextEncoding;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymtabError {
    #[error("Invalid {encoding} byte sequence at offset {offset}")]
    Encoding {
        encoding: TextEncoding,
        offset: usize,
    },

    #[error("Declared length {length} exceeds buffer of {available} bytes")]
    LengthOutOfBounds { length: usize, available: usize },

    #[error("Intern table exhausted after {0} symbols")]
    TableFull(usize),

    #[error("Runtime not booted")]
    NotBooted,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SymtabError {
    pub fn is_encoding(&self) -> bool {
        matches!(self, SymtabError::Encoding { .. })
    }
}

pub type Result<T> = std::result::Result<T, SymtabError>;
