//! Runtime context and bootstrap.
//!
//! A [`Runtime`] owns the intern table; the table's encoding policy is the
//! one the locale entry points decode with. Tests build isolated runtimes with
//! [`Runtime::new`]; embedders call [`boot`] once to set up the process-wide
//! instance and run their code inside the callback.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::encoding::EncodingPolicy;
use crate::error::{Result, SymtabError};
use crate::symbol::{Keyword, Symbol};
use crate::table::InternTable;
use crate::value::Value;

static GLOBAL_RUNTIME: OnceCell<Runtime> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct Runtime {
    table: Arc<InternTable>,
}

impl Runtime {
    pub fn new(config: &RuntimeConfig) -> Self {
        let table = InternTable::with_capacity(config.encoding_policy(), config.initial_capacity);
        Self {
            table: Arc::new(table),
        }
    }

    /// A runtime over an existing table, e.g. one shared with another context.
    pub fn with_table(table: Arc<InternTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<InternTable> {
        &self.table
    }

    pub fn policy(&self) -> EncodingPolicy {
        self.table.policy()
    }

    /// Intern the first `length` bytes of a locale-encoded name.
    pub fn from_locale_symboln(&self, bytes: &[u8], length: usize) -> Result<Symbol> {
        self.table.intern_symbol(bytes, length)
    }

    /// Keyword from the first `length` bytes of a locale-encoded name.
    pub fn from_locale_keywordn(&self, bytes: &[u8], length: usize) -> Result<Keyword> {
        let sym = self.from_locale_symboln(bytes, length)?;
        Ok(self.table.symbol_to_keyword(&sym))
    }

    /// Keyword from a whole locale-encoded name. A NUL byte ends the name.
    pub fn from_locale_keyword(&self, bytes: &[u8]) -> Result<Keyword> {
        let length = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.from_locale_keywordn(bytes, length)
    }

    pub fn from_locale_symbol(&self, bytes: &[u8]) -> Result<Symbol> {
        let length = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.from_locale_symboln(bytes, length)
    }

    /// `#t` if `value` is a keyword, `#f` otherwise.
    pub fn keyword_p(&self, value: &Value) -> Value {
        Value::Bool(value.is_keyword())
    }

    pub fn symbol_p(&self, value: &Value) -> Value {
        Value::Bool(value.is_symbol())
    }
}

/// Initialize the process-wide runtime and run `callback` inside it.
///
/// Only the first call builds the runtime; later calls reuse it and ignore
/// their `config`.
pub fn boot<F, R>(config: &RuntimeConfig, args: &[String], callback: F) -> R
where
    F: FnOnce(&Runtime, &[String]) -> R,
{
    let mut created = false;
    let runtime = GLOBAL_RUNTIME.get_or_init(|| {
        created = true;
        Runtime::new(config)
    });

    if created {
        info!(
            encoding = %runtime.policy().encoding,
            strategy = ?runtime.policy().strategy,
            "Runtime booted"
        );
    } else {
        debug!("Runtime already booted, reusing it");
    }

    callback(runtime, args)
}

/// The runtime set up by [`boot`].
pub fn global() -> Result<&'static Runtime> {
    GLOBAL_RUNTIME.get().ok_or(SymtabError::NotBooted)
}
