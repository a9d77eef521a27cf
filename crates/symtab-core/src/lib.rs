//! Interned symbol and keyword table.
//!
//! - `table`: the process-wide intern table (`intern_symbol`, `make_keyword`)
//! - `symbol`: identity-compared `Symbol` and `Keyword` handles
//! - `value`: tagged runtime values and the `is_keyword` predicate
//! - `encoding`: locale-aware decoding of name bytes
//! - `runtime`: runtime context and bootstrap
//! - `config`, `stats`, `error`: ambient plumbing

pub mod config;
pub mod encoding;
pub mod error;
pub mod runtime;
pub mod stats;
pub mod symbol;
pub mod table;
pub mod value;

pub use config::{ConfigError, EncodingSetting, LoggingConfig, RuntimeConfig};
pub use encoding::{ConversionStrategy, EncodingPolicy, TextEncoding};
pub use error::*;
pub use runtime::{boot, global, Runtime};
pub use stats::{InternStats, InternStatsSnapshot};
pub use symbol::{Keyword, Symbol, SymbolId};
pub use table::InternTable;
pub use value::{is_keyword, Value, ValueTag};
