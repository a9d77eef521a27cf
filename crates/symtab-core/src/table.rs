//! The intern table: one canonical `Symbol` per distinct name.
//!
//! The map sits behind a `parking_lot::RwLock`. Hits only take the read
//! lock; misses re-check under the write lock before allocating, so two
//! threads racing on the same new name always observe the same symbol.
//! Keywords need no map of their own: a keyword shares its symbol's
//! allocation, so it lives exactly as long as someone holds either.

use std::hash::BuildHasherDefault;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use rustc_hash::FxHasher;
use tracing::{debug, trace};

use crate::encoding::{EncodingPolicy, TextEncoding};
use crate::error::{Result, SymtabError};
use crate::stats::{InternStats, InternStatsSnapshot};
use crate::symbol::{Keyword, Symbol, SymbolId};

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Only the first `length` bytes of `bytes` name the symbol.
fn significant(bytes: &[u8], length: usize) -> Result<&[u8]> {
    bytes.get(..length).ok_or(SymtabError::LengthOutOfBounds {
        length,
        available: bytes.len(),
    })
}

#[derive(Debug)]
pub struct InternTable {
    policy: EncodingPolicy,
    symbols: RwLock<HashMap<Arc<str>, Symbol, FxBuildHasher>>,
    stats: InternStats,
}

impl Default for InternTable {
    fn default() -> Self {
        Self::new(EncodingPolicy::default())
    }
}

impl InternTable {
    pub fn new(policy: EncodingPolicy) -> Self {
        Self::with_capacity(policy, 0)
    }

    pub fn with_capacity(policy: EncodingPolicy, capacity: usize) -> Self {
        Self {
            policy,
            symbols: RwLock::new(HashMap::with_capacity_and_hasher(
                capacity,
                FxBuildHasher::default(),
            )),
            stats: InternStats::default(),
        }
    }

    /// The policy used by [`intern_symbol`](Self::intern_symbol) and
    /// [`make_keyword`](Self::make_keyword).
    pub fn policy(&self) -> EncodingPolicy {
        self.policy
    }

    /// Intern the first `length` bytes of `bytes`, decoded with the table's policy.
    pub fn intern_symbol(&self, bytes: &[u8], length: usize) -> Result<Symbol> {
        self.intern_with(self.policy, bytes, length)
    }

    /// Intern with an explicit policy, ignoring the table default.
    pub fn intern_with(&self, policy: EncodingPolicy, bytes: &[u8], length: usize) -> Result<Symbol> {
        let bytes = significant(bytes, length)?;
        // Decode fully before touching the maps so a bad name leaves no trace.
        let name = policy.decode(bytes)?;
        self.intern(&name)
    }

    pub fn intern_utf8(&self, bytes: &[u8], length: usize) -> Result<Symbol> {
        self.intern_with(EncodingPolicy::new(TextEncoding::Utf8), bytes, length)
    }

    pub fn intern_latin1(&self, bytes: &[u8], length: usize) -> Result<Symbol> {
        self.intern_with(EncodingPolicy::new(TextEncoding::Latin1), bytes, length)
    }

    /// Intern an already decoded name.
    pub fn intern(&self, name: &str) -> Result<Symbol> {
        // Fast-path read lock: if present, return it
        {
            let symbols = self.symbols.read();
            if let Some(sym) = symbols.get(name) {
                self.stats.record_lookup(true);
                trace!(name, "intern hit");
                return Ok(sym.clone());
            }
        }

        let mut symbols = self.symbols.write();
        if let Some(sym) = symbols.get(name) {
            self.stats.record_lookup(true);
            return Ok(sym.clone());
        }

        let index = symbols.len();
        let id = u32::try_from(index)
            .map(SymbolId)
            .map_err(|_| SymtabError::TableFull(index))?;
        let name: Arc<str> = Arc::from(name);
        let sym = Symbol::interned(name.clone(), id);
        symbols.insert(name, sym.clone());
        drop(symbols);

        self.stats.record_lookup(false);
        self.stats.record_symbol(sym.name().len());
        debug!(name = sym.name(), %id, "interned new symbol");
        Ok(sym)
    }

    /// Intern the first `length` bytes and return the symbol's canonical keyword.
    pub fn make_keyword(&self, bytes: &[u8], length: usize) -> Result<Keyword> {
        let sym = self.intern_symbol(bytes, length)?;
        Ok(self.symbol_to_keyword(&sym))
    }

    pub fn keyword(&self, name: &str) -> Result<Keyword> {
        let sym = self.intern(name)?;
        Ok(self.symbol_to_keyword(&sym))
    }

    /// The canonical keyword wrapping `symbol`.
    ///
    /// Works for any symbol, uninterned or from another table, without
    /// retaining it. Only symbols interned here count towards `stats().keywords`.
    pub fn symbol_to_keyword(&self, symbol: &Symbol) -> Keyword {
        if self.contains(symbol) && symbol.mark_keyword() {
            self.stats.record_keyword();
            debug!(name = symbol.name(), "created keyword");
        }
        Keyword::new(symbol.clone())
    }

    pub fn keyword_to_symbol(&self, keyword: &Keyword) -> Symbol {
        keyword.symbol().clone()
    }

    /// Find an interned symbol without creating one.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        let found = self.symbols.read().get(name).cloned();
        self.stats.record_lookup(found.is_some());
        found
    }

    /// A fresh symbol that is never identity-equal to any interned symbol.
    pub fn make_uninterned_symbol(&self, name: &str) -> Symbol {
        self.stats.record_uninterned();
        Symbol::uninterned(name)
    }

    /// Whether `symbol` is the canonical entry of this table.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols
            .read()
            .get(symbol.name_arc().as_ref())
            .is_some_and(|sym| sym.ptr_eq(symbol))
    }

    pub fn len(&self) -> usize {
        self.symbols.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.read().is_empty()
    }

    /// Snapshot of all interned symbols in interning order.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut all: Vec<Symbol> = self.symbols.read().values().cloned().collect();
        all.sort_by_key(|sym| sym.id());
        all
    }

    pub fn stats(&self) -> InternStatsSnapshot {
        self.stats.snapshot()
    }
}
