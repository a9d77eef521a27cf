use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identity token of an interned symbol. Dense, assigned in interning order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct SymbolData {
    name: Arc<str>,
    // `None` for uninterned symbols.
    id: Option<SymbolId>,
    // Set once the symbol has been handed out as a keyword.
    keyword_seen: AtomicBool,
}

/// A symbol handle. Cloning shares the same allocation; equality is identity.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

impl Symbol {
    pub(crate) fn interned(name: Arc<str>, id: SymbolId) -> Self {
        Symbol(Arc::new(SymbolData {
            name,
            id: Some(id),
            keyword_seen: AtomicBool::new(false),
        }))
    }

    pub(crate) fn uninterned(name: &str) -> Self {
        Symbol(Arc::new(SymbolData {
            name: Arc::from(name),
            id: None,
            keyword_seen: AtomicBool::new(false),
        }))
    }

    /// Returns `true` only for the first caller.
    pub(crate) fn mark_keyword(&self) -> bool {
        !self.0.keyword_seen.swap(true, Ordering::AcqRel)
    }

    #[cfg(test)]
    pub(crate) fn handle_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Identity token, or `None` for a symbol that never entered a table.
    pub fn id(&self) -> Option<SymbolId> {
        self.0.id
    }

    pub fn is_interned(&self) -> bool {
        self.0.id.is_some()
    }

    pub fn ptr_eq(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.0.name
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.id {
            Some(id) => write!(f, "Symbol({:?}, {})", self.name(), id),
            None => write!(f, "Symbol({:?}, uninterned)", self.name()),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A keyword wraps exactly one symbol and shares its allocation, so every
/// keyword made from the same symbol is identity-equal without a cache.
#[derive(Clone)]
pub struct Keyword(Symbol);

impl Keyword {
    pub(crate) fn new(symbol: Symbol) -> Self {
        Keyword(symbol)
    }

    pub fn symbol(&self) -> &Symbol {
        &self.0
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn ptr_eq(&self, other: &Keyword) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl PartialEq for Keyword {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Keyword {}

impl Hash for Keyword {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyword({:?})", self.0)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#:{}", self.name())
    }
}
