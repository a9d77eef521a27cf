use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::symbol::{Keyword, Symbol};

/// Discriminant of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTag {
    Unspecified,
    Nil,
    Bool,
    Int,
    Char,
    Str,
    Symbol,
    Keyword,
    Pair,
}

/// A dynamically typed runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Unspecified,
    Nil,
    Bool(bool),
    Int(i64),
    Char(char),
    Str(Arc<str>),
    Symbol(Symbol),
    Keyword(Keyword),
    Pair(Arc<(Value, Value)>),
}

impl Value {
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Unspecified => ValueTag::Unspecified,
            Value::Nil => ValueTag::Nil,
            Value::Bool(_) => ValueTag::Bool,
            Value::Int(_) => ValueTag::Int,
            Value::Char(_) => ValueTag::Char,
            Value::Str(_) => ValueTag::Str,
            Value::Symbol(_) => ValueTag::Symbol,
            Value::Keyword(_) => ValueTag::Keyword,
            Value::Pair(_) => ValueTag::Pair,
        }
    }

    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Pair(Arc::new((car, cdr)))
    }

    /// Build a proper list from `items`.
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Value::Nil, |tail, head| Value::cons(head, tail))
    }

    pub fn is_keyword(&self) -> bool {
        self.tag() == ValueTag::Keyword
    }

    pub fn is_symbol(&self) -> bool {
        self.tag() == ValueTag::Symbol
    }

    pub fn is_pair(&self) -> bool {
        self.tag() == ValueTag::Pair
    }

    pub fn is_string(&self) -> bool {
        self.tag() == ValueTag::Str
    }

    pub fn is_integer(&self) -> bool {
        self.tag() == ValueTag::Int
    }

    /// Everything except `#f` counts as true.
    pub fn is_true(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            Value::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    /// Identity comparison for heap values, value comparison for immediates.
    pub fn is_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Unspecified, Value::Unspecified) | (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::Symbol(a), Value::Symbol(b)) => a.ptr_eq(b),
            (Value::Keyword(a), Value::Keyword(b)) => a.ptr_eq(b),
            (Value::Pair(a), Value::Pair(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// True iff `value` is tagged as a keyword.
pub fn is_keyword(value: &Value) -> bool {
    value.is_keyword()
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Value::Symbol(sym)
    }
}

impl From<Keyword> for Value {
    fn from(kw: Keyword) -> Self {
        Value::Keyword(kw)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unspecified => f.write_str("#<unspecified>"),
            Value::Nil => f.write_str("()"),
            Value::Bool(true) => f.write_str("#t"),
            Value::Bool(false) => f.write_str("#f"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "#\\{}", c),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Symbol(sym) => write!(f, "{}", sym),
            Value::Keyword(kw) => write!(f, "{}", kw),
            Value::Pair(pair) => {
                write!(f, "({}", pair.0)?;
                let mut rest = &pair.1;
                loop {
                    match rest {
                        Value::Nil => break,
                        Value::Pair(next) => {
                            write!(f, " {}", next.0)?;
                            rest = &next.1;
                        }
                        tail => {
                            write!(f, " . {}", tail)?;
                            break;
                        }
                    }
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::InternTable;

    #[test]
    fn keyword_predicate_follows_tag() {
        let table = InternTable::default();
        let kw = table.keyword("thus").unwrap();
        let sym = table.intern("thus").unwrap();

        assert!(is_keyword(&Value::from(kw)));
        assert!(!is_keyword(&Value::from(sym)));
        assert!(!is_keyword(&Value::from(42)));
        assert!(!is_keyword(&Value::from("thus")));
        assert!(!is_keyword(&Value::Nil));
    }

    #[test]
    fn printed_forms() {
        let table = InternTable::default();
        let list = Value::list([
            Value::from(table.intern("define").unwrap()),
            Value::from(table.keyword("key").unwrap()),
            Value::from(7),
            Value::from("s"),
            Value::from(true),
        ]);
        assert_eq!(list.to_string(), "(define #:key 7 \"s\" #t)");

        let dotted = Value::cons(Value::from(1), Value::from(2));
        assert_eq!(dotted.to_string(), "(1 . 2)");
        assert_eq!(Value::Nil.to_string(), "()");
    }

    #[test]
    fn eq_is_identity_for_heap_values() {
        let table = InternTable::default();
        let a = Value::from(table.intern("x").unwrap());
        let b = Value::from(table.intern("x").unwrap());
        assert!(a.is_eq(&b));

        assert!(!Value::from("x").is_eq(&Value::from("x")));
        assert!(Value::from(3).is_eq(&Value::from(3)));
        assert!(!a.is_eq(&Value::from(table.keyword("x").unwrap())));
    }

    #[test]
    fn only_false_is_false() {
        assert!(!Value::Bool(false).is_true());
        assert!(Value::Nil.is_true());
        assert!(Value::Int(0).is_true());
    }
}
