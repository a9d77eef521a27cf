use std::sync::{Arc, Barrier};
use std::thread;

use symtab_core::{
    is_keyword, EncodingPolicy, InternTable, Symbol, SymtabError, TextEncoding, Value,
};

fn utf8_table() -> InternTable {
    InternTable::new(EncodingPolicy::new(TextEncoding::Utf8))
}

#[test]
fn test_repeated_interning_is_identity_equal() {
    let table = utf8_table();
    for name in ["alpha", "beta", "", "with space", "λ"] {
        let bytes = name.as_bytes();
        let a = table.intern_symbol(bytes, bytes.len()).unwrap();
        let b = table.intern_symbol(bytes, bytes.len()).unwrap();
        assert!(a.ptr_eq(&b), "{name:?} interned twice");
        assert_eq!(a.name(), name);
    }
    assert_eq!(table.len(), 5);
}

#[test]
fn test_keyword_satisfies_predicate() {
    let table = utf8_table();
    for name in ["a", "thusly", "", "key-word"] {
        let kw = table.make_keyword(name.as_bytes(), name.len()).unwrap();
        assert!(is_keyword(&Value::from(kw)));
    }
}

#[test]
fn test_bare_symbol_is_not_keyword() {
    let table = utf8_table();
    let sym = table.intern_symbol(b"plain", 5).unwrap();
    let kw = table.make_keyword(b"plain", 5).unwrap();

    assert!(!is_keyword(&Value::from(sym.clone())));
    assert!(kw.symbol().ptr_eq(&sym));
}

#[test]
fn test_empty_name_is_stable() {
    let table = utf8_table();
    let a = table.intern_symbol(b"", 0).unwrap();
    let b = table.intern_symbol(b"ignored", 0).unwrap();
    assert!(a.ptr_eq(&b));
    assert_eq!(a.name(), "");

    let k1 = table.make_keyword(b"", 0).unwrap();
    let k2 = table.make_keyword(b"", 0).unwrap();
    assert!(k1.ptr_eq(&k2));
    assert_eq!(k1.to_string(), "#:");
}

#[test]
fn test_length_truncates_name() {
    let table = utf8_table();
    let truncated = table.intern_symbol(b"thusly!", 6).unwrap();
    let exact = table.intern_symbol(b"thusly", 6).unwrap();
    let full = table.intern_symbol(b"thusly!", 7).unwrap();

    assert!(truncated.ptr_eq(&exact));
    assert!(!truncated.ptr_eq(&full));
    assert_eq!(full.name(), "thusly!");
}

#[test]
fn test_make_keyword_thusly_four() {
    let table = utf8_table();
    let kw = table.make_keyword(b"thusly", 4).unwrap();
    assert_eq!(kw.name(), "thus");
    assert!(is_keyword(&Value::from(kw)));

    assert!(!is_keyword(&Value::from(42)));
    let sym = table.intern_symbol(b"thus", 4).unwrap();
    assert!(!is_keyword(&Value::from(sym)));
}

#[test]
fn test_sequential_keywords_are_identity_equal() {
    let table = utf8_table();
    let first = table.make_keyword(b"again", 5).unwrap();
    let second = table.make_keyword(b"again", 5).unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(first, second);
}

#[test]
fn test_encoding_error_is_reported_and_recoverable() {
    let table = utf8_table();
    let err = table.intern_symbol(b"bad\xc3", 4).unwrap_err();
    assert_eq!(
        err,
        SymtabError::Encoding {
            encoding: TextEncoding::Utf8,
            offset: 3
        }
    );
    assert!(table.is_empty());

    // Same buffer, shorter length, is fine.
    let sym = table.intern_symbol(b"bad\xc3", 3).unwrap();
    assert_eq!(sym.name(), "bad");
}

#[test]
fn test_concurrent_interning_publishes_one_symbol() {
    const THREADS: usize = 8;
    const NAMES: usize = 64;

    let table = Arc::new(utf8_table());
    let barrier = Barrier::new(THREADS);

    let results: Vec<Vec<Symbol>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let table = &table;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    (0..NAMES)
                        .map(|i| {
                            let name = format!("racy-{i}");
                            table.intern_symbol(name.as_bytes(), name.len()).unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(table.len(), NAMES);
    for per_thread in &results[1..] {
        for (a, b) in results[0].iter().zip(per_thread) {
            assert!(a.ptr_eq(b));
        }
    }

    let stats = table.stats();
    assert_eq!(stats.symbols, NAMES as u64);
    assert_eq!(stats.lookups, (THREADS * NAMES) as u64);
}

#[test]
fn test_concurrent_keywords_share_identity() {
    const THREADS: usize = 8;

    let table = utf8_table();
    let barrier = Barrier::new(THREADS);

    let keywords: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let table = &table;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    table.make_keyword(b"shared", 6).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for kw in &keywords[1..] {
        assert!(kw.ptr_eq(&keywords[0]));
    }
    assert_eq!(table.stats().keywords, 1);
}
