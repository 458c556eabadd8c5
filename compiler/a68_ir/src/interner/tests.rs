use super::*;
use proptest::prelude::*;

#[test]
fn test_intern_same_text_same_name() {
    let interner = StringInterner::new();
    let a = interner.intern("maxint");
    let b = interner.intern("maxint");
    assert_eq!(a, b);
    assert_eq!(interner.lookup(a), "maxint");
}

#[test]
fn test_intern_empty_is_preinterned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.len(), 1);
}

#[test]
fn test_get_does_not_insert() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("pi"), None);
    let pi = interner.intern("pi");
    assert_eq!(interner.get("pi"), Some(pi));
}

proptest! {
    #[test]
    fn intern_is_idempotent_iff_texts_equal(s in "[a-z]{0,8}", t in "[a-z]{0,8}") {
        let interner = StringInterner::new();
        let a = interner.intern(&s);
        let b = interner.intern(&t);
        prop_assert_eq!(a == b, s == t);
    }
}
