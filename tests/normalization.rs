//! Integration tests for statement normalization and list splitting.

use sql_parity::normalize::{collapse_whitespace, strip_hints};
use sql_parity::{normalize, split_top_level};

#[test]
fn test_cosmetic_variants_normalize_identically() {
    let variants = [
        "SELECT a, b FROM t WHERE x = 1",
        "SELECT a,b FROM t WHERE x = 1",
        "  SELECT\ta ,\n\tb\nFROM   t\nWHERE x = 1  ",
        "SELECT a, -- first column\n b FROM t WHERE x = 1",
    ];
    let expected = normalize(variants[0]);
    for variant in variants {
        assert_eq!(normalize(variant), expected, "{variant:?}");
    }
    assert_eq!(expected.as_str(), "SELECT a,b FROM t WHERE x = 1");
}

#[test]
fn test_keywords_get_one_space() {
    assert_eq!(
        normalize("SELECT(a)FROM(t)WHERE(x=1)").as_str(),
        "SELECT (a)FROM (t)WHERE (x=1)"
    );
    assert_eq!(
        normalize("insert into T(a)values(:a)").as_str(),
        "insert into T(a)values (:a)"
    );
}

#[test]
fn test_normalize_is_idempotent() {
    for raw in [
        "SELECT a , b FROM t",
        "INSERT INTO t ( a ) VALUES ( TO_DATE( :a , 'YYYY, MM' ) )",
        "SELECT 'x -- y' FROM t -- trailing",
        "VALUES('a''b' , \"q  q\")",
        "BEGIN INSERT INTO t(a) VALUES(1); END;",
    ] {
        let once = normalize(raw);
        assert_eq!(normalize(&once), once, "{raw:?}");
    }
}

#[test]
fn test_hints_and_whitespace() {
    assert_eq!(
        strip_hints("SELECT /*+ INDEX(t t_ix) PARALLEL(4) */ a FROM t"),
        "SELECT a FROM t"
    );
    assert_eq!(collapse_whitespace("a\r\n\t b"), "a b");
}

#[test]
fn test_split_top_level() {
    let tokens = split_top_level("a, TO_DATE(x,'YYYY,MM'), b");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens, ["a", "TO_DATE(x,'YYYY,MM')", "b"]);

    assert_eq!(
        split_top_level("DECODE(a, 'x,y', (1, 2)), 'it''s, fine'"),
        ["DECODE(a, 'x,y', (1, 2))", "'it''s, fine'"]
    );
    assert!(split_top_level(" ").is_empty());
}
