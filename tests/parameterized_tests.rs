use doublecount::core::{enumerate_pairs, Counter};
use doublecount::fixture::{generate, random_cases, Alphabet};
use doublecount::{ByteScan, CharScan, Lookahead, ZipPairs};

fn lookahead() -> Lookahead {
    Lookahead::new().expect("built-in pattern compiles")
}

// Generic helpers: accept any concrete implementation of Counter.
fn run_reference_fixtures<C: Counter>(c: C) {
    let cases = [
        ("", 0),
        ("a", 0),
        ("aaa", 2),
        ("aabb", 2),
        ("abcabc", 0),
        ("aabbaa", 3),
        ("abba", 1),
        ("Aa", 0),
    ];
    for (input, expected) in cases {
        assert_eq!(c.count(input), Ok(expected), "variant={} input={input:?}", c.name());
    }
}

#[test]
fn reference_fixtures() {
    run_reference_fixtures(CharScan);
    run_reference_fixtures(ZipPairs);
    run_reference_fixtures(ByteScan);
    run_reference_fixtures(lookahead());
}

fn run_matches_direct_enumeration<C: Counter>(c: C) {
    let fixtures = [
        "mississippi",
        "bookkeeper",
        "aaabaaa",
        "  double  spaces  ",
        "line\n\nbreak",
        "xyzzy",
        "ZZzz",
    ];
    for s in fixtures {
        assert_eq!(
            c.count(s),
            Ok(enumerate_pairs(s).len()),
            "variant={} input={s:?}",
            c.name()
        );
    }
}

#[test]
fn matches_direct_enumeration() {
    run_matches_direct_enumeration(CharScan);
    run_matches_direct_enumeration(ZipPairs);
    run_matches_direct_enumeration(ByteScan);
    run_matches_direct_enumeration(lookahead());
}

fn run_long_runs_count_every_overlapping_pair<C: Counter>(c: C) {
    for len in [1usize, 2, 3, 10, 1000] {
        let s = "q".repeat(len);
        assert_eq!(c.count(&s), Ok(len - 1), "variant={} len={len}", c.name());
    }
}

#[test]
fn long_runs_count_every_overlapping_pair() {
    run_long_runs_count_every_overlapping_pair(CharScan);
    run_long_runs_count_every_overlapping_pair(ZipPairs);
    run_long_runs_count_every_overlapping_pair(ByteScan);
    run_long_runs_count_every_overlapping_pair(lookahead());
}

fn run_long_input_without_pairs_counts_zero<C: Counter>(c: C) {
    let s = "ab".repeat(1_000_000);
    assert_eq!(c.count(&s), Ok(0), "variant={}", c.name());

    let t = format!("{s}zz{s}");
    assert_eq!(c.count(&t), Ok(1), "variant={}", c.name());
}

#[test]
fn long_input_without_pairs_counts_zero() {
    run_long_input_without_pairs_counts_zero(CharScan);
    run_long_input_without_pairs_counts_zero(ZipPairs);
    run_long_input_without_pairs_counts_zero(ByteScan);
    run_long_input_without_pairs_counts_zero(lookahead());
}

fn run_non_ascii_compares_whole_chars<C: Counter>(c: C) {
    let cases = [
        ("ééa", 1),
        ("\u{1041}", 0),
        ("\u{1041}\u{1041}\u{1041}", 2),
        ("日日本本本", 3),
        ("🦀🦀x🦀", 1),
        ("e\u{301}e\u{301}", 0),
    ];
    for (input, expected) in cases {
        assert_eq!(c.count(input), Ok(expected), "variant={} input={input:?}", c.name());
    }
}

#[test]
fn non_ascii_compares_whole_chars() {
    run_non_ascii_compares_whole_chars(CharScan);
    run_non_ascii_compares_whole_chars(ZipPairs);
    run_non_ascii_compares_whole_chars(ByteScan);
    run_non_ascii_compares_whole_chars(lookahead());
}

fn run_is_idempotent<C: Counter>(c: C) {
    let s = generate(5, 50_000, &Alphabet::first_n(3));
    let first = c.count(&s);
    assert!(first.is_ok());
    assert_eq!(first, c.count(&s), "variant={}", c.name());
}

#[test]
fn is_idempotent() {
    run_is_idempotent(CharScan);
    run_is_idempotent(ZipPairs);
    run_is_idempotent(ByteScan);
    run_is_idempotent(lookahead());
}

#[test]
fn all_variants_agree_on_random_corpus() {
    let counters: Vec<Box<dyn Counter>> = doublecount::all_counters().unwrap();
    let cases = random_cases(2024, 1_000, 1_000);
    let mut single_char_cases = 0;

    for (alphabet, s) in &cases {
        let expected = CharScan.count_str(s);
        for c in &counters {
            assert_eq!(
                c.count(s),
                Ok(expected),
                "variant={} alphabet={} len={}",
                c.name(),
                alphabet.len(),
                s.len()
            );
        }
        if alphabet.len() == 1 && !s.is_empty() {
            single_char_cases += 1;
            assert_eq!(expected, s.chars().count() - 1);
        }
    }
    assert!(single_char_cases > 0, "corpus should include single-char alphabets");
}

#[test]
fn same_seed_gives_same_counts() {
    let alphabet = Alphabet::ascii_letters();
    let a = generate(1234, 100_000, &alphabet);
    let b = generate(1234, 100_000, &alphabet);
    assert_eq!(a, b);
    for c in doublecount::all_counters().unwrap() {
        assert_eq!(c.count(&a), c.count(&b), "variant={}", c.name());
    }
}

#[test]
fn uniform_letters_give_expected_pair_rate() {
    // With 52 letters, each adjacent pair matches with probability 1/52.
    let s = generate(77, 1_000_000, &Alphabet::ascii_letters());
    let n = doublecount::count_doubles(&s) as f64;
    let expected = 999_999.0 / 52.0;
    assert!((n - expected).abs() < expected * 0.05, "n={n} expected~{expected}");
}
