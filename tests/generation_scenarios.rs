//! End-to-end coverage of the generator against whole grammars, as
//! opposed to the per-module unit tests living alongside their source.

use brickgrammar::generator::{generate, GenerationLimits};
use brickgrammar::grammar::{load_grammar, Symbol};
use brickgrammar::ldraw::{parse_ldraw, to_ldraw};
use brickgrammar::parse_cache::ParseCache;
use indoc::indoc;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A grammar of recursive studs, wrapped with a `Start` rule that seeds
/// a radius-7 bounding sphere before `Stud` starts recursing. Neither
/// alternative carries a
/// probability, so the generator falls back to fitness-greedy selection:
/// it keeps taking the recursive branch while it stays collision-free
/// and falls back to the nullary branch (always valid) the moment a
/// further stud would collide with the sphere shell or a prior fill.
const G1: &str = indoc! {"
    Start -> 'PlaceBoundingSphere(7)' Stud
    Stud -> '(' 'Move(0,-3,0)' 'FillRect(2,3,2)' 'Place(3005)' Stud ')' |
"};

fn tokens_of(sentence: &[Symbol]) -> Vec<String> {
    sentence
        .iter()
        .map(|s| match s {
            Symbol::Terminal(t) => t.to_string(),
            Symbol::Nonterminal(n) => panic!("unresolved nonterminal {n} in generated sentence"),
        })
        .collect()
}

/// Generation against G1 always terminates, and the resulting token
/// sequence parses and executes cleanly end to end.
#[test]
fn g1_generates_and_executes() {
    let grammar = load_grammar(G1).unwrap();
    let limits = GenerationLimits::default();

    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let sentence = generate(&grammar, &limits, &mut rng).unwrap();
        let tokens = tokens_of(&sentence);

        let mut cache = ParseCache::new();
        let (elements, image, stack) = cache.parse(&tokens).unwrap();

        assert!(!image.is_empty(), "seed {seed}: image should never be empty after generation");
        assert_eq!(stack.len(), 1, "seed {seed}: every '(' must be matched by ')'");
        assert!(elements.len() <= 3, "seed {seed}: bounding sphere(7) admits at most 3 studs");
    }
}

/// Generated elements round-trip through LDraw end to end.
#[test]
fn generated_elements_round_trip_through_ldraw() {
    let grammar = load_grammar(G1).unwrap();
    let limits = GenerationLimits::default();
    let mut rng = StdRng::seed_from_u64(42);
    let sentence = generate(&grammar, &limits, &mut rng).unwrap();
    let tokens = tokens_of(&sentence);

    let mut cache = ParseCache::new();
    let (elements, _, _) = cache.parse(&tokens).unwrap();

    let rendered = to_ldraw(&elements);
    let parsed = parse_ldraw(&rendered).unwrap();
    assert_eq!(parsed, elements);
}

/// A nullable grammar (no terminals at all) generates the empty sentence
/// immediately rather than looping.
#[test]
fn purely_nullable_grammar_terminates_immediately() {
    let grammar = load_grammar("Start -> ").unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let limits = GenerationLimits::default();
    let sentence = generate(&grammar, &limits, &mut rng).unwrap();
    assert!(sentence.is_empty());
}

/// A recursive grammar with no terminating alternative hits the
/// configured sentence-length ceiling rather than running forever.
#[test]
fn unbounded_recursive_grammar_hits_generation_limit() {
    let grammar = load_grammar("Start -> 'Move(1,0,0)' Start [1.0]").unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let limits = GenerationLimits { max_sentence_len: 50, max_terminate_depth: 256 };
    let err = generate(&grammar, &limits, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        brickgrammar::error::BrickError::GenerationLimitExceeded { .. }
    ));
}
