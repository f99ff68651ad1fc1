//! The PCFG generator: leftmost-nonterminal expansion, stochastic where
//! a nonterminal's productions carry a valid probability distribution,
//! fitness-greedy otherwise.
//!
//! A `while` loop pulls a cursor forward one nonterminal at a time,
//! `log::debug!` tracing each decision, rather than recursing through the
//! derivation tree.

use crate::error::BrickError;
use crate::fitness::fitness;
use crate::grammar::{Grammar, Production, Symbol};
use crate::parse_cache::ParseCache;
use log::debug;
use rand::Rng;
use smol_str::SmolStr;

/// Caller-supplied limits. Generation is not guaranteed to terminate on
/// its own (an unbounded recursive grammar can always produce a
/// collision-free continuation), so callers must enforce a ceiling.
#[derive(Debug, Clone, Copy)]
pub struct GenerationLimits {
    /// Hard cap on sentence length (`GenerationLimitExceeded` beyond this).
    pub max_sentence_len: usize,
    /// Hard cap on recursion depth while terminating a candidate RHS for
    /// a fitness probe, so a self-referential nonterminal with no
    /// terminating alternative reports an error instead of overflowing
    /// the stack.
    pub max_terminate_depth: usize,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self { max_sentence_len: 10_000, max_terminate_depth: 256 }
    }
}

/// Runs the leftmost-expansion loop to completion and returns the final
/// sentence (a mix of resolved terminals — there should be none left
/// unresolved on success, since the loop only stops once no nonterminal
/// remains).
pub fn generate(
    grammar: &Grammar,
    limits: &GenerationLimits,
    rng: &mut impl Rng,
) -> Result<Vec<Symbol>, BrickError> {
    let mut cache = ParseCache::new();
    let mut sentence = vec![Symbol::Nonterminal(grammar.start().clone())];
    let mut cursor = next_nonterminal(&sentence, 0);

    while let Some(i) = cursor {
        if sentence.len() > limits.max_sentence_len {
            return Err(BrickError::GenerationLimitExceeded {
                sentence_len: sentence.len(),
                limit: limits.max_sentence_len,
            });
        }

        let lhs = match &sentence[i] {
            Symbol::Nonterminal(name) => name.clone(),
            Symbol::Terminal(_) => unreachable!("cursor always points at a nonterminal"),
        };
        let prods = grammar.productions_for(&lhs);

        let chosen = if grammar.has_valid_distribution(&lhs) {
            debug!("sampling {lhs} stochastically over {} productions", prods.len());
            sample_weighted(rng, prods).clone()
        } else {
            let prefix: Vec<String> = sentence[..i]
                .iter()
                .map(|s| match s {
                    Symbol::Terminal(t) => t.to_string(),
                    Symbol::Nonterminal(n) => {
                        unreachable!("symbol left of cursor must be terminal, found {n}")
                    }
                })
                .collect();

            let mut best_fitness = 0.0_f64;
            let mut best_prods: Vec<&Production> = Vec::new();

            for prod in prods {
                let candidate =
                    terminate_rhs(grammar, &prod.rhs, rng, 0, limits.max_terminate_depth)?;
                let score = fitness(&mut cache, &prefix, &candidate)?;

                if score > best_fitness {
                    best_prods.clear();
                }
                if score >= best_fitness {
                    best_fitness = score;
                    best_prods.push(prod);
                    if best_fitness >= 1.0 {
                        break;
                    }
                }
            }

            debug!("{lhs}: best_fitness={best_fitness} candidates={}", best_prods.len());

            match best_prods.len() {
                0 => prods.last().cloned().expect("grammar rule must have at least one production"),
                1 => best_prods[0].clone(),
                n => best_prods[rng.gen_range(0..n)].clone(),
            }
        };

        sentence.splice(i..=i, chosen.rhs.iter().cloned());
        cursor = next_nonterminal(&sentence, i);
    }

    Ok(sentence)
}

/// Finds the index of the first [`Symbol::Nonterminal`] at or after
/// `start`. Must start from `start` (not `start + 1`) because an
/// expansion may insert zero symbols, leaving the next nonterminal (if
/// any) at the same index.
fn next_nonterminal(sentence: &[Symbol], start: usize) -> Option<usize> {
    sentence[start.min(sentence.len())..]
        .iter()
        .position(|s| matches!(s, Symbol::Nonterminal(_)))
        .map(|offset| offset + start.min(sentence.len()))
}

/// Recursively resolves `rhs` to a flat sequence of terminal lexemes for
/// a fitness probe. A nonterminal resolves via its `to_terminal` shortcut
/// if one exists; otherwise via its own productions, sampled
/// stochastically if they have a valid distribution, or deterministically
/// via the *last* listed production otherwise — a permissive fallback
/// matching the grammar-author convention of placing the "empty" rule
/// last.
fn terminate_rhs(
    grammar: &Grammar,
    rhs: &[Symbol],
    rng: &mut impl Rng,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<String>, BrickError> {
    let mut out = Vec::new();
    for sym in rhs {
        out.extend(terminate_symbol(grammar, sym, rng, depth, max_depth)?);
    }
    Ok(out)
}

fn terminate_symbol(
    grammar: &Grammar,
    sym: &Symbol,
    rng: &mut impl Rng,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<String>, BrickError> {
    if depth > max_depth {
        return Err(BrickError::GenerationLimitExceeded { sentence_len: depth, limit: max_depth });
    }

    match sym {
        Symbol::Terminal(t) => Ok(vec![t.to_string()]),
        Symbol::Nonterminal(name) => {
            if let Some(terms) = grammar.to_terminal(name) {
                return Ok(terms.iter().map(SmolStr::to_string).collect());
            }

            let prods = grammar.productions_for(name);
            if prods.is_empty() {
                return Ok(Vec::new());
            }

            let prod = if prods.len() == 1 {
                &prods[0]
            } else if grammar.has_valid_distribution(name) {
                sample_weighted(rng, prods)
            } else {
                prods.last().unwrap()
            };

            terminate_rhs(grammar, &prod.rhs, rng, depth + 1, max_depth)
        }
    }
}

/// Samples one production weighted by its probability (cumulative-sum
/// scan).
fn sample_weighted<'a>(rng: &mut impl Rng, prods: &'a [Production]) -> &'a Production {
    let total: f64 = prods.iter().map(|p| p.probability).sum();
    let mut choice = rng.gen::<f64>() * total;
    for p in prods {
        if choice < p.probability {
            return p;
        }
        choice -= p.probability;
    }
    prods.last().expect("sample_weighted called with no productions")
}
