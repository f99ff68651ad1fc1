//! PCFG grammar representation and the line-oriented grammar-file loader.
//!
//! The in-memory shape is a map of rule name to its alternatives, plus a
//! `Display` impl that reprints something close to the source format —
//! productions over terminal lexemes rather than a character grammar.

use crate::error::BrickError;
use multimap::MultiMap;
use smol_str::SmolStr;
use std::fmt;

/// A probability sum within this much of 1.0 is treated as "this
/// nonterminal has a valid probability distribution," which makes the
/// generator sample stochastically instead of by fitness. Weighted random
/// sampling is only well-defined once weights sum to (very close to) 1.
pub const STOCHASTIC_SUM_TOLERANCE: f64 = 1e-6;

/// Probabilities for one LHS may sum to at most this before the loader
/// rejects the grammar outright — a looser check than requiring an exact
/// distribution, since most rules are written without probabilities at
/// all and rely on fitness-greedy selection instead.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 2.0;

/// Either a terminal lexeme or a reference to another rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(SmolStr),
    Nonterminal(SmolStr),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(s) => write!(f, "'{s}'"),
            Symbol::Nonterminal(s) => write!(f, "{s}"),
        }
    }
}

/// One `LHS -> RHS_1 RHS_2 ... [p]` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub lhs: SmolStr,
    pub rhs: Vec<Symbol>,
    pub probability: f64,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rhs: Vec<String> = self.rhs.iter().map(|s| s.to_string()).collect();
        write!(f, "{} -> {} [{}]", self.lhs, rhs.join(" "), self.probability)
    }
}

/// A loaded PCFG: productions grouped by LHS, plus the derived
/// `to_terminal` map for leaves that reduce to an all-terminal RHS.
#[derive(Debug, Clone)]
pub struct Grammar {
    start: SmolStr,
    productions: MultiMap<SmolStr, Production>,
    to_terminal: std::collections::HashMap<SmolStr, Vec<SmolStr>>,
}

impl Grammar {
    pub fn start(&self) -> &SmolStr {
        &self.start
    }

    /// All productions for `lhs`, in the order they were listed in the
    /// source text — the generator's fitness comparison walks this order
    /// and short-circuits on the first perfect candidate, so listing
    /// order is load-bearing, not cosmetic.
    pub fn productions_for(&self, lhs: &str) -> &[Production] {
        self.productions
            .get_vec(lhs)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The canonical all-terminal expansion of `nonterminal`, if one of
    /// its productions has an all-terminal RHS.
    pub fn to_terminal(&self, nonterminal: &str) -> Option<&[SmolStr]> {
        self.to_terminal.get(nonterminal).map(Vec::as_slice)
    }

    /// True when `lhs`'s productions carry a probability distribution
    /// that sums to (nearly) 1 — the generator's signal to sample
    /// stochastically rather than via the fitness filter.
    pub fn has_valid_distribution(&self, lhs: &str) -> bool {
        let prods = self.productions_for(lhs);
        if prods.is_empty() {
            return false;
        }
        let sum: f64 = prods.iter().map(|p| p.probability).sum();
        (sum - 1.0).abs() < STOCHASTIC_SUM_TOLERANCE
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (lhs, prods) in self.productions.iter_all() {
            let alts: Vec<String> = prods
                .iter()
                .map(|p| {
                    let rhs: Vec<String> = p.rhs.iter().map(|s| s.to_string()).collect();
                    format!("{} [{}]", rhs.join(" "), p.probability)
                })
                .collect();
            writeln!(f, "{} -> {}", lhs, alts.join(" | "))?;
        }
        Ok(())
    }
}

/// Parses grammar source text into a [`Grammar`].
///
/// Line shape: `LHS -> RHS_1 RHS_2 ... [p]`, blank lines ignored, `|`
/// joins alternatives sharing one LHS and each gets its own trailing
/// `[p]`. A line missing `[p]` is treated as `[0]`. The start symbol is
/// the LHS of the first rule.
pub fn load_grammar(text: &str) -> Result<Grammar, BrickError> {
    let mut productions: Vec<Production> = Vec::new();
    let mut start: Option<SmolStr> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let (lhs_str, rhs_str) = line
            .split_once("->")
            .ok_or_else(|| BrickError::LexError(format!("missing '->' in rule: {line}")))?;
        let lhs = SmolStr::new(lhs_str.trim());
        if start.is_none() {
            start = Some(lhs.clone());
        }

        for alt in rhs_str.split('|') {
            productions.push(parse_alternative(&lhs, alt)?);
        }
    }

    let start = start.ok_or_else(|| BrickError::LexError("empty grammar".to_string()))?;

    let mut by_lhs: MultiMap<SmolStr, Production> = MultiMap::new();
    for p in &productions {
        by_lhs.insert(p.lhs.clone(), p.clone());
    }

    for (lhs, prods) in by_lhs.iter_all() {
        let sum: f64 = prods.iter().map(|p| p.probability).sum();
        if sum > PROBABILITY_SUM_TOLERANCE {
            return Err(BrickError::InvalidProbability { lhs: lhs.to_string(), sum });
        }
    }

    let mut to_terminal = std::collections::HashMap::new();
    for (lhs, prods) in by_lhs.iter_all() {
        for p in prods {
            if p.rhs.iter().all(|s| matches!(s, Symbol::Terminal(_))) {
                let terms: Vec<SmolStr> = p
                    .rhs
                    .iter()
                    .map(|s| match s {
                        Symbol::Terminal(t) => t.clone(),
                        Symbol::Nonterminal(_) => unreachable!(),
                    })
                    .collect();
                to_terminal.insert(lhs.clone(), terms);
            }
        }
    }

    Ok(Grammar { start, productions: by_lhs, to_terminal })
}

/// Parses one `|`-separated alternative, including its optional
/// trailing `[p]`.
fn parse_alternative(lhs: &SmolStr, alt: &str) -> Result<Production, BrickError> {
    let alt = alt.trim();

    let (body, probability) = if let Some(open) = alt.rfind('[') {
        if !alt.ends_with(']') {
            return Err(BrickError::LexError(format!("unterminated probability in: {alt}")));
        }
        let body = alt[..open].trim();
        let prob_str = &alt[open + 1..alt.len() - 1];
        let prob = prob_str
            .trim()
            .parse::<f64>()
            .map_err(|_| BrickError::LexError(format!("bad probability in: {alt}")))?;
        (body, prob)
    } else {
        (alt, 0.0)
    };

    let rhs = if body.is_empty() {
        Vec::new()
    } else {
        body.split_whitespace().map(parse_symbol).collect()
    };

    Ok(Production { lhs: lhs.clone(), rhs, probability })
}

fn parse_symbol(tok: &str) -> Symbol {
    if tok.len() >= 2 && tok.starts_with('\'') && tok.ends_with('\'') {
        Symbol::Terminal(SmolStr::new(&tok[1..tok.len() - 1]))
    } else {
        Symbol::Nonterminal(SmolStr::new(tok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn loads_probability_free_rule_as_zero() {
        let g = load_grammar("Start -> 'a'").unwrap();
        assert_eq!(g.productions_for("Start")[0].probability, 0.0);
    }

    #[test]
    fn loads_explicit_probabilities() {
        let g = load_grammar("Start -> 'a' [.3] | 'b' [.7]").unwrap();
        let prods = g.productions_for("Start");
        assert_eq!(prods.len(), 2);
        assert_eq!(prods[0].probability, 0.3);
        assert_eq!(prods[1].probability, 0.7);
        assert!(g.has_valid_distribution("Start"));
    }

    #[test]
    fn empty_rhs_is_legal_and_nullable() {
        let g = load_grammar("Start -> ").unwrap();
        assert_eq!(g.productions_for("Start")[0].rhs, Vec::new());
    }

    #[test]
    fn start_symbol_is_lhs_of_first_rule() {
        let g = load_grammar(indoc! {"
            Stud -> '(' 'Move(0,-3,0)' 'FillRect(2,3,2)' 'Place(3005)' Stud ')'
            Stud ->
        "})
        .unwrap();
        assert_eq!(g.start(), "Stud");
        assert_eq!(g.productions_for("Stud").len(), 2);
    }

    #[test]
    fn to_terminal_only_covers_all_terminal_rhs() {
        let g = load_grammar(indoc! {"
            A -> 'x' 'y'
            B -> A 'z'
        "})
        .unwrap();
        assert!(g.to_terminal("A").is_some());
        assert!(g.to_terminal("B").is_none());
    }

    /// When a nonterminal has more than one all-terminal alternative, the
    /// *last* one listed wins, matching the original's per-production
    /// assignment (`grammar.to_terminal[lhs] = rhs`) rather than
    /// first-one-kept.
    #[test]
    fn to_terminal_prefers_last_all_terminal_production() {
        let g = load_grammar("X -> 'a' | 'b'").unwrap();
        assert_eq!(g.to_terminal("X"), Some(&[SmolStr::new("b")][..]));
    }

    #[test]
    fn probabilities_need_not_sum_to_one() {
        let g = load_grammar("Start -> 'a' [0.9] | 'b' [0.9]").unwrap();
        assert!(!g.has_valid_distribution("Start"));
    }

    #[test]
    fn wildly_invalid_probability_sum_is_rejected() {
        let err = load_grammar("Start -> 'a' [3.0] | 'b' [3.0]").unwrap_err();
        assert!(matches!(err, BrickError::InvalidProbability { .. }));
    }
}
