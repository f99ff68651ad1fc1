use argh::FromArgs;
use brickgrammar::generator::{generate, GenerationLimits};
use brickgrammar::grammar::load_grammar;
use brickgrammar::ldraw::to_ldraw;
use brickgrammar::parse_cache::ParseCache;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ffi::OsString;
use std::fs;

/// Generate a brick model from a PCFG grammar file
#[derive(FromArgs)]
#[argh(subcommand, name = "generate")]
pub struct Generate {
    /// grammar file (one rule per line)
    #[argh(option, short = 'g')]
    grammar: OsString,

    /// RNG seed, for reproducible output
    #[argh(option, short = 's')]
    seed: Option<u64>,

    /// maximum sentence length before giving up
    #[argh(option, default = "10_000")]
    max_sentence_len: usize,

    /// maximum terminal-resolution recursion depth during a fitness probe
    #[argh(option, default = "256")]
    max_terminate_depth: usize,

    /// output format: "ldraw" (default) or "tokens"
    #[argh(option, short = 'o', default = "String::from(\"ldraw\")")]
    out_format: String,
}

impl Generate {
    pub fn run(self) -> i32 {
        let text = match fs::read_to_string(&self.grammar) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error: could not read grammar file {:?}: {e}", self.grammar);
                return 1;
            }
        };

        let grammar = match load_grammar(&text) {
            Ok(g) => g,
            Err(e) => {
                eprintln!("Error: {e}");
                return 2;
            }
        };

        let limits = GenerationLimits {
            max_sentence_len: self.max_sentence_len,
            max_terminate_depth: self.max_terminate_depth,
        };

        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        let sentence = match generate(&grammar, &limits, &mut rng) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        };

        info!("generated sentence of {} tokens", sentence.len());

        let tokens: Vec<String> = sentence.iter().map(|s| s.to_string()).collect();
        match self.out_format.as_str() {
            "tokens" => println!("{}", tokens.join(" ")),
            "ldraw" => {
                let ops: Vec<String> = sentence
                    .iter()
                    .map(|s| match s {
                        brickgrammar::grammar::Symbol::Terminal(t) => t.to_string(),
                        brickgrammar::grammar::Symbol::Nonterminal(n) => {
                            unreachable!("generated sentence still has nonterminal {n}")
                        }
                    })
                    .collect();
                let mut cache = ParseCache::new();
                match cache.parse(&ops) {
                    Ok((elements, _, _)) => print!("{}", to_ldraw(&elements)),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return 1;
                    }
                }
            }
            other => {
                eprintln!("Error: unknown output format {other:?}");
                return 1;
            }
        }

        0
    }
}
