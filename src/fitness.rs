//! The spatial fitness function: binary fitness, used by the generator
//! to filter out physically invalid continuations.
//!
//! Fitness itself carries no preference between valid continuations —
//! that's the grammar's job, via production probabilities.

use crate::error::BrickError;
use crate::interpreter::exec_ops;
use crate::lexer::get_token;
use crate::parse_cache::ParseCache;

/// Dry-runs `candidate_tokens` against the state reached after
/// `prefix_tokens` (resolved through `cache`). Returns `1.0` if the
/// candidate causes no collision or failed assertion, `0.0` otherwise.
/// Any other error (malformed lexeme, unknown op, stack underflow)
/// propagates rather than being folded into the score.
pub fn fitness(
    cache: &mut ParseCache,
    prefix_tokens: &[String],
    candidate_tokens: &[String],
) -> Result<f64, BrickError> {
    let (_, mut image, mut stack) = cache.parse(prefix_tokens)?;

    let ops: Result<Vec<_>, BrickError> = candidate_tokens.iter().map(|t| get_token(t)).collect();
    let ops = ops?;

    match exec_ops(&mut image, &mut stack, &ops, true) {
        Ok(_) => Ok(1.0),
        Err(BrickError::CollisionError(_)) | Err(BrickError::AssertionError) => Ok(0.0),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn non_colliding_candidate_scores_one() {
        let mut cache = ParseCache::new();
        let score = fitness(&mut cache, &toks(""), &toks("FillRect(2,3,2)")).unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn colliding_candidate_scores_zero() {
        let mut cache = ParseCache::new();
        let score = fitness(
            &mut cache,
            &toks("FillRect(2,3,2)"),
            &toks("FillRect(2,3,2)"),
        )
        .unwrap();
        assert_eq!(score, 0.0);
    }

    /// Fitness probes never mutate the cache's retained parse.
    #[test]
    fn fitness_probe_does_not_disturb_cache() {
        let mut cache = ParseCache::new();
        let prefix = toks("FillRect(2,3,2)");
        let (_, image_before, _) = cache.parse(&prefix).unwrap();
        fitness(&mut cache, &prefix, &toks("FillRect(2,3,2)")).unwrap();
        let (_, image_after, _) = cache.parse(&prefix).unwrap();
        assert_eq!(image_before.len(), image_after.len());
    }
}
