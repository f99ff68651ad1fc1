//! The incremental parser cache: holds at most one previously-parsed
//! operation sequence so that extending it by one lexeme costs O(1)
//! applied operations instead of a full re-parse.
//!
//! This is the optimization that makes each fitness probe O(|new
//! tokens|) rather than O(|sentence|).

use crate::error::BrickError;
use crate::interpreter::{exec_ops, Element};
use crate::lexer::get_token;
use crate::state::State;
use crate::voxel::VoxelImage;

#[derive(Clone)]
struct CacheEntry {
    ops_prefix: Vec<String>,
    elements: Vec<Element>,
    image: VoxelImage,
    stack: Vec<State>,
}

/// Holds the single retained parse. Not `Sync`/shared across
/// generations — each generation owns its own cache.
#[derive(Default)]
pub struct ParseCache {
    entry: Option<CacheEntry>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Returns `(elements, image, stack)` such that executing `ops` from
    /// the empty initial state yields them.
    ///
    /// If `ops` extends the cached prefix by exactly one lexeme, only
    /// that lexeme is applied to a clone of the cached triple. Otherwise
    /// this recomputes recursively via `parse(ops[:-1])` then applies
    /// the final lexeme.
    pub fn parse(
        &mut self,
        ops: &[String],
    ) -> Result<(Vec<Element>, VoxelImage, Vec<State>), BrickError> {
        if ops.is_empty() {
            let image = VoxelImage::new();
            let stack = vec![State::origin()];
            self.entry = Some(CacheEntry {
                ops_prefix: Vec::new(),
                elements: Vec::new(),
                image: image.clone(),
                stack: stack.clone(),
            });
            return Ok((Vec::new(), image, stack));
        }

        let (head, last) = ops.split_at(ops.len() - 1);
        let last = &last[0];

        if let Some(entry) = self.entry.as_ref() {
            if entry.ops_prefix == head {
                let mut image = entry.image.clone();
                let mut stack = entry.stack.clone();
                let mut elements = entry.elements.clone();
                let op = get_token(last)?;
                elements.extend(exec_ops(&mut image, &mut stack, &[op], false)?);
                self.entry = Some(CacheEntry {
                    ops_prefix: ops.to_vec(),
                    elements: elements.clone(),
                    image: image.clone(),
                    stack: stack.clone(),
                });
                return Ok((elements, image, stack));
            }
        }

        let (mut elements, mut image, mut stack) = self.parse(head)?;
        let op = get_token(last)?;
        elements.extend(exec_ops(&mut image, &mut stack, &[op], false)?);
        self.entry = Some(CacheEntry {
            ops_prefix: ops.to_vec(),
            elements: elements.clone(),
            image: image.clone(),
            stack: stack.clone(),
        });
        Ok((elements, image, stack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    /// Two calls to parse with the prefix reused must cause at most one
    /// additional operation to be executed on the second call. We can't
    /// observe op counts directly from the outside, but we can observe
    /// that the result is identical to a from-scratch parse, which is
    /// the externally-visible contract the cache must uphold.
    #[test]
    fn extending_prefix_matches_full_reparse() {
        let mut incremental = ParseCache::new();
        let (_, _, stack1) = incremental.parse(&toks("Move(1,0,0)")).unwrap();
        let (_, _, stack2) = incremental.parse(&toks("Move(1,0,0) Move(1,0,0)")).unwrap();

        let mut fresh = ParseCache::new();
        let (_, _, stack_fresh) = fresh.parse(&toks("Move(1,0,0) Move(1,0,0)")).unwrap();

        assert_eq!(stack2, stack_fresh);
        assert_ne!(stack1, stack2);
    }

    #[test]
    fn non_extending_call_rebuilds_from_scratch() {
        let mut cache = ParseCache::new();
        cache.parse(&toks("Move(1,0,0)")).unwrap();
        let (_, _, stack) = cache.parse(&toks("Move(2,0,0)")).unwrap();
        assert_eq!(stack[0].pos, crate::vector::Vec3::new(2, 0, 0));
    }

    /// Filling a rect then placing a part yields one element and the
    /// expected lattice point count, reached through the cache entry
    /// point rather than a direct interpreter call. Matches spec
    /// scenario S3: `((0,0,0,0,1), '3005')` — base-state color is 1.
    #[test]
    fn parse_fill_then_place() {
        let mut cache = ParseCache::new();
        let (elements, image, _) = cache.parse(&toks("FillRect(2,3,2) Place(3005)")).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].part_id, "3005");
        assert_eq!(elements[0].state.color, 1);
        assert_eq!(image.len(), 12);
    }
}
