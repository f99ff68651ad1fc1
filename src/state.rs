//! Per-scope kinematic state: position, rotation index, and color.

use crate::vector::{apply_rotation, rotation_matrix, Vec3};

/// The five-tuple (x, y, z, rotation_index, color).
///
/// `rot` is always in `{0, 1, 2, 3}`; `color` is a caller-defined
/// palette index with no further interpretation by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    pub pos: Vec3,
    pub rot: u8,
    pub color: u32,
}

impl State {
    /// The base state a fresh state stack starts with: origin, no
    /// rotation, color 1.
    pub fn origin() -> Self {
        Self { pos: Vec3::new(0, 0, 0), rot: 0, color: 1 }
    }
}

/// Returns a new state displaced by `delta`, rotated by the state's
/// current rotation index. Rotation and color are preserved.
pub fn move_state(s: State, delta: Vec3) -> State {
    let rotated = apply_rotation(delta, rotation_matrix(s.rot));
    State { pos: s.pos + rotated, rot: s.rot, color: s.color }
}
