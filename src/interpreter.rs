//! The placement interpreter: executes an operation sequence against a
//! state stack and a voxel image, with a dry-run mode for fitness probes.
//!
//! Dispatch is by tagged variant (`Operation`), matched directly rather
//! than through any inheritance hierarchy.

use crate::error::BrickError;
use crate::lexer::Operation;
use crate::state::{move_state, State};
use crate::vector::Vec3;
use crate::voxel::VoxelImage;

/// A placed part: the state captured at placement time, and the opaque
/// part id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub state: State,
    pub part_id: String,
}

/// The size `AssertFilled` probes.
const ASSERT_FILLED_PROBE_SIZE: Vec3 = Vec3::new(2, 1, 2);

/// The radius of the bounding sphere injected the first time a generation
/// would otherwise leave the image empty.
const DEFAULT_BOUNDING_SPHERE_RADIUS: i64 = 8;

/// Executes `ops` against `image` and `stack`.
///
/// When `dry_run` is true, neither `image` nor `stack` is mutated:
/// internally a clone absorbs every mutation and is discarded. When
/// false, both are mutated in place and the mutation is observable to
/// the caller on success; on any error the fill that failed is
/// guaranteed not to have partially applied, but operations before it in
/// the sequence have already committed (operations are a total order,
/// not a single transaction spanning the whole call).
pub fn exec_ops(
    image: &mut VoxelImage,
    stack: &mut Vec<State>,
    ops: &[Operation],
    dry_run: bool,
) -> Result<Vec<Element>, BrickError> {
    if dry_run {
        let mut image_clone = image.clone();
        let mut stack_clone = stack.clone();
        run_ops(&mut image_clone, &mut stack_clone, ops, true)
    } else {
        run_ops(image, stack, ops, false)
    }
}

fn run_ops(
    image: &mut VoxelImage,
    stack: &mut Vec<State>,
    ops: &[Operation],
    dry_run: bool,
) -> Result<Vec<Element>, BrickError> {
    let mut elements = Vec::new();

    for op in ops {
        let top = *stack.last().expect("state stack must never be empty");

        match op {
            Operation::Push => stack.push(top),
            Operation::Pop => {
                if stack.len() <= 1 {
                    return Err(BrickError::StackUnderflow);
                }
                stack.pop();
            }
            Operation::Move(delta) => {
                *stack.last_mut().unwrap() = move_state(top, *delta);
            }
            Operation::Rotate(theta) => {
                let steps = theta.div_euclid(90);
                let new_rot = (top.rot as i64 + steps).rem_euclid(4) as u8;
                stack.last_mut().unwrap().rot = new_rot;
            }
            Operation::SetColor(color) => {
                stack.last_mut().unwrap().color = *color;
            }
            Operation::Place(part_id) => {
                elements.push(Element { state: top, part_id: part_id.clone() });
            }
            Operation::FillRect(size) => {
                image.fill_rect(top, *size, dry_run, true)?;
            }
            Operation::FillRectNoCheck(size) => {
                image.fill_rect(top, *size, dry_run, false)?;
            }
            Operation::PlaceBoundingBox(size) => {
                image.add_bounding_box(*size, top.pos);
            }
            Operation::PlaceBoundingSphere(r) => {
                image.add_bounding_sphere(*r);
            }
            // Inverted contract: a probe fill that succeeds means the
            // cell was empty, which is the failure case here. Only a
            // probe that collides (the cell is already filled) counts
            // as a passing assertion.
            Operation::AssertFilled => {
                match image.fill_rect(top, ASSERT_FILLED_PROBE_SIZE, true, true) {
                    Ok(()) => return Err(BrickError::AssertionError),
                    Err(BrickError::CollisionError(_)) => {}
                    Err(other) => return Err(other),
                }
            }
        }

        if image.is_empty() {
            image.add_bounding_sphere(DEFAULT_BOUNDING_SPHERE_RADIUS);
        }
    }

    Ok(elements)
}
