//! The voxel occupancy image: a set of integer lattice points with
//! transactional rectangular fill and collision detection.

use crate::error::BrickError;
use crate::state::State;
use crate::vector::{apply_rotation, rotation_matrix, Vec3};
use std::collections::HashSet;

/// Set of occupied integer lattice points. Membership is the sole source
/// of truth for occupancy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoxelImage {
    voxels: HashSet<Vec3>,
}

impl VoxelImage {
    pub fn new() -> Self {
        Self { voxels: HashSet::new() }
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.voxels.contains(&p)
    }

    fn insert_all(&mut self, points: &[Vec3]) {
        for p in points {
            self.voxels.insert(*p);
        }
    }

    fn union_all<I: IntoIterator<Item = Vec3>>(&mut self, points: I) {
        self.voxels.extend(points);
    }

    /// Computes the candidate lattice points for a `size`-shaped fill
    /// rooted at `origin`: the size is rotated by the origin state's
    /// rotation, x/z become half-open symmetric ranges, y spans
    /// `[0, size.y)`.
    fn candidate_points(origin: State, size: Vec3) -> Vec<Vec3> {
        let rotated = apply_rotation(size, rotation_matrix(origin.rot));
        let bx = rotated.x.abs();
        let by = rotated.y.abs();
        let bz = rotated.z.abs();

        let mut points = Vec::with_capacity((bx * by * bz).max(0) as usize);
        for x in -(bx / 2)..(bx / 2) {
            for y in 0..by {
                for z in -(bz / 2)..(bz / 2) {
                    points.push(origin.pos + Vec3::new(x, y, z));
                }
            }
        }
        points
    }

    /// Fills a rectangular region. On collision (when `check` is true),
    /// returns `Err` with no mutation performed. When `dry_run` is
    /// true, the collision check still runs but no mutation occurs
    /// regardless of the outcome.
    pub fn fill_rect(
        &mut self,
        origin: State,
        size: Vec3,
        dry_run: bool,
        check: bool,
    ) -> Result<(), BrickError> {
        let points = Self::candidate_points(origin, size);

        if check {
            if let Some(collision) = points.iter().find(|p| self.voxels.contains(p)) {
                return Err(BrickError::CollisionError(format!(
                    "({}, {}, {})",
                    collision.x, collision.y, collision.z
                )));
            }
        }

        if !dry_run {
            self.insert_all(&points);
        }
        Ok(())
    }

    /// Inserts a hollow spherical shell of the given radius, centered at
    /// the lattice origin — not at the current placement state, so this
    /// op is not affected by any prior `Move`/`Rotate`.
    pub fn add_bounding_sphere(&mut self, r: i64) {
        let mut shell = Vec::new();
        for x in -r..r {
            for y in -r..r {
                for z in -r..r {
                    let dist_sq = (x * x + y * y + z * z) as f64;
                    if (dist_sq.sqrt().ceil() as i64) == r {
                        shell.push(Vec3::new(x, y, z));
                    }
                }
            }
        }
        self.union_all(shell);
    }

    /// Inserts every point on the six faces of a box of half-extents
    /// `size`, centered at `center`.
    pub fn add_bounding_box(&mut self, size: Vec3, center: Vec3) {
        let mut shell = Vec::new();
        for x in -size.x - 1..=size.x {
            for y in -size.y - 1..=size.y {
                for z in -size.z - 1..=size.z {
                    let on_face = x == size.x
                        || x == -size.x - 1
                        || y == size.y
                        || y == -size.y - 1
                        || z == size.z
                        || z == -size.z - 1;
                    if on_face {
                        shell.push(center + Vec3::new(x, y, z));
                    }
                }
            }
        }
        self.union_all(shell);
    }
}
