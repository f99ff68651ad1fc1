//! LDraw file serialization: renders placed [`Element`]s as LDraw type-1
//! (sub-file reference) lines, one bounded by a `0 STEP` meta-command.
//!
//! This is the crate's one genuine external-facing wire format, so unlike
//! the placement language's `Display` impls elsewhere it is byte-exact,
//! with the rotation matrix coming from
//! [`crate::vector::rotation_matrix_ldraw`].

use crate::error::BrickError;
use crate::interpreter::Element;
use crate::state::State;
use crate::vector::{rotation_index_from_ldraw, rotation_matrix_ldraw, Vec3};

/// LDraw units per lattice unit along X and Z (stud spacing).
const LDU_PER_STUD: i64 = 10;
/// LDraw units per lattice unit along Y (plate height).
const LDU_PER_PLATE: i64 = 8;

/// Renders one element as `1 <color> <X> <Y> <Z> <3x3 matrix> <part>.dat`
/// followed by `0 STEP`, with lattice coordinates scaled to LDraw units.
fn to_ldraw_lines(el: &Element) -> String {
    format!(
        "1 {} {} {} {} {} {}.dat\n0 STEP\n",
        el.state.color,
        el.state.pos.x * LDU_PER_STUD,
        el.state.pos.y * LDU_PER_PLATE,
        el.state.pos.z * LDU_PER_STUD,
        rotation_matrix_ldraw(el.state.rot),
        el.part_id,
    )
}

/// Renders a full sequence of elements as an LDraw file body, in
/// placement order.
pub fn to_ldraw(elements: &[Element]) -> String {
    elements.iter().map(to_ldraw_lines).collect()
}

/// Parses one LDraw type-1 line back into an [`Element`], converting its
/// coordinates back from LDraw units to lattice coordinates. `0 STEP`
/// lines (and any other non-type-1 line) are not handled here — see
/// [`parse_ldraw`] for the line filter. Only understands lines this
/// module itself could have emitted (color, position, and one of the
/// four fixed cardinal rotations) — not a general LDraw reader.
pub fn parse_ldraw_line(line: &str) -> Result<Element, BrickError> {
    let line = line.trim();
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 14 || fields[0] != "1" {
        return Err(BrickError::LexError(line.to_string()));
    }

    let color: u32 = fields[1].parse().map_err(|_| BrickError::LexError(line.to_string()))?;
    let ldu_x: i64 = fields[2].parse().map_err(|_| BrickError::LexError(line.to_string()))?;
    let ldu_y: i64 = fields[3].parse().map_err(|_| BrickError::LexError(line.to_string()))?;
    let ldu_z: i64 = fields[4].parse().map_err(|_| BrickError::LexError(line.to_string()))?;

    if ldu_x % LDU_PER_STUD != 0 || ldu_y % LDU_PER_PLATE != 0 || ldu_z % LDU_PER_STUD != 0 {
        return Err(BrickError::LexError(format!("off-lattice LDraw position in: {line}")));
    }

    let matrix = fields[5..14].join(" ");
    let rot = rotation_index_from_ldraw(&matrix)
        .ok_or_else(|| BrickError::LexError(format!("unrecognized rotation in: {line}")))?;

    let part_field = fields[13];
    let part_id = part_field
        .strip_suffix(".dat")
        .ok_or_else(|| BrickError::LexError(line.to_string()))?
        .to_string();

    let pos = Vec3::new(ldu_x / LDU_PER_STUD, ldu_y / LDU_PER_PLATE, ldu_z / LDU_PER_STUD);
    Ok(Element { state: State { pos, rot, color }, part_id })
}

/// Parses a full LDraw file body written by [`to_ldraw`] back into its
/// elements, ignoring `0 STEP` (and any other non-type-1) lines.
pub fn parse_ldraw(text: &str) -> Result<Vec<Element>, BrickError> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("0 "))
        .map(parse_ldraw_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(part_id: &str, pos: Vec3, rot: u8, color: u32) -> Element {
        Element { state: State { pos, rot, color }, part_id: part_id.to_string() }
    }

    #[test]
    fn renders_single_element_scaled_and_step_terminated() {
        let elements = vec![el("3005", Vec3::new(0, -3, 0), 0, 4)];
        let rendered = to_ldraw(&elements);
        assert_eq!(rendered, "1 4 0 -24 0 1 0 0 0 1 0 0 0 1 3005.dat\n0 STEP\n");
    }

    /// Each fixture part id round-trips through a render/parse cycle at
    /// the same lattice coordinates.
    #[test]
    fn round_trips_all_fixture_parts_at_origin() {
        let part_ids = ["3005", "3024", "3003", "3004", "3001", "3022"];
        let elements: Vec<Element> =
            part_ids.iter().map(|id| el(id, Vec3::new(0, 0, 0), 0, 0)).collect();

        let rendered = to_ldraw(&elements);
        let parsed = parse_ldraw(&rendered).unwrap();
        assert_eq!(parsed, elements);
    }

    #[test]
    fn round_trips_nonzero_positions_and_rotations() {
        let part_ids = ["3005", "3024", "3003", "3004", "3001", "3022"];
        let elements: Vec<Element> = part_ids
            .iter()
            .enumerate()
            .map(|(i, id)| el(id, Vec3::new(i as i64, -(i as i64), i as i64), (i % 4) as u8, i as u32))
            .collect();

        let rendered = to_ldraw(&elements);
        let parsed = parse_ldraw(&rendered).unwrap();
        assert_eq!(parsed, elements);
    }

    #[test]
    fn rejects_malformed_line() {
        assert!(parse_ldraw_line("not an ldraw line").is_err());
    }
}
