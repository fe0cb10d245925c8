//! Placement enumeration: every way a piece's orientations can translate
//! onto the board without leaving the required cells.

use rustc_hash::FxHashSet;

use crate::geometry::{orientations, Cell};
use crate::pieces::Piece;

/// One way to place a piece: a unique id, the piece it belongs to, and the
/// sorted absolute cells it would occupy.
#[derive(Debug, Clone)]
pub struct Placement {
    pub id: usize,
    pub piece_id: u32,
    pub cells: Vec<Cell>,
}

/// Enumerates every placement of `piece` that fits on a `width`x`height`
/// board and lands entirely within `required`.
///
/// Enumeration order is orientation-outer, `dy`-inner-innermost (matching
/// dx-outer, dy-inner), so the row order downstream is deterministic. `next_id`
/// is the first id to assign; placements are numbered consecutively from
/// it so ids stay unique across a whole solve's worth of pieces.
pub fn placements_for_piece(
    piece: &Piece,
    required: &FxHashSet<Cell>,
    width: usize,
    height: usize,
    next_id: &mut usize,
) -> Vec<Placement> {
    let mut out = Vec::new();
    let width = width as i32;
    let height = height as i32;

    for orientation in orientations(&piece.shape) {
        let min_x = orientation.iter().map(|&(x, _)| x).min().unwrap();
        let max_x = orientation.iter().map(|&(x, _)| x).max().unwrap();
        let min_y = orientation.iter().map(|&(_, y)| y).min().unwrap();
        let max_y = orientation.iter().map(|&(_, y)| y).max().unwrap();

        for dx in -min_x..(width - max_x) {
            for dy in -min_y..(height - max_y) {
                let mut cells: Vec<Cell> =
                    orientation.iter().map(|&(x, y)| (x + dx, y + dy)).collect();

                if cells.iter().all(|c| required.contains(c)) {
                    cells.sort();
                    out.push(Placement {
                        id: *next_id,
                        piece_id: piece.id,
                        cells,
                    });
                    *next_id += 1;
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::demo_trominoes;

    fn all_cells(width: usize, height: usize) -> FxHashSet<Cell> {
        let mut set = FxHashSet::default();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                set.insert((x, y));
            }
        }
        set
    }

    #[test]
    fn placements_stay_in_bounds() {
        let pieces = demo_trominoes();
        let required = all_cells(3, 3);
        let mut next_id = 0;
        for piece in &pieces {
            let placements = placements_for_piece(piece, &required, 3, 3, &mut next_id);
            assert!(!placements.is_empty());
            for placement in &placements {
                for &(x, y) in &placement.cells {
                    assert!((0..3).contains(&x) && (0..3).contains(&y));
                }
            }
        }
    }

    #[test]
    fn ids_are_unique_and_monotonic_across_pieces() {
        let pieces = demo_trominoes();
        let required = all_cells(3, 3);
        let mut next_id = 0;
        let mut all_ids = Vec::new();
        for piece in &pieces {
            let placements = placements_for_piece(piece, &required, 3, 3, &mut next_id);
            all_ids.extend(placements.iter().map(|p| p.id));
        }
        let mut sorted = all_ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), all_ids.len());
        assert_eq!(sorted, all_ids);
    }

    #[test]
    fn rejects_placements_outside_required() {
        let piece = &demo_trominoes()[0];
        // only half the board is required; some placements must be rejected
        let mut required = FxHashSet::default();
        required.insert((0, 0));
        required.insert((1, 0));
        let mut next_id = 0;
        let placements = placements_for_piece(piece, &required, 3, 3, &mut next_id);
        assert!(placements.is_empty());
    }
}
