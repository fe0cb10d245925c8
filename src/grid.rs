//! Board representation and cell-enumeration helpers.
//!
//! A board is a row-major `Vec<Vec<u32>>` of `H` rows by `W` columns; each
//! entry is a piece id, or `0` for empty.

use crate::geometry::Cell;
use crate::pieces::EMPTY_ID;

/// A board state: `H` rows of `W` piece ids (`0` = empty).
pub type Board = Vec<Vec<u32>>;

/// Builds an all-empty board of the given dimensions.
pub fn empty_board(width: usize, height: usize) -> Board {
    vec![vec![EMPTY_ID; width]; height]
}

/// Normalizes a possibly null/ragged partial board: missing rows or cells
/// are treated as `0`.
pub fn normalize_board(partial: Option<&Board>, width: usize, height: usize) -> Board {
    let mut board = empty_board(width, height);
    if let Some(partial) = partial {
        for (y, row) in board.iter_mut().enumerate() {
            if let Some(src_row) = partial.get(y) {
                for (x, cell) in row.iter_mut().enumerate() {
                    if let Some(&id) = src_row.get(x) {
                        *cell = id;
                    }
                }
            }
        }
    }
    board
}

/// Returns the set of occupied cells and the set of already-placed piece ids.
pub fn occupied_cells(board: &Board) -> (rustc_hash::FxHashSet<Cell>, rustc_hash::FxHashSet<u32>) {
    let mut occupied = rustc_hash::FxHashSet::default();
    let mut placed_ids = rustc_hash::FxHashSet::default();
    for (y, row) in board.iter().enumerate() {
        for (x, &id) in row.iter().enumerate() {
            if id != EMPTY_ID {
                occupied.insert((x as i32, y as i32));
                placed_ids.insert(id);
            }
        }
    }
    (occupied, placed_ids)
}

/// Enumerates the cells not in `occupied`, in row-major order (`y` outer,
/// `x` inner). This fixes the required-cell column order, which is otherwise unspecified, for
/// the constraint matrix's per-cell columns.
pub fn required_positions(
    width: usize,
    height: usize,
    occupied: &rustc_hash::FxHashSet<Cell>,
) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(width * height - occupied.len());
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let cell = (x, y);
            if !occupied.contains(&cell) {
                cells.push(cell);
            }
        }
    }
    cells
}

/// Overlays placements onto a clone of `base`, stamping each cell with its
/// piece id. Panics if a cell is out of bounds; callers only ever pass
/// placements produced by the placement enumerator, which guarantees this.
pub fn stamp_placements(base: &Board, placements: &[(u32, Vec<Cell>)]) -> Board {
    let mut board = base.clone();
    for (piece_id, cells) in placements {
        for &(x, y) in cells {
            board[y as usize][x as usize] = *piece_id;
        }
    }
    board
}

/// Renders a board as a human-readable grid, one line per row, piece ids in
/// hex-ish single characters (`.` for empty, `0`-`9` then `A`-`Z`).
pub fn format_board(board: &Board) -> String {
    let mut out = String::new();
    for row in board {
        for &id in row {
            let ch = if id == EMPTY_ID {
                '.'
            } else if id < 10 {
                char::from(b'0' + id as u8)
            } else if id < 36 {
                char::from(b'A' + (id - 10) as u8)
            } else {
                '?'
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}
