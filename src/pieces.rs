//! Puzzle piece definitions.
//!
//! Each piece is defined by a base shape in relative coordinates, normalized
//! so its minimum coordinates sit at the origin.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::geometry::{canonicalize, Cell, Shape};

/// Id reserved to mean "empty cell" on a board. No piece may use it.
pub const EMPTY_ID: u32 = 0;

/// A puzzle piece: a unique id, an informational name, a base shape, and an
/// opaque display color passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: u32,
    pub name: String,
    pub shape: Shape,
    pub color: String,
}

impl Piece {
    /// Creates a piece, canonicalizing its shape.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        shape: &[Cell],
        color: impl Into<String>,
    ) -> Result<Self> {
        if id == EMPTY_ID {
            return Err(SolverError::InvalidInput(
                "piece id 0 is reserved for empty cells".to_string(),
            ));
        }
        if shape.is_empty() {
            return Err(SolverError::InvalidInput(format!(
                "piece {id} has an empty shape"
            )));
        }
        Ok(Piece {
            id,
            name: name.into(),
            shape: canonicalize(shape),
            color: color.into(),
        })
    }
}

/// Validates a piece set: unique ids, all ids non-zero, no empty shapes.
pub fn validate_pieces(pieces: &[Piece]) -> Result<()> {
    let mut seen = rustc_hash::FxHashSet::default();
    for piece in pieces {
        if piece.id == EMPTY_ID {
            return Err(SolverError::InvalidInput(
                "piece id 0 is reserved for empty cells".to_string(),
            ));
        }
        if piece.shape.is_empty() {
            return Err(SolverError::InvalidInput(format!(
                "piece {} has an empty shape",
                piece.id
            )));
        }
        if !seen.insert(piece.id) {
            return Err(SolverError::InvalidInput(format!(
                "duplicate piece id {}",
                piece.id
            )));
        }
    }
    Ok(())
}

/// A small demo piece set: one straight tromino and two corner trominoes,
/// which tile a 3x3 board 16 ways under rotation and reflection.
pub fn demo_trominoes() -> Vec<Piece> {
    vec![
        Piece::new(1, "I-tromino", &[(0, 0), (1, 0), (2, 0)], "#e74c3c").unwrap(),
        Piece::new(2, "L-tromino-a", &[(0, 0), (0, 1), (1, 1)], "#2ecc71").unwrap(),
        Piece::new(3, "L-tromino-b", &[(0, 0), (0, 1), (1, 1)], "#3498db").unwrap(),
    ]
}

/// A larger demo piece set covering a 4x4 board with two square tetrominoes
/// and two S/Z tetrominoes, used by the CLI's `demo` command and benches.
pub fn demo_tetrominoes() -> Vec<Piece> {
    vec![
        Piece::new(1, "square-a", &[(0, 0), (1, 0), (0, 1), (1, 1)], "#e74c3c").unwrap(),
        Piece::new(2, "square-b", &[(0, 0), (1, 0), (0, 1), (1, 1)], "#2ecc71").unwrap(),
        Piece::new(
            3,
            "s-tetromino",
            &[(1, 0), (2, 0), (0, 1), (1, 1)],
            "#3498db",
        )
        .unwrap(),
        Piece::new(
            4,
            "z-tetromino",
            &[(0, 0), (1, 0), (1, 1), (2, 1)],
            "#f1c40f",
        )
        .unwrap(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_reserved_id() {
        assert!(Piece::new(0, "x", &[(0, 0)], "#000000").is_err());
    }

    #[test]
    fn rejects_empty_shape() {
        assert!(Piece::new(1, "x", &[], "#000000").is_err());
    }

    #[test]
    fn validate_rejects_duplicates() {
        let pieces = vec![
            Piece::new(1, "a", &[(0, 0)], "#000000").unwrap(),
            Piece::new(1, "b", &[(0, 0)], "#000000").unwrap(),
        ];
        assert!(validate_pieces(&pieces).is_err());
    }

    #[test]
    fn demo_trominoes_cover_nine_cells() {
        let total: usize = demo_trominoes().iter().map(|p| p.shape.len()).sum();
        assert_eq!(total, 9);
    }
}
