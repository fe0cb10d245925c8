//! 2D rotation and reflection utilities.
//!
//! A polyomino shape has up to 8 distinct orientations under the dihedral
//! group D4: 4 rotations times {identity, reflection}. Symmetric shapes
//! produce fewer than 8 distinct canonical forms.

/// A single board cell, relative or absolute depending on context.
pub type Cell = (i32, i32);

/// A shape in canonical form: translated so `min_x = min_y = 0`, sorted.
pub type Shape = Vec<Cell>;

/// Rotates a cell 90 degrees counter-clockwise: `(x, y) -> (y, -x)`.
#[inline]
fn rotate_ccw90(cell: Cell) -> Cell {
    let (x, y) = cell;
    (y, -x)
}

/// Reflects a cell across the y-axis: `(x, y) -> (-x, y)`.
#[inline]
fn reflect_x(cell: Cell) -> Cell {
    let (x, y) = cell;
    (-x, y)
}

/// Translates cells so the minimum x and y are both zero, then sorts.
///
/// This is the canonicalization step: two shapes that differ only by
/// translation are recognized as identical after normalization.
pub fn canonicalize(cells: &[Cell]) -> Shape {
    let min_x = cells.iter().map(|&(x, _)| x).min().unwrap_or(0);
    let min_y = cells.iter().map(|&(_, y)| y).min().unwrap_or(0);

    let mut normalized: Shape = cells.iter().map(|&(x, y)| (x - min_x, y - min_y)).collect();
    normalized.sort();
    normalized
}

/// Generates all distinct canonical orientations of a base shape.
///
/// Emission order is {flip=false, r=0..4} then {flip=true, r=0..4}, with
/// duplicates suppressed in first-seen order; this order becomes the
/// stable iteration order the placement enumerator inherits.
pub fn orientations(base_shape: &[Cell]) -> Vec<Shape> {
    let mut seen = Vec::with_capacity(8);

    for flip in [false, true] {
        let flipped: Vec<Cell> = if flip {
            base_shape.iter().copied().map(reflect_x).collect()
        } else {
            base_shape.to_vec()
        };

        let mut current = canonicalize(&flipped);
        for _ in 0..4 {
            if !seen.contains(&current) {
                seen.push(current.clone());
            }
            let rotated: Vec<Cell> = current.iter().copied().map(rotate_ccw90).collect();
            current = canonicalize(&rotated);
        }
    }

    seen
}
