//! The Dancing-Links (DLX) exact-cover engine.
//!
//! A toroidal doubly-linked sparse matrix, represented as an arena of
//! parallel index vectors rather than a heap-pointer mesh (`usize` indices
//! instead of `NonNull<Node>`): this keeps the cyclic structure entirely
//! safe and cache-friendly, at the cost of giving up generic node payloads.
//! Node `0` is the header sentinel; nodes `1..=num_columns` are column
//! headers; everything after that is a data node.

use std::time::{Duration, Instant};

const HEADER: usize = 0;

/// The toroidal node arena plus column-header bookkeeping.
pub struct Dlx {
    left: Vec<usize>,
    right: Vec<usize>,
    up: Vec<usize>,
    down: Vec<usize>,
    /// The column header a data node belongs to. Unused for header nodes.
    column_of: Vec<usize>,
    /// The row id a data node belongs to. Unused for header nodes.
    row_of: Vec<usize>,
    /// Count of currently-linked data nodes below a column header. Unused
    /// for non-column nodes.
    size: Vec<usize>,
    num_columns: usize,
}

impl Dlx {
    /// Builds an empty matrix with `num_columns` columns and no rows.
    pub fn new(num_columns: usize) -> Self {
        let total = num_columns + 1;
        let mut dlx = Dlx {
            left: (0..total).collect(),
            right: (0..total).collect(),
            up: (0..total).collect(),
            down: (0..total).collect(),
            column_of: vec![0; total],
            row_of: vec![0; total],
            size: vec![0; total],
            num_columns,
        };

        // Thread the header and all column headers into one horizontal
        // cycle, in column-index order.
        let mut prev = HEADER;
        for col in 1..total {
            dlx.right[prev] = col;
            dlx.left[col] = prev;
            prev = col;
        }
        dlx.right[prev] = HEADER;
        dlx.left[HEADER] = prev;

        dlx
    }

    /// Appends one row covering `columns` (1-indexed column-header ids).
    /// `row_id` is the caller's identifier for this row (e.g. a placement
    /// id); it is returned verbatim by `search_bounded`/`Enumerator`.
    pub fn add_row(&mut self, row_id: usize, columns: &[usize]) {
        if columns.is_empty() {
            return;
        }

        let mut new_nodes = Vec::with_capacity(columns.len());
        for &col in columns {
            let node = self.left.len();
            self.left.push(node);
            self.right.push(node);
            // insert above the column header (at the bottom of the column)
            let col_up = self.up[col];
            self.up.push(col_up);
            self.down.push(col);
            self.down[col_up] = node;
            self.up[col] = node;

            self.column_of.push(col);
            self.row_of.push(row_id);
            self.size.push(0);

            self.size[col] += 1;
            new_nodes.push(node);
        }

        // link the new nodes into a horizontal cycle for this row
        let len = new_nodes.len();
        for i in 0..len {
            let left = new_nodes[(i + len - 1) % len];
            let right = new_nodes[(i + 1) % len];
            self.left[new_nodes[i]] = left;
            self.right[new_nodes[i]] = right;
        }
    }

    /// Whether every column has been satisfied (no active columns remain).
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.right[HEADER] == HEADER
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// The active column with the fewest remaining rows (minimum-remaining-
    /// values heuristic), ties broken by first-encountered. Only valid to
    /// call when `!is_complete()`.
    fn choose_column(&self) -> usize {
        let mut best = self.right[HEADER];
        let mut best_size = self.size[best];
        let mut c = self.right[best];
        while c != HEADER {
            if self.size[c] < best_size {
                best = c;
                best_size = self.size[c];
            }
            c = self.right[c];
        }
        best
    }

    /// Removes column `col` from the header row, and removes every row that
    /// intersects it from their other columns' vertical lists.
    fn cover(&mut self, col: usize) {
        self.right[self.left[col]] = self.right[col];
        self.left[self.right[col]] = self.left[col];

        let mut i = self.down[col];
        while i != col {
            let mut j = self.right[i];
            while j != i {
                self.down[self.up[j]] = self.down[j];
                self.up[self.down[j]] = self.up[j];
                self.size[self.column_of[j]] -= 1;
                j = self.right[j];
            }
            i = self.down[i];
        }
    }

    /// The exact inverse of `cover`: restores every link and size counter
    /// `cover(col)` touched, in reverse order.
    fn uncover(&mut self, col: usize) {
        let mut i = self.up[col];
        while i != col {
            let mut j = self.left[i];
            while j != i {
                self.size[self.column_of[j]] += 1;
                self.down[self.up[j]] = j;
                self.up[self.down[j]] = j;
                j = self.left[j];
            }
            i = self.up[i];
        }

        self.right[self.left[col]] = col;
        self.left[self.right[col]] = col;
    }

    /// Covers every column a row participates in, except the one already
    /// covered when the row was selected (walked left-to-right).
    fn cover_row_rest(&mut self, row: usize) {
        let mut j = self.right[row];
        while j != row {
            self.cover(self.column_of[j]);
            j = self.right[j];
        }
    }

    /// The inverse of `cover_row_rest`, walked right-to-left.
    fn uncover_row_rest(&mut self, row: usize) {
        let mut j = self.left[row];
        while j != row {
            self.uncover(self.column_of[j]);
            j = self.left[j];
        }
    }

    #[inline]
    fn row_id(&self, row: usize) -> usize {
        self.row_of[row]
    }

    /// Runs the recursive, callback-driven search, bounded by an optional
    /// solution-count budget and an optional wall-clock deadline. The
    /// budget is checked between yielded solutions (not mid-recursion),
    /// matching the suspension-point contract: the reference implementation's
    /// exception-based unwind is re-expressed as an explicit `should_stop`
    /// flag so the cover stack always unwinds cleanly.
    pub fn search_bounded(
        &mut self,
        max_solutions: Option<usize>,
        max_time: Option<Duration>,
        mut sink: impl FnMut(&[usize]),
    ) -> BoundedOutcome {
        let deadline = max_time.map(|d| Instant::now() + d);
        let mut state = SearchState {
            max_solutions,
            deadline,
            total_found: 0,
            limit_reached: false,
            timed_out: false,
            should_stop: false,
        };
        let mut partial = Vec::new();
        self.search_step(&mut partial, &mut state, &mut sink);

        BoundedOutcome {
            total_found: state.total_found,
            limit_reached: state.limit_reached,
            timed_out: state.timed_out,
        }
    }

    fn search_step(
        &mut self,
        partial: &mut Vec<usize>,
        state: &mut SearchState,
        sink: &mut dyn FnMut(&[usize]),
    ) {
        if state.should_stop {
            return;
        }

        if self.is_complete() {
            state.total_found += 1;
            sink(partial);

            if let Some(max) = state.max_solutions {
                if state.total_found >= max {
                    state.limit_reached = true;
                    state.should_stop = true;
                }
            }
            if !state.should_stop {
                if let Some(deadline) = state.deadline {
                    if Instant::now() >= deadline {
                        state.timed_out = true;
                        state.should_stop = true;
                    }
                }
            }
            return;
        }

        let col = self.choose_column();
        if self.size[col] == 0 {
            return;
        }

        self.cover(col);
        let mut r = self.down[col];
        while r != col {
            partial.push(self.row_id(r));
            self.cover_row_rest(r);

            self.search_step(partial, state, sink);

            self.uncover_row_rest(r);
            partial.pop();

            if state.should_stop {
                break;
            }
            r = self.down[r];
        }
        self.uncover(col);
    }
}

/// Result of a bounded search: how many solutions exist (enumerated before
/// stopping), and why the search stopped.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedOutcome {
    pub total_found: usize,
    pub limit_reached: bool,
    pub timed_out: bool,
}

struct SearchState {
    max_solutions: Option<usize>,
    deadline: Option<Instant>,
    total_found: usize,
    limit_reached: bool,
    timed_out: bool,
    should_stop: bool,
}

/// One level of the iterative state machine `Enumerator` uses to resume the
/// recursive search across calls.
struct Level {
    /// The covered column header for this level.
    col: usize,
    /// The data node (row) currently selected at this level.
    row: usize,
}

/// A resumable search: the same recursion as `search_bounded`, lowered into
/// an explicit stack of `(column, row)` frames so it can be advanced one
/// solution at a time across calls, matching the "generator yields"
/// design note. Exclusively owns its `Dlx`.
pub struct Enumerator {
    dlx: Dlx,
    stack: Vec<Level>,
    partial: Vec<usize>,
    pending_descend: bool,
    done: bool,
}

impl Enumerator {
    pub fn new(dlx: Dlx) -> Self {
        Enumerator {
            dlx,
            stack: Vec::new(),
            partial: Vec::new(),
            pending_descend: true,
            done: false,
        }
    }

    /// Advances the search to the next complete solution, or `None` once
    /// the enumeration is exhausted. Once `None` is returned, all further
    /// calls return `None`.
    pub fn advance(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }

        loop {
            if self.pending_descend {
                if self.dlx.is_complete() {
                    self.pending_descend = false;
                    return Some(self.partial.clone());
                }

                let col = self.dlx.choose_column();
                if self.dlx.size[col] > 0 {
                    self.dlx.cover(col);
                    let row = self.dlx.down[col];
                    self.partial.push(self.dlx.row_id(row));
                    self.dlx.cover_row_rest(row);
                    self.stack.push(Level { col, row });
                    continue;
                }

                // dead end: this column has no rows, backtrack without
                // having pushed a level for it.
                self.pending_descend = false;
            }

            // backtrack: advance the innermost level's row, popping
            // exhausted levels until one has another row to try.
            loop {
                let Some(top_col) = self.stack.last().map(|l| l.col) else {
                    self.done = true;
                    return None;
                };
                let row = self.stack.last().unwrap().row;

                self.dlx.uncover_row_rest(row);
                self.partial.pop();
                let next_row = self.dlx.down[row];

                if next_row != top_col {
                    self.stack.last_mut().unwrap().row = next_row;
                    self.partial.push(self.dlx.row_id(next_row));
                    self.dlx.cover_row_rest(next_row);
                    self.pending_descend = true;
                    break;
                } else {
                    self.dlx.uncover(top_col);
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_exact_cover() -> Dlx {
        // columns A,B,C; row0={A,B}; row1={C}; row2={A}; row3={B,C}. Two
        // exact covers: {row0,row1} and {row2,row3}.
        let mut dlx = Dlx::new(3);
        dlx.add_row(0, &[1, 2]);
        dlx.add_row(1, &[3]);
        dlx.add_row(2, &[1]);
        dlx.add_row(3, &[2, 3]);
        dlx
    }

    #[test]
    fn bounded_search_finds_expected_solutions() {
        let mut dlx = tiny_exact_cover();
        let mut found = Vec::new();
        let outcome = dlx.search_bounded(None, None, |sol| found.push(sol.to_vec()));
        assert_eq!(outcome.total_found, 2);
        let mut sols: Vec<Vec<usize>> = found
            .into_iter()
            .map(|mut s| {
                s.sort();
                s
            })
            .collect();
        sols.sort();
        assert_eq!(sols, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn num_columns_reports_construction_size() {
        let dlx = tiny_exact_cover();
        assert_eq!(dlx.num_columns(), 3);
    }

    #[test]
    fn enumerator_matches_bounded_search() {
        let mut dlx = tiny_exact_cover();
        let mut bounded_solutions = Vec::new();
        dlx.search_bounded(None, None, |sol| bounded_solutions.push(sol.to_vec()));

        let dlx2 = tiny_exact_cover();
        let mut enumerator = Enumerator::new(dlx2);
        let mut resumed_solutions = Vec::new();
        while let Some(sol) = enumerator.advance() {
            resumed_solutions.push(sol);
        }

        assert_eq!(bounded_solutions.len(), resumed_solutions.len());
        for (mut a, mut b) in bounded_solutions
            .into_iter()
            .zip(resumed_solutions)
        {
            a.sort();
            b.sort();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn bounded_search_respects_max_solutions() {
        // 1 column, 3 rows each covering it alone — 3 trivial solutions.
        let mut dlx = Dlx::new(1);
        dlx.add_row(0, &[1]);
        let outcome_unbounded = {
            let mut d = Dlx::new(1);
            d.add_row(0, &[1]);
            d.add_row(1, &[1]);
            d.add_row(2, &[1]);
            d.search_bounded(None, None, |_| {})
        };
        assert_eq!(outcome_unbounded.total_found, 3);

        dlx.add_row(1, &[1]);
        dlx.add_row(2, &[1]);
        let mut seen = 0;
        let outcome = dlx.search_bounded(Some(2), None, |_| seen += 1);
        assert_eq!(seen, 2);
        assert!(outcome.limit_reached);
        assert_eq!(outcome.total_found, 2);
    }

    #[test]
    fn cover_uncover_are_perfect_inverses() {
        let mut dlx = tiny_exact_cover();
        let before = (
            dlx.left.clone(),
            dlx.right.clone(),
            dlx.up.clone(),
            dlx.down.clone(),
            dlx.size.clone(),
        );

        dlx.cover(1);
        dlx.uncover(1);

        let after = (
            dlx.left.clone(),
            dlx.right.clone(),
            dlx.up.clone(),
            dlx.down.clone(),
            dlx.size.clone(),
        );
        assert_eq!(before, after);
    }

    #[test]
    fn empty_matrix_yields_one_empty_solution() {
        let mut dlx = Dlx::new(0);
        let mut found = Vec::new();
        dlx.search_bounded(None, None, |sol| found.push(sol.to_vec()));
        assert_eq!(found, vec![Vec::<usize>::new()]);
    }
}
