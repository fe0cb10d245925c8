//! The solver façade: feasibility gating, matrix assembly, and the
//! external operations a host process calls.

use std::time::{Duration, Instant};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{Cache, DEFAULT_TTL};
use crate::dlx::{Dlx, Enumerator};
use crate::error::{Result, SolverError};
use crate::fingerprint::make_cache_keys;
use crate::geometry::Cell;
use crate::grid::{normalize_board, occupied_cells, required_positions, stamp_placements, Board};
use crate::pieces::{validate_pieces, Piece};
use crate::placements::{placements_for_piece, Placement};
use crate::session::SessionRegistry;

/// Result of `solve_partial`: a batch of solutions collected from the
/// start of the enumeration, plus the bookkeeping needed to know whether
/// it is the complete set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    pub solutions: Vec<Board>,
    pub solution_count: usize,
    pub solutions_returned: usize,
    pub timed_out: bool,
    pub limit_reached: bool,
    pub message: String,
}

/// Result of `session_next_batch`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub solutions: Vec<Board>,
    pub solutions_returned: usize,
    pub solution_count: usize,
    pub timed_out: bool,
    pub exhausted: bool,
    pub message: String,
    pub cache: CacheStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Outcome of `create_session`: either the session is live, or the input
/// was infeasible and no session was created.
pub enum SessionOutcome {
    Created { id: String },
    Unsolvable { message: String },
}

struct MatrixBuild {
    dlx: Dlx,
    placements_by_id: FxHashMap<usize, Placement>,
    base_board: Board,
}

/// Builds the exact-cover matrix for one solve, or short-circuits with an
/// unsolvable message per the feasibility gate.
fn build_matrix(
    width: usize,
    height: usize,
    pieces: &[Piece],
    partial_board: Option<&Board>,
) -> Result<std::result::Result<MatrixBuild, String>> {
    if width == 0 || height == 0 {
        return Err(SolverError::InvalidInput(
            "board width and height must be positive".to_string(),
        ));
    }
    validate_pieces(pieces)?;

    let base_board = normalize_board(partial_board, width, height);
    let (occupied, placed_ids) = occupied_cells(&base_board);

    let remaining: Vec<&Piece> = pieces.iter().filter(|p| !placed_ids.contains(&p.id)).collect();
    let required = required_positions(width, height, &occupied);

    let remaining_cell_count: usize = remaining.iter().map(|p| p.shape.len()).sum();
    if remaining_cell_count != required.len() {
        return Ok(Err(
            "Unsolvable: Placed pieces do not leave a solvable empty space.".to_string(),
        ));
    }

    let required_set: FxHashSet<Cell> = required.iter().copied().collect();
    let cell_columns: FxHashMap<Cell, usize> = required
        .iter()
        .enumerate()
        .map(|(i, &cell)| (cell, remaining.len() + i + 1))
        .collect();

    let num_columns = remaining.len() + required.len();
    debug!(num_columns, num_pieces = remaining.len(), num_cells = required.len(), "building DLX matrix");
    let mut dlx = Dlx::new(num_columns);
    let mut placements_by_id = FxHashMap::default();
    let mut next_id = 0usize;

    for (piece_idx, piece) in remaining.iter().enumerate() {
        let piece_col = piece_idx + 1;
        let placements = placements_for_piece(piece, &required_set, width, height, &mut next_id);
        for placement in placements {
            let mut cols = Vec::with_capacity(1 + placement.cells.len());
            cols.push(piece_col);
            for cell in &placement.cells {
                cols.push(cell_columns[cell]);
            }
            dlx.add_row(placement.id, &cols);
            placements_by_id.insert(placement.id, placement);
        }
    }
    debug!(num_placements = placements_by_id.len(), "built DLX matrix");

    if placements_by_id.is_empty() {
        return Ok(Err("Unsolvable: No valid placements found.".to_string()));
    }

    Ok(Ok(MatrixBuild {
        dlx,
        placements_by_id,
        base_board,
    }))
}

fn reconstruct_board(base: &Board, placements_by_id: &FxHashMap<usize, Placement>, row_ids: &[usize]) -> Board {
    let placed: Vec<(u32, Vec<Cell>)> = row_ids
        .iter()
        .map(|id| {
            let placement = &placements_by_id[id];
            (placement.piece_id, placement.cells.clone())
        })
        .collect();
    stamp_placements(base, &placed)
}

/// Collects up to `max_samples` solutions from the start of the
/// enumeration, truncated at `max_time_ms` if it elapses first.
/// `max_samples == None` and `max_time_ms == None`/`Some(0)` disable their
/// respective limits.
pub fn solve_partial(
    width: usize,
    height: usize,
    pieces: &[Piece],
    partial_board: Option<&Board>,
    max_samples: Option<usize>,
    max_time_ms: Option<u64>,
) -> Result<SolveResult> {
    let build = match build_matrix(width, height, pieces, partial_board)? {
        Err(message) => {
            return Ok(SolveResult {
                solutions: Vec::new(),
                solution_count: 0,
                solutions_returned: 0,
                timed_out: false,
                limit_reached: false,
                message,
            })
        }
        Ok(build) => build,
    };

    let MatrixBuild {
        mut dlx,
        placements_by_id,
        base_board,
    } = build;

    let max_time = max_time_ms.filter(|&ms| ms > 0).map(Duration::from_millis);
    let mut boards = Vec::new();
    let outcome = dlx.search_bounded(max_samples, max_time, |row_ids| {
        boards.push(reconstruct_board(&base_board, &placements_by_id, row_ids));
    });

    let message = if boards.is_empty() {
        "No solutions found.".to_string()
    } else if outcome.limit_reached {
        format!("Found {} solution(s) (sample limit reached).", boards.len())
    } else if outcome.timed_out {
        format!("Found {} solution(s) before time limit.", boards.len())
    } else {
        format!("Found all {} solution(s).", boards.len())
    };

    Ok(SolveResult {
        solutions_returned: boards.len(),
        solutions: boards,
        solution_count: outcome.total_found,
        timed_out: outcome.timed_out,
        limit_reached: outcome.limit_reached,
        message,
    })
}

/// Builds a live resumable session for `(width, height, pieces,
/// partial_board)` and registers it under the caller-supplied `key`
/// (e.g. `"solve:<solution_id>"`), or reports the input as unsolvable
/// without registering anything. Registering under a key already in use
/// replaces that session outright.
pub fn create_session(
    registry: &SessionRegistry,
    key: &str,
    width: usize,
    height: usize,
    pieces: Vec<Piece>,
    partial_board: Option<&Board>,
) -> Result<SessionOutcome> {
    let build = match build_matrix(width, height, &pieces, partial_board)? {
        Err(message) => return Ok(SessionOutcome::Unsolvable { message }),
        Ok(build) => build,
    };

    let enumerator = Enumerator::new(build.dlx);
    let id = registry.create_session(
        key,
        width,
        height,
        pieces,
        build.base_board,
        enumerator,
        build.placements_by_id,
    );
    info!(session_id = %id, "created session");
    Ok(SessionOutcome::Created { id })
}

/// Pulls the next `batch_size` solutions for a live session, consulting an
/// external cache first and writing newly computed solutions back to it.
/// Cache failures never fail the request; the session remains
/// authoritative.
pub fn session_next_batch(
    registry: &SessionRegistry,
    cache: &dyn Cache,
    key: &str,
    batch_size: usize,
    max_time_ms: Option<u64>,
) -> Result<BatchResult> {
    let session_handle = registry
        .get(key)
        .ok_or_else(|| SolverError::SessionNotFound(key.to_string()))?;
    let mut session = session_handle.lock();

    if session.exhausted {
        return Ok(BatchResult {
            solutions: Vec::new(),
            solutions_returned: 0,
            solution_count: session.cumulative_total,
            timed_out: false,
            exhausted: true,
            message: "All solutions found.".to_string(),
            cache: CacheStatus::Miss,
        });
    }

    let keys = make_cache_keys(session.width, session.height, &session.pieces, &session.base_board);

    let mut cache_status = CacheStatus::Miss;
    let mut boards: Vec<Board> = Vec::new();

    if let Ok(cached) = cache.get_range(&keys.solutions_key, session.cache_cursor, batch_size) {
        if !cached.is_empty() {
            if let Ok(decoded) = cached
                .iter()
                .map(|v| serde_json::from_value::<Board>(v.clone()))
                .collect::<std::result::Result<Vec<Board>, _>>()
            {
                session.cache_cursor += decoded.len();
                boards = decoded;
                if boards.len() == batch_size {
                    cache_status = CacheStatus::Hit;
                }
            }
        }
    }

    if cache_status == CacheStatus::Hit {
        info!(key, count = boards.len(), "cache hit");
    } else {
        info!(key, "cache miss");
    }

    let mut timed_out = false;
    if boards.len() < batch_size {
        let remaining = batch_size - boards.len();
        let deadline = max_time_ms
            .filter(|&ms| ms > 0)
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        let (fresh, did_time_out) = session.next_batch(remaining, deadline);
        timed_out = did_time_out;

        if !fresh.is_empty() {
            let fresh_values: Vec<Value> = fresh
                .iter()
                .map(|b| serde_json::to_value(b).expect("boards are always serializable"))
                .collect();
            let _ = cache.append(&keys.solutions_key, &fresh_values, DEFAULT_TTL);
            let _ = cache.set_meta(
                &keys.meta_key,
                &serde_json::json!({ "total": session.cumulative_total, "exhausted": session.exhausted }),
                DEFAULT_TTL,
            );
            session.cache_cursor += fresh.len();
        }
        boards.extend(fresh);
    }

    // On a full cache hit the session itself never advanced, so its own
    // bookkeeping (`cumulative_total`, `exhausted`) lags behind what was
    // actually served; fold in the cached meta blob another client may have
    // written so the reported totals reflect the cache's view too.
    let (solution_count, exhausted) = if cache_status == CacheStatus::Hit {
        match cache.get_meta(&keys.meta_key) {
            Ok(Some(meta)) => {
                let meta_total = meta
                    .get("total")
                    .and_then(Value::as_u64)
                    .map(|v| v as usize)
                    .unwrap_or(0);
                let meta_exhausted = meta.get("exhausted").and_then(Value::as_bool).unwrap_or(false);
                let total = session.cumulative_total.max(session.cache_cursor).max(meta_total);
                (total, session.exhausted || meta_exhausted)
            }
            _ => (
                session.cumulative_total.max(session.cache_cursor),
                session.exhausted,
            ),
        }
    } else {
        (session.cumulative_total, session.exhausted)
    };

    let message = if timed_out {
        "Time limit reached; partial batch.".to_string()
    } else if exhausted {
        "All solutions found.".to_string()
    } else {
        "Batch complete, more available.".to_string()
    };

    Ok(BatchResult {
        solutions_returned: boards.len(),
        solutions: boards,
        solution_count,
        timed_out,
        exhausted,
        message,
        cache: cache_status,
    })
}

/// Removes a session. Non-fatal if the key is already gone.
pub fn delete_session(registry: &SessionRegistry, key: &str) -> bool {
    registry.delete(key)
}
