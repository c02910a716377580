use log::trace;

use crate::error::{AlignError, AlignResult};

/// Hard ceiling on trace-matrix cell count. Rust's allocator aborts the
/// process on true OOM rather than returning an error, so this cap is the
/// practical analogue of the original C code's `malloc` failure guard: an
/// oversized request is rejected as `AlignError::Alloc` before it can hit
/// that abort path.
const MAX_CELLS: usize = 1 << 34;

/// Owns the two rolling score rows, two rolling insertion-length rows, and
/// the full traceback matrix. Grown in place by [`Buffers::resize`]; never
/// shrinks capacity, only the logical window exposed via the `*_len` args
/// to each alignment step.
#[derive(Clone, Debug, Default)]
pub(crate) struct Buffers {
    pub(crate) pen: Vec<i32>,
    pub(crate) pen_prev: Vec<i32>,
    pub(crate) ins: Vec<i32>,
    pub(crate) ins_prev: Vec<i32>,
    pub(crate) ins_len: Vec<u32>,
    pub(crate) ins_len_prev: Vec<u32>,
    /// Flattened `(subquery_len + 1) x (subdb_len + 1)` packed trace cells.
    pub(crate) trace: Vec<u32>,
    ref_cap: usize,
    query_cap: usize,
}

impl Buffers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn resize(&mut self, ref_len: usize, query_len: usize) -> AlignResult<()> {
        let row_len = ref_len + 1;
        let cells = row_len
            .checked_mul(query_len + 1)
            .ok_or(AlignError::Alloc {
                rows: query_len + 1,
                cols: row_len,
            })?;
        if cells > MAX_CELLS {
            return Err(AlignError::Alloc {
                rows: query_len + 1,
                cols: row_len,
            });
        }

        let grew_ref = ref_len > self.ref_cap;
        let grew_query = query_len > self.query_cap;

        if grew_ref {
            self.pen.resize(row_len, 0);
            self.pen_prev.resize(row_len, 0);
            self.ins.resize(row_len, 0);
            self.ins_prev.resize(row_len, 0);
            self.ins_len.resize(row_len, 0);
            self.ins_len_prev.resize(row_len, 0);
        }

        if grew_ref || grew_query || self.trace.len() < cells {
            trace!(
                "growing alignment buffers to {}x{} ({} cells)",
                query_len + 1,
                row_len,
                cells
            );
            self.trace.resize(cells, 0);
        }

        self.ref_cap = self.ref_cap.max(ref_len);
        self.query_cap = self.query_cap.max(query_len);

        Ok(())
    }

    #[inline]
    pub(crate) fn trace_idx(&self, row: usize, col: usize, row_len: usize) -> usize {
        row * row_len + col
    }
}
