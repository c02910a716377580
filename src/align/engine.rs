use log::trace;

use crate::error::{AlignError, AlignResult};

use super::buffers::Buffers;
use super::input::InputView;
use super::penalty::PenaltyTables;
use super::types::{AlignmentResult, Cigar, Op, Penalties};

#[inline]
fn pack(len: u32, op: Op) -> u32 {
    super::types::pack(len, op)
}

#[inline]
fn unpack(cell: u32) -> AlignResult<(u32, Op)> {
    super::types::unpack(cell)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Prepared,
    Initialized,
    Aligned,
    Located,
    Traced,
}

/// Owns the penalty tables and DP buffers across many alignments.
///
/// Not `Sync`: callers must hold one `Engine` per thread (spec.md §5).
/// Each alignment runs through a [`Session`] borrowed from [`Engine::prepare`].
pub struct Engine {
    tables: PenaltyTables,
    cfg: Penalties,
    buffers: Buffers,
}

impl Engine {
    pub fn new(cfg: Penalties) -> Self {
        let tables = PenaltyTables::new(&cfg);
        Self {
            tables,
            cfg,
            buffers: Buffers::new(),
        }
    }

    pub fn penalties(&self) -> &Penalties {
        &self.cfg
    }

    /// Prepare buffers and input views for one alignment. Must be followed
    /// by exactly one of `align_init_global`/`align_init_semi`, then
    /// `align`, `locate_min`, `trace`, any of the post-processing steps, and
    /// optionally `get_basic_align_pair` (spec.md §5).
    #[allow(clippy::too_many_arguments)]
    pub fn prepare<'e, 'a>(
        &'e mut self,
        reference: &'a [u8],
        ref_clip_head: u32,
        ref_clip_tail: u32,
        query: &'a [u8],
        quality: &'a [u8],
        query_clip_head: u32,
        query_clip_tail: u32,
    ) -> AlignResult<Session<'e, 'a>> {
        let input = InputView::new(
            reference,
            ref_clip_head,
            ref_clip_tail,
            query,
            quality,
            query_clip_head,
            query_clip_tail,
        )?;
        let subdb_len = input.subref().len();
        let subquery_len = input.subquery().len();
        self.buffers.resize(subdb_len, subquery_len)?;

        Ok(Session {
            tables: &self.tables,
            cfg: self.cfg,
            buffers: &mut self.buffers,
            input,
            subdb_len,
            subquery_len,
            row_len: subdb_len + 1,
            opt_score: 0,
            opt_col: 0,
            cigar: Vec::new(),
            offset: 0,
            stage: Stage::Prepared,
        })
    }
}

/// One alignment in progress: borrows the engine's tables and buffers,
/// and the caller's input slices, for the duration of a single
/// `prepare → ... → trace → postproc*` call sequence.
pub struct Session<'e, 'a> {
    tables: &'e PenaltyTables,
    cfg: Penalties,
    buffers: &'e mut Buffers,
    input: InputView<'a>,
    subdb_len: usize,
    subquery_len: usize,
    row_len: usize,
    pub(crate) opt_score: i32,
    pub(crate) opt_col: usize,
    pub(crate) cigar: Vec<(Op, u32)>,
    pub(crate) offset: usize,
    stage: Stage,
}

impl<'e, 'a> Session<'e, 'a> {
    fn expect_stage(&self, stage: Stage) {
        debug_assert_eq!(
            self.stage, stage,
            "alignment operations must be called in the documented order"
        );
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        self.buffers.trace_idx(row, col, self.row_len)
    }

    /// Dispatch to `align_init_global` or `align_init_semi` by mode.
    pub fn align_init(&mut self, mode: super::types::AlignmentMode) {
        match mode {
            super::types::AlignmentMode::Global => self.align_init_global(),
            super::types::AlignmentMode::Semi => self.align_init_semi(),
        }
    }

    /// Fill row 0 for global alignment: the top row encodes query position
    /// 0 aligning against an initial deletion run, accumulating gap-extend
    /// penalty at the quality of query position 0 only.
    pub fn align_init_global(&mut self) {
        self.expect_stage(Stage::Prepared);
        let qq = (self.input.subquality()[0] - self.cfg.phred_offset) as usize;
        let gopen_true_pen = self.tables.gopen_penalty[qq] - self.tables.gext_penalty[qq];

        self.buffers.pen_prev[0] = 0;
        self.buffers.ins_prev[0] = gopen_true_pen;
        self.buffers.ins_len_prev[0] = 0;
        let mut stored_del = self.cfg.gap_open_extend - self.cfg.gap_extend;
        let i0 = self.idx(0, 0);
        self.buffers.trace[i0] = pack(0, Op::Eq);

        for n1 in 1..=self.subdb_len {
            stored_del += self.cfg.gap_extend;
            self.buffers.pen_prev[n1] = stored_del;
            self.buffers.ins_prev[n1] = stored_del + gopen_true_pen;
            self.buffers.ins_len_prev[n1] = 0;
            let i = self.idx(0, n1);
            self.buffers.trace[i] = pack(n1 as u32, Op::Del);
        }
        self.stage = Stage::Initialized;
    }

    /// Fill row 0 for semi-global alignment: the leading reference gap is
    /// free, so row 0 scores are all zero.
    pub fn align_init_semi(&mut self) {
        self.expect_stage(Stage::Prepared);
        let qq = (self.input.subquality()[0] - self.cfg.phred_offset) as usize;
        let gopen_true_pen = self.tables.gopen_penalty[qq] - self.tables.gext_penalty[qq];

        self.buffers.pen_prev[0] = 0;
        self.buffers.ins_prev[0] = gopen_true_pen;
        self.buffers.ins_len_prev[0] = 0;
        let i0 = self.idx(0, 0);
        self.buffers.trace[i0] = pack(0, Op::Eq);

        for n1 in 1..=self.subdb_len {
            self.buffers.pen_prev[n1] = 0;
            self.buffers.ins_prev[n1] = gopen_true_pen;
            self.buffers.ins_len_prev[n1] = 0;
            let i = self.idx(0, n1);
            self.buffers.trace[i] = pack(n1 as u32, Op::Del);
        }
        self.stage = Stage::Initialized;
    }

    /// Run the Gotoh recurrence over all interior cells, recording the best
    /// move per cell in the trace matrix.
    pub fn align(&mut self) -> AlignResult<()> {
        self.expect_stage(Stage::Initialized);
        let subref = self.input.subref();
        let subquery = self.input.subquery();
        let subquality = self.input.subquality();
        let gap_open_extend = self.cfg.gap_open_extend;
        let gap_extend = self.cfg.gap_extend;
        let phred_offset = self.cfg.phred_offset;

        for m in 0..self.subquery_len {
            let m1 = m + 1;
            let cq = subquery[m];
            let qq = (subquality[m] - phred_offset) as usize;
            let match_pen = self.tables.match_penalty[qq];
            let mismatch_pen = self.tables.mismatch_penalty[qq];
            let gopen_pen = self.tables.gopen_penalty[qq];
            let gext_pen = self.tables.gext_penalty[qq];

            // leftmost column: only vertical (insertion) moves are possible
            let wi_extend = self.buffers.ins_prev[0] + gext_pen;
            self.buffers.ins[0] = wi_extend;
            let c_i = self.buffers.ins_len_prev[0] + 1;
            self.buffers.ins_len[0] = c_i;
            let i_m1_0 = self.idx(m1, 0);
            self.buffers.trace[i_m1_0] = pack(c_i, Op::Ins);
            self.buffers.pen[0] = wi_extend;
            let mut stored_del = self.buffers.pen[0] + (gap_open_extend - gap_extend);
            let mut c_d = 0u32;

            for n in 0..self.subdb_len {
                let n1 = n + 1;
                let is_match = subref[n] == cq || subref[n] == b'N';

                let wd_open = self.buffers.pen[n] + gap_open_extend;
                let wd_extend = stored_del + gap_extend;
                let (wd, cd_here) = if wd_open < wd_extend {
                    c_d = 1;
                    (wd_open, 1)
                } else {
                    c_d += 1;
                    (wd_extend, c_d)
                };
                stored_del = wd;

                let wi_open = self.buffers.pen_prev[n1] + gopen_pen;
                let wi_extend = self.buffers.ins_prev[n1] + gext_pen;
                let (wi, ci_here) = if wi_open < wi_extend {
                    (wi_open, 1)
                } else {
                    (wi_extend, self.buffers.ins_len_prev[n1] + 1)
                };
                self.buffers.ins[n1] = wi;
                self.buffers.ins_len[n1] = ci_here;

                let (wm, mstate) = if is_match {
                    (self.buffers.pen_prev[n] + match_pen, Op::Eq)
                } else {
                    (self.buffers.pen_prev[n] + mismatch_pen, Op::Diff)
                };

                // preference order M > I > D, via strict less-than chains
                let (score, cell) = if wi < wm {
                    if wd < wi {
                        (wd, pack(cd_here, Op::Del))
                    } else {
                        (wi, pack(ci_here, Op::Ins))
                    }
                } else if wd < wm {
                    (wd, pack(cd_here, Op::Del))
                } else {
                    (wm, pack(1, mstate))
                };
                self.buffers.pen[n1] = score;
                let i_m1_n1 = self.idx(m1, n1);
                self.buffers.trace[i_m1_n1] = cell;
            }

            std::mem::swap(&mut self.buffers.pen, &mut self.buffers.pen_prev);
            std::mem::swap(&mut self.buffers.ins, &mut self.buffers.ins_prev);
            std::mem::swap(&mut self.buffers.ins_len, &mut self.buffers.ins_len_prev);
        }
        self.stage = Stage::Aligned;
        Ok(())
    }

    /// Scan the final score row (now in `pen_prev` after the last swap) and
    /// return the first column achieving the minimum.
    pub fn locate_min(&mut self) -> i32 {
        self.expect_stage(Stage::Aligned);
        let last_row = &self.buffers.pen_prev[..=self.subdb_len];
        let mut opt_score = last_row[0];
        let mut opt_col = 0usize;
        for (col, &score) in last_row.iter().enumerate().skip(1) {
            if score < opt_score {
                opt_score = score;
                opt_col = col;
            }
        }
        self.opt_score = opt_score;
        self.opt_col = opt_col;
        self.stage = Stage::Located;
        opt_score
    }

    /// Walk the trace matrix from the optimum to row 0, emitting run-length
    /// CIGAR ops. Consecutive `=`/`X` cells are merged into one op.
    pub fn trace(&mut self) -> AlignResult<()> {
        self.expect_stage(Stage::Located);
        let mut m1 = self.subquery_len;
        let mut n1 = self.opt_col;
        let (mut z, mut op) = unpack(self.buffers.trace[self.idx(m1, n1)])?;
        let mut rev_ops: Vec<(Op, u32)> = Vec::new();

        while m1 > 0 {
            match op {
                Op::Eq | Op::Diff => {
                    let run_op = op;
                    let mut total = 0u32;
                    loop {
                        total += z;
                        m1 -= z as usize;
                        n1 -= z as usize;
                        let cell = self.buffers.trace[self.idx(m1, n1)];
                        let (z2, op2) = unpack(cell)?;
                        z = z2;
                        op = op2;
                        if !(op == run_op && m1 > 0) {
                            break;
                        }
                    }
                    rev_ops.push((run_op, total));
                }
                Op::Del => {
                    rev_ops.push((Op::Del, z));
                    n1 -= z as usize;
                    let cell = self.buffers.trace[self.idx(m1, n1)];
                    let (z2, op2) = unpack(cell)?;
                    z = z2;
                    op = op2;
                }
                Op::Ins => {
                    rev_ops.push((Op::Ins, z));
                    m1 -= z as usize;
                    let cell = self.buffers.trace[self.idx(m1, n1)];
                    let (z2, op2) = unpack(cell)?;
                    z = z2;
                    op = op2;
                }
                _ => return Err(AlignError::CorruptTrace),
            }
        }

        rev_ops.reverse();
        trace!(
            "trace produced {} ops, offset {}, score {}",
            rev_ops.len(),
            n1,
            self.opt_score
        );
        self.cigar = rev_ops;
        self.offset = n1;
        self.stage = Stage::Traced;
        Ok(())
    }

    pub(crate) fn input(&self) -> &InputView<'a> {
        &self.input
    }

    /// Materialize the current optimum into an owned [`AlignmentResult`].
    pub fn result(&self) -> AlignmentResult {
        AlignmentResult {
            score: self.opt_score,
            end_col: self.opt_col,
            offset: self.offset,
            cigar: Cigar {
                ops: self.cigar.clone(),
            },
        }
    }
}
