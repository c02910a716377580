use super::engine::Session;
use super::types::Op;

/// Gap-padded two-row alignment view, reconstructed from a CIGAR plus the
/// reference/query bytes it was traced against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignPair {
    pub reference_row: Vec<u8>,
    pub query_row: Vec<u8>,
    pub reference_start: usize,
    pub reference_end: usize,
    pub query_start: usize,
    pub query_end: usize,
}

impl<'e, 'a> Session<'e, 'a> {
    /// Expand the current CIGAR into two equal-length rows: `M`/`=`/`X` copy
    /// both sides, `I` pads the reference with `-`, `D` pads the query with
    /// `-`. Soft clips advance both cursors without writing; hard clips
    /// write and advance nothing.
    pub fn get_basic_align_pair(&self) -> AlignPair {
        let reference = self.input().reference();
        let query = self.input().query();
        let mut ref_cursor = self.input().ref_clip_head() + self.offset;
        let mut query_cursor = self.input().query_clip_head();

        let mut reference_row = Vec::new();
        let mut query_row = Vec::new();

        for &(op, len) in &self.cigar {
            let len = len as usize;
            match op {
                Op::HardClip => {}
                Op::SoftClip => {
                    ref_cursor += len;
                    query_cursor += len;
                }
                Op::Match | Op::Eq | Op::Diff => {
                    reference_row.extend_from_slice(&reference[ref_cursor..ref_cursor + len]);
                    query_row.extend_from_slice(&query[query_cursor..query_cursor + len]);
                    ref_cursor += len;
                    query_cursor += len;
                }
                Op::Ins => {
                    reference_row.resize(reference_row.len() + len, b'-');
                    query_row.extend_from_slice(&query[query_cursor..query_cursor + len]);
                    query_cursor += len;
                }
                Op::Del | Op::RefSkip => {
                    reference_row.extend_from_slice(&reference[ref_cursor..ref_cursor + len]);
                    query_row.resize(query_row.len() + len, b'-');
                    ref_cursor += len;
                }
                Op::Pad => {}
            }
        }

        debug_assert_eq!(reference_row.len(), query_row.len());

        AlignPair {
            reference_row,
            query_row,
            reference_start: self.offset,
            reference_end: self.opt_col.saturating_sub(1),
            query_start: 0,
            query_end: self.subquery_len_for_pair().saturating_sub(1),
        }
    }

    fn subquery_len_for_pair(&self) -> usize {
        self.input().subquery().len()
    }
}
