use super::engine::Session;
use super::types::Op;

/// CIGAR post-processing: the four transforms applied after `trace` to turn
/// a raw traceback into a reportable alignment (spec.md §4.7).
impl<'e, 'a> Session<'e, 'a> {
    /// Extend the outer CIGAR boundaries to cover the clipped (outside the
    /// aligned sub-window) head/tail of the query, contracting into existing
    /// matches where the clipped bases happen to extend them.
    pub fn append_softclip(&mut self) {
        let query = self.input().query();
        let reference = self.input().reference();
        let query_clip_head = self.input().query_clip_head();
        let query_clip_tail = self.input().query_clip_tail();
        let ref_clip_head = self.input().ref_clip_head();
        let subdb_len = self.input().subdb_len();

        if query_clip_head > 0 {
            let mut clip_head = query_clip_head as u32;
            match self.cigar.first().copied() {
                Some((Op::SoftClip, z)) => {
                    self.cigar[0] = (Op::SoftClip, clip_head + z);
                }
                Some((state @ (Op::Eq | Op::Match), z)) => {
                    let mut match_add = 0u32;
                    let mut qi = query_clip_head;
                    let mut ri = ref_clip_head + self.offset;
                    while clip_head > 0 && qi > 0 && ri > 0 {
                        qi -= 1;
                        ri -= 1;
                        if query[qi] != reference[ri] {
                            break;
                        }
                        match_add += 1;
                        clip_head -= 1;
                    }
                    if match_add > 0 {
                        self.cigar[0] = (state, z + match_add);
                        self.offset -= match_add as usize;
                    }
                    if clip_head > 0 {
                        self.cigar.insert(0, (Op::SoftClip, clip_head));
                    }
                }
                _ => self.cigar.insert(0, (Op::SoftClip, clip_head)),
            }
        }

        if query_clip_tail > 0 {
            let mut clip_tail = query_clip_tail as u32;
            match self.cigar.last().copied() {
                Some((Op::SoftClip, z)) => {
                    let last = self.cigar.len() - 1;
                    self.cigar[last] = (Op::SoftClip, clip_tail + z);
                }
                Some((state @ (Op::Eq | Op::Match), z)) => {
                    let mut match_add = 0u32;
                    let mut qi = query.len() - query_clip_tail;
                    let mut ri = ref_clip_head + self.offset + subdb_len;
                    while clip_tail > 0 && qi < query.len() && ri < reference.len() {
                        if query[qi] != reference[ri] {
                            break;
                        }
                        match_add += 1;
                        clip_tail -= 1;
                        qi += 1;
                        ri += 1;
                    }
                    let last = self.cigar.len() - 1;
                    if match_add > 0 {
                        self.cigar[last] = (state, z + match_add);
                    }
                    if clip_tail > 0 {
                        self.cigar.push((Op::SoftClip, clip_tail));
                    }
                }
                _ => self.cigar.push((Op::SoftClip, clip_tail)),
            }
        }
    }

    /// Extend the outer CIGAR boundaries with hard clips for bases that were
    /// never part of the input window at all (e.g. adapter trimmed upstream).
    pub fn append_hardclip(&mut self, clip_head: u32, clip_tail: u32) {
        if clip_head > 0 {
            match self.cigar.first().copied() {
                Some((Op::HardClip, z)) => self.cigar[0] = (Op::HardClip, clip_head + z),
                _ => self.cigar.insert(0, (Op::HardClip, clip_head)),
            }
        }
        if clip_tail > 0 {
            match self.cigar.last().copied() {
                Some((Op::HardClip, z)) => {
                    let last = self.cigar.len() - 1;
                    self.cigar[last] = (Op::HardClip, clip_tail + z);
                }
                _ => self.cigar.push((Op::HardClip, clip_tail)),
            }
        }
    }

    /// Replace non-match edits at either end of the CIGAR with soft clips,
    /// scanning inward from each end until the first exact match is found.
    pub fn softclip_trace(&mut self) {
        let mut soft_clip_3p = 0u32;
        let mut tail_cut = self.cigar.len();
        while tail_cut > 0 {
            let (state, z) = self.cigar[tail_cut - 1];
            if state == Op::Eq {
                break;
            } else if state != Op::Del && state != Op::HardClip {
                soft_clip_3p += z;
            }
            tail_cut -= 1;
        }
        self.cigar.truncate(tail_cut);
        if soft_clip_3p > 0 {
            self.cigar.push((Op::SoftClip, soft_clip_3p));
        }

        let mut offset = self.offset;
        let mut soft_clip_5p = 0u32;
        let mut head_cut = 0usize;
        while head_cut < self.cigar.len() {
            let (state, z) = self.cigar[head_cut];
            if state == Op::Eq {
                break;
            } else if state != Op::HardClip {
                if state != Op::Del {
                    soft_clip_5p += z;
                }
                if state != Op::Ins {
                    offset += z as usize;
                }
            }
            head_cut += 1;
        }
        self.cigar.drain(0..head_cut);
        if soft_clip_5p > 0 {
            self.cigar.insert(0, (Op::SoftClip, soft_clip_5p));
        }
        self.offset = offset;
    }

    /// Collapse the CIGAR by fusing consecutive `=`/`X` runs into `M`.
    pub fn compact_trace(&mut self) {
        let mut compacted: Vec<(Op, u32)> = Vec::with_capacity(self.cigar.len());
        for &(op, len) in &self.cigar {
            if op == Op::Eq || op == Op::Diff {
                if let Some((Op::Match, last_len)) = compacted.last_mut() {
                    *last_len += len;
                    continue;
                }
                compacted.push((Op::Match, len));
            } else {
                compacted.push((op, len));
            }
        }
        self.cigar = compacted;
    }
}
