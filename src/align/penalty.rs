use super::types::{Penalties, PHRED_RANGE};

/// Four dense quality→penalty lookup tables, one per scoring term, indexed
/// by `quality_byte - phred_offset`.
///
/// `w(q) = 1 - 10^(-(q + qN)/10)`, `qN = -10 * log10(0.75)`; each entry is
/// `10 + round(w(q) * base)`. The constant `10` floor keeps every entry
/// strictly positive even at `q = 0`.
#[derive(Clone, Debug)]
pub struct PenaltyTables {
    pub(crate) match_penalty: [i32; PHRED_RANGE],
    pub(crate) mismatch_penalty: [i32; PHRED_RANGE],
    pub(crate) gopen_penalty: [i32; PHRED_RANGE],
    pub(crate) gext_penalty: [i32; PHRED_RANGE],
}

impl PenaltyTables {
    pub fn new(penalties: &Penalties) -> Self {
        // qN = -10 * log10(P(error | N)), P(error | N) = 0.75
        let qn = -10.0 * 0.75f64.log10();
        let mut match_penalty = [0i32; PHRED_RANGE];
        let mut mismatch_penalty = [0i32; PHRED_RANGE];
        let mut gopen_penalty = [0i32; PHRED_RANGE];
        let mut gext_penalty = [0i32; PHRED_RANGE];

        for q in 0..PHRED_RANGE {
            let weight = 1.0 - 10f64.powf(-((q as f64) + qn) / 10.0);
            match_penalty[q] = 10 + (weight * penalties.match_score as f64).round() as i32;
            mismatch_penalty[q] = 10 + (weight * penalties.mismatch_score as f64).round() as i32;
            gopen_penalty[q] = 10 + (weight * penalties.gap_open_extend as f64).round() as i32;
            gext_penalty[q] = 10 + (weight * penalties.gap_extend as f64).round() as i32;
        }

        Self {
            match_penalty,
            mismatch_penalty,
            gopen_penalty,
            gext_penalty,
        }
    }
}
