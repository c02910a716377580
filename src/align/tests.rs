use super::types::{Op, Penalties};
use super::Engine;
use proptest::prelude::*;

fn default_penalties() -> Penalties {
    Penalties::new(-10, 30, 50, 20, 33, 40).unwrap()
}

fn uniform_quality(len: usize) -> Vec<u8> {
    vec![b'I'; len]
}

fn global_cigar(reference: &[u8], query: &[u8], quality: &[u8]) -> (i32, String) {
    let mut engine = Engine::new(default_penalties());
    let mut session = engine
        .prepare(reference, 0, 0, query, quality, 0, 0)
        .unwrap();
    session.align_init_global();
    session.align().unwrap();
    session.locate_min();
    session.trace().unwrap();
    let result = session.result();
    (result.score, result.cigar.to_string())
}

fn semi_cigar(reference: &[u8], query: &[u8], quality: &[u8]) -> (i32, usize, String) {
    let mut engine = Engine::new(default_penalties());
    let mut session = engine
        .prepare(reference, 0, 0, query, quality, 0, 0)
        .unwrap();
    session.align_init_semi();
    session.align().unwrap();
    session.locate_min();
    session.trace().unwrap();
    let result = session.result();
    (result.score, result.offset, result.cigar.to_string())
}

#[test]
fn identical_sequences_align_with_all_matches() {
    let (score, cigar) = global_cigar(b"ACGT", b"ACGT", &uniform_quality(4));
    assert_eq!(cigar, "4=");
    assert_eq!(score, 0, "an all-match alignment at this quality scores exactly zero");
}

#[test]
fn single_substitution_is_reported_as_mismatch_run() {
    let (_, cigar) = global_cigar(b"ACGT", b"ACCT", &uniform_quality(4));
    assert_eq!(cigar, "2=1X1=");
}

#[test]
fn insertion_in_query_is_reported() {
    // matching flanks on both sides of the inserted base are long enough that
    // the free reference end-gap can never win by discarding them early, and
    // the inserted base differs from both of its neighbors so there is only
    // one optimal placement for it.
    let (_, cigar) = global_cigar(b"ACGTACGT", b"ACGATACGT", &uniform_quality(9));
    assert_eq!(cigar, "3=1I5=");
}

#[test]
fn deletion_in_query_is_reported() {
    let (_, cigar) = global_cigar(b"ACGATACGT", b"ACGTACGT", &uniform_quality(8));
    assert_eq!(cigar, "3=1D5=");
}

#[test]
fn reference_n_is_a_wildcard_match() {
    let (score_n, cigar) = global_cigar(b"ANGT", b"ACGT", &uniform_quality(4));
    let (score_identical, _) = global_cigar(b"ACGT", b"ACGT", &uniform_quality(4));
    assert_eq!(cigar, "4=");
    assert_eq!(score_n, score_identical);
}

#[test]
fn query_n_is_not_a_wildcard() {
    // the wildcard is deliberately one-sided on the reference: a query 'N'
    // against a non-'N' reference base scores as an ordinary mismatch.
    let (_, cigar) = global_cigar(b"ACGT", b"ANGT", &uniform_quality(4));
    assert_eq!(cigar, "1=1X2=");
}

#[test]
fn semi_global_free_leading_reference_gap() {
    let (score_semi, offset, cigar) = semi_cigar(b"TTTACGT", b"ACGT", &uniform_quality(4));
    let (score_identical, _) = global_cigar(b"ACGT", b"ACGT", &uniform_quality(4));
    assert_eq!(offset, 3);
    assert_eq!(cigar, "4=");
    assert_eq!(score_semi, score_identical);
}

#[test]
fn compact_trace_fuses_eq_and_diff_into_match() {
    let quality = uniform_quality(4);
    let mut engine = Engine::new(default_penalties());
    let mut session = engine
        .prepare(b"ACGT", 0, 0, b"ACCT", &quality, 0, 0)
        .unwrap();
    session.align_init_global();
    session.align().unwrap();
    session.locate_min();
    session.trace().unwrap();
    session.compact_trace();
    assert_eq!(session.result().cigar.to_string(), "4M");
}

#[test]
fn compact_trace_is_idempotent() {
    let quality = uniform_quality(4);
    let mut engine = Engine::new(default_penalties());
    let mut session = engine
        .prepare(b"ACGT", 0, 0, b"ACCT", &quality, 0, 0)
        .unwrap();
    session.align_init_global();
    session.align().unwrap();
    session.locate_min();
    session.trace().unwrap();
    session.compact_trace();
    let once = session.result().cigar;
    session.compact_trace();
    let twice = session.result().cigar;
    assert_eq!(once, twice);
}

#[test]
fn softclip_trace_is_idempotent_and_ends_clean() {
    let quality = uniform_quality(4);
    let mut engine = Engine::new(default_penalties());
    let mut session = engine
        .prepare(b"ACGT", 0, 0, b"ACCT", &quality, 0, 0)
        .unwrap();
    session.align_init_global();
    session.align().unwrap();
    session.locate_min();
    session.trace().unwrap();
    session.softclip_trace();
    let once = session.result().cigar;
    session.softclip_trace();
    let twice = session.result().cigar;
    assert_eq!(once, twice);
    let first = once.ops.first().unwrap().0;
    let last = once.ops.last().unwrap().0;
    assert!(matches!(first, Op::Eq | Op::SoftClip | Op::HardClip));
    assert!(matches!(last, Op::Eq | Op::SoftClip | Op::HardClip));
}

#[test]
fn basic_align_pair_round_trips_to_equal_length_rows() {
    let quality = uniform_quality(8);
    let mut engine = Engine::new(default_penalties());
    let mut session = engine
        .prepare(b"ACGATACGT", 0, 0, b"ACGTACGT", &quality, 0, 0)
        .unwrap();
    session.align_init_global();
    session.align().unwrap();
    session.locate_min();
    session.trace().unwrap();
    let pair = session.get_basic_align_pair();
    assert_eq!(pair.reference_row.len(), pair.query_row.len());
    let stripped_ref: Vec<u8> = pair
        .reference_row
        .iter()
        .copied()
        .filter(|&b| b != b'-')
        .collect();
    assert_eq!(stripped_ref, b"ACGATACGT");
    let stripped_query: Vec<u8> = pair
        .query_row
        .iter()
        .copied()
        .filter(|&b| b != b'-')
        .collect();
    assert_eq!(stripped_query, b"ACGTACGT");
}

#[test]
fn prefer_extend_over_open_fuses_a_multi_base_gap_into_one_run() {
    // a 2-base deletion scores cheaper as one extended run (one gap-open
    // plus one extend) than as two independently opened single-base gaps
    // (two gap-opens), so the trace must record a single D run of length 2.
    // matching flanks on both sides are long enough that the free reference
    // end-gap can never win by discarding them early, and the deleted bases
    // differ from both neighbors so there is only one optimal placement.
    let (_, cigar) = global_cigar(b"ACGTGCACGT", b"ACGTACGT", &uniform_quality(8));
    assert_eq!(cigar, "4=2D4=");
}

/// Naive three-matrix DP, independent of the rolling-row engine, used to
/// check optimal score agreement for randomly generated inputs.
fn naive_global_score(reference: &[u8], query: &[u8], quality: &[u8], cfg: &Penalties) -> i32 {
    use super::penalty::PenaltyTables;
    let tables = PenaltyTables::new(cfg);
    let n = query.len();
    let m = reference.len();

    let mut mat_m = vec![vec![0i32; m + 1]; n + 1];
    let mut mat_i = vec![vec![0i32; m + 1]; n + 1];
    let mut mat_d = vec![vec![0i32; m + 1]; n + 1];

    let qq0 = (quality[0] - cfg.phred_offset) as usize;
    let gopen_true0 = tables.gopen_penalty[qq0] - tables.gext_penalty[qq0];
    mat_m[0][0] = 0;
    mat_i[0][0] = gopen_true0;
    let mut stored = cfg.gap_open_extend - cfg.gap_extend;
    for j in 1..=m {
        stored += cfg.gap_extend;
        mat_m[0][j] = stored;
        mat_i[0][j] = stored + gopen_true0;
    }

    for i in 1..=n {
        let qq = (quality[i - 1] - cfg.phred_offset) as usize;
        let match_pen = tables.match_penalty[qq];
        let mismatch_pen = tables.mismatch_penalty[qq];
        let gopen_pen = tables.gopen_penalty[qq];
        let gext_pen = tables.gext_penalty[qq];

        mat_i[i][0] = mat_i[i - 1][0] + gext_pen;
        mat_m[i][0] = mat_i[i][0];
        // the rolling engine re-seeds its deletion accumulator from the
        // current row's column-0 score at the start of every row; mirror
        // that here so column 1's wd_extend sees the same baseline.
        mat_d[i][0] = mat_m[i][0] + (cfg.gap_open_extend - cfg.gap_extend);

        for j in 1..=m {
            let is_match = reference[j - 1] == query[i - 1] || reference[j - 1] == b'N';
            let wm = mat_m[i - 1][j - 1] + if is_match { match_pen } else { mismatch_pen };
            let wi_open = mat_m[i - 1][j] + gopen_pen;
            let wi_extend = mat_i[i - 1][j] + gext_pen;
            let wi = wi_open.min(wi_extend);
            mat_i[i][j] = wi;

            let wd_open = mat_m[i][j - 1] + cfg.gap_open_extend;
            let wd_extend = mat_d[i][j - 1] + cfg.gap_extend;
            let wd = wd_open.min(wd_extend);
            mat_d[i][j] = wd;

            mat_m[i][j] = if wi < wm {
                wi.min(wd)
            } else if wd < wm {
                wd
            } else {
                wm
            };
        }
    }

    *mat_m[n].iter().min().unwrap()
}

proptest! {
    #[test]
    fn cigar_consumes_exactly_the_query_length(
        reference in "[ACGT]{4,24}",
        query in "[ACGT]{4,24}",
    ) {
        let quality = uniform_quality(query.len());
        let mut engine = Engine::new(default_penalties());
        let mut session = engine
            .prepare(reference.as_bytes(), 0, 0, query.as_bytes(), &quality, 0, 0)
            .unwrap();
        session.align_init_global();
        session.align().unwrap();
        session.locate_min();
        session.trace().unwrap();
        let result = session.result();
        prop_assert_eq!(result.cigar.query_span() as usize, query.len());
    }

    #[test]
    fn cigar_spans_exactly_the_consumed_reference_range(
        reference in "[ACGT]{4,24}",
        query in "[ACGT]{4,24}",
    ) {
        let quality = uniform_quality(query.len());
        let mut engine = Engine::new(default_penalties());
        let mut session = engine
            .prepare(reference.as_bytes(), 0, 0, query.as_bytes(), &quality, 0, 0)
            .unwrap();
        session.align_init_global();
        session.align().unwrap();
        session.locate_min();
        session.trace().unwrap();
        let result = session.result();
        prop_assert_eq!(
            result.cigar.reference_span() as usize,
            result.end_col - result.offset
        );
    }

    #[test]
    fn score_matches_naive_three_matrix_dp(
        reference in "[ACGT]{2,16}",
        query in "[ACGT]{2,16}",
    ) {
        let quality = uniform_quality(query.len());
        let cfg = default_penalties();
        let mut engine = Engine::new(cfg);
        let mut session = engine
            .prepare(reference.as_bytes(), 0, 0, query.as_bytes(), &quality, 0, 0)
            .unwrap();
        session.align_init_global();
        session.align().unwrap();
        let engine_score = session.locate_min();

        let naive_score = naive_global_score(reference.as_bytes(), query.as_bytes(), &quality, &cfg);
        prop_assert_eq!(engine_score, naive_score);
    }
}


