use thiserror::Error;

/// Failure modes of the alignment engine.
///
/// `Alloc` and `CorruptTrace` leave the engine in an indeterminate state;
/// every other variant is rejected at entry with no state change.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("allocation failed while growing alignment buffers to {rows}x{cols}")]
    Alloc { rows: usize, cols: usize },

    #[error("empty reference or query input")]
    EmptyInput,

    #[error("assume_phred {0} out of range 0..=93")]
    QualityOutOfRange(u8),

    #[error("quality buffer shorter than query ({qual_len} < {query_len})")]
    QualityTooShort { qual_len: usize, query_len: usize },

    #[error("traceback encountered a corrupt cigar opcode")]
    CorruptTrace,
}

pub type AlignResult<T> = Result<T, AlignError>;
