mod buffers;
mod engine;
mod input;
mod pair;
mod penalty;
mod postproc;
pub mod types;

pub use engine::{Engine, Session};
pub use pair::AlignPair;
pub use penalty::PenaltyTables;
pub use types::{AlignmentMode, AlignmentResult, Cigar, Op, Penalties};

#[cfg(test)]
mod tests;
