pub mod align;
pub mod error;

pub use align::{AlignPair, AlignmentMode, AlignmentResult, Cigar, Engine, Op, Penalties, Session};
pub use error::{AlignError, AlignResult};
