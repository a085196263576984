//! Standard math functions

mod math;
mod aggregate;

pub use math::{Sqrt, Ln, Log10, Exp, Pow, Abs, Round, Floor, Ceil};
pub use aggregate::{Sum, Avg, Min, Max};
