//! Ready-made function sets agents can register as-is:
//! - Calculator: arithmetic over string-encoded operands
//! - Datetime: current-date lookup

pub mod calculator;
pub mod datetime;

pub use calculator::calculator_functions;
pub use datetime::datetime_functions;
