//! Core math modules.

pub mod beta;
pub mod stable;
pub mod students_t;
pub mod welch;
