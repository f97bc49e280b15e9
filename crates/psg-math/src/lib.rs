//! Power state graph math utilities.

pub mod math;

pub use math::beta::*;
pub use math::stable::*;
pub use math::students_t::*;
pub use math::welch;
