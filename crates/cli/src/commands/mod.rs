//! Command implementations.

mod analyze;
mod info;
mod inspect;
mod validate;

pub use analyze::run_analyze;
pub use info::run_info;
pub use inspect::run_inspect;
pub use validate::run_validate;
