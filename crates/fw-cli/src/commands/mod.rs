//! Command implementations for fw-cli

pub mod check;
pub mod list;
pub mod show;

pub use check::run_check;
pub use list::run_list;
pub use show::run_show;
