//! Cleaning stages.
//!
//! Each stage is a single-shot transformation that fully owns its input
//! table: it runs to completion or fails as a whole.

mod derive;
mod expand;
mod filter;
mod impute;
mod prune;

pub use derive::ProfitComputer;
pub use expand::RowExpander;
pub use filter::NullDropper;
pub use impute::SentinelImputer;
pub use prune::ColumnPruner;
