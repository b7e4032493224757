//! Analysis modules.
//!
//! Both analyzers reload the dataset on every call and share the typed
//! grouping helpers in [`aggregator`].

pub mod aggregator;
pub mod mom;
pub mod period;
pub mod summary;

pub use mom::analyze_mom_data;
pub use summary::analyze_marketing_data;
