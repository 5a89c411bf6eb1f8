//! Report module - terminal summary, churn report export, charts and bundles

pub mod analysis_export;
pub mod bundle;
pub mod charts;
pub mod churn_export;
pub mod summary;

pub use analysis_export::*;
pub use bundle::*;
pub use charts::*;
pub use churn_export::*;
pub use summary::*;
