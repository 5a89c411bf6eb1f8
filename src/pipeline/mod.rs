//! Pipeline module - loading, validation and the RFM churn steps

pub mod binning;
pub mod category;
pub mod correlation;
pub mod error;
pub mod excel;
pub mod loader;
pub mod orders;
pub mod rfm;
pub mod segment;

pub use binning::*;
pub use category::*;
pub use correlation::*;
pub use error::*;
pub use excel::{excel_column_names, read_excel};
pub use loader::*;
pub use orders::*;
pub use rfm::*;
pub use segment::*;
