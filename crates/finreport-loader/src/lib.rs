//! Loading report definitions and movements for finreport.
//!
//! - [`ReportLoader`] reads JSON report definitions, caching each by path
//!   until the file's modification time changes, and optionally validates them.
//! - [`ReportRegistry`] holds loaded definitions by `reportId` and tracks the
//!   selected report per statement type, persisted to a small JSON file.
//! - [`load_movements_csv`] reads the ledger rows statements are rendered from.
//!
//! # Example
//!
//! ```no_run
//! use finreport_core::StatementType;
//! use finreport_loader::{ReportLoader, ReportRegistry};
//! use std::path::Path;
//!
//! let mut loader = ReportLoader::new().with_validation(true);
//! let mut registry = ReportRegistry::new();
//! for report in loader.load_dir(Path::new("reports"))? {
//!     registry.register(report);
//! }
//! let income = registry.selected(StatementType::Income);
//! # Ok::<(), finreport_loader::LoadError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod loader;
mod movements;
mod registry;

pub use error::{LoadError, RegistryError};
pub use loader::ReportLoader;
pub use movements::{load_movements_csv, read_movements_csv};
pub use registry::ReportRegistry;
