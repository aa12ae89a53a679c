//! srcmerge - Merge a project's source files into one Markdown document.
//!
//! srcmerge walks a directory tree, keeps the files whose path ends with a
//! configured suffix and contains none of the excluded fragments, and writes
//! them into a single document: a `path:` header followed by the file's
//! content in a fenced code block, one entry per file.
//!
//! # Quick Start
//!
//! ```no_run
//! use srcmerge::builder::Merger;
//!
//! // Merge every .js file outside node_modules/ and data/ into ./merge.md
//! let report = Merger::new(".").run().unwrap();
//!
//! println!("Merged {} files into {}", report.files, report.output.display());
//! ```
//!
//! # Modules
//!
//! - [`config`] - Run configuration
//! - [`filter`] - The qualification predicate
//! - [`walker`] - Deterministic directory traversal
//! - [`collect`] - Reading qualifying files in discovery order
//! - [`output`] - Document formatting and writing
//! - [`tokens`] - Token estimate for the run report
//! - [`builder`] - Fluent API and orchestration

pub mod builder;
pub mod collect;
pub mod config;
pub mod errors;
pub mod filter;
pub mod output;
pub mod tokens;
pub mod walker;

// Re-export key types at crate root for convenience
pub use builder::{run, MergeReport, Merger};
pub use collect::{collect, Collected, CollectedFile, CollectError};
pub use config::MergeConfig;
pub use errors::{ErrorKind, MergeError};
pub use filter::Filter;
pub use output::{merge, MergeOptions, MergeStats, OutputError};
pub use tokens::Encoding;
pub use walker::WalkError;
