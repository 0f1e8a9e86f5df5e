//! Input-directory monitoring.
//!
//! Watches one directory for newly arrived PDF files and hands each to the
//! [`FileProcessor`](crate::pipeline::FileProcessor), one at a time.

pub mod monitor;

pub use monitor::DirectoryMonitor;
