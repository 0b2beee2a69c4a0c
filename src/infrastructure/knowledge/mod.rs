//! Knowledge source implementations

mod json_export;

pub use json_export::JsonExportSource;
