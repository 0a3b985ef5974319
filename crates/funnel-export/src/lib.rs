//! Export of funnel projects.
//!
//! [`Exporter`] loads a project and its entities through the stores and
//! renders them either as a pretty-printed JSON snapshot or as Markdown (see
//! [`render_markdown`], which is pure and can be used on already loaded
//! data).

pub mod error;
pub mod exporter;
pub mod format;
pub mod markdown;

pub use error::{ExportError, ExportResult};
pub use exporter::{Exporter, ProjectSnapshot};
pub use format::ExportFormat;
pub use markdown::render_markdown;
