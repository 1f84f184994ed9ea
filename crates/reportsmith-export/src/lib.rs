//! Paginated export
//!
//! Splits a tall preview raster into fixed-height pages: slice boundaries
//! are contiguous, every source row appears exactly once, and the final
//! page's unused trailing area stays blank. Also owns the scoped hiding of
//! preview-only overlay markers and the idempotent export naming scheme.

pub mod naming;
pub mod overlay;
pub mod paginate;

pub use naming::export_basename;
pub use overlay::{OverlayControl, OverlayGuard};
pub use paginate::{paginate_document, ExportedDocument, PageGeometry, PaginationError};
