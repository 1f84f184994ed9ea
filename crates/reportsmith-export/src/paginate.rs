//! Page geometry and raster slicing

use reportsmith_artifact::{Raster, RasterError};
use serde::{Deserialize, Serialize};

const PAGE_BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Export failures
#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
    /// A zero-height source is a programming-contract violation, not a
    /// zero-page document
    #[error("cannot paginate a zero-height source raster")]
    EmptySource,

    /// Source is wider than the page content area; output is never scaled
    #[error("source raster width {source_width} exceeds page content width {content_width}")]
    SourceTooWide {
        /// Source raster width
        source_width: u32,
        /// Usable page width
        content_width: u32,
    },

    /// Page dimensions leave no content area
    #[error("page geometry leaves no content area: {page_width}x{page_height} with margin {margin}")]
    InvalidGeometry {
        /// Page width
        page_width: u32,
        /// Page height
        page_height: u32,
        /// Uniform margin
        margin: u32,
    },

    /// Raster slicing failed
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Fixed page dimensions with a uniform margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width in pixels
    pub page_width: u32,
    /// Page height in pixels
    pub page_height: u32,
    /// Uniform margin in pixels
    pub margin: u32,
}

impl PageGeometry {
    /// Construct a geometry, validating that a content area remains
    ///
    /// # Errors
    /// Returns [`PaginationError::InvalidGeometry`] when the margins consume
    /// the whole page.
    pub fn new(page_width: u32, page_height: u32, margin: u32) -> Result<Self, PaginationError> {
        let geometry = Self {
            page_width,
            page_height,
            margin,
        };
        if geometry.content_width() == 0 || geometry.content_height() == 0 {
            return Err(PaginationError::InvalidGeometry {
                page_width,
                page_height,
                margin,
            });
        }
        Ok(geometry)
    }

    /// Usable width between the margins
    #[inline]
    #[must_use]
    pub fn content_width(&self) -> u32 {
        self.page_width.saturating_sub(self.margin * 2)
    }

    /// Usable height between the margins
    #[inline]
    #[must_use]
    pub fn content_height(&self) -> u32 {
        self.page_height.saturating_sub(self.margin * 2)
    }
}

impl Default for PageGeometry {
    /// A4 portrait at 96 dpi with a 24 px margin
    fn default() -> Self {
        Self {
            page_width: 794,
            page_height: 1123,
            margin: 24,
        }
    }
}

/// The finished multi-page document
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    /// Stable name derived from client identity and reporting period
    pub basename: String,
    /// Geometry every page was laid out with
    pub geometry: PageGeometry,
    /// Height of the source raster that was split
    pub source_height: u32,
    /// Page rasters, in order
    pub pages: Vec<Raster>,
}

impl ExportedDocument {
    /// Total page count
    #[inline]
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Split `source` into page-sized rasters
///
/// `page_count = ceil(source_height / content_height)`. Page `i` carries the
/// source rows `[i * ch, min((i + 1) * ch, H))` blitted at the margin
/// offset; the trailing area of the last page stays blank.
///
/// # Errors
/// - [`PaginationError::EmptySource`] for a zero-height source
/// - [`PaginationError::SourceTooWide`] when the source does not fit the
///   content width (no silent scaling)
pub fn paginate_document(
    basename: impl Into<String>,
    source: &Raster,
    geometry: PageGeometry,
) -> Result<ExportedDocument, PaginationError> {
    if source.height() == 0 {
        return Err(PaginationError::EmptySource);
    }
    let content_height = geometry.content_height();
    let content_width = geometry.content_width();
    if content_height == 0 || content_width == 0 {
        return Err(PaginationError::InvalidGeometry {
            page_width: geometry.page_width,
            page_height: geometry.page_height,
            margin: geometry.margin,
        });
    }
    if source.width() > content_width {
        return Err(PaginationError::SourceTooWide {
            source_width: source.width(),
            content_width,
        });
    }

    let page_count = source.height().div_ceil(content_height);
    let mut pages = Vec::with_capacity(page_count as usize);
    for i in 0..page_count {
        let start = i * content_height;
        let end = (start + content_height).min(source.height());
        let slice_bytes = source.rows(start, end)?.to_vec();
        let slice = Raster::new(source.width(), end - start, slice_bytes)?;

        let mut page = Raster::filled(geometry.page_width, geometry.page_height, PAGE_BACKGROUND);
        page.blit(&slice, geometry.margin, geometry.margin)?;
        pages.push(page);
    }

    let basename = basename.into();
    tracing::info!(
        %basename,
        source_height = source.height(),
        pages = pages.len(),
        "document paginated"
    );
    Ok(ExportedDocument {
        basename,
        geometry,
        source_height: source.height(),
        pages,
    })
}
