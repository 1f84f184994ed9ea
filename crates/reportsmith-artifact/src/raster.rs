//! RGBA raster buffer

use serde::{Deserialize, Serialize};

const BYTES_PER_PIXEL: usize = 4;

/// Errors constructing or slicing a raster
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// Pixel buffer length does not match the dimensions
    #[error("pixel buffer length {actual} does not match {width}x{height} rgba ({expected})")]
    BufferMismatch {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        actual: usize,
    },

    /// Requested row range lies outside the raster
    #[error("row range {start}..{end} outside raster of height {height}")]
    RowsOutOfBounds {
        /// Range start
        start: u32,
        /// Range end (exclusive)
        end: u32,
        /// Raster height
        height: u32,
    },
}

/// An RGBA8 image buffer
///
/// # Invariants
/// - `pixels.len() == width * height * 4`, enforced at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Construct from a pixel buffer, validating the length
    ///
    /// # Errors
    /// Returns [`RasterError::BufferMismatch`] when the buffer does not hold
    /// exactly `width * height` RGBA pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(RasterError::BufferMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A raster filled with one color
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * BYTES_PER_PIXEL)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Byte length of one row
    #[inline]
    #[must_use]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Bytes of rows `start..end`
    ///
    /// # Errors
    /// Returns [`RasterError::RowsOutOfBounds`] when the range exceeds the
    /// raster height or is inverted.
    pub fn rows(&self, start: u32, end: u32) -> Result<&[u8], RasterError> {
        if start > end || end > self.height {
            return Err(RasterError::RowsOutOfBounds {
                start,
                end,
                height: self.height,
            });
        }
        let row = self.row_bytes();
        Ok(&self.pixels[start as usize * row..end as usize * row])
    }

    /// Copy `src` into this raster with its top-left corner at `(x, y)`
    ///
    /// The source must fit entirely inside the destination.
    ///
    /// # Errors
    /// Returns [`RasterError::RowsOutOfBounds`] when the source would
    /// overrun the destination in either dimension.
    pub fn blit(&mut self, src: &Raster, x: u32, y: u32) -> Result<(), RasterError> {
        if u64::from(x) + u64::from(src.width) > u64::from(self.width)
            || u64::from(y) + u64::from(src.height) > u64::from(self.height)
        {
            return Err(RasterError::RowsOutOfBounds {
                start: y,
                end: y + src.height,
                height: self.height,
            });
        }
        let dst_row = self.row_bytes();
        let src_row = src.row_bytes();
        let x_off = x as usize * BYTES_PER_PIXEL;
        for r in 0..src.height as usize {
            let dst_start = (y as usize + r) * dst_row + x_off;
            let src_start = r * src_row;
            self.pixels[dst_start..dst_start + src_row]
                .copy_from_slice(&src.pixels[src_start..src_start + src_row]);
        }
        Ok(())
    }

    /// Content hash of the pixel data, used in preview fingerprints
    #[must_use]
    pub fn content_digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.width.to_le_bytes());
        hasher.update(&self.height.to_le_bytes());
        hasher.update(&self.pixels);
        *hasher.finalize().as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_buffer_length() {
        assert!(Raster::new(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            Raster::new(2, 2, vec![0; 15]),
            Err(RasterError::BufferMismatch { expected: 16, actual: 15, .. })
        ));
    }

    #[test]
    fn rows_slices_row_major() {
        let mut pixels = vec![0u8; 2 * 3 * 4];
        // Mark the first byte of each row: rows 0,1,2 -> 10,11,12
        for r in 0..3 {
            pixels[r * 8] = 10 + r as u8;
        }
        let raster = Raster::new(2, 3, pixels).unwrap();

        let middle = raster.rows(1, 2).unwrap();
        assert_eq!(middle.len(), raster.row_bytes());
        assert_eq!(middle[0], 11);
    }

    #[test]
    fn rows_rejects_out_of_bounds() {
        let raster = Raster::filled(2, 2, [0, 0, 0, 255]);
        assert!(raster.rows(1, 3).is_err());
        assert!(raster.rows(2, 1).is_err());
    }

    #[test]
    fn blit_copies_into_place() {
        let mut page = Raster::filled(4, 4, [255, 255, 255, 255]);
        let stamp = Raster::filled(2, 1, [1, 2, 3, 4]);
        page.blit(&stamp, 1, 2).unwrap();

        let row = page.rows(2, 3).unwrap();
        assert_eq!(&row[4..8], &[1, 2, 3, 4]);
        assert_eq!(&row[0..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn blit_rejects_overrun() {
        let mut page = Raster::filled(2, 2, [0, 0, 0, 0]);
        let big = Raster::filled(3, 1, [0, 0, 0, 0]);
        assert!(page.blit(&big, 0, 0).is_err());
    }

    #[test]
    fn content_digest_tracks_pixels() {
        let a = Raster::filled(2, 2, [1, 1, 1, 1]);
        let b = Raster::filled(2, 2, [1, 1, 1, 1]);
        let c = Raster::filled(2, 2, [2, 2, 2, 2]);
        assert_eq!(a.content_digest(), b.content_digest());
        assert_ne!(a.content_digest(), c.content_digest());
    }
}
