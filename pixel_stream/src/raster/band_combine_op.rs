use super::raster::*;
use super::raster_op_trait::*;
use super::rows::*;
use crate::error::*;

use smallvec::*;

use std::fmt;
use std::sync::*;

///
/// Calculates each band of the destination as a linear combination of the bands of the source
///
/// The matrix has one row for each destination band. Each row has a column per source band, optionally followed by a
/// constant term. Results are truncated towards zero and then stored in the destination sample type.
///
#[derive(Clone)]
pub struct BandCombineOp {
    rows:           usize,
    columns:        usize,

    /// The matrix, stored in rows
    matrix:         Arc<[f32]>,

    accelerator:    Option<Arc<dyn RasterAccelerator>>,
}

impl BandCombineOp {
    ///
    /// Creates a new band combine operation. Every row of the matrix must have the same length
    ///
    pub fn new<TRow: AsRef<[f32]>>(matrix: &[TRow]) -> Result<BandCombineOp> {
        let rows    = matrix.len();
        let columns = matrix.first().map(|row| row.as_ref().len()).unwrap_or(0);

        if rows == 0 || columns == 0 {
            return Err(PixelStreamError::configuration("a band combine matrix needs at least one row and column"));
        }

        if let Some(bad_row) = matrix.iter().position(|row| row.as_ref().len() != columns) {
            return Err(PixelStreamError::configuration(format!("row {} of the band combine matrix has {} columns, but row 0 has {}", bad_row, matrix[bad_row].as_ref().len(), columns)));
        }

        Ok(BandCombineOp {
            rows:           rows,
            columns:        columns,
            matrix:         matrix.iter().flat_map(|row| row.as_ref().iter().copied()).collect(),
            accelerator:    None,
        })
    }

    ///
    /// Uses an accelerator for this operation where it's able
    ///
    pub fn with_accelerator(mut self, accelerator: Arc<dyn RasterAccelerator>) -> BandCombineOp {
        self.accelerator = Some(accelerator);
        self
    }

    #[inline] pub fn rows(&self) -> usize { self.rows }
    #[inline] pub fn columns(&self) -> usize { self.columns }

    ///
    /// Returns a copy of the matrix
    ///
    pub fn matrix(&self) -> Vec<Vec<f32>> {
        self.matrix.chunks(self.columns).map(|row| row.to_vec()).collect()
    }

    ///
    /// Checks that this matrix can be applied to a raster with a particular number of bands
    ///
    fn check_source_bands(&self, bands: usize) -> Result<()> {
        if self.columns != bands && self.columns != bands + 1 {
            Err(PixelStreamError::delivery(format!("a band combine matrix with {} columns cannot be applied to a raster with {} bands", self.columns, bands)))
        } else {
            Ok(())
        }
    }
}

impl RasterOp for BandCombineOp {
    fn filter_into(&self, src: &Raster, dst: &mut Raster) -> Result<()> {
        let src_bands = src.bands();
        self.check_source_bands(src_bands)?;

        if dst.bands() != self.rows {
            return Err(PixelStreamError::delivery(format!("a band combine matrix with {} rows cannot write to a raster with {} bands", self.rows, dst.bands())));
        }

        if !dst.covers(src) {
            return Err(PixelStreamError::delivery(format!("a {}x{} destination is too small for a {}x{} source", dst.width(), dst.height(), src.width(), src.height())));
        }

        if let Some(accelerator) = &self.accelerator {
            if accelerator.filter(AcceleratedOp::BandCombine(self), src, dst) {
                return Ok(());
            }
        }

        let columns     = self.columns;
        let rows        = self.rows;
        let matrix      = &self.matrix;
        let affine      = columns == src_bands + 1;
        let sample_type = dst.sample_type();

        for_each_row(dst, |y, dst_row| {
            if y >= src.height() { return Ok(()); }

            let mut result: SmallVec<[i32; 4]> = smallvec![0; rows];

            for x in 0..src.width() {
                let pixel = src.pixel(x, y);

                for (r, matrix_row) in matrix.chunks(columns).enumerate() {
                    let mut sum = pixel.iter().zip(matrix_row.iter())
                        .map(|(sample, weight)| (*sample as f32) * weight)
                        .sum::<f32>();

                    if affine {
                        sum += matrix_row[src_bands];
                    }

                    result[r] = sample_type.store(sum as i32);
                }

                let start = x * rows;
                dst_row[start..(start + rows)].copy_from_slice(&result);
            }

            Ok(())
        })
    }

    fn create_compatible_dest_raster(&self, src: &Raster) -> Result<Raster> {
        if self.rows != src.bands() {
            return Err(PixelStreamError::delivery(format!("cannot create a destination for a matrix with {} rows from a raster with {} bands", self.rows, src.bands())));
        }

        Ok(src.create_compatible())
    }
}

impl fmt::Debug for BandCombineOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BandCombineOp")
            .field("matrix", &self.matrix())
            .field("accelerated", &self.accelerator.is_some())
            .finish()
    }
}
