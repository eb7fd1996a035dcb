use super::raster::*;
use crate::error::*;

///
/// Calls a function for each row of a raster, with the row number and the samples for that row
///
#[cfg(not(feature="multithreading"))]
pub (crate) fn for_each_row<TFn>(dst: &mut Raster, process_row: TFn) -> Result<()>
where
    TFn: Sync + Send + Fn(usize, &mut [i32]) -> Result<()>,
{
    let row_len = dst.row_len();

    dst.samples_mut()
        .chunks_mut(row_len)
        .enumerate()
        .try_for_each(|(y, row)| process_row(y, row))
}

///
/// Calls a function for each row of a raster, with the row number and the samples for that row
///
/// Rows are processed in parallel
///
#[cfg(feature="multithreading")]
pub (crate) fn for_each_row<TFn>(dst: &mut Raster, process_row: TFn) -> Result<()>
where
    TFn: Sync + Send + Fn(usize, &mut [i32]) -> Result<()>,
{
    use rayon::prelude::*;

    let row_len = dst.row_len();

    dst.samples_mut()
        .par_chunks_mut(row_len)
        .enumerate()
        .try_for_each(|(y, row)| process_row(y, row))
}
