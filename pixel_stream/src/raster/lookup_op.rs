use super::raster::*;
use super::raster_image::*;
use super::raster_op_trait::*;
use super::rows::*;
use crate::color::*;
use crate::error::*;

use smallvec::*;

use std::fmt;
use std::sync::*;

///
/// A type of value that can be stored in a lookup table
///
pub trait LookupEntry : 'static + Copy + Send + Sync + fmt::Debug {
    /// The value of this entry as a sample
    fn to_sample(self) -> i32;

    /// Wraps a lookup operation that uses this entry type so it can be sent to an accelerator
    fn accelerated_op(op: &LookupOp<Self>) -> AcceleratedOp<'_>;
}

impl LookupEntry for u8 {
    #[inline] fn to_sample(self) -> i32 { self as i32 }
    #[inline] fn accelerated_op(op: &LookupOp<u8>) -> AcceleratedOp<'_> { AcceleratedOp::ByteLookup(op) }
}

impl LookupEntry for u16 {
    #[inline] fn to_sample(self) -> i32 { self as i32 }
    #[inline] fn accelerated_op(op: &LookupOp<u16>) -> AcceleratedOp<'_> { AcceleratedOp::ShortLookup(op) }
}

///
/// Maps sample values to new values, using either one table for every band or a separate table per band
///
/// A sample `s` in band `b` maps to `table[b][s - offset]`. Samples below the offset or past the end of the table are
/// errors rather than being clamped.
///
#[derive(Clone, Debug, PartialEq)]
pub struct LookupTable<TEntry: LookupEntry> {
    offset: i32,
    tables: SmallVec<[Arc<[TEntry]>; 4]>,
}

/// Lookup table with 8-bit entries
pub type ByteLookupTable = LookupTable<u8>;

/// Lookup table with 16-bit entries
pub type ShortLookupTable = LookupTable<u16>;

impl<TEntry: LookupEntry> LookupTable<TEntry> {
    ///
    /// Creates a lookup table that uses the same values for every band
    ///
    pub fn shared(offset: i32, table: Vec<TEntry>) -> Result<LookupTable<TEntry>> {
        Self::per_band(offset, vec![table])
    }

    ///
    /// Creates a lookup table with a separate set of values for each band
    ///
    pub fn per_band(offset: i32, tables: Vec<Vec<TEntry>>) -> Result<LookupTable<TEntry>> {
        if offset < 0 {
            return Err(PixelStreamError::configuration(format!("lookup table offset {} is negative", offset)));
        }

        if tables.is_empty() {
            return Err(PixelStreamError::configuration("a lookup table needs at least one band"));
        }

        if let Some(empty_band) = tables.iter().position(|table| table.is_empty()) {
            return Err(PixelStreamError::configuration(format!("band {} of the lookup table has no entries", empty_band)));
        }

        Ok(LookupTable {
            offset: offset,
            tables: tables.into_iter().map(|table| table.into()).collect(),
        })
    }

    #[inline] pub fn offset(&self) -> i32 { self.offset }
    #[inline] pub fn num_tables(&self) -> usize { self.tables.len() }

    ///
    /// The entries used for a band
    ///
    #[inline]
    pub fn table(&self, band: usize) -> &[TEntry] {
        if self.tables.len() == 1 { &self.tables[0][..] } else { &self.tables[band][..] }
    }

    ///
    /// Looks up the value for a sample in a band
    ///
    #[inline]
    pub fn lookup(&self, band: usize, sample: i32) -> Result<i32> {
        let table = self.table(band);
        let index = (sample as i64) - (self.offset as i64);

        if index < 0 || index >= table.len() as i64 {
            Err(PixelStreamError::LookupOutOfRange { band, sample, offset: self.offset, table_len: table.len() })
        } else {
            Ok(table[index as usize].to_sample())
        }
    }
}

///
/// Replaces every sample of a raster with the value from a lookup table
///
#[derive(Clone)]
pub struct LookupOp<TEntry: LookupEntry> {
    table:          LookupTable<TEntry>,
    accelerator:    Option<Arc<dyn RasterAccelerator>>,
}

impl<TEntry: LookupEntry> LookupOp<TEntry> {
    pub fn new(table: LookupTable<TEntry>) -> LookupOp<TEntry> {
        LookupOp { table, accelerator: None }
    }

    ///
    /// Uses an accelerator for this operation where it's able
    ///
    pub fn with_accelerator(mut self, accelerator: Arc<dyn RasterAccelerator>) -> LookupOp<TEntry> {
        self.accelerator = Some(accelerator);
        self
    }

    #[inline]
    pub fn table(&self) -> &LookupTable<TEntry> { &self.table }

    ///
    /// Checks that every sample in the first `mapped_bands` bands of a raster has an entry in the lookup table
    ///
    fn check_range(&self, src: &Raster, mapped_bands: usize) -> Result<()> {
        let bands = src.bands();

        for pixel in src.samples().chunks(bands) {
            for (band, sample) in pixel.iter().take(mapped_bands).enumerate() {
                self.table.lookup(band, *sample)?;
            }
        }

        Ok(())
    }

    ///
    /// Looks up the first `mapped_bands` bands of every pixel, copying any other bands unchanged
    ///
    fn lookup_bands(&self, src: &Raster, dst: &mut Raster, mapped_bands: usize) -> Result<()> {
        let table       = &self.table;
        let bands       = src.bands();
        let sample_type = dst.sample_type();

        for_each_row(dst, |y, dst_row| {
            if y >= src.height() { return Ok(()); }

            for (x, src_pixel) in src.row(y).chunks(bands).enumerate() {
                let dst_pixel = &mut dst_row[(x * bands)..((x + 1) * bands)];

                for band in 0..bands {
                    dst_pixel[band] = if band < mapped_bands {
                        sample_type.store(table.lookup(band, src_pixel[band])?)
                    } else {
                        src_pixel[band]
                    };
                }
            }

            Ok(())
        })
    }

    ///
    /// Applies the lookup table to a single ARGB colour. Tables with 1 or 3 bands leave the alpha channel alone
    ///
    fn lookup_argb(&self, argb: u32) -> Result<u32> {
        let [a, r, g, b]    = argb_components(argb);
        let component       = |band: usize, value: u8| -> Result<u8> { Ok(self.table.lookup(band, value as i32)?.clamp(0, 255) as u8) };
        let alpha           = if self.table.num_tables() == 4 { component(3, a)? } else { a };

        Ok(argb_from_components([alpha, component(0, r)?, component(1, g)?, component(2, b)?]))
    }

    ///
    /// Applies the lookup table to the colours of an image
    ///
    /// The alpha channel of an image is only looked up if the table has a separate band for it. Indexed images have their
    /// palette looked up instead of their pixels, and premultiplied images are looked up with their colours divided by alpha.
    ///
    pub fn filter_image(&self, src: &RasterImage) -> Result<RasterImage> {
        let num_tables = self.table.num_tables();

        let result = match src.color() {
            ImageColor::Indexed(palette) => {
                if num_tables != 1 && num_tables != 3 && num_tables != 4 {
                    return Err(PixelStreamError::delivery(format!("a lookup table with {} bands cannot be applied to a palette", num_tables)));
                }

                let mut entries = Vec::with_capacity(palette.len());
                for entry in palette.entries() {
                    entries.push(self.lookup_argb(*entry)?);
                }

                let mut remapped = IndexPalette::new(entries)?;
                if let Some(transparent) = palette.transparent_index() {
                    remapped = remapped.with_transparent_index(transparent)?;
                }

                RasterImage::new(src.raster().clone(), ImageColor::Indexed(Arc::new(remapped)))?
            }

            ImageColor::Rgba { premultiplied } => {
                let mapped_bands = match num_tables {
                    1 | 3   => 3,
                    4       => 4,
                    _       => { return Err(PixelStreamError::delivery(format!("a lookup table with {} bands cannot be applied to an RGBA image", num_tables))); }
                };

                let straight    = if *premultiplied { src.expand_to_rgba(false)? } else { src.clone() };
                let mut raster  = straight.raster().create_compatible();
                self.lookup_bands(straight.raster(), &mut raster, mapped_bands)?;

                RasterImage::new(raster, ImageColor::Rgba { premultiplied: false })?
            }

            ImageColor::Rgb | ImageColor::Gray => {
                RasterImage::new(self.filter_raster(src.raster())?, src.color().clone())?
            }
        };

        Ok(result)
    }

    ///
    /// Applies the lookup table to the colours of an image, writing the result to an existing image
    ///
    /// The destination is left unchanged if this returns an error.
    ///
    pub fn filter_image_into(&self, src: &RasterImage, dst: &mut RasterImage) -> Result<()> {
        self.filter_image(src)?.copy_into(dst)
    }
}

impl<TEntry: LookupEntry> RasterOp for LookupOp<TEntry> {
    fn filter_into(&self, src: &Raster, dst: &mut Raster) -> Result<()> {
        let num_tables = self.table.num_tables();

        if num_tables != 1 && num_tables != src.bands() {
            return Err(PixelStreamError::delivery(format!("a lookup table with {} bands cannot be applied to a raster with {} bands", num_tables, src.bands())));
        }

        if dst.bands() != src.bands() {
            return Err(PixelStreamError::delivery(format!("cannot look up a raster with {} bands into one with {} bands", src.bands(), dst.bands())));
        }

        if !dst.covers(src) {
            return Err(PixelStreamError::delivery(format!("a {}x{} destination is too small for a {}x{} source", dst.width(), dst.height(), src.width(), src.height())));
        }

        self.check_range(src, src.bands())?;

        if let Some(accelerator) = &self.accelerator {
            if accelerator.filter(TEntry::accelerated_op(self), src, dst) {
                return Ok(());
            }
        }

        self.lookup_bands(src, dst, src.bands())
    }

    fn create_compatible_dest_raster(&self, src: &Raster) -> Result<Raster> {
        Ok(src.create_compatible())
    }
}

impl<TEntry: LookupEntry> fmt::Debug for LookupOp<TEntry> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LookupOp")
            .field("table", &self.table)
            .field("accelerated", &self.accelerator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bad_tables_are_rejected() {
        assert!(ByteLookupTable::shared(-1, vec![0]).is_err());
        assert!(ByteLookupTable::shared(0, vec![]).is_err());
        assert!(ShortLookupTable::per_band(0, vec![]).is_err());
    }

    #[test]
    fn past_the_end_is_an_error() {
        let table = ByteLookupTable::shared(10, vec![1, 2, 3]).unwrap();

        assert!(table.lookup(0, 12) == Ok(3));
        assert!(table.lookup(0, 13) == Err(PixelStreamError::LookupOutOfRange { band: 0, sample: 13, offset: 10, table_len: 3 }));
    }

    #[test]
    fn table_count_must_be_compatible() {
        let src = Raster::zeroed(2, 2, 3, SampleType::Byte).unwrap();
        let op  = LookupOp::new(ByteLookupTable::per_band(0, vec![vec![0; 256], vec![0; 256]]).unwrap());

        assert!(op.filter_raster(&src).is_err());
    }

    #[test]
    fn alpha_is_left_alone() {
        let invert  = (0..=255u8).rev().collect::<Vec<u8>>();
        let op      = LookupOp::new(ByteLookupTable::shared(0, invert).unwrap());
        let src     = RasterImage::from_packed(1, 1, &[0x80102030], 1, &ColorInterpreter::default_argb()).unwrap();
        let result  = op.filter_image(&src).unwrap();

        assert!(result.argb(0, 0) == 0x80efdfcf, "{:08x}", result.argb(0, 0));
    }

    #[test]
    fn palettes_are_remapped() {
        let invert  = (0..=255u8).rev().collect::<Vec<u8>>();
        let op      = LookupOp::new(ByteLookupTable::shared(0, invert).unwrap());
        let palette = Arc::new(IndexPalette::from_rgb(vec![0x000000, 0xff8000]).unwrap());
        let src     = RasterImage::from_packed(2, 1, &[1, 0], 2, &ColorInterpreter::Indexed(palette)).unwrap();
        let result  = op.filter_image(&src).unwrap();

        assert!(result.raster() == src.raster());
        assert!(result.to_argb() == vec![0xff007fff, 0xffffffff]);
    }
}
