use crate::color::*;
use crate::error::*;
use crate::geometry::*;

///
/// The packed samples that make up a pixel block
///
/// These are borrowed from whatever delivered the block and are only valid for the duration of a single call: anything
/// that needs to keep pixels around must copy them.
///
#[derive(Copy, Clone, Debug)]
pub enum PixelData<'a> {
    /// One byte per sample (typically indexes into a palette)
    Bytes(&'a [u8]),

    /// One 32-bit value per sample
    Ints(&'a [u32]),
}

///
/// A rectangular block of pixels delivered to a consumer
///
/// The sample for the pixel at `(x + m, y + n)` is found at `pixels[offset + n*scansize + m]`
///
#[derive(Clone, Debug)]
pub struct PixelBlock<'a> {
    pub x:          i32,
    pub y:          i32,
    pub width:      i32,
    pub height:     i32,

    /// How the samples in this block are converted to colours
    pub color:      &'a ColorInterpreter,

    /// The samples
    pub pixels:     PixelData<'a>,

    /// Index of the sample for the top-left pixel
    pub offset:     usize,

    /// Distance between the start of consecutive rows in the sample array
    pub scansize:   usize,
}

impl<'a> PixelData<'a> {
    ///
    /// The number of samples in the array
    ///
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            PixelData::Bytes(bytes) => bytes.len(),
            PixelData::Ints(ints)   => ints.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    ///
    /// Reads a sample from the array
    ///
    #[inline]
    pub fn sample(&self, index: usize) -> u32 {
        match self {
            PixelData::Bytes(bytes) => bytes[index] as u32,
            PixelData::Ints(ints)   => ints[index],
        }
    }
}

impl<'a> PixelBlock<'a> {
    ///
    /// Creates a new pixel block
    ///
    #[inline]
    pub fn new(x: i32, y: i32, width: i32, height: i32, color: &'a ColorInterpreter, pixels: PixelData<'a>, offset: usize, scansize: usize) -> Self {
        PixelBlock { x, y, width, height, color, pixels, offset, scansize }
    }

    ///
    /// Creates a block of 32-bit samples, tightly packed (the scansize is the width of the block)
    ///
    #[inline]
    pub fn from_ints(x: i32, y: i32, width: i32, height: i32, color: &'a ColorInterpreter, pixels: &'a [u32]) -> Self {
        PixelBlock::new(x, y, width, height, color, PixelData::Ints(pixels), 0, width.max(0) as usize)
    }

    ///
    /// Creates a block of byte samples, tightly packed (the scansize is the width of the block)
    ///
    #[inline]
    pub fn from_bytes(x: i32, y: i32, width: i32, height: i32, color: &'a ColorInterpreter, pixels: &'a [u8]) -> Self {
        PixelBlock::new(x, y, width, height, color, PixelData::Bytes(pixels), 0, width.max(0) as usize)
    }

    ///
    /// The area covered by this block
    ///
    #[inline]
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }

    ///
    /// The index in the sample array of the pixel at `(x + m, y + n)`
    ///
    #[inline]
    pub fn sample_index(&self, m: usize, n: usize) -> usize {
        self.offset + n*self.scansize + m
    }

    ///
    /// Reads the sample for the pixel at `(x + m, y + n)`
    ///
    #[inline]
    pub fn sample(&self, m: usize, n: usize) -> u32 {
        self.pixels.sample(self.sample_index(m, n))
    }

    ///
    /// Reads the non-premultiplied ARGB colour of the pixel at `(x + m, y + n)`
    ///
    #[inline]
    pub fn argb(&self, m: usize, n: usize) -> u32 {
        self.color.argb_for_sample(self.sample(m, n))
    }

    ///
    /// Checks that the size of this block is valid and that every sample it refers to is inside the sample array
    ///
    pub fn validate(&self) -> Result<()> {
        if self.width < 0 || self.height < 0 {
            return Err(PixelStreamError::delivery(format!("block at ({}, {}) has a negative size ({}x{})", self.x, self.y, self.width, self.height)));
        }

        if self.width == 0 || self.height == 0 {
            return Ok(());
        }

        let last_row    = (self.height as usize - 1).checked_mul(self.scansize);
        let end         = last_row.and_then(|last_row| last_row.checked_add(self.offset)).and_then(|start| start.checked_add(self.width as usize));

        match end {
            Some(end) if end <= self.pixels.len()   => Ok(()),
            _                                       => Err(PixelStreamError::delivery(format!("block {}x{} (offset {}, scansize {}) needs more than the {} samples supplied",
                self.width, self.height, self.offset, self.scansize, self.pixels.len()))),
        }
    }

    ///
    /// Clips this block to a region, returning None if none of the block lies within it
    ///
    /// Blocks with a negative width or height are rejected as an error, and blocks with a width or height of 0 are always
    /// dropped. The clipped block refers to the same sample array with its offset moved to the new top-left pixel, and is
    /// validated against the length of that array.
    ///
    pub fn clipped_to(&self, region: &Rectangle) -> Result<Option<PixelBlock<'a>>> {
        if self.width < 0 || self.height < 0 {
            return Err(PixelStreamError::delivery(format!("block at ({}, {}) has a negative size ({}x{})", self.x, self.y, self.width, self.height)));
        }

        if self.width == 0 || self.height == 0 {
            return Ok(None);
        }

        let clipped = match self.bounds().intersect(region) {
            Some(clipped)   => clipped,
            None            => { return Ok(None); }
        };

        // Move the offset to the new top-left position
        let skip_rows   = (clipped.y as i64 - self.y as i64) as usize;
        let skip_cols   = (clipped.x as i64 - self.x as i64) as usize;
        let offset      = skip_rows.checked_mul(self.scansize)
            .and_then(|rows| rows.checked_add(skip_cols))
            .and_then(|skip| skip.checked_add(self.offset))
            .ok_or_else(|| PixelStreamError::delivery("clipped block offset does not fit in memory"))?;

        let clipped     = PixelBlock {
            x:          clipped.x,
            y:          clipped.y,
            width:      clipped.width,
            height:     clipped.height,
            color:      self.color,
            pixels:     self.pixels,
            offset:     offset,
            scansize:   self.scansize,
        };

        clipped.validate()?;
        Ok(Some(clipped))
    }

    ///
    /// Returns the same block moved by an offset
    ///
    #[inline]
    pub fn translated(&self, dx: i32, dy: i32) -> PixelBlock<'a> {
        PixelBlock {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..self.clone()
        }
    }

    ///
    /// Returns the same samples interpreted with a different colour model
    ///
    #[inline]
    pub fn with_color<'b>(&self, color: &'b ColorInterpreter) -> PixelBlock<'b>
    where
        'a: 'b,
    {
        PixelBlock {
            x:          self.x,
            y:          self.y,
            width:      self.width,
            height:     self.height,
            color:      color,
            pixels:     self.pixels,
            offset:     self.offset,
            scansize:   self.scansize,
        }
    }
}
