use crate::error::*;
use crate::geometry::*;

///
/// The range of values that the samples of a raster can hold
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SampleType {
    /// Samples from 0 to 255
    Byte,

    /// Samples from 0 to 65535
    UShort,

    /// Signed 32-bit samples
    Int,
}

impl SampleType {
    ///
    /// The number of bits in each sample
    ///
    #[inline]
    pub fn bits(&self) -> u32 {
        match self {
            SampleType::Byte    => 8,
            SampleType::UShort  => 16,
            SampleType::Int     => 32,
        }
    }

    ///
    /// Converts a value to a sample by discarding any bits that the sample type can't store
    ///
    #[inline]
    pub fn store(&self, value: i32) -> i32 {
        match self {
            SampleType::Byte    => value & 0xff,
            SampleType::UShort  => value & 0xffff,
            SampleType::Int     => value,
        }
    }

    ///
    /// Rounds a value to the nearest integer (halves round up) and clamps it to the range of this sample type
    ///
    #[inline]
    pub fn clamp(&self, value: f32) -> i32 {
        let rounded = (value + 0.5).floor();

        match self {
            SampleType::Byte    => rounded.clamp(0.0, 255.0) as i32,
            SampleType::UShort  => rounded.clamp(0.0, 65535.0) as i32,
            SampleType::Int     => rounded as i32,
        }
    }
}

///
/// A rectangular grid of pixels, each made up of one sample per band
///
/// Samples are stored pixel-interleaved: the samples for each pixel are next to each other, and rows follow each other
/// with no padding.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width:          usize,
    height:         usize,
    bands:          usize,
    sample_type:    SampleType,
    samples:        Vec<i32>,
}

impl Raster {
    ///
    /// Creates a new raster with every sample set to zero
    ///
    pub fn zeroed(width: usize, height: usize, bands: usize, sample_type: SampleType) -> Result<Raster> {
        let len = Self::sample_count(width, height, bands)?;

        Ok(Raster {
            width,
            height,
            bands,
            sample_type,
            samples: vec![0; len],
        })
    }

    ///
    /// Creates a raster from a set of pixel-interleaved samples, which are truncated to fit the sample type
    ///
    pub fn from_samples(width: usize, height: usize, bands: usize, sample_type: SampleType, samples: Vec<i32>) -> Result<Raster> {
        let len = Self::sample_count(width, height, bands)?;

        if samples.len() != len {
            return Err(PixelStreamError::configuration(format!("a {}x{} raster with {} bands needs {} samples, not {}", width, height, bands, len, samples.len())));
        }

        let mut samples = samples;
        samples.iter_mut().for_each(|sample| *sample = sample_type.store(*sample));

        Ok(Raster { width, height, bands, sample_type, samples })
    }

    fn sample_count(width: usize, height: usize, bands: usize) -> Result<usize> {
        if width == 0 || height == 0 || bands == 0 {
            return Err(PixelStreamError::configuration(format!("cannot create a {}x{} raster with {} bands", width, height, bands)));
        }

        width.checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(bands))
            .ok_or_else(|| PixelStreamError::configuration(format!("a {}x{} raster with {} bands is too large", width, height, bands)))
    }

    ///
    /// Creates a zeroed raster with the same size, bands and sample type as this one
    ///
    pub fn create_compatible(&self) -> Raster {
        Raster {
            width:          self.width,
            height:         self.height,
            bands:          self.bands,
            sample_type:    self.sample_type,
            samples:        vec![0; self.samples.len()],
        }
    }

    ///
    /// Creates a zeroed raster with the same size and sample type as this one but a different number of bands
    ///
    pub fn create_compatible_with_bands(&self, bands: usize) -> Result<Raster> {
        Raster::zeroed(self.width, self.height, bands, self.sample_type)
    }

    #[inline] pub fn width(&self) -> usize { self.width }
    #[inline] pub fn height(&self) -> usize { self.height }
    #[inline] pub fn bands(&self) -> usize { self.bands }
    #[inline] pub fn sample_type(&self) -> SampleType { self.sample_type }
    #[inline] pub fn samples(&self) -> &[i32] { &self.samples }

    ///
    /// The area covered by this raster
    ///
    #[inline]
    pub fn bounds(&self) -> Rectangle {
        Rectangle::with_size(self.width as i32, self.height as i32)
    }

    ///
    /// The number of samples in one row of this raster
    ///
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width * self.bands
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.bands
    }

    ///
    /// Reads the value of a sample
    ///
    #[inline]
    pub fn sample(&self, x: usize, y: usize, band: usize) -> i32 {
        self.samples[self.index(x, y) + band]
    }

    ///
    /// Sets the value of a sample (bits that don't fit in the sample type are discarded)
    ///
    #[inline]
    pub fn set_sample(&mut self, x: usize, y: usize, band: usize, value: i32) {
        let index               = self.index(x, y) + band;
        self.samples[index]     = self.sample_type.store(value);
    }

    ///
    /// Reads the samples for every band of a pixel
    ///
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[i32] {
        let index = self.index(x, y);
        &self.samples[index..(index + self.bands)]
    }

    ///
    /// Sets the samples for every band of a pixel
    ///
    pub fn set_pixel(&mut self, x: usize, y: usize, samples: &[i32]) {
        let index       = self.index(x, y);
        let sample_type = self.sample_type;

        for (target, value) in self.samples[index..(index + self.bands)].iter_mut().zip(samples.iter()) {
            *target = sample_type.store(*value);
        }
    }

    ///
    /// The samples for a row of pixels
    ///
    #[inline]
    pub fn row(&self, y: usize) -> &[i32] {
        let start = y * self.row_len();
        &self.samples[start..(start + self.row_len())]
    }

    ///
    /// All of the samples, for writing. Values written here must already be in range for the sample type
    ///
    #[inline]
    pub (crate) fn samples_mut(&mut self) -> &mut [i32] {
        &mut self.samples
    }

    ///
    /// True if this raster has at least as many rows and columns as another
    ///
    #[inline]
    pub fn covers(&self, other: &Raster) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_rasters_are_rejected() {
        assert!(Raster::zeroed(0, 4, 1, SampleType::Byte).is_err());
        assert!(Raster::zeroed(4, 4, 0, SampleType::Byte).is_err());
        assert!(Raster::zeroed(usize::MAX, 4, 4, SampleType::Byte).is_err());
    }

    #[test]
    fn byte_samples_wrap() {
        let mut raster = Raster::zeroed(2, 2, 3, SampleType::Byte).unwrap();

        raster.set_sample(1, 1, 2, 300);
        raster.set_pixel(0, 1, &[1, -1, 256]);

        assert!(raster.sample(1, 1, 2) == 44);
        assert!(raster.pixel(0, 1) == &[1, 255, 0]);
        assert!(raster.row(1) == &[1, 255, 0, 0, 0, 44]);
    }

    #[test]
    fn clamping_rounds() {
        assert!(SampleType::Byte.clamp(254.5) == 255);
        assert!(SampleType::Byte.clamp(-0.6) == 0);
        assert!(SampleType::UShort.clamp(70000.0) == 65535);
        assert!(SampleType::Int.clamp(-1.4) == -1);
    }
}
