use super::image_filter_trait::*;
use super::stream_state::*;
use crate::color::*;
use crate::error::*;
use crate::stream::*;

use log::{debug, trace};

///
/// The size that a scaling filter should produce
///
/// A negative width or height is calculated from the size of the source image when it's known: if both are negative the
/// image keeps its size, and if only one is negative the aspect ratio of the source image is preserved.
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScaleTarget {
    width:  i32,
    height: i32,
}

impl ScaleTarget {
    ///
    /// Creates a new scale target. A width or height of 0 is not allowed
    ///
    pub fn new(width: i32, height: i32) -> Result<ScaleTarget> {
        if width == 0 || height == 0 {
            return Err(PixelStreamError::configuration(format!("cannot scale an image to {}x{}", width, height)));
        }

        Ok(ScaleTarget { width, height })
    }

    #[inline] pub fn width(&self) -> i32 { self.width }
    #[inline] pub fn height(&self) -> i32 { self.height }

    ///
    /// Calculates the size of the scaled image for a source image
    ///
    pub fn resolve(&self, src_width: i32, src_height: i32) -> (i32, i32) {
        let proportional = |size: i32, numerator: i32, denominator: i32| {
            let scaled = (size as i64) * (numerator as i64) / (denominator as i64).max(1);
            scaled.clamp(1, i32::MAX as i64) as i32
        };

        match (self.width < 0, self.height < 0) {
            (true, true)    => (src_width, src_height),
            (true, false)   => (proportional(src_width, self.height, src_height), self.height),
            (false, true)   => (self.width, proportional(src_height, self.width, src_width)),
            (false, false)  => (self.width, self.height),
        }
    }
}

///
/// Types of sample that can be copied into a row buffer
///
pub (crate) trait Sample : Copy + Default {
    fn pixel_data(samples: &[Self]) -> PixelData<'_>;
}

impl Sample for u8 {
    #[inline]
    fn pixel_data(samples: &[u8]) -> PixelData<'_> { PixelData::Bytes(samples) }
}

impl Sample for u32 {
    #[inline]
    fn pixel_data(samples: &[u32]) -> PixelData<'_> { PixelData::Ints(samples) }
}

///
/// Maps each destination row and column to the nearest source row and column, and copies the samples across one row at a time
///
pub (crate) struct ReplicateSampler {
    src_width:      i32,
    src_height:     i32,
    dest_width:     i32,
    dest_height:    i32,

    /// The source row for each destination row (with an extra entry past the end of the source image)
    src_rows:       Vec<i32>,

    /// The source column for each destination column (with an extra entry past the end of the source image)
    src_cols:       Vec<i32>,

    /// Row buffers for byte and int samples
    byte_row:       Vec<u8>,
    int_row:        Vec<u32>,
}

///
/// Generates `(2*d*src + src) / (2*dest)` for each `d` in `0..=dest`, the source position closest to the center of each destination position
///
fn nearest_source_positions(src_size: i32, dest_size: i32) -> Vec<i32> {
    let src_size    = src_size as i64;
    let dest_size   = dest_size as i64;

    (0..=dest_size)
        .map(|d| ((2*d*src_size + src_size) / (2*dest_size)).min(i32::MAX as i64) as i32)
        .collect()
}

impl ReplicateSampler {
    ///
    /// Creates a sampler for a source and destination image size (both must be at least 1x1)
    ///
    pub fn new(src_width: i32, src_height: i32, dest_width: i32, dest_height: i32) -> ReplicateSampler {
        ReplicateSampler {
            src_width,
            src_height,
            dest_width,
            dest_height,
            src_rows:       nearest_source_positions(src_height, dest_height),
            src_cols:       nearest_source_positions(src_width, dest_width),
            byte_row:       vec![],
            int_row:        vec![],
        }
    }

    ///
    /// Sends the destination rows that can be generated from a block of source pixels (which must already be clipped to the source image)
    ///
    pub fn scale_block(&mut self, block: &PixelBlock, consumer: &ConsumerRef) -> Result<()> {
        match block.pixels {
            PixelData::Bytes(samples)   => Self::replicate_rows(&self.src_rows, &self.src_cols, (self.src_width, self.src_height), (self.dest_width, self.dest_height), block, samples, &mut self.byte_row, consumer),
            PixelData::Ints(samples)    => Self::replicate_rows(&self.src_rows, &self.src_cols, (self.src_width, self.src_height), (self.dest_width, self.dest_height), block, samples, &mut self.int_row, consumer),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn replicate_rows<TSample: Sample>(src_rows: &[i32], src_cols: &[i32], src_size: (i32, i32), dest_size: (i32, i32), block: &PixelBlock, samples: &[TSample], row: &mut Vec<TSample>, consumer: &ConsumerRef) -> Result<()> {
        let (src_width, src_height)     = (src_size.0 as i64, src_size.1 as i64);
        let (dest_width, dest_height)   = (dest_size.0 as i64, dest_size.1 as i64);

        if row.len() != dest_width as usize {
            row.resize(dest_width as usize, TSample::default());
        }

        // The first destination row and column whose source lies at or after the start of the block
        let dx1     = ((2 * (block.x as i64) * dest_width + src_width - 1) / (2 * src_width)) as usize;
        let dy1     = ((2 * (block.y as i64) * dest_height + src_height - 1) / (2 * src_height)) as usize;
        let x_end   = block.x + block.width;
        let y_end   = block.y + block.height;

        let mut dy = dy1;
        while src_rows[dy] < y_end {
            let sy      = src_rows[dy];
            let src_off = block.sample_index(0, (sy - block.y) as usize);

            let mut dx = dx1;
            while src_cols[dx] < x_end {
                row[dx] = samples[src_off + (src_cols[dx] - block.x) as usize];
                dx += 1;
            }

            if dx > dx1 {
                trace!("Replicating source row {} to destination row {}", sy, dy);

                let scaled_row = PixelBlock::new(dx1 as i32, dy as i32, (dx - dx1) as i32, 1, block.color, TSample::pixel_data(row), dx1, dest_width as usize);
                consumer.lock().set_pixels(&scaled_row)?;
            }

            dy += 1;
        }

        Ok(())
    }
}

///
/// Describes a filter that scales an image by copying the nearest source pixel to each destination pixel
///
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ReplicateScaleDescriptor {
    target: ScaleTarget,
}

impl ReplicateScaleDescriptor {
    ///
    /// Creates a descriptor for a replicating scale filter. Negative sizes are calculated from the source size
    ///
    pub fn new(width: i32, height: i32) -> Result<ReplicateScaleDescriptor> {
        Ok(ReplicateScaleDescriptor { target: ScaleTarget::new(width, height)? })
    }

    #[inline]
    pub fn target(&self) -> ScaleTarget { self.target }
}

///
/// Scales an image by replicating or dropping rows and columns of pixels
///
/// Each destination row depends on exactly one source row, so this works whatever order the pixels arrive in.
///
pub struct ReplicateScaleFilter {
    target:     ScaleTarget,
    consumer:   ConsumerRef,
    state:      StreamState,
    sampler:    Option<ReplicateSampler>,
}

impl FilterDescriptor for ReplicateScaleDescriptor {
    type Filter = ReplicateScaleFilter;

    fn create_instance(&self, consumer: ConsumerRef) -> ReplicateScaleFilter {
        ReplicateScaleFilter {
            target:     self.target,
            consumer:   consumer,
            state:      StreamState::new(),
            sampler:    None,
        }
    }
}

///
/// Adds the `rescale` property and filter description for a scaling filter
///
pub (crate) fn scaled_properties(properties: &ImageProperties, description: &str, dest_size: Option<(i32, i32)>) -> ImageProperties {
    let mut properties = with_filter_description(properties, description);

    if let Some((width, height)) = dest_size {
        properties.insert("rescale".to_string(), format!("{}x{}", width, height));
    }

    properties
}

impl ImageConsumer for ReplicateScaleFilter {
    fn set_dimensions(&mut self, width: i32, height: i32) {
        if !self.state.set_dimensions(width, height) {
            self.sampler = None;
            self.consumer.lock().image_complete(CompletionStatus::ImageDone);
            return;
        }

        let (dest_width, dest_height) = self.target.resolve(width, height);
        debug!("Replicate scaling {}x{} to {}x{}", width, height, dest_width, dest_height);

        self.sampler = Some(ReplicateSampler::new(width, height, dest_width, dest_height));
        self.consumer.lock().set_dimensions(dest_width, dest_height);
    }

    fn set_properties(&mut self, properties: &ImageProperties) {
        let dest_size   = self.sampler.as_ref().map(|sampler| (sampler.dest_width, sampler.dest_height));
        let properties  = scaled_properties(properties, &self.description(), dest_size);

        self.consumer.lock().set_properties(&properties);
    }

    fn set_color_interpreter(&mut self, color: &ColorInterpreter) {
        self.consumer.lock().set_color_interpreter(color);
    }

    fn set_hints(&mut self, hints: DeliveryHints) {
        self.consumer.lock().set_hints(hints);
    }

    fn set_pixels(&mut self, block: &PixelBlock) -> Result<()> {
        let block = match self.state.accept_block(block)? {
            Some(block) => block,
            None        => { return Ok(()); }
        };

        match &mut self.sampler {
            Some(sampler)   => sampler.scale_block(&block, &self.consumer),
            None            => Ok(()),
        }
    }

    fn image_complete(&mut self, status: CompletionStatus) {
        if status.is_failure() {
            self.sampler = None;
        }

        if self.state.complete(status) {
            self.consumer.lock().image_complete(status);
        }
    }
}

impl ImageFilter for ReplicateScaleFilter {
    fn description(&self) -> String {
        format!("replicate scale to {}x{}", self.target.width, self.target.height)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_target_is_rejected() {
        assert!(ReplicateScaleDescriptor::new(0, 10).is_err());
        assert!(ReplicateScaleDescriptor::new(10, 0).is_err());
        assert!(ReplicateScaleDescriptor::new(-1, 10).is_ok());
    }

    #[test]
    fn automatic_sizes() {
        assert!(ScaleTarget::new(-1, -1).unwrap().resolve(30, 20) == (30, 20));
        assert!(ScaleTarget::new(-1, 10).unwrap().resolve(30, 20) == (15, 10));
        assert!(ScaleTarget::new(60, -1).unwrap().resolve(30, 20) == (60, 40));
        assert!(ScaleTarget::new(-1, 1).unwrap().resolve(1, 100) == (1, 1));
    }

    #[test]
    fn source_rows_are_nearest_centers() {
        assert!(nearest_source_positions(4, 2) == vec![1, 3, 5]);
        assert!(nearest_source_positions(2, 4) == vec![0, 0, 1, 1, 2]);
        assert!(nearest_source_positions(3, 3) == vec![0, 1, 2, 3]);
    }

    #[test]
    fn doubles_a_row() {
        let (collector, consumer)   = ImageCollector::shared();
        let mut filter              = ReplicateScaleDescriptor::new(4, 2).unwrap().create_instance(consumer);
        let color                   = ColorInterpreter::default_argb();
        let pixels                  = vec![0xff0000ff, 0xff00ff00];

        filter.set_dimensions(2, 1);
        filter.set_pixels(&PixelBlock::from_ints(0, 0, 2, 1, &color, &pixels)).unwrap();
        filter.image_complete(CompletionStatus::ImageDone);

        let collector = collector.lock().unwrap();
        assert!(collector.dimensions() == (4, 2));
        assert!(collector.pixels() == &[0xff0000ff, 0xff0000ff, 0xff00ff00, 0xff00ff00, 0xff0000ff, 0xff0000ff, 0xff00ff00, 0xff00ff00]);
        assert!(collector.delivered_blocks().len() == 2);
    }

    #[test]
    fn partial_blocks_fill_matching_rows() {
        let (collector, consumer)   = ImageCollector::shared();
        let mut filter              = ReplicateScaleDescriptor::new(2, 2).unwrap().create_instance(consumer);
        let color                   = ColorInterpreter::default_argb();
        let pixels                  = (0..16).map(|idx| 0xff000000 | idx).collect::<Vec<u32>>();

        filter.set_dimensions(4, 4);

        // Deliver the source one pixel at a time, bottom to top
        for y in (0..4).rev() {
            for x in 0..4 {
                filter.set_pixels(&PixelBlock::new(x, y, 1, 1, &color, PixelData::Ints(&pixels), (y*4 + x) as usize, 4)).unwrap();
            }
        }

        let collector = collector.lock().unwrap();
        assert!(collector.pixels() == &[0xff000005, 0xff000007, 0xff00000d, 0xff00000f]);
        assert!(collector.delivered_blocks().len() == 4);
    }

    #[test]
    fn errors_discard_the_sampler() {
        let (collector, consumer)   = ImageCollector::shared();
        let mut filter              = ReplicateScaleDescriptor::new(4, 4).unwrap().create_instance(consumer);
        let color                   = ColorInterpreter::default_argb();
        let red                     = vec![0xffff0000u32; 2];
        let blue                    = vec![0xff0000ffu32; 1];

        filter.set_dimensions(2, 2);
        filter.set_pixels(&PixelBlock::from_ints(0, 0, 2, 1, &color, &red)).unwrap();
        filter.image_complete(CompletionStatus::Error);

        assert!(filter.sampler.is_none());
        assert!(filter.set_pixels(&PixelBlock::from_ints(0, 1, 2, 1, &color, &red)).is_err());

        filter.set_dimensions(1, 1);
        filter.set_pixels(&PixelBlock::from_ints(0, 0, 1, 1, &color, &blue)).unwrap();
        filter.image_complete(CompletionStatus::ImageDone);

        let collector = collector.lock().unwrap();
        assert!(collector.dimensions() == (4, 4));
        assert!(collector.pixels().iter().all(|pixel| *pixel == 0xff0000ff));
        assert!((0..4).all(|y| (0..4).all(|x| collector.coverage(x, y) == 1)));
    }
}
