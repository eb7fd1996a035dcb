use super::consumer_trait::*;
use super::delivery_hints::*;
use super::pixel_block::*;
use crate::color::*;
use crate::error::*;
use crate::geometry::*;
use crate::raster::*;

use log::{trace};

use std::sync::*;

///
/// An image consumer that gathers the pixels it is sent into an ARGB buffer
///
/// As well as the pixels, the collector records everything else it was told about the image: the hints, properties,
/// the rectangles of the blocks it received and how the image completed. This makes it the usual end point of a
/// pipeline.
///
#[derive(Clone, Debug, Default)]
pub struct ImageCollector {
    width:              i32,
    height:             i32,

    /// The non-premultiplied ARGB value of each pixel
    pixels:             Vec<u32>,

    /// The number of times each pixel has been written
    coverage:           Vec<u32>,

    hints:              DeliveryHints,
    properties:         ImageProperties,
    color:              Option<ColorInterpreter>,

    /// The blocks that were delivered, in order
    blocks:             Vec<Rectangle>,

    /// The number of frames that were completed with `FrameDone`
    frames_completed:   usize,

    /// The last status that was received
    status:             Option<CompletionStatus>,
}

impl ImageCollector {
    ///
    /// Creates a new, empty, image collector
    ///
    pub fn new() -> ImageCollector {
        ImageCollector::default()
    }

    ///
    /// Creates a collector that can be subscribed to a producer and also read from afterwards
    ///
    pub fn shared() -> (Arc<Mutex<ImageCollector>>, ConsumerRef) {
        let collector   = Arc::new(Mutex::new(ImageCollector::new()));
        let consumer    = ConsumerRef::from_shared(Arc::clone(&collector));

        (collector, consumer)
    }

    /// The dimensions of the image, as set by the producer
    #[inline] pub fn dimensions(&self) -> (i32, i32) { (self.width, self.height) }

    /// The pixels of the image as non-premultiplied ARGB values
    #[inline] pub fn pixels(&self) -> &[u32] { &self.pixels }

    /// The hints that were supplied by the producer
    #[inline] pub fn hints(&self) -> DeliveryHints { self.hints }

    /// The properties that were supplied by the producer
    #[inline] pub fn properties(&self) -> &ImageProperties { &self.properties }

    /// The colour interpreter announced by the producer
    #[inline] pub fn color_interpreter(&self) -> Option<&ColorInterpreter> { self.color.as_ref() }

    /// The area covered by each block that was received, in the order they arrived
    #[inline] pub fn delivered_blocks(&self) -> &[Rectangle] { &self.blocks }

    /// The number of frames that have been completed
    #[inline] pub fn frames_completed(&self) -> usize { self.frames_completed }

    /// The most recent completion status
    #[inline] pub fn status(&self) -> Option<CompletionStatus> { self.status }

    ///
    /// Reads the colour of a pixel
    ///
    #[inline]
    pub fn argb(&self, x: i32, y: i32) -> u32 {
        self.pixels[self.index(x, y)]
    }

    ///
    /// The number of times that a pixel has been written
    ///
    #[inline]
    pub fn coverage(&self, x: i32, y: i32) -> u32 {
        self.coverage[self.index(x, y)]
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    ///
    /// Converts the collected pixels into a raster image
    ///
    pub fn to_raster_image(&self) -> Result<RasterImage> {
        RasterImage::from_packed(self.width.max(0) as usize, self.height.max(0) as usize, &self.pixels, self.width.max(0) as usize, &ColorInterpreter::default_argb())
    }
}

impl ImageConsumer for ImageCollector {
    fn set_dimensions(&mut self, width: i32, height: i32) {
        self.width  = width;
        self.height = height;

        let num_pixels = if width > 0 && height > 0 { (width as usize) * (height as usize) } else { 0 };
        self.pixels     = vec![0; num_pixels];
        self.coverage   = vec![0; num_pixels];
        self.blocks.clear();
    }

    fn set_properties(&mut self, properties: &ImageProperties) {
        self.properties = properties.clone();
    }

    fn set_color_interpreter(&mut self, color: &ColorInterpreter) {
        self.color = Some(color.clone());
    }

    fn set_hints(&mut self, hints: DeliveryHints) {
        self.hints = hints;
    }

    fn set_pixels(&mut self, block: &PixelBlock) -> Result<()> {
        let bounds  = Rectangle::with_size(self.width, self.height);
        let block   = match block.clipped_to(&bounds)? {
            Some(block) => block,
            None        => { return Ok(()); }
        };

        trace!("Collecting block {:?}", block.bounds());
        self.blocks.push(block.bounds());

        for n in 0..(block.height as usize) {
            let row_start = self.index(block.x, block.y + n as i32);

            for m in 0..(block.width as usize) {
                self.pixels[row_start + m]      = block.argb(m, n);
                self.coverage[row_start + m]    += 1;
            }
        }

        Ok(())
    }

    fn image_complete(&mut self, status: CompletionStatus) {
        if status == CompletionStatus::FrameDone {
            self.frames_completed += 1;
        }

        self.status = Some(status);
    }
}

#[cfg(feature="render_png")]
mod render_png {
    use super::*;

    use std::io::{self, Write, BufWriter};

    impl ImageCollector {
        ///
        /// Writes the collected image to a stream as a PNG file
        ///
        pub fn write_png<TStream>(&self, target: TStream) -> io::Result<()>
        where
            TStream: Write,
        {
            if self.width <= 0 || self.height <= 0 {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "cannot write an image with no pixels"));
            }

            let mut encoder = png::Encoder::new(BufWriter::new(target), self.width as u32, self.height as u32);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let rgba = self.pixels.iter()
                .flat_map(|argb| { let [a, r, g, b] = argb_components(*argb); [r, g, b, a] })
                .collect::<Vec<u8>>();

            let mut writer = encoder.write_header()?;
            writer.write_image_data(&rgba)?;

            Ok(())
        }
    }
}
