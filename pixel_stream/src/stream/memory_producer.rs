use super::consumer_trait::*;
use super::delivery_hints::*;
use super::pixel_block::*;
use super::producer_trait::*;
use crate::color::*;
use crate::error::*;

use log::{debug, warn};

use std::sync::*;

///
/// Pixel samples owned by a producer
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PixelStorage {
    Bytes(Vec<u8>),
    Ints(Vec<u32>),
}

impl PixelStorage {
    ///
    /// Borrows the samples as pixel data that can be delivered in a block
    ///
    #[inline]
    pub fn as_pixel_data(&self) -> PixelData<'_> {
        match self {
            PixelStorage::Bytes(bytes)  => PixelData::Bytes(bytes),
            PixelStorage::Ints(ints)    => PixelData::Ints(ints),
        }
    }
}

struct MemoryProducerCore {
    /// The consumers that are currently subscribed
    consumers: Vec<ConsumerRef>,

    /// The samples that are sent to the consumers
    pixels: Arc<PixelStorage>,

    /// True if this producer sends a sequence of frames rather than a single image
    animated: bool,
}

///
/// Produces an image from an array of samples held in memory
///
/// Pixels are always delivered top-down, as one block covering the whole image. A static image is sent with
/// `ImageDone`, after which the consumer is unsubscribed. An animated image keeps its consumers subscribed: each call to
/// `new_frame` sends the current samples to every consumer followed by `FrameDone`.
///
pub struct MemoryProducer {
    width:      i32,
    height:     i32,
    color:      ColorInterpreter,
    offset:     usize,
    scansize:   usize,
    properties: ImageProperties,
    core:       Mutex<MemoryProducerCore>,
}

impl MemoryProducer {
    ///
    /// Creates a producer for an image using any colour interpreter
    ///
    pub fn new(width: i32, height: i32, color: ColorInterpreter, pixels: PixelStorage, offset: usize, scansize: usize) -> Result<MemoryProducer> {
        Self::check_storage(width, height, &pixels, offset, scansize)?;

        Ok(MemoryProducer {
            width,
            height,
            color,
            offset,
            scansize,
            properties: ImageProperties::new(),
            core:       Mutex::new(MemoryProducerCore {
                consumers:  vec![],
                pixels:     Arc::new(pixels),
                animated:   false,
            }),
        })
    }

    ///
    /// Creates a producer for a tightly packed array of `0xAARRGGBB` values
    ///
    pub fn from_argb(width: i32, height: i32, pixels: Vec<u32>) -> Result<MemoryProducer> {
        Self::new(width, height, ColorInterpreter::default_argb(), PixelStorage::Ints(pixels), 0, width.max(0) as usize)
    }

    ///
    /// Creates a producer for a tightly packed array of palette indexes
    ///
    pub fn from_indexes(width: i32, height: i32, palette: Arc<IndexPalette>, pixels: Vec<u8>) -> Result<MemoryProducer> {
        Self::new(width, height, ColorInterpreter::Indexed(palette), PixelStorage::Bytes(pixels), 0, width.max(0) as usize)
    }

    ///
    /// Sets the properties that are sent along with the image
    ///
    pub fn with_properties(mut self, properties: ImageProperties) -> MemoryProducer {
        self.properties = properties;
        self
    }

    fn check_storage(width: i32, height: i32, pixels: &PixelStorage, offset: usize, scansize: usize) -> Result<()> {
        if width <= 0 || height <= 0 {
            // Null images have no pixels to check
            return Ok(());
        }

        let color = ColorInterpreter::default_argb();
        PixelBlock::new(0, 0, width, height, &color, pixels.as_pixel_data(), offset, scansize)
            .validate()
            .map_err(|_| PixelStreamError::configuration(format!("{} samples are not enough for a {}x{} image with offset {} and scansize {}",
                pixels.as_pixel_data().len(), width, height, offset, scansize)))
    }

    ///
    /// The hints that describe how this producer delivers its pixels
    ///
    fn hints(animated: bool) -> DeliveryHints {
        let hints = DeliveryHints::TOP_DOWN_LEFT_RIGHT | DeliveryHints::COMPLETE_SCANLINES | DeliveryHints::SINGLE_PASS;

        if animated { hints } else { hints | DeliveryHints::SINGLE_FRAME }
    }

    ///
    /// Switches between a single static image and a sequence of frames
    ///
    /// Switching animation off finishes the image for every consumer that's currently subscribed.
    ///
    pub fn set_animated(&self, animated: bool) {
        let finished = {
            let mut core    = self.core.lock().unwrap();
            let finishing   = core.animated && !animated;
            core.animated   = animated;

            if finishing { core.consumers.drain(..).collect::<Vec<_>>() } else { vec![] }
        };

        for consumer in finished {
            consumer.lock().image_complete(CompletionStatus::ImageDone);
        }
    }

    ///
    /// Sends a new frame to every subscribed consumer, optionally replacing the samples first
    ///
    pub fn new_frame(&self, pixels: Option<PixelStorage>) -> Result<()> {
        if let Some(new_pixels) = &pixels {
            Self::check_storage(self.width, self.height, new_pixels, self.offset, self.scansize)?;
        }

        let (consumers, pixels, animated) = {
            let mut core = self.core.lock().unwrap();

            if let Some(new_pixels) = pixels {
                core.pixels = Arc::new(new_pixels);
            }

            (core.consumers.clone(), Arc::clone(&core.pixels), core.animated)
        };

        if !animated {
            return Ok(());
        }

        let mut result = Ok(());
        for consumer in consumers.iter() {
            let sent = self.send_pixels(consumer, &pixels);

            if sent.is_ok() {
                self.send_completion(consumer, CompletionStatus::FrameDone);
            } else if result.is_ok() {
                result = sent;
            }
        }

        result
    }

    ///
    /// Sends the header information (size, properties, colours and hints) to a consumer
    ///
    fn initialize_consumer(&self, consumer: &ConsumerRef, animated: bool) {
        if self.is_consumer(consumer) { consumer.lock().set_dimensions(self.width, self.height); }
        if self.is_consumer(consumer) { consumer.lock().set_properties(&self.properties); }
        if self.is_consumer(consumer) { consumer.lock().set_color_interpreter(&self.color); }
        if self.is_consumer(consumer) { consumer.lock().set_hints(Self::hints(animated)); }
    }

    ///
    /// Sends the whole image as one block to a consumer, if it's still subscribed
    ///
    fn send_pixels(&self, consumer: &ConsumerRef, pixels: &PixelStorage) -> Result<()> {
        if self.width <= 0 || self.height <= 0 || !self.is_consumer(consumer) {
            return Ok(());
        }

        let block   = PixelBlock::new(0, 0, self.width, self.height, &self.color, pixels.as_pixel_data(), self.offset, self.scansize);
        let result  = consumer.lock().set_pixels(&block);

        if let Err(err) = &result {
            // Consumers that reject the image are sent an error and unsubscribed
            warn!("Consumer {:?} rejected the image: {}", consumer, err);

            self.remove_consumer(consumer);
            consumer.lock().image_complete(CompletionStatus::Error);
        }

        result
    }

    fn send_completion(&self, consumer: &ConsumerRef, status: CompletionStatus) {
        if self.is_consumer(consumer) {
            consumer.lock().image_complete(status);
        }
    }
}

impl ImageProducer for MemoryProducer {
    fn add_consumer(&self, consumer: &ConsumerRef) {
        let mut core = self.core.lock().unwrap();

        if !core.consumers.iter().any(|existing| existing.is_same(consumer)) {
            core.consumers.push(consumer.clone());
        }
    }

    fn is_consumer(&self, consumer: &ConsumerRef) -> bool {
        self.core.lock().unwrap().consumers.iter().any(|existing| existing.is_same(consumer))
    }

    fn remove_consumer(&self, consumer: &ConsumerRef) {
        self.core.lock().unwrap().consumers.retain(|existing| !existing.is_same(consumer));
    }

    fn start_production(&self, consumer: &ConsumerRef) -> Result<()> {
        self.add_consumer(consumer);

        let (pixels, animated) = {
            let core = self.core.lock().unwrap();
            (Arc::clone(&core.pixels), core.animated)
        };

        debug!("Producing {}x{} image for {:?}", self.width, self.height, consumer);

        self.initialize_consumer(consumer, animated);
        self.send_pixels(consumer, &pixels)?;

        if animated {
            self.send_completion(consumer, CompletionStatus::FrameDone);
        } else {
            self.send_completion(consumer, CompletionStatus::ImageDone);
            self.remove_consumer(consumer);
        }

        Ok(())
    }

    fn request_ordered_resend(&self, consumer: &ConsumerRef) -> Result<()> {
        // Pixels are always produced in order, so a resend is just a repeat of the whole production
        self.start_production(consumer)
    }
}
