use super::image_filter_trait::*;
use super::replicate_scale_filter::*;
use super::stream_state::*;
use crate::color::*;
use crate::error::*;
use crate::stream::*;

use log::{debug, trace};

///
/// Describes a filter that scales an image by averaging the area of the source image covered by each destination pixel
///
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AreaAveragingScaleDescriptor {
    target: ScaleTarget,
}

impl AreaAveragingScaleDescriptor {
    ///
    /// Creates a descriptor for an area averaging scale filter. Negative sizes are calculated from the source size
    ///
    pub fn new(width: i32, height: i32) -> Result<AreaAveragingScaleDescriptor> {
        Ok(AreaAveragingScaleDescriptor { target: ScaleTarget::new(width, height)? })
    }

    #[inline]
    pub fn target(&self) -> ScaleTarget { self.target }
}

///
/// The weighted, premultiplied sums for the destination row that's being assembled
///
struct RowAccumulator {
    red:    Vec<f32>,
    green:  Vec<f32>,
    blue:   Vec<f32>,
    alpha:  Vec<f32>,

    /// The ARGB pixels for the last row that was calculated
    output: Vec<u32>,
}

impl RowAccumulator {
    fn new(dest_width: usize) -> RowAccumulator {
        RowAccumulator {
            red:    vec![0.0; dest_width],
            green:  vec![0.0; dest_width],
            blue:   vec![0.0; dest_width],
            alpha:  vec![0.0; dest_width],
            output: vec![0; dest_width],
        }
    }

    fn clear(&mut self) {
        self.red.iter_mut().for_each(|c| *c = 0.0);
        self.green.iter_mut().for_each(|c| *c = 0.0);
        self.blue.iter_mut().for_each(|c| *c = 0.0);
        self.alpha.iter_mut().for_each(|c| *c = 0.0);
    }

    #[inline]
    fn add(&mut self, dx: usize, weight: f32, [a, r, g, b]: [f32; 4]) {
        self.alpha[dx]  += weight * a;
        self.red[dx]    += weight * r;
        self.green[dx]  += weight * g;
        self.blue[dx]   += weight * b;
    }

    ///
    /// Divides the sums by the total weight they were accumulated with, and writes the resulting non-premultiplied colours to the output row
    ///
    fn calculate_row(&mut self, total_weight: f32) -> &[u32] {
        for x in 0..self.output.len() {
            let alpha = round_component(self.alpha[x] / total_weight);

            let pixel = match alpha {
                // Fully transparent pixels have no colour
                0   => 0,

                // Opaque pixels don't need to be divided by their alpha
                255 => argb_from_components([255, round_component(self.red[x] / total_weight), round_component(self.green[x] / total_weight), round_component(self.blue[x] / total_weight)]),

                _   => {
                    let alpha_weight = self.alpha[x] / 255.0;
                    argb_from_components([alpha, round_component(self.red[x] / alpha_weight), round_component(self.green[x] / alpha_weight), round_component(self.blue[x] / alpha_weight)])
                }
            };

            self.output[x] = pixel;
        }

        &self.output
    }
}

///
/// Scales an image using a box filter: each destination pixel is the average of the source pixels it covers, weighted by area
///
/// This needs the producer to deliver complete scanlines from the top of the image to the bottom. Producers that can't
/// promise this (or that send no hints at all) get the same results as the `ReplicateScaleFilter`.
///
pub struct AreaAveragingScaleFilter {
    target:         ScaleTarget,
    consumer:       ConsumerRef,
    state:          StreamState,

    src_width:      i32,
    src_height:     i32,
    dest_width:     i32,
    dest_height:    i32,

    /// True if pixels are being scaled by replication because the producer's delivery order is unsuitable for averaging
    passthrough:    bool,
    sampler:        Option<ReplicateSampler>,
    accumulator:    Option<RowAccumulator>,

    /// The destination row being accumulated, and the amount of vertical weight it still needs
    saved_dy:       i32,
    saved_dyrem:    i32,

    /// The next source row that should be delivered
    next_row:       i32,

    argb:           ColorInterpreter,
}

impl FilterDescriptor for AreaAveragingScaleDescriptor {
    type Filter = AreaAveragingScaleFilter;

    fn create_instance(&self, consumer: ConsumerRef) -> AreaAveragingScaleFilter {
        AreaAveragingScaleFilter {
            target:         self.target,
            consumer:       consumer,
            state:          StreamState::new(),
            src_width:      0,
            src_height:     0,
            dest_width:     0,
            dest_height:    0,
            passthrough:    true,
            sampler:        None,
            accumulator:    None,
            saved_dy:       0,
            saved_dyrem:    0,
            next_row:       0,
            argb:           ColorInterpreter::default_argb(),
        }
    }
}

impl AreaAveragingScaleFilter {
    ///
    /// True if this filter is copying pixels rather than averaging them
    ///
    #[inline]
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    ///
    /// Throws away any partially accumulated row
    ///
    fn reset_accumulation(&mut self) {
        self.accumulator    = None;
        self.saved_dy       = 0;
        self.saved_dyrem    = 0;
        self.next_row       = 0;
    }

    ///
    /// Adds a block of complete scanlines to the accumulated rows, sending any destination rows that are finished
    ///
    fn accumulate_pixels(&mut self, block: &PixelBlock) -> Result<()> {
        if block.x != 0 || block.width != self.src_width {
            return Err(PixelStreamError::delivery(format!("block at ({}, {}) {}x{} does not cover complete scanlines", block.x, block.y, block.width, block.height)));
        }

        if block.y != self.next_row && block.y != 0 {
            return Err(PixelStreamError::delivery(format!("expected row {} but received row {}", self.next_row, block.y)));
        }

        let src_width   = self.src_width;
        let src_height  = self.src_height;
        let dest_width  = self.dest_width;
        let dest_height = self.dest_height;
        let accumulator = self.accumulator.get_or_insert_with(|| RowAccumulator::new(dest_width as usize));

        // A block at the top of the image starts a new frame
        let (mut dy, mut dyrem) = if block.y == 0 { (0, 0) } else { (self.saved_dy, self.saved_dyrem) };

        let mut syrem   = dest_height;
        let mut n       = 0;

        while n < block.height {
            if dyrem == 0 {
                accumulator.clear();
                dyrem = src_height;
            }

            let amty = syrem.min(dyrem);

            // Spread this source row across the destination row
            let mut sx      = 0;
            let mut dx      = 0;
            let mut sxrem   = 0;
            let mut dxrem   = src_width;
            let mut color   = [0.0f32; 4];

            while sx < src_width {
                if sxrem == 0 {
                    sxrem = dest_width;

                    let [a, r, g, b]    = argb_components(block.argb(sx as usize, n as usize));
                    let (a, r, g, b)    = (a as f32, r as f32, g as f32, b as f32);

                    color = if a != 255.0 {
                        let scale = a / 255.0;
                        [a, r*scale, g*scale, b*scale]
                    } else {
                        [a, r, g, b]
                    };
                }

                let amtx = sxrem.min(dxrem);
                accumulator.add(dx as usize, (amtx as f32) * (amty as f32), color);

                sxrem -= amtx;
                if sxrem == 0 { sx += 1; }

                dxrem -= amtx;
                if dxrem == 0 { dx += 1; dxrem = src_width; }
            }

            dyrem -= amty;
            if dyrem == 0 {
                // This destination row is finished (a source row can finish several destination rows when scaling up)
                let row = accumulator.calculate_row((src_width as f32) * (src_height as f32));

                loop {
                    if dy < dest_height {
                        trace!("Area averaging emitting row {}", dy);
                        self.consumer.lock().set_pixels(&PixelBlock::from_ints(0, dy, dest_width, 1, &self.argb, row))?;
                    }
                    dy += 1;

                    syrem -= amty;
                    if !(syrem >= amty && amty == src_height) { break; }
                }
            } else {
                syrem -= amty;
            }

            if syrem == 0 {
                syrem   = dest_height;
                n       += 1;
            }
        }

        self.saved_dy       = dy;
        self.saved_dyrem    = dyrem;
        self.next_row       = block.y + block.height;

        Ok(())
    }

    ///
    /// Sends a destination row that has only been partly accumulated (because the producer finished early), scaled by the weight it received
    ///
    fn flush_partial_row(&mut self) {
        let received = self.src_height - self.saved_dyrem;

        if self.saved_dyrem <= 0 || received <= 0 || self.saved_dy >= self.dest_height {
            return;
        }

        if let Some(accumulator) = &mut self.accumulator {
            debug!("Area averaging flushing partial row {}", self.saved_dy);

            let row = accumulator.calculate_row((self.src_width as f32) * (received as f32));

            if let Err(err) = self.consumer.lock().set_pixels(&PixelBlock::from_ints(0, self.saved_dy, self.dest_width, 1, &self.argb, row)) {
                debug!("Consumer rejected the partial row: {}", err);
            }
        }
    }
}

impl ImageConsumer for AreaAveragingScaleFilter {
    fn set_dimensions(&mut self, width: i32, height: i32) {
        self.reset_accumulation();

        if !self.state.set_dimensions(width, height) {
            self.sampler = None;
            self.consumer.lock().image_complete(CompletionStatus::ImageDone);
            return;
        }

        let (dest_width, dest_height) = self.target.resolve(width, height);

        self.src_width      = width;
        self.src_height     = height;
        self.dest_width     = dest_width;
        self.dest_height    = dest_height;
        self.sampler        = Some(ReplicateSampler::new(width, height, dest_width, dest_height));

        self.consumer.lock().set_dimensions(dest_width, dest_height);
    }

    fn set_properties(&mut self, properties: &ImageProperties) {
        let dest_size   = if self.dest_width > 0 { Some((self.dest_width, self.dest_height)) } else { None };
        let properties  = scaled_properties(properties, &self.description(), dest_size);

        self.consumer.lock().set_properties(&properties);
    }

    fn set_color_interpreter(&mut self, color: &ColorInterpreter) {
        self.consumer.lock().set_color_interpreter(color);
    }

    fn set_hints(&mut self, hints: DeliveryHints) {
        self.passthrough = !hints.contains(DeliveryHints::TOP_DOWN_LEFT_RIGHT | DeliveryHints::COMPLETE_SCANLINES);
        debug!("Area averaging scale filter hints {:?}: passthrough {}", hints, self.passthrough);

        self.consumer.lock().set_hints(hints);
    }

    fn set_pixels(&mut self, block: &PixelBlock) -> Result<()> {
        let block = match self.state.accept_block(block)? {
            Some(block) => block,
            None        => { return Ok(()); }
        };

        if self.passthrough {
            match &mut self.sampler {
                Some(sampler)   => sampler.scale_block(&block, &self.consumer),
                None            => Ok(()),
            }
        } else {
            self.accumulate_pixels(&block)
        }
    }

    fn image_complete(&mut self, status: CompletionStatus) {
        match status {
            CompletionStatus::Error | CompletionStatus::Aborted => {
                self.reset_accumulation();
            }

            CompletionStatus::FrameDone | CompletionStatus::ImageDone => {
                if !self.passthrough {
                    self.flush_partial_row();
                }

                self.reset_accumulation();
            }
        }

        if self.state.complete(status) {
            self.consumer.lock().image_complete(status);
        }
    }
}

impl ImageFilter for AreaAveragingScaleFilter {
    fn description(&self) -> String {
        format!("area averaging scale to {}x{}", self.target.width(), self.target.height())
    }
}
