use super::image_filter_trait::*;
use super::stream_state::*;
use crate::color::*;
use crate::error::*;
use crate::stream::*;

use log::{debug, trace};

use std::sync::*;

///
/// A transformation applied to the colour of each pixel of an image
///
pub trait RgbRemap : Send + Sync {
    ///
    /// Returns the new colour for a pixel, given its position and non-premultiplied ARGB colour
    ///
    /// Palette entries are remapped with a position of `(-1, -1)`
    ///
    fn remap_rgb(&self, x: i32, y: i32, argb: u32) -> u32;

    ///
    /// True if the result of `remap_rgb` does not depend on the position of the pixel
    ///
    /// Indexed images can be remapped by changing their palette instead of their pixels when this is true.
    ///
    fn position_independent(&self) -> bool { false }

    ///
    /// Describes this remapping
    ///
    fn description(&self) -> String { "rgb remap".to_string() }
}

///
/// Describes a filter that transforms the colour of every pixel
///
pub struct RgbRemapDescriptor<TRemap: RgbRemap> {
    remap: Arc<TRemap>,
}

impl<TRemap: RgbRemap> RgbRemapDescriptor<TRemap> {
    pub fn new(remap: TRemap) -> RgbRemapDescriptor<TRemap> {
        RgbRemapDescriptor { remap: Arc::new(remap) }
    }

    #[inline]
    pub fn remap(&self) -> &Arc<TRemap> { &self.remap }
}

///
/// Filter that transforms the colour of every pixel of an image
///
/// Pixels are always sent on as ARGB values, except for indexed images with a position-independent remapping: those keep
/// their samples but are sent with a new palette.
///
pub struct RgbRemapFilter<TRemap: RgbRemap> {
    remap:          Arc<TRemap>,
    consumer:       ConsumerRef,
    state:          StreamState,

    /// The last palette that was remapped, and the interpreter that replaces it
    substitution:   Option<(Arc<IndexPalette>, ColorInterpreter)>,

    /// Buffer for the remapped pixels of a block
    remapped:       Vec<u32>,

    argb:           ColorInterpreter,
}

impl<TRemap: 'static + RgbRemap> FilterDescriptor for RgbRemapDescriptor<TRemap> {
    type Filter = RgbRemapFilter<TRemap>;

    fn create_instance(&self, consumer: ConsumerRef) -> RgbRemapFilter<TRemap> {
        RgbRemapFilter {
            remap:          Arc::clone(&self.remap),
            consumer:       consumer,
            state:          StreamState::new(),
            substitution:   None,
            remapped:       vec![],
            argb:           ColorInterpreter::default_argb(),
        }
    }
}

impl<TRemap: RgbRemap> RgbRemapFilter<TRemap> {
    ///
    /// Returns the interpreter that replaces a palette, remapping the palette if it hasn't been seen before
    ///
    fn substitute_palette(&mut self, palette: &Arc<IndexPalette>) -> ColorInterpreter {
        if let Some((original, substitute)) = &self.substitution {
            if Arc::ptr_eq(original, palette) {
                return substitute.clone();
            }
        }

        debug!("Remapping palette of {} entries", palette.len());

        let remap       = &self.remap;
        let substitute  = ColorInterpreter::Indexed(Arc::new(palette.map_entries(|entry| remap.remap_rgb(-1, -1, entry))));
        self.substitution = Some((Arc::clone(palette), substitute.clone()));

        substitute
    }

    ///
    /// Converts a block to ARGB, remaps every pixel and sends it on
    ///
    fn remap_pixels(&mut self, block: &PixelBlock) -> Result<()> {
        let width   = block.width as usize;
        let height  = block.height as usize;

        self.remapped.clear();
        self.remapped.reserve(width * height);

        for n in 0..height {
            for m in 0..width {
                let argb = block.argb(m, n);
                self.remapped.push(self.remap.remap_rgb(block.x + m as i32, block.y + n as i32, argb));
            }
        }

        trace!("Remapped {:?}", block.bounds());
        self.consumer.lock().set_pixels(&PixelBlock::from_ints(block.x, block.y, block.width, block.height, &self.argb, &self.remapped))
    }
}

impl<TRemap: RgbRemap> ImageConsumer for RgbRemapFilter<TRemap> {
    fn set_dimensions(&mut self, width: i32, height: i32) {
        if self.state.set_dimensions(width, height) {
            self.consumer.lock().set_dimensions(width, height);
        } else {
            self.consumer.lock().image_complete(CompletionStatus::ImageDone);
        }
    }

    fn set_properties(&mut self, properties: &ImageProperties) {
        let properties = with_filter_description(properties, &self.description());
        self.consumer.lock().set_properties(&properties);
    }

    fn set_color_interpreter(&mut self, color: &ColorInterpreter) {
        let forwarded = match color {
            ColorInterpreter::Indexed(palette) if self.remap.position_independent() => self.substitute_palette(palette),
            _                                                                       => self.argb.clone(),
        };

        self.consumer.lock().set_color_interpreter(&forwarded);
    }

    fn set_hints(&mut self, hints: DeliveryHints) {
        self.consumer.lock().set_hints(hints);
    }

    fn set_pixels(&mut self, block: &PixelBlock) -> Result<()> {
        let block = match self.state.accept_block(block)? {
            Some(block) => block,
            None        => { return Ok(()); }
        };

        match block.color {
            ColorInterpreter::Indexed(palette) if self.remap.position_independent() => {
                let substitute = self.substitute_palette(palette);
                self.consumer.lock().set_pixels(&block.with_color(&substitute))
            }

            _ => self.remap_pixels(&block),
        }
    }

    fn image_complete(&mut self, status: CompletionStatus) {
        if self.state.complete(status) {
            self.consumer.lock().image_complete(status);
        }
    }
}

impl<TRemap: RgbRemap> ImageFilter for RgbRemapFilter<TRemap> {
    fn description(&self) -> String {
        self.remap.description()
    }
}

///
/// One of the colour channels of an ARGB value
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    #[inline]
    fn shift(&self) -> u32 {
        match self {
            ColorChannel::Red   => 16,
            ColorChannel::Green => 8,
            ColorChannel::Blue  => 0,
        }
    }
}

///
/// Remaps colours by rearranging their red, green and blue channels
///
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelSwapRemap {
    /// The channel that each of the red, green and blue outputs is read from
    sources: [ColorChannel; 3],
}

impl ChannelSwapRemap {
    ///
    /// Creates a remapping that reads the red, green and blue channels from the specified channels of the original colour
    ///
    pub fn new(red_from: ColorChannel, green_from: ColorChannel, blue_from: ColorChannel) -> ChannelSwapRemap {
        ChannelSwapRemap { sources: [red_from, green_from, blue_from] }
    }
}

impl RgbRemap for ChannelSwapRemap {
    fn remap_rgb(&self, _x: i32, _y: i32, argb: u32) -> u32 {
        let [red, green, blue] = self.sources.map(|channel| (argb >> channel.shift()) & 0xff);

        (argb & 0xff000000) | (red << 16) | (green << 8) | blue
    }

    fn position_independent(&self) -> bool { true }

    fn description(&self) -> String {
        use itertools::*;
        format!("channel swap ({})", self.sources.iter().map(|channel| format!("{:?}", channel)).join(", "))
    }
}

///
/// Converts colours to grayscale, brightened or darkened by a percentage (the usual look for disabled icons)
///
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GrayRemap {
    brighter:   bool,
    percent:    u32,
}

impl GrayRemap {
    ///
    /// Creates a gray remapping. The percentage must be between 0 and 100
    ///
    pub fn new(brighter: bool, percent: u32) -> Result<GrayRemap> {
        if percent > 100 {
            return Err(PixelStreamError::configuration(format!("gray percentage {} is not between 0 and 100", percent)));
        }

        Ok(GrayRemap { brighter, percent })
    }
}

impl RgbRemap for GrayRemap {
    fn remap_rgb(&self, _x: i32, _y: i32, argb: u32) -> u32 {
        let [_, r, g, b]    = argb_components(argb);
        let luma            = round_component(0.30 * (r as f32) + 0.59 * (g as f32) + 0.11 * (b as f32)) as u32;

        let gray = if self.brighter {
            255 - ((255 - luma) * (100 - self.percent) / 100)
        } else {
            luma * (100 - self.percent) / 100
        };

        (argb & 0xff000000) | (gray << 16) | (gray << 8) | gray
    }

    fn position_independent(&self) -> bool { true }

    fn description(&self) -> String {
        format!("gray {} {}%", if self.brighter { "brighter" } else { "darker" }, self.percent)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Checkerboard;

    impl RgbRemap for Checkerboard {
        fn remap_rgb(&self, x: i32, y: i32, argb: u32) -> u32 {
            if (x + y) % 2 == 0 { argb } else { argb ^ 0x00ffffff }
        }
    }

    #[test]
    fn channel_swap() {
        let swap = ChannelSwapRemap::new(ColorChannel::Blue, ColorChannel::Green, ColorChannel::Red);

        assert!(swap.remap_rgb(0, 0, 0x80112233) == 0x80332211);
    }

    #[test]
    fn gray_levels() {
        assert!(GrayRemap::new(false, 0).unwrap().remap_rgb(0, 0, 0xffffffff) == 0xffffffff);
        assert!(GrayRemap::new(false, 100).unwrap().remap_rgb(0, 0, 0xffffffff) == 0xff000000);
        assert!(GrayRemap::new(true, 100).unwrap().remap_rgb(0, 0, 0x80000000) == 0x80ffffff);
        assert!(GrayRemap::new(true, 101).is_err());
    }

    #[test]
    fn palette_is_substituted() {
        let (collector, consumer)   = ImageCollector::shared();
        let descriptor              = RgbRemapDescriptor::new(ChannelSwapRemap::new(ColorChannel::Blue, ColorChannel::Green, ColorChannel::Red));
        let mut filter              = descriptor.create_instance(consumer);
        let palette                 = Arc::new(IndexPalette::from_rgb(vec![0xff0000, 0x00ff00]).unwrap());
        let color                   = ColorInterpreter::Indexed(Arc::clone(&palette));
        let pixels                  = vec![0u8, 1u8];

        filter.set_dimensions(2, 1);
        filter.set_color_interpreter(&color);
        filter.set_pixels(&PixelBlock::from_bytes(0, 0, 2, 1, &color, &pixels)).unwrap();

        let collector   = collector.lock().unwrap();
        let forwarded   = collector.color_interpreter().and_then(|color| color.palette().cloned()).unwrap();

        assert!(forwarded.entries() == &[0xff0000ff, 0xff00ff00]);
        assert!(collector.pixels() == &[0xff0000ff, 0xff00ff00]);

        // Both the announced interpreter and the block use the same substituted palette
        assert!(Arc::ptr_eq(&forwarded, filter.substitution.as_ref().and_then(|(_, substitute)| substitute.palette()).unwrap()));
    }

    #[test]
    fn position_dependent_remaps_produce_argb() {
        let (collector, consumer)   = ImageCollector::shared();
        let mut filter              = RgbRemapDescriptor::new(Checkerboard).create_instance(consumer);
        let color                   = ColorInterpreter::indexed(IndexPalette::from_rgb(vec![0x000000]).unwrap());
        let pixels                  = vec![0u8; 4];

        filter.set_dimensions(2, 2);
        filter.set_color_interpreter(&color);
        filter.set_pixels(&PixelBlock::from_bytes(0, 0, 2, 2, &color, &pixels)).unwrap();

        let collector = collector.lock().unwrap();
        assert!(collector.color_interpreter().map(|color| color.is_default_argb()) == Some(true));
        assert!(collector.pixels() == &[0xff000000, 0xffffffff, 0xffffffff, 0xff000000]);
    }
}
