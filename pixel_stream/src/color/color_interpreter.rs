use super::argb::*;
use super::index_palette::*;
use crate::error::*;

use std::fmt;
use std::sync::*;

///
/// An opaque colour service that can interpret packed samples
///
/// This is how colour models that the pipeline doesn't know about are plugged in: the pipeline will only ever ask for
/// the ARGB value of a sample, and will ask for the inverse mapping only when it needs to write samples back.
///
pub trait ColorMapping : Send + Sync {
    /// Returns the non-premultiplied ARGB value of a sample
    fn argb_for_sample(&self, sample: u32) -> u32;

    /// Returns the sample that represents an ARGB value, if this mapping can be inverted
    fn sample_for_argb(&self, _argb: u32) -> Option<u32> { None }

    /// A short name for this mapping, used in error messages
    fn name(&self) -> &str { "custom colour mapping" }
}

///
/// Describes how the red, green, blue and alpha components are packed into a sample
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DirectColor {
    pub red_mask:   u32,
    pub green_mask: u32,
    pub blue_mask:  u32,

    /// The alpha mask, or 0 if samples are always opaque
    pub alpha_mask: u32,
}

///
/// Maps packed samples to ARGB colours and back again
///
#[derive(Clone)]
pub enum ColorInterpreter {
    /// Components are packed directly into the sample using bit masks
    Direct(DirectColor),

    /// Samples are indexes into a colour table
    Indexed(Arc<IndexPalette>),

    /// Samples are interpreted by an external service
    Custom(Arc<dyn ColorMapping>),
}

impl DirectColor {
    /// The default `0xAARRGGBB` packing
    pub const ARGB: DirectColor = DirectColor { red_mask: 0x00ff0000, green_mask: 0x0000ff00, blue_mask: 0x000000ff, alpha_mask: 0xff000000 };

    /// `0x00RRGGBB` packing with no alpha channel
    pub const RGB: DirectColor  = DirectColor { red_mask: 0x00ff0000, green_mask: 0x0000ff00, blue_mask: 0x000000ff, alpha_mask: 0 };

    ///
    /// Creates a new direct colour description, checking that the masks are usable
    ///
    pub fn new(red_mask: u32, green_mask: u32, blue_mask: u32, alpha_mask: u32) -> Result<DirectColor> {
        for (name, mask) in [("red", red_mask), ("green", green_mask), ("blue", blue_mask), ("alpha", alpha_mask)] {
            let bits = if mask == 0 { 0 } else { mask >> mask.trailing_zeros() };

            if bits & bits.wrapping_add(1) != 0 {
                return Err(PixelStreamError::configuration(format!("the {} mask {:#x} is not a contiguous set of bits", name, mask)));
            }
        }

        if red_mask == 0 && green_mask == 0 && blue_mask == 0 {
            return Err(PixelStreamError::configuration("a direct colour needs at least one colour component"));
        }

        Ok(DirectColor { red_mask, green_mask, blue_mask, alpha_mask })
    }

    ///
    /// True if samples in this format carry an alpha value
    ///
    #[inline]
    pub fn has_alpha(&self) -> bool { self.alpha_mask != 0 }

    ///
    /// Reads a component from a sample, scaled to the range 0-255
    ///
    #[inline]
    fn extract(sample: u32, mask: u32) -> u8 {
        if mask == 0 { return 0; }

        let shift   = mask.trailing_zeros();
        let max     = mask >> shift;
        let value   = (sample & mask) >> shift;

        if max == 255 {
            value as u8
        } else {
            (((value as u64) * 255 + (max as u64)/2) / (max as u64)) as u8
        }
    }

    ///
    /// Writes a component in the range 0-255 into the bits of a mask
    ///
    #[inline]
    fn insert(component: u8, mask: u32) -> u32 {
        if mask == 0 { return 0; }

        let shift   = mask.trailing_zeros();
        let max     = mask >> shift;
        let value   = if max == 255 { component as u32 } else { (((component as u64) * (max as u64) + 127) / 255) as u32 };

        (value << shift) & mask
    }

    ///
    /// Returns the non-premultiplied ARGB value of a sample
    ///
    #[inline]
    pub fn argb(&self, sample: u32) -> u32 {
        let alpha = if self.alpha_mask == 0 { 255 } else { Self::extract(sample, self.alpha_mask) };

        argb_from_components([alpha, Self::extract(sample, self.red_mask), Self::extract(sample, self.green_mask), Self::extract(sample, self.blue_mask)])
    }

    ///
    /// Returns the sample that represents an ARGB value
    ///
    #[inline]
    pub fn sample(&self, argb: u32) -> u32 {
        let [a, r, g, b] = argb_components(argb);

        Self::insert(a, self.alpha_mask) | Self::insert(r, self.red_mask) | Self::insert(g, self.green_mask) | Self::insert(b, self.blue_mask)
    }
}

impl ColorInterpreter {
    ///
    /// The default colour interpreter, which treats samples as `0xAARRGGBB` values
    ///
    #[inline]
    pub fn default_argb() -> ColorInterpreter {
        ColorInterpreter::Direct(DirectColor::ARGB)
    }

    ///
    /// Creates an interpreter for indexed samples
    ///
    #[inline]
    pub fn indexed(palette: IndexPalette) -> ColorInterpreter {
        ColorInterpreter::Indexed(Arc::new(palette))
    }

    ///
    /// True if this is the default ARGB interpreter
    ///
    #[inline]
    pub fn is_default_argb(&self) -> bool {
        matches!(self, ColorInterpreter::Direct(direct) if *direct == DirectColor::ARGB)
    }

    ///
    /// Returns the non-premultiplied ARGB value for a sample
    ///
    #[inline]
    pub fn argb_for_sample(&self, sample: u32) -> u32 {
        match self {
            ColorInterpreter::Direct(direct)    => direct.argb(sample),
            ColorInterpreter::Indexed(palette)  => palette.argb(sample),
            ColorInterpreter::Custom(mapping)   => mapping.argb_for_sample(sample),
        }
    }

    ///
    /// Returns the sample that best represents an ARGB value
    ///
    pub fn sample_for_argb(&self, argb: u32) -> Result<u32> {
        match self {
            ColorInterpreter::Direct(direct)    => Ok(direct.sample(argb)),
            ColorInterpreter::Indexed(palette)  => Ok(palette.closest_index(argb)),
            ColorInterpreter::Custom(mapping)   => mapping.sample_for_argb(argb)
                .ok_or_else(|| PixelStreamError::unsupported(format!("{} cannot map colours back to samples", mapping.name()))),
        }
    }

    ///
    /// If this interpreter uses a colour table, returns it
    ///
    #[inline]
    pub fn palette(&self) -> Option<&Arc<IndexPalette>> {
        match self {
            ColorInterpreter::Indexed(palette)  => Some(palette),
            _                                   => None,
        }
    }

    ///
    /// True if this interpreter is the same mapping instance as another one
    ///
    /// Palettes and custom mappings are compared by identity rather than contents: a filter that substitutes a palette
    /// only wants to recognise the exact palette it substituted.
    ///
    pub fn same_mapping(&self, other: &ColorInterpreter) -> bool {
        match (self, other) {
            (ColorInterpreter::Direct(a), ColorInterpreter::Direct(b))      => a == b,
            (ColorInterpreter::Indexed(a), ColorInterpreter::Indexed(b))    => Arc::ptr_eq(a, b),
            (ColorInterpreter::Custom(a), ColorInterpreter::Custom(b))      => Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const (),
            _                                                               => false,
        }
    }
}

impl Default for ColorInterpreter {
    fn default() -> Self {
        ColorInterpreter::default_argb()
    }
}

impl fmt::Debug for ColorInterpreter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ColorInterpreter::Direct(direct)    => f.debug_tuple("Direct").field(direct).finish(),
            ColorInterpreter::Indexed(palette)  => f.debug_tuple("Indexed").field(&palette.len()).finish(),
            ColorInterpreter::Custom(mapping)   => f.debug_tuple("Custom").field(&mapping.name()).finish(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Gray;

    impl ColorMapping for Gray {
        fn argb_for_sample(&self, sample: u32) -> u32 {
            let v = sample & 0xff;
            0xff000000 | (v << 16) | (v << 8) | v
        }
    }

    #[test]
    fn default_argb_is_identity() {
        let interpreter = ColorInterpreter::default_argb();

        assert!(interpreter.argb_for_sample(0x12345678) == 0x12345678);
        assert!(interpreter.sample_for_argb(0x12345678) == Ok(0x12345678));
    }

    #[test]
    fn rgb_565() {
        let direct = DirectColor::new(0xf800, 0x07e0, 0x001f, 0).unwrap();

        assert!(direct.argb(0xffff) == 0xffffffff);
        assert!(direct.argb(0xf800) == 0xffff0000);
        assert!(direct.sample(0xff00ff00) == 0x07e0);
    }

    #[test]
    fn broken_mask_is_rejected() {
        assert!(DirectColor::new(0xf0f, 0x00f0, 0, 0).is_err());
    }

    #[test]
    fn palettes_compare_by_identity() {
        let palette     = Arc::new(IndexPalette::from_rgb(vec![0, 0xffffff]).unwrap());
        let copy        = Arc::new((*palette).clone());
        let a           = ColorInterpreter::Indexed(Arc::clone(&palette));
        let b           = ColorInterpreter::Indexed(Arc::clone(&palette));
        let c           = ColorInterpreter::Indexed(copy);

        assert!(a.same_mapping(&b));
        assert!(!a.same_mapping(&c));
    }

    #[test]
    fn custom_mapping_without_inverse() {
        let gray = ColorInterpreter::Custom(Arc::new(Gray));

        assert!(gray.argb_for_sample(0x40) == 0xff404040);
        assert!(matches!(gray.sample_for_argb(0xff404040), Err(PixelStreamError::UnsupportedColorModel(_))));
    }
}
