use once_cell::sync::{Lazy};

///
/// Table of `(c * a + 127) / 255` values, indexed by `(a << 8) | c`
///
static PREMULTIPLY: Lazy<Box<[u8]>> = Lazy::new(|| {
    let mut table = vec![0u8; 65536];

    for a in 0..256 {
        for c in 0..256 {
            table[(a<<8) | c] = ((c * a + 127) / 255) as u8;
        }
    }

    table.into_boxed_slice()
});

///
/// Splits a packed `0xAARRGGBB` value into its `[a, r, g, b]` components
///
#[inline]
pub fn argb_components(argb: u32) -> [u8; 4] {
    [(argb >> 24) as u8, (argb >> 16) as u8, (argb >> 8) as u8, argb as u8]
}

///
/// Packs a set of `[a, r, g, b]` components into a `0xAARRGGBB` value
///
#[inline]
pub fn argb_from_components(components: [u8; 4]) -> u32 {
    let [a, r, g, b] = components;

    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

///
/// Multiplies the colour components of a non-premultiplied ARGB value by its alpha
///
#[inline]
pub fn premultiply_argb(argb: u32) -> u32 {
    let [a, r, g, b] = argb_components(argb);

    if a == 255 {
        argb
    } else {
        let alpha = (a as usize) << 8;
        argb_from_components([a, PREMULTIPLY[alpha | r as usize], PREMULTIPLY[alpha | g as usize], PREMULTIPLY[alpha | b as usize]])
    }
}

///
/// Divides the colour components of a premultiplied ARGB value by its alpha (fully transparent values become transparent black)
///
#[inline]
pub fn unpremultiply_argb(argb: u32) -> u32 {
    let [a, r, g, b] = argb_components(argb);

    match a {
        0   => 0,
        255 => argb,
        _   => {
            let unmultiply = |c: u8| (((c as u32) * 255 + (a as u32)/2) / (a as u32)).min(255) as u8;
            argb_from_components([a, unmultiply(r), unmultiply(g), unmultiply(b)])
        }
    }
}

///
/// Rounds a floating point component to the nearest integer (halves round upwards) and clamps it to the range 0-255
///
#[inline]
pub fn round_component(value: f32) -> u8 {
    let rounded = (value + 0.5).floor();

    if rounded <= 0.0 {
        0
    } else if rounded >= 255.0 {
        255
    } else {
        rounded as u8
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pack_unpack() {
        assert!(argb_components(0x80112233) == [0x80, 0x11, 0x22, 0x33]);
        assert!(argb_from_components([0x80, 0x11, 0x22, 0x33]) == 0x80112233);
    }

    #[test]
    fn opaque_values_are_unchanged_by_premultiplication() {
        for c in 0..=255u32 {
            let argb = 0xff000000 | (c << 16) | ((255-c) << 8) | c;

            assert!(premultiply_argb(argb) == argb);
            assert!(unpremultiply_argb(argb) == argb);
        }
    }

    #[test]
    fn transparent_pixels_premultiply_to_zero() {
        assert!(premultiply_argb(0x00ffffff) == 0);
        assert!(unpremultiply_argb(0x00123456) == 0);
    }

    #[test]
    fn half_alpha_round_trip() {
        let premultiplied = premultiply_argb(0x80ff8000);

        assert!(premultiplied == 0x80804000, "{:08x}", premultiplied);
        assert!(unpremultiply_argb(premultiplied) == 0x80ff8000, "{:08x}", unpremultiply_argb(premultiplied));
    }

    #[test]
    fn rounding_clamps() {
        assert!(round_component(-3.0) == 0);
        assert!(round_component(254.5) == 255);
        assert!(round_component(300.0) == 255);
        assert!(round_component(127.49) == 127);
    }
}
