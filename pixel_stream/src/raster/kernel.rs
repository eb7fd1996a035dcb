use crate::error::*;

use std::sync::*;

///
/// A matrix of weights used by a convolution
///
/// The origin of the kernel (the element that lines up with the pixel being calculated) is at `((width-1)/2, (height-1)/2)`.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    width:      usize,
    height:     usize,
    x_origin:   usize,
    y_origin:   usize,

    /// The weights, in rows from top to bottom
    data:       Arc<[f32]>,
}

impl Kernel {
    ///
    /// Creates a new kernel from the first `width * height` values of an array of weights
    ///
    pub fn new(width: i32, height: i32, data: &[f32]) -> Result<Kernel> {
        if width <= 0 || height <= 0 {
            return Err(PixelStreamError::configuration(format!("cannot create a {}x{} kernel", width, height)));
        }

        let (width, height) = (width as usize, height as usize);
        let len             = width.checked_mul(height).unwrap_or(usize::MAX);

        if data.len() < len {
            return Err(PixelStreamError::configuration(format!("a {}x{} kernel needs {} values, but only {} were supplied", width, height, len, data.len())));
        }

        Ok(Kernel {
            width:      width,
            height:     height,
            x_origin:   (width - 1) / 2,
            y_origin:   (height - 1) / 2,
            data:       data[0..len].into(),
        })
    }

    ///
    /// Creates a kernel where every weight is the same and the weights add up to 1
    ///
    pub fn box_blur(width: i32, height: i32) -> Result<Kernel> {
        let len     = (width.max(0) as usize) * (height.max(0) as usize);
        let weight  = 1.0 / (len.max(1) as f32);

        Kernel::new(width, height, &vec![weight; len])
    }

    #[inline] pub fn width(&self) -> usize { self.width }
    #[inline] pub fn height(&self) -> usize { self.height }
    #[inline] pub fn x_origin(&self) -> usize { self.x_origin }
    #[inline] pub fn y_origin(&self) -> usize { self.y_origin }
    #[inline] pub fn data(&self) -> &[f32] { &self.data }

    ///
    /// The weight at a position in the kernel
    ///
    #[inline]
    pub fn weight(&self, i: usize, j: usize) -> f32 {
        self.data[j * self.width + i]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn origin_is_center() {
        let kernel = Kernel::new(3, 4, &[0.0; 12]).unwrap();

        assert!(kernel.x_origin() == 1);
        assert!(kernel.y_origin() == 1);
    }

    #[test]
    fn short_data_is_rejected() {
        assert!(Kernel::new(3, 3, &[1.0; 8]).is_err());
        assert!(Kernel::new(0, 3, &[1.0; 8]).is_err());
        assert!(Kernel::new(2, 2, &[1.0; 8]).unwrap().data().len() == 4);
    }
}
