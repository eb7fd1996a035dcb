use flo_pixel_stream::*;
use flo_pixel_stream::filters::*;
use flo_pixel_stream::raster::*;
use flo_pixel_stream::stream::*;

use itertools::*;

use std::sync::*;

fn gradient(width: usize, height: usize, bands: usize) -> Raster {
    let samples = iproduct!(0..height, 0..width, 0..bands)
        .map(|(y, x, band)| ((x * 31 + y * 17 + band * 5) % 256) as i32)
        .collect();

    Raster::from_samples(width, height, bands, SampleType::Byte, samples).unwrap()
}

#[test]
pub fn identity_band_combine() {
    let src = gradient(5, 3, 3);
    let op  = BandCombineOp::new(&[[1.0f32, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]).unwrap();

    assert!(op.filter_raster(&src).unwrap() == src);
}

#[test]
pub fn constant_band_combine() {
    let src = gradient(5, 3, 3);
    let op  = BandCombineOp::new(&[[0.0f32, 0.0, 0.0, 255.0], [0.0, 0.0, 0.0, 255.0], [0.0, 0.0, 0.0, 255.0]]).unwrap();
    let dst = op.filter_raster(&src).unwrap();

    assert!(dst.samples().iter().all(|sample| *sample == 255));
}

#[test]
pub fn band_combine_to_gray() {
    let src = Raster::from_samples(2, 1, 3, SampleType::Byte, vec![100, 100, 100, 10, 20, 30]).unwrap();
    let op  = BandCombineOp::new(&[[0.25f32, 0.5, 0.25]]).unwrap();
    let mut dst = Raster::zeroed(2, 1, 1, SampleType::Byte).unwrap();

    op.filter_into(&src, &mut dst).unwrap();
    assert!(dst.samples() == &[100, 20]);
}

#[test]
pub fn identity_lookup() {
    let src = gradient(6, 4, 4);
    let op  = LookupOp::new(ByteLookupTable::shared(0, (0..=255u8).collect()).unwrap());

    assert!(op.filter_raster(&src).unwrap() == src);
}

#[test]
pub fn lookup_below_offset_is_an_error() {
    let src = Raster::from_samples(3, 3, 1, SampleType::Byte, vec![5; 9]).unwrap();
    let op  = LookupOp::new(ShortLookupTable::shared(10, vec![1000; 246]).unwrap());

    let result = op.filter_raster(&src);
    assert!(result == Err(PixelStreamError::LookupOutOfRange { band: 0, sample: 5, offset: 10, table_len: 246 }));
}

#[test]
pub fn short_lookup_into_int_raster() {
    let src = Raster::from_samples(2, 1, 1, SampleType::Byte, vec![0, 1]).unwrap();
    let op  = LookupOp::new(ShortLookupTable::shared(0, vec![40000, 65535]).unwrap());
    let mut dst = Raster::zeroed(2, 1, 1, SampleType::Int).unwrap();

    op.filter_into(&src, &mut dst).unwrap();
    assert!(dst.samples() == &[40000, 65535]);
}

#[test]
pub fn rejected_operations_leave_the_destination_alone() {
    let src         = Raster::from_samples(3, 1, 1, SampleType::Byte, vec![20, 5, 30]).unwrap();
    let previous    = Raster::from_samples(3, 1, 1, SampleType::Byte, vec![1, 2, 3]).unwrap();
    let mut dst     = previous.clone();

    // The second sample is below the table offset, after the first has already been looked up
    let lookup = LookupOp::new(ByteLookupTable::shared(10, vec![200; 246]).unwrap());
    assert!(matches!(lookup.filter_into(&src, &mut dst), Err(PixelStreamError::LookupOutOfRange { sample: 5, .. })));
    assert!(dst == previous);

    // Too many bands for the matrix
    let combine = BandCombineOp::new(&[[1.0f32, 0.0, 0.0]]).unwrap();
    assert!(combine.filter_into(&src, &mut dst).is_err());
    assert!(dst == previous);

    // Destination smaller than the source
    let mut small   = Raster::from_samples(2, 1, 1, SampleType::Byte, vec![7, 8]).unwrap();
    let convolve    = ConvolveOp::new(Kernel::new(1, 1, &[1.0]).unwrap(), EdgeCondition::NoOp);
    assert!(convolve.filter_into(&src, &mut small).is_err());
    assert!(small.samples() == &[7, 8]);

    // The same destination can be used once the call is valid
    convolve.filter_into(&src, &mut dst).unwrap();
    assert!(dst == src);
}

#[test]
pub fn one_by_one_kernel_is_identity() {
    let src     = gradient(7, 5, 3);
    let kernel  = Kernel::new(1, 1, &[1.0]).unwrap();

    for edge in [EdgeCondition::ZeroFill, EdgeCondition::NoOp] {
        assert!(ConvolveOp::new(kernel.clone(), edge).filter_raster(&src).unwrap() == src, "{:?}", edge);
    }
}

#[test]
pub fn zero_fill_darkens_edges() {
    let src         = Raster::from_samples(4, 4, 1, SampleType::Byte, vec![90; 16]).unwrap();
    let kernel      = Kernel::box_blur(3, 3).unwrap();
    let zero_fill   = ConvolveOp::new(kernel.clone(), EdgeCondition::ZeroFill).filter_raster(&src).unwrap();
    let no_op       = ConvolveOp::new(kernel, EdgeCondition::NoOp).filter_raster(&src).unwrap();

    assert!(no_op == src);

    assert!(zero_fill.sample(0, 0, 0) == 40);
    assert!(zero_fill.sample(1, 0, 0) == 60);
    assert!(zero_fill.sample(1, 1, 0) == 90);
    assert!(zero_fill.sample(2, 2, 0) == 90);
    assert!(zero_fill.sample(3, 3, 0) == 40);
}

#[test]
pub fn collected_images_can_be_convolved() {
    let source          = Arc::new(MemoryProducer::from_argb(2, 2, vec![0xffff0000, 0xff0000ff, 0xff0000ff, 0xffff0000]).unwrap());
    let scaled          = FilteredProducer::new(source, ReplicateScaleDescriptor::new(4, 4).unwrap());
    let (image, sink)   = ImageCollector::shared();

    scaled.start_production(&sink).unwrap();

    let image   = image.lock().unwrap().to_raster_image().unwrap();
    let blurred = ConvolveOp::new(Kernel::box_blur(2, 2).unwrap(), EdgeCondition::NoOp).filter_image(&image).unwrap();

    assert!(blurred.color() == image.color());
    assert!(blurred.argb(0, 0) == 0xffff0000);
    assert!(blurred.argb(3, 3) == 0xffff0000);

    // Where the quadrants meet, red and blue are mixed equally
    assert!(blurred.argb(1, 1) == 0xff800080, "{:08x}", blurred.argb(1, 1));
}

///
/// Accelerator that records the operations it's asked to perform, and handles lookups by filling the destination
///
struct RecordingAccelerator {
    requests:       Mutex<Vec<&'static str>>,
    handle_lookups: bool,
}

impl RasterAccelerator for RecordingAccelerator {
    fn filter(&self, op: AcceleratedOp, src: &Raster, dst: &mut Raster) -> bool {
        let name = match op {
            AcceleratedOp::Convolve(_)      => "convolve",
            AcceleratedOp::BandCombine(_)   => "band combine",
            AcceleratedOp::ByteLookup(_)    => "byte lookup",
            AcceleratedOp::ShortLookup(_)   => "short lookup",
        };
        self.requests.lock().unwrap().push(name);

        if self.handle_lookups && name == "byte lookup" {
            for (x, y, band) in iproduct!(0..src.width(), 0..src.height(), 0..src.bands()) {
                dst.set_sample(x, y, band, 7);
            }

            true
        } else {
            false
        }
    }
}

#[test]
pub fn accelerators_are_consulted() {
    let accelerator = Arc::new(RecordingAccelerator { requests: Mutex::new(vec![]), handle_lookups: true });
    let src         = gradient(3, 3, 2);

    let lookup      = LookupOp::new(ByteLookupTable::shared(0, (0..=255u8).collect()).unwrap()).with_accelerator(accelerator.clone());
    let combine     = BandCombineOp::new(&[[1.0f32, 0.0], [0.0, 1.0]]).unwrap().with_accelerator(accelerator.clone());
    let convolve    = ConvolveOp::new(Kernel::new(1, 1, &[1.0]).unwrap(), EdgeCondition::ZeroFill).with_accelerator(accelerator.clone());

    let looked_up   = lookup.filter_raster(&src).unwrap();
    let combined    = combine.filter_raster(&src).unwrap();
    let convolved   = convolve.filter_raster(&src).unwrap();

    assert!(*accelerator.requests.lock().unwrap() == vec!["byte lookup", "band combine", "convolve"]);

    // The accelerated lookup replaces the software one; the others fall back when the accelerator declines
    assert!(looked_up.samples().iter().all(|sample| *sample == 7));
    assert!(combined == src);
    assert!(convolved == src);
}

#[test]
pub fn accelerators_are_not_used_for_invalid_operations() {
    let accelerator = Arc::new(RecordingAccelerator { requests: Mutex::new(vec![]), handle_lookups: true });
    let src         = gradient(3, 3, 3);
    let lookup      = LookupOp::new(ByteLookupTable::per_band(0, vec![vec![0; 256], vec![0; 256]]).unwrap()).with_accelerator(accelerator.clone());

    assert!(lookup.filter_raster(&src).is_err());
    assert!(accelerator.requests.lock().unwrap().is_empty());
}
