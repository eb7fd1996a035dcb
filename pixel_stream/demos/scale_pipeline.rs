use flo_pixel_stream::color::*;
use flo_pixel_stream::filters::*;
use flo_pixel_stream::geometry::*;
use flo_pixel_stream::raster::*;
use flo_pixel_stream::stream::*;

use std::sync::*;

///
/// Renders an image to the terminal using background colours
///
fn print_image(title: &str, image: &ImageCollector) {
    let (width, height) = image.dimensions();

    println!("{} ({}x{})", title, width, height);

    for y in 0..height {
        let line = (0..width)
            .map(|x| {
                let [_, r, g, b] = argb_components(image.argb(x, y));
                format!("\x1b[48;2;{};{};{}m  ", r, g, b)
            })
            .collect::<String>();

        println!("{}\x1b[0m", line);
    }

    println!();
}

///
/// Crops a generated image, scales it with both scaling filters, and then blurs the result
///
pub fn main() {
    // A 64x64 image with a colour gradient and a white diagonal
    let pixels = (0..64*64)
        .map(|idx| {
            let (x, y) = (idx % 64, idx / 64);
            if x == y { 0xffffffff } else { argb_from_components([255, (x * 4) as u8, (y * 4) as u8, 128]) }
        })
        .collect::<Vec<u32>>();
    let source = Arc::new(MemoryProducer::from_argb(64, 64, pixels).unwrap());

    // Filters can be chained by using a filtered producer as the source for another
    let cropped     = Arc::new(FilteredProducer::new(source, CropDescriptor::new(Rectangle::new(8, 8, 48, 48)).unwrap()));
    let replicated  = FilteredProducer::new(Arc::clone(&cropped) as Arc<dyn ImageProducer>, ReplicateScaleDescriptor::new(24, -1).unwrap());
    let averaged    = FilteredProducer::new(Arc::clone(&cropped) as Arc<dyn ImageProducer>, AreaAveragingScaleDescriptor::new(24, -1).unwrap());
    let gray        = FilteredProducer::new(cropped, RgbRemapDescriptor::new(GrayRemap::new(true, 50).unwrap()));

    let (replicated_image, replicated_sink) = ImageCollector::shared();
    let (averaged_image, averaged_sink)     = ImageCollector::shared();
    let (gray_image, gray_sink)             = ImageCollector::shared();

    replicated.start_production(&replicated_sink).unwrap();
    averaged.start_production(&averaged_sink).unwrap();
    gray.start_production(&gray_sink).unwrap();

    print_image("Replicate scale", &replicated_image.lock().unwrap());
    print_image("Area averaging scale", &averaged_image.lock().unwrap());

    let averaged_image = averaged_image.lock().unwrap();
    println!("Filters: {}", averaged_image.properties().get("filters").map(|s| s.as_str()).unwrap_or(""));
    println!();

    // Blur the averaged image with a raster operation
    let raster  = averaged_image.to_raster_image().unwrap();
    let blurred = ConvolveOp::new(Kernel::box_blur(3, 3).unwrap(), EdgeCondition::NoOp).filter_image(&raster).unwrap();

    let mut blurred_image = ImageCollector::new();
    let argb_color        = ColorInterpreter::default_argb();
    let blurred_pixels    = blurred.to_argb();

    blurred_image.set_dimensions(blurred.width() as i32, blurred.height() as i32);
    blurred_image.set_pixels(&PixelBlock::from_ints(0, 0, blurred.width() as i32, blurred.height() as i32, &argb_color, &blurred_pixels)).unwrap();
    blurred_image.image_complete(CompletionStatus::ImageDone);

    print_image("Blurred", &blurred_image);

    #[cfg(feature="render_png")]
    {
        let file = std::fs::File::create("gray_crop.png").unwrap();
        gray_image.lock().unwrap().write_png(file).unwrap();
        println!("Wrote gray_crop.png");
    }

    #[cfg(not(feature="render_png"))]
    {
        print_image("Gray", &gray_image.lock().unwrap());
    }
}
