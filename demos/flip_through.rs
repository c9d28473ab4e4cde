//! Flip through a whole synthetic book and print the animation timeline.
//!
//! Run with: cargo run --example flip_through

use flipbook_rig::{Book, BookConfig, Rasterizer, TurnPhase};

struct SolidRasterizer;

impl Rasterizer for SolidRasterizer {
    fn rasterize(&self, _markup: &str, width: u32, height: u32) -> flipbook_rig::Result<Vec<u8>> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([220, 214, 196, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )?;
        Ok(bytes)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let face = |label: String| format!("<svg><text x=\"4\" y=\"20\">{}</text></svg>", label);

    let mut images = vec![face("front cover".into()), face("front inner".into())];
    for i in 0..16 {
        images.push(face(format!("face {}", i)));
    }
    images.push(face("back inner".into()));
    images.push(face("back cover".into()));

    let mut book = Book::new(BookConfig {
        page_images: images,
        ..BookConfig::default()
    })?;
    book.rasterize_with(&SolidRasterizer);

    println!("Book with {} pages; flipping front to back...", book.total_pages());
    book.set_page(book.total_pages());

    let dt = 1.0 / 60.0;
    let mut now = 0.0f64;
    for frame in 0.. {
        now += dt as f64 * 1000.0;
        book.frame(now, dt);

        if frame % 15 == 0 {
            let bar: String = (0..book.total_pages())
                .map(|i| {
                    let page = &book.pages()[i];
                    match page.phase(now) {
                        TurnPhase::Turning => '~',
                        TurnPhase::SettledOpen => '<',
                        TurnPhase::ClosedFlat => '>',
                    }
                })
                .collect();
            println!("t={:>6.0}ms  current={:>2}  [{}]", now, book.current_page(), bar);
        }

        if book.is_settled() && now > 3_000.0 {
            break;
        }
    }

    println!(
        "Done: current={} closed={}",
        book.current_page(),
        book.book_closed()
    );
    Ok(())
}
