//! Flipbook Rig CLI
//!
//! Simulate and inspect book animations without a browser host.

use clap::{Parser, Subcommand};
use flipbook_rig::{
    export_skinned_glb, Book, BookConfig, FrameSnapshot, Rasterizer,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flipbook-rig")]
#[command(author, version, about = "Simulate and inspect 3D book animations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a page flip on a fixed-step clock and print progress
    Simulate {
        /// Book config JSON file (defaults to a synthetic book)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Inner page count for the synthetic book
        #[arg(short, long, default_value = "10")]
        pages: usize,

        /// Page to flip to
        #[arg(short, long, default_value = "5")]
        to: usize,

        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Print a progress line every N frames
        #[arg(long, default_value = "10")]
        every: u32,
    },

    /// Settle the book at a page and write a frame snapshot as JSON
    Snapshot {
        /// Book config JSON file (defaults to a synthetic book)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Inner page count for the synthetic book
        #[arg(short, long, default_value = "10")]
        pages: usize,

        /// Page to settle at
        #[arg(short, long, default_value = "5")]
        at: usize,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Export one rigged page as a skinned GLB
    Glb {
        /// Book config JSON file (defaults to a synthetic book)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Inner page count for the synthetic book
        #[arg(short, long, default_value = "10")]
        pages: usize,

        /// Page to export
        #[arg(long, default_value = "1")]
        page: usize,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show derived metrics for a book config
    Info {
        /// Book config JSON file (defaults to a synthetic book)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Inner page count for the synthetic book
        #[arg(short, long, default_value = "10")]
        pages: usize,
    },
}

/// Rasterizer that fills every face with a flat tone, enough to exercise
/// the texture path offline.
struct SolidRasterizer;

impl Rasterizer for SolidRasterizer {
    fn rasterize(&self, _markup: &str, width: u32, height: u32) -> flipbook_rig::Result<Vec<u8>> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([235, 228, 210, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )?;
        Ok(bytes)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            pages,
            to,
            fps,
            every,
        } => simulate(load_config(config, pages)?, to, fps, every),
        Commands::Snapshot {
            config,
            pages,
            at,
            output,
        } => snapshot(load_config(config, pages)?, at, &output),
        Commands::Glb {
            config,
            pages,
            page,
            output,
        } => export_page(load_config(config, pages)?, page, &output),
        Commands::Info { config, pages } => info(load_config(config, pages)?),
    }
}

fn load_config(
    path: Option<PathBuf>,
    pages: usize,
) -> Result<BookConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(synthetic_config(pages)),
    }
}

/// A placeholder book: numbered SVG faces, default dimensions.
fn synthetic_config(pages: usize) -> BookConfig {
    let face = |label: &str| {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><text x=\"8\" y=\"24\">{}</text></svg>",
            label
        )
    };

    let mut images = vec![face("front cover"), face("front inner")];
    for i in 0..pages * 2 {
        images.push(face(&format!("face {}", i)));
    }
    images.push(face("back inner"));
    images.push(face("back cover"));

    BookConfig {
        page_images: images,
        ..BookConfig::default()
    }
}

fn simulate(
    config: BookConfig,
    to: usize,
    fps: u32,
    every: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut book = Book::new(config)?;
    book.rasterize_with(&SolidRasterizer);

    println!(
        "Simulating flip to page {} of {} at {} fps...",
        to,
        book.total_pages(),
        fps
    );

    book.set_page(to);
    let dt = 1.0 / fps as f32;
    let mut now = 0.0f64;
    let mut frame = 0u32;

    // Run until the sequencer settles, then let the easing drain
    while !book.is_settled() || frame < fps * 3 {
        now += dt as f64 * 1000.0;
        book.frame(now, dt);
        frame += 1;

        if frame % every == 0 {
            let turning = book
                .pages()
                .iter()
                .filter(|p| p.phase(now) == flipbook_rig::TurnPhase::Turning)
                .count();
            println!(
                "  t={:>6.0}ms current={:>2} requested={:>2} turning={} closed={}",
                now,
                book.current_page(),
                book.requested_page(),
                turning,
                book.book_closed()
            );
        }

        if frame > fps * 60 {
            return Err("simulation failed to settle".into());
        }
    }

    println!(
        "Settled: current={} closed={} after {} frames",
        book.current_page(),
        book.book_closed(),
        frame
    );
    Ok(())
}

fn snapshot(
    config: BookConfig,
    at: usize,
    output: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut book = Book::new(config)?;
    book.rasterize_with(&SolidRasterizer);
    book.set_page(at);

    let dt = 1.0 / 60.0;
    let mut now = 0.0f64;
    for _ in 0..60 * 30 {
        now += dt as f64 * 1000.0;
        book.frame(now, dt);
        if book.is_settled() && now > 3_000.0 {
            break;
        }
    }

    let snapshot = FrameSnapshot::capture(&book, now);
    fs::write(output, serde_json::to_string_pretty(&snapshot)?)?;
    println!(
        "Wrote snapshot at page {} to {:?} ({} pages)",
        book.current_page(),
        output,
        snapshot.pages.len()
    );
    Ok(())
}

fn export_page(
    config: BookConfig,
    page: usize,
    output: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let book = Book::new(config)?;
    let node = book
        .page(page)
        .ok_or_else(|| format!("page {} out of range", page))?;

    let glb = export_skinned_glb(node.plate(), node.chain(), node.skin())?;
    fs::write(output, &glb)?;
    println!("Wrote {} bytes to {:?}", glb.len(), output);
    Ok(())
}

fn info(config: BookConfig) -> Result<(), Box<dyn std::error::Error>> {
    let book = Book::new(config)?;
    let plate = book.pages()[0].plate();

    println!("Pages:         {}", book.total_pages());
    println!(
        "Visible pages: {}",
        book.pages().iter().filter(|p| p.visible).count()
    );
    println!("Segments:      {}", plate.segments());
    println!("Joints/page:   {}", book.pages()[0].chain().len());
    println!("Vertices/page: {}", plate.vertex_count());
    println!("Spine:         {}", book.spine().is_some());
    Ok(())
}
