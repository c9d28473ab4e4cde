//! End-to-end book animation scenarios on a manual clock.

use flipbook_rig::{
    Book, BookConfig, BookStyle, CoverSide, FrameSnapshot, Rasterizer, TurnPhase,
};

const DT: f32 = 1.0 / 60.0;
const FRAME_MS: f64 = 1000.0 / 60.0;

struct SolidRasterizer;

impl Rasterizer for SolidRasterizer {
    fn rasterize(&self, _markup: &str, width: u32, height: u32) -> flipbook_rig::Result<Vec<u8>> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )?;
        Ok(bytes)
    }
}

struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn rasterize(&self, _markup: &str, _width: u32, _height: u32) -> flipbook_rig::Result<Vec<u8>> {
        Err(flipbook_rig::FlipbookError::Export(
            "rasterizer unavailable".to_string(),
        ))
    }
}

/// 16 inner faces -> 8 image pages + 2 extra slots = 10 pages total.
fn test_book() -> Book {
    let mut images = vec!["<svg>fc</svg>".to_string(), "<svg>fci</svg>".to_string()];
    images.extend((0..16).map(|i| format!("<svg>{}</svg>", i)));
    images.push("<svg>bci</svg>".to_string());
    images.push("<svg>bc</svg>".to_string());

    Book::new(BookConfig {
        page_images: images,
        ..BookConfig::default()
    })
    .unwrap()
}

fn run(book: &mut Book, now: &mut f64, ms: f64) {
    let end = *now + ms;
    while *now < end {
        *now += FRAME_MS;
        book.frame(*now, DT);
    }
}

#[test]
fn flip_front_to_back_cover() {
    let mut book = test_book();
    let mut now = 0.0;
    assert_eq!(book.total_pages(), 10);
    assert!(book.book_closed());

    book.set_page(10);
    run(&mut book, &mut now, 5_000.0);

    assert_eq!(book.current_page(), 10);
    assert!(book.book_closed());
    for page in 0..10 {
        assert!(book.opened(page));
    }
}

#[test]
fn opened_flag_tracks_current_page_every_frame() {
    let mut book = test_book();
    let mut now = 0.0;
    book.set_page(10);

    while !book.is_settled() {
        now += FRAME_MS;
        book.frame(now, DT);
        for page in 0..book.total_pages() {
            assert_eq!(book.opened(page), book.current_page() > page);
        }
    }
}

#[test]
fn redirect_mid_animation_never_finishes_old_target() {
    let mut book = test_book();
    let mut now = 0.0;
    book.set_page(8);

    while book.current_page() != 5 {
        now += FRAME_MS;
        book.frame(now, DT);
    }

    book.set_page(2);
    let mut max_seen = book.current_page();
    while !book.is_settled() {
        now += FRAME_MS;
        book.frame(now, DT);
        max_seen = max_seen.max(book.current_page());
    }
    assert_eq!(book.current_page(), 2);
    assert_eq!(max_seen, 5);
}

#[test]
fn page_turn_transient_rises_and_settles() {
    let mut book = test_book();
    let mut now = 0.0;
    book.set_page(4);
    run(&mut book, &mut now, 5_000.0);
    assert_eq!(book.current_page(), 4);
    assert_eq!(book.pages()[3].phase(now), TurnPhase::SettledOpen);

    // Step to 5: page 4 flips opened and turns
    book.set_page(5);
    while !book.opened(4) {
        now += FRAME_MS;
        book.frame(now, DT);
    }
    assert_eq!(book.pages()[4].phase(now), TurnPhase::Turning);

    run(&mut book, &mut now, 1_000.0);
    assert_eq!(book.pages()[4].phase(now), TurnPhase::SettledOpen);
}

#[test]
fn failed_rasterization_stays_local_to_the_page() {
    let mut book = test_book();
    book.rasterize_with(&FailingRasterizer);
    assert_eq!(book.pending_texture_count(), 0);

    // Every face fell back to the transparent placeholder and the book
    // still animates
    let placeholder = flipbook_rig::TextureData::transparent_placeholder();
    for page in book.pages().iter().filter(|p| p.visible) {
        let front = page.materials.slot(flipbook_rig::PlateFace::Front);
        assert_eq!(front.texture.render_data(), placeholder);
    }

    let mut now = 0.0;
    book.set_page(3);
    run(&mut book, &mut now, 3_000.0);
    assert_eq!(book.current_page(), 3);
}

#[test]
fn successful_rasterization_swaps_in_textures() {
    let mut book = test_book();
    book.rasterize_with(&SolidRasterizer);
    assert_eq!(book.pending_texture_count(), 0);

    for page in book.pages().iter().filter(|p| p.visible) {
        let front = page.materials.slot(flipbook_rig::PlateFace::Front);
        assert!(front.texture.is_ready());
        assert_eq!(front.texture.render_data().width, 512);
    }
}

#[test]
fn covers_and_spine_follow_navigation() {
    let mut book = test_book();
    let mut now = 0.0;

    // Closed at the front: covers flat, spine edge-on
    run(&mut book, &mut now, 3_000.0);
    assert!(book.front_cover().pivot_angle().abs() < 1e-2);
    let spine = book.spine().expect("soft style has a spine");
    assert!((spine.yaw() - std::f32::consts::FRAC_PI_2).abs() < 1e-2);

    // Open in the interior: covers splayed to a right angle
    book.set_page(5);
    run(&mut book, &mut now, 6_000.0);
    assert!((book.front_cover().pivot_angle() - std::f32::consts::FRAC_PI_2).abs() < 1e-2);
    assert!((book.back_cover().pivot_angle() + std::f32::consts::FRAC_PI_2).abs() < 1e-2);
}

#[test]
fn spineless_style_has_no_spine_node() {
    let mut images = vec!["<svg>fc</svg>".to_string(), "<svg>fci</svg>".to_string()];
    images.extend((0..8).map(|i| format!("<svg>{}</svg>", i)));
    images.push("<svg>bci</svg>".to_string());
    images.push("<svg>bc</svg>".to_string());

    let book = Book::new(BookConfig {
        page_images: images,
        style: BookStyle::spineless(),
        ..BookConfig::default()
    })
    .unwrap();
    assert!(book.spine().is_none());
}

#[test]
fn click_navigation_round_trip() {
    let mut book = test_book();
    let mut now = 0.0;

    book.click_page(2);
    assert_eq!(book.requested_page(), 3);
    run(&mut book, &mut now, 3_000.0);

    book.click_cover(CoverSide::Back);
    run(&mut book, &mut now, 5_000.0);
    assert_eq!(book.current_page(), 10);

    book.click_cover(CoverSide::Front);
    run(&mut book, &mut now, 5_000.0);
    assert!(book.book_closed());
    assert_eq!(book.current_page(), 0);
}

#[test]
fn snapshot_serializes_to_json_file() {
    let mut book = test_book();
    let mut now = 0.0;
    book.set_page(5);
    run(&mut book, &mut now, 5_000.0);

    let snapshot = FrameSnapshot::capture(&book, now);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.json");
    std::fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["current_page"], 5);
    assert_eq!(value["total_pages"], 10);
    assert_eq!(value["pages"].as_array().unwrap().len(), 10);
}

#[test]
fn remount_resets_navigation_state() {
    let mut book = test_book();
    let mut now = 0.0;
    book.set_page(7);
    run(&mut book, &mut now, 5_000.0);
    assert_eq!(book.current_page(), 7);

    // Navigation state is ephemeral: a rebuilt book starts over
    let book = test_book();
    assert_eq!(book.current_page(), 0);
    assert!(book.book_closed());
}
