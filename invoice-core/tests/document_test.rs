use invoice_core::{BuiltinFont, Color, ImageFit, PdfDocument, Rect, RenderError, TextStyle};

/// Check whether a byte pattern exists in the buffer.
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn bold(size: f64) -> TextStyle {
    TextStyle::new(BuiltinFont::HelveticaBold, size)
}

// -------------------------------------------------------
// Document structure
// -------------------------------------------------------

#[test]
fn minimal_document_is_valid_pdf() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.set_info("Creator", "document-test");
    doc.begin_page(595.27, 841.89);
    doc.place_text("Hello", 72.0, 720.0);
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    assert!(output.starts_with("%PDF-1.7"));
    assert!(output.ends_with("%%EOF\n"));
    assert!(output.contains("/Type /Catalog"));
    assert!(output.contains("/Type /Pages"));
    assert!(output.contains("/Count 1"));
    assert!(output.contains("(Hello) Tj"));
    assert!(output.contains("(document-test)"));
    assert!(output.contains("startxref"));
}

#[test]
fn media_box_carries_page_size() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(595.27, 841.89);
    let bytes = doc.end_document().unwrap();
    assert!(contains(&bytes, b"/MediaBox [0 0 595.27 841.89]"));
}

#[test]
fn begin_page_auto_closes_previous_page() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.begin_page(612.0, 792.0);
    doc.end_page();
    let bytes = doc.end_document().unwrap();
    assert!(contains(&bytes, b"/Count 2"));
}

#[test]
fn fonts_declared_with_winansi_encoding() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.place_text_styled("Bold", 72.0, 700.0, &bold(10.0));
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    assert!(output.contains("/BaseFont /Helvetica-Bold"));
    assert!(output.contains("/Encoding /WinAnsiEncoding"));
    assert!(output.contains("/F2 10 Tf"));
}

#[test]
fn only_used_fonts_are_declared() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.place_text("regular only", 72.0, 700.0);
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    assert!(output.contains("/BaseFont /Helvetica"));
    assert!(!output.contains("/BaseFont /Helvetica-Bold"));
}

// -------------------------------------------------------
// Text placement
// -------------------------------------------------------

#[test]
fn right_aligned_text_lands_left_of_anchor() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.place_text_right("INVOICE", 540.0, 700.0, &bold(22.0));
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    // 7 characters of 22pt Helvetica-Bold are well over 60pt wide, so the
    // emitted x must be clearly left of the anchor.
    let td_line = output
        .lines()
        .find(|l| l.ends_with(" Td"))
        .expect("Td operator");
    let x: f64 = td_line.split_whitespace().next().unwrap().parse().unwrap();
    assert!(x < 480.0, "x = {}", x);
    assert!(output.contains("(INVOICE) Tj"));
}

#[test]
fn non_ascii_text_uses_octal_escapes() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.place_text("A \u{2014} B", 72.0, 700.0);
    let bytes = doc.end_document().unwrap();
    assert!(contains(&bytes, b"(A \\227 B) Tj"));
}

// -------------------------------------------------------
// Graphics operators
// -------------------------------------------------------

#[test]
fn stroke_and_fill_operators() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.save_state()
        .set_stroke_color(Color::rgb(1.0, 0.0, 0.0))
        .set_line_width(2.0)
        .move_to(10.0, 10.0)
        .line_to(100.0, 100.0)
        .stroke()
        .restore_state();
    doc.set_fill_color(Color::gray(0.9));
    doc.rect(72.0, 72.0, 100.0, 50.0);
    doc.fill();
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    assert!(output.contains("q\n"));
    assert!(output.contains("1 0 0 RG\n"));
    assert!(output.contains("2 w\n"));
    assert!(output.contains("10 10 m\n"));
    assert!(output.contains("100 100 l\n"));
    assert!(output.contains("S\n"));
    assert!(output.contains("Q\n"));
    assert!(output.contains("0.9 0.9 0.9 rg\n"));
    assert!(output.contains("72 72 100 50 re\n"));
    assert!(output.contains("f\n"));
}

#[test]
fn circle_and_round_rect_emit_bezier_curves() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.circle(100.0, 100.0, 30.0);
    doc.fill();
    doc.round_rect(200.0, 200.0, 120.0, 40.0, 3.0);
    doc.stroke();
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    // Four curves each for the circle and the rounded corners.
    assert_eq!(output.matches(" c\n").count(), 8);
}

// -------------------------------------------------------
// Compression
// -------------------------------------------------------

#[test]
fn compressed_streams_declare_flatedecode() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.set_compression(true);
    doc.begin_page(612.0, 792.0);
    doc.place_text("compress me", 72.0, 700.0);
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    assert!(output.contains("/Filter /FlateDecode"));
    assert!(!contains(&bytes, b"(compress me) Tj"));
}

#[test]
fn uncompressed_streams_have_no_filter() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.place_text("raw", 72.0, 700.0);
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    assert!(!output.contains("FlateDecode"));
    assert!(output.contains("(raw) Tj"));
}

// -------------------------------------------------------
// page_count / open_page
// -------------------------------------------------------

#[test]
fn page_count_counts_completed_pages_only() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    assert_eq!(doc.page_count(), 0);
    doc.begin_page(612.0, 792.0);
    assert_eq!(doc.page_count(), 0);
    doc.end_page();
    assert_eq!(doc.page_count(), 1);
    doc.begin_page(612.0, 792.0);
    doc.end_page();
    assert_eq!(doc.page_count(), 2);
}

#[test]
fn open_page_rejects_zero_and_out_of_range() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    assert!(matches!(doc.open_page(1), Err(RenderError::PageOutOfRange { .. })));
    doc.begin_page(612.0, 792.0);
    doc.end_page();
    assert!(doc.open_page(0).is_err());
    assert!(doc.open_page(2).is_err());
    assert!(doc.open_page(1).is_ok());
}

#[test]
fn open_page_does_not_change_page_count() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.end_page();
    doc.open_page(1).unwrap();
    doc.place_text("overlay", 72.0, 36.0);
    doc.end_page();
    assert_eq!(doc.page_count(), 1);
}

#[test]
fn open_page_overlay_becomes_contents_array() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.place_text("Main content", 72.0, 700.0);
    doc.end_page();

    doc.open_page(1).unwrap();
    doc.place_text("Page 1 of 1", 72.0, 36.0);
    doc.end_page();

    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(output.contains("(Main content) Tj"));
    assert!(output.contains("(Page 1 of 1) Tj"));
    assert!(output.contains("/Contents ["));
}

#[test]
fn empty_overlay_leaves_single_content_stream() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    doc.place_text("body", 72.0, 700.0);
    doc.end_page();
    doc.open_page(1).unwrap();
    doc.end_page();
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(!output.contains("/Contents ["));
}

// -------------------------------------------------------
// Images
// -------------------------------------------------------

/// Minimal JPEG: SOI, SOF0 declaring 1x2 px / 3 components, EOI.
/// Only the SOF scan reads it — pixel data is never decoded.
const TEST_JPEG: [u8; 23] = [
    0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x02, 0x00, 0x01, 0x03, 0x01, 0x22, 0x00,
    0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xD9,
];

fn make_test_png(color: png::ColorType, pixel: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut data, 2, 2);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        let mut pixels = Vec::new();
        for _ in 0..4 {
            pixels.extend_from_slice(pixel);
        }
        writer.write_image_data(&pixels).unwrap();
    }
    data
}

#[test]
fn jpeg_embeds_with_dctdecode() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    let img = doc.load_image_bytes(TEST_JPEG.to_vec()).unwrap();
    let rect = Rect { x: 72.0, y: 720.0, width: 100.0, height: 100.0 };
    doc.place_image(img, &rect, ImageFit::Fit);
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    assert!(output.contains("/Subtype /Image"));
    assert!(output.contains("/Filter /DCTDecode"));
    assert!(output.contains("/Im1 Do"));
    assert!(output.contains("/XObject"));
}

#[test]
fn rgba_png_gets_smask() {
    let data = make_test_png(png::ColorType::Rgba, &[200, 40, 10, 128]);
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    let img = doc.load_image_bytes(data).unwrap();
    let rect = Rect { x: 72.0, y: 720.0, width: 50.0, height: 50.0 };
    doc.place_image(img, &rect, ImageFit::Fit);
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    assert!(output.contains("/SMask"));
    assert!(output.contains("/ColorSpace /DeviceRGB"));
    assert!(output.contains("/ColorSpace /DeviceGray"));
}

#[test]
fn rgb_png_embeds_without_smask() {
    let data = make_test_png(png::ColorType::Rgb, &[10, 20, 30]);
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    let img = doc.load_image_bytes(data).unwrap();
    let rect = Rect { x: 72.0, y: 720.0, width: 50.0, height: 50.0 };
    doc.place_image(img, &rect, ImageFit::Stretch);
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    assert!(output.contains("/Subtype /Image"));
    assert!(!output.contains("/SMask"));
}

#[test]
fn garbage_image_bytes_are_rejected() {
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.begin_page(612.0, 792.0);
    let result = doc.load_image_bytes(vec![0x00, 0x01, 0x02, 0x03]);
    assert!(matches!(result, Err(RenderError::Image(_))));
}

#[test]
fn png_image_data_flate_compressed_when_enabled() {
    let data = make_test_png(png::ColorType::Rgb, &[10, 20, 30]);
    let mut doc = PdfDocument::new(Vec::<u8>::new());
    doc.set_compression(true);
    doc.begin_page(612.0, 792.0);
    let img = doc.load_image_bytes(data).unwrap();
    let rect = Rect { x: 72.0, y: 720.0, width: 50.0, height: 50.0 };
    doc.place_image(img, &rect, ImageFit::Fit);
    let bytes = doc.end_document().unwrap();
    let output = String::from_utf8_lossy(&bytes);

    assert!(output.contains("/Filter /FlateDecode"));
}
