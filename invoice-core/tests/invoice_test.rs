use invoice_core::{
    amount_in_words, generate, generate_with_options, BusinessInfo, CustomerInfo, InvoiceData,
    LineItem, Logo, PaymentInfo, RenderOptions, StaffInfo, TaxRates, Theme, Totals,
};

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn invoice_with(items: Vec<LineItem>) -> InvoiceData {
    let totals = Totals::calculate(&items, TaxRates::default());
    InvoiceData {
        business: BusinessInfo {
            name: "Dine & Spoon".to_string(),
            address: "12 MG Road, Indore".to_string(),
            phone: "+91 98765 43210".to_string(),
            tax_id: "23ABCDE1234F1Z5".to_string(),
            reg_no: "11419850000000".to_string(),
            logo: None,
        },
        invoice_number: "INV-001".to_string(),
        invoice_date: "29 January 2026".to_string(),
        visit_period: "27 Jan \u{2013} 29 Jan 2026".to_string(),
        customer: CustomerInfo {
            name: "Walk-in Guest".to_string(),
            reference: "TBL-01 / WALK-IN".to_string(),
            covers: Some(3),
        },
        staff: StaffInfo {
            served_by: "Ravi".to_string(),
            staff_id: "S-11".to_string(),
        },
        amount_in_words: amount_in_words(totals.grand_total),
        items,
        totals,
        payment: PaymentInfo {
            mode: "UPI".to_string(),
            reference: "UTR-20260129".to_string(),
        },
        theme: Theme::default(),
    }
}

fn render(invoice: &InvoiceData) -> Vec<u8> {
    generate_with_options(invoice, &RenderOptions { compress: false }).expect("generate")
}

fn page_count(bytes: &[u8]) -> usize {
    count(bytes, b"/Type /Page /Parent")
}

/// Every "Page X of Y" stamp found in the output, in draw order.
fn page_stamps(bytes: &[u8]) -> Vec<(usize, usize)> {
    let needle = b"(Page ";
    let mut stamps = Vec::new();
    let mut i = 0;
    while i + needle.len() <= bytes.len() {
        if &bytes[i..i + needle.len()] == needle {
            let tail: String = bytes[i + needle.len()..]
                .iter()
                .take(32)
                .map(|&b| b as char)
                .collect();
            let mut parts = tail.split_whitespace();
            let x = parts.next().and_then(|s| s.parse::<usize>().ok());
            let of = parts.next();
            let y = parts.next().and_then(|s| s.parse::<usize>().ok());
            if let (Some(x), Some("of"), Some(y)) = (x, of, y) {
                stamps.push((x, y));
            }
        }
        i += 1;
    }
    stamps
}

fn dinner_items(n: usize) -> Vec<LineItem> {
    (0..n)
        .map(|i| {
            LineItem::new(
                "27 Jan",
                "Dinner",
                format!("Dish {}", i),
                1.0,
                100.0 + i as f64,
                5.0,
            )
        })
        .collect()
}

const CATEGORIES: [&str; 5] = ["Breakfast", "Lunch", "Dinner", "Snacks", "Beverages"];

fn spread_items(n: usize) -> Vec<LineItem> {
    (0..n)
        .map(|i| {
            LineItem::new(
                format!("{} Jan", 27 + i % 3),
                CATEGORIES[i % CATEGORIES.len()],
                format!("Menu item {}", i),
                1.0 + (i % 3) as f64,
                45.0 + (i % 9) as f64 * 15.0,
                5.0,
            )
        })
        .collect()
}

// -------------------------------------------------------
// Scenario: empty item list
// -------------------------------------------------------

#[test]
fn empty_invoice_is_a_single_page() {
    let invoice = invoice_with(vec![]);
    let bytes = render(&invoice);

    assert_eq!(page_count(&bytes), 1);
    assert_eq!(page_stamps(&bytes), vec![(1, 1)]);
    // Totals are drawn, the item table is not.
    assert!(contains(&bytes, b"(GRAND TOTAL) Tj"));
    assert!(!contains(&bytes, b"(ITEM DESCRIPTION) Tj"));
}

#[test]
fn empty_invoice_still_carries_chrome() {
    let invoice = invoice_with(vec![]);
    let bytes = render(&invoice);

    assert!(contains(&bytes, b"(INVOICE) Tj"));
    assert!(contains(&bytes, b"(BILLED TO) Tj"));
    assert!(contains(&bytes, b"(SERVED BY) Tj"));
    assert!(contains(&bytes, b"(INVOICE NUMBER) Tj"));
    assert!(contains(&bytes, b"(UPI) Tj"));
}

// -------------------------------------------------------
// Scenario: three items, one section
// -------------------------------------------------------

#[test]
fn three_same_key_items_fit_on_page_one() {
    let invoice = invoice_with(dinner_items(3));
    let bytes = render(&invoice);

    assert_eq!(page_count(&bytes), 1);
    assert!(contains(&bytes, b"(Dish 0) Tj"));
    assert!(contains(&bytes, b"(Dish 1) Tj"));
    assert!(contains(&bytes, b"(Dish 2) Tj"));
    // One section label carrying category, date and covers.
    assert!(contains(&bytes, b"DINNER"));
    assert!(contains(&bytes, b"\\(3 Covers\\)"));
}

#[test]
fn date_cell_rendered_once_per_section() {
    let invoice = invoice_with(dinner_items(3));
    let bytes = render(&invoice);
    // The bare date cell appears only on the section's first data row;
    // the other occurrence of the label lives inside the section header.
    assert_eq!(count(&bytes, b"(27 Jan) Tj"), 1);
}

#[test]
fn totals_card_lists_every_charge() {
    let invoice = invoice_with(dinner_items(3));
    let bytes = render(&invoice);

    assert!(contains(&bytes, b"(Subtotal \\(excl. extra tax\\)) Tj"));
    assert!(contains(&bytes, b"(CGST @ 2.5%) Tj"));
    assert!(contains(&bytes, b"(SGST @ 2.5%) Tj"));
    assert!(contains(&bytes, b"(Service Charge @ 5%) Tj"));
    assert!(contains(&bytes, b"(GRAND TOTAL) Tj"));
    assert!(contains(&bytes, b"(Amount in words: Rupees"));
}

// -------------------------------------------------------
// Scenario: 200 items across 5 categories
// -------------------------------------------------------

#[test]
fn large_invoice_spans_multiple_pages() {
    let invoice = invoice_with(spread_items(200));
    let bytes = render(&invoice);

    let pages = page_count(&bytes);
    assert!(pages >= 2, "expected multi-page, got {}", pages);
    // Continuation chrome on pages 2+.
    assert!(contains(&bytes, b"continued"));
    // Spot-check rows from both ends of the table.
    assert!(contains(&bytes, b"(Menu item 0) Tj"));
    assert!(contains(&bytes, b"(Menu item 199) Tj"));
}

#[test]
fn every_page_gets_one_correct_page_stamp() {
    let invoice = invoice_with(spread_items(200));
    let bytes = render(&invoice);

    let pages = page_count(&bytes);
    let mut stamps = page_stamps(&bytes);
    stamps.sort();
    let expected: Vec<(usize, usize)> = (1..=pages).map(|i| (i, pages)).collect();
    assert_eq!(stamps, expected, "final total must appear on every page");
}

#[test]
fn column_header_repeats_on_every_page() {
    let invoice = invoice_with(spread_items(200));
    let bytes = render(&invoice);

    let pages = page_count(&bytes);
    let headers = count(&bytes, b"(ITEM DESCRIPTION) Tj");
    // The totals block may claim a final page with no table on it.
    assert!(headers >= pages - 1, "headers {} pages {}", headers, pages);
    assert!(headers <= pages);
}

// -------------------------------------------------------
// Metadata, compression, logo fallback
// -------------------------------------------------------

#[test]
fn document_metadata_follows_the_invoice() {
    let invoice = invoice_with(dinner_items(2));
    let bytes = render(&invoice);

    // Title: "{business} – Invoice {number}" (en dash in WinAnsi octal).
    assert!(contains(&bytes, b"(Dine & Spoon \\226 Invoice INV-001)"));
    assert!(contains(&bytes, b"/Author (Dine & Spoon)"));
    assert!(contains(&bytes, b"/Subject (Invoice INV-001)"));
}

#[test]
fn default_generate_compresses_content() {
    let invoice = invoice_with(dinner_items(2));
    let bytes = generate(&invoice).expect("generate");
    let output = String::from_utf8_lossy(&bytes);

    assert!(output.contains("/Filter /FlateDecode"));
    assert!(!contains(&bytes, b"(GRAND TOTAL) Tj"));
}

#[test]
fn broken_logo_falls_back_to_initials() {
    let mut invoice = invoice_with(dinner_items(2));
    invoice.business.logo = Some(Logo::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]));
    let bytes = render(&invoice);

    // "Dine & Spoon" → first letters of the first two words.
    assert!(contains(&bytes, b"(D&) Tj"));
    assert!(!contains(&bytes, b"/Im1 Do"));
}

#[test]
fn png_logo_is_embedded() {
    let mut png_bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_bytes, 4, 4);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[128u8; 48]).unwrap();
    }
    let mut invoice = invoice_with(dinner_items(2));
    invoice.business.logo = Some(Logo::Bytes(png_bytes));
    let bytes = render(&invoice);

    assert!(contains(&bytes, b"/Im1 Do"));
    assert!(!contains(&bytes, b"(D&) Tj"));
}

#[test]
fn non_finite_totals_are_refused() {
    let mut invoice = invoice_with(dinner_items(2));
    invoice.totals.grand_total = f64::NAN;
    assert!(generate(&invoice).is_err());
}

#[test]
fn totals_invariant_holds_for_rendered_invoice() {
    let invoice = invoice_with(spread_items(57));
    let t = &invoice.totals;
    assert!((t.grand_total - (t.subtotal + t.cgst + t.sgst + t.service_charge)).abs() < 0.01);
}
