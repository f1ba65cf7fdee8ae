//! Page layout engine: fixed chrome, table pagination, totals placement.
//!
//! One document shape at one page size. Page 1 carries the full header,
//! meta box and billing block; continuation pages get a compact top bar.
//! Footers are drawn once per page without the page number; a final pass
//! re-opens every page and stamps "Page X of Y" once Y is known.

use std::io::Write;

use tracing::{debug, warn};

use crate::document::PdfDocument;
use crate::error::RenderError;
use crate::fonts::BuiltinFont;
use crate::graphics::{light_border, text_body, text_muted, white, Color};
use crate::images::ImageFit;
use crate::model::{format_money, format_pct, InvoiceData, Logo};
use crate::table::ItemTable;
use crate::text::{Rect, TextStyle};
use crate::MM;

/// A4 page size in points.
pub const A4_WIDTH: f64 = 595.27;
pub const A4_HEIGHT: f64 = 841.89;

const MARGIN: f64 = 18.0 * MM;
/// Dark footer bar height.
const FOOTER_H: f64 = 16.0 * MM;
/// Minimum whitespace kept before every page break.
const MIN_GAP: f64 = 4.0 * MM;
/// Space required for the totals block plus payment stamp.
const TOTALS_BLOCK_H: f64 = 62.0 * MM;
/// Compact top bar on continuation pages.
const CONT_BAR_H: f64 = 14.0 * MM;
/// Pitch of the totals rows.
const TOTALS_ROW_H: f64 = 6.5 * MM;

fn regular(size: f64) -> TextStyle {
    TextStyle::new(BuiltinFont::Helvetica, size)
}

fn bold(size: f64) -> TextStyle {
    TextStyle::new(BuiltinFont::HelveticaBold, size)
}

fn oblique(size: f64) -> TextStyle {
    TextStyle::new(BuiltinFont::HelveticaOblique, size)
}

fn meta_tint() -> Color {
    Color::from_hex(0xF5F5F0)
}

fn footer_muted() -> Color {
    Color::from_hex(0xAAAAAA)
}

fn footer_dim() -> Color {
    Color::from_hex(0x666666)
}

/// Render the whole invoice into `doc`. The caller owns metadata and
/// serialization; this owns pages, chrome and pagination.
pub(crate) fn render_invoice<W: Write>(
    doc: &mut PdfDocument<W>,
    data: &InvoiceData,
) -> Result<(), RenderError> {
    let chrome = Chrome { data };

    doc.begin_page(A4_WIDTH, A4_HEIGHT);
    chrome.draw_header(doc);
    chrome.draw_meta_box(doc);
    let sep_y = chrome.draw_billing_info(doc);

    if data.items.is_empty() {
        let words_y = chrome.draw_totals(doc, sep_y - 30.0 * MM);
        chrome.draw_words_line(doc, words_y);
        chrome.draw_payment_stamp(doc, words_y);
        chrome.draw_footer(doc);
        doc.end_page();
        return chrome.stamp_page_numbers(doc);
    }

    let table = ItemTable::build(&data.items, data.customer.covers, &data.theme);
    let table_x = (A4_WIDTH - table.width()) / 2.0;

    let page1_top = sep_y - 2.0 * MM;
    let page1_avail = page1_top - FOOTER_H - MIN_GAP;
    let cont_top = A4_HEIGHT - CONT_BAR_H - 3.0 * MM;
    let cont_avail = cont_top - FOOTER_H - MIN_GAP;

    let mut from = 0;
    let mut end = table.chunk_end(0, page1_avail);
    let mut bottom = table.draw_chunk(doc, from, end, table_x, page1_top);
    chrome.draw_footer(doc);
    from = end;

    while from < table.row_count() {
        doc.end_page();
        doc.begin_page(A4_WIDTH, A4_HEIGHT);
        let top = chrome.draw_continuation_header(doc);
        end = table.chunk_end(from, cont_avail);
        bottom = table.draw_chunk(doc, from, end, table_x, top);
        chrome.draw_footer(doc);
        from = end;
    }

    // Not enough room left under the last chunk: give the totals block a
    // page of its own.
    if bottom - FOOTER_H < TOTALS_BLOCK_H {
        doc.end_page();
        doc.begin_page(A4_WIDTH, A4_HEIGHT);
        chrome.draw_continuation_header(doc);
        chrome.draw_footer(doc);
        bottom = cont_top;
    }

    let words_y = chrome.draw_totals(doc, bottom - 6.0 * MM);
    chrome.draw_words_line(doc, words_y);
    chrome.draw_payment_stamp(doc, words_y);
    doc.end_page();

    debug!(
        pages = doc.page_count(),
        body_rows = table.row_count(),
        "invoice paginated"
    );
    chrome.stamp_page_numbers(doc)
}

struct Chrome<'a> {
    data: &'a InvoiceData,
}

impl<'a> Chrome<'a> {
    fn accent(&self) -> Color {
        self.data.theme.accent
    }

    fn dark(&self) -> Color {
        self.data.theme.header
    }

    /// White header band: logo (or initials circle), business identity,
    /// right-aligned INVOICE label, accent divider stripe.
    fn draw_header<W: Write>(&self, doc: &mut PdfDocument<W>) {
        let business = &self.data.business;

        doc.set_fill_color(white());
        doc.rect(0.0, A4_HEIGHT - 52.0 * MM, A4_WIDTH, 52.0 * MM);
        doc.fill();

        let cx = MARGIN + 12.0 * MM;
        let cy = A4_HEIGHT - 26.0 * MM;
        let mut have_logo = false;
        if let Some(logo) = &business.logo {
            let loaded = match logo {
                Logo::Path(path) => doc.load_image_file(path),
                Logo::Bytes(bytes) => doc.load_image_bytes(bytes.clone()),
            };
            match loaded {
                Ok(image) => {
                    let size = 46.0 * MM;
                    let rect = Rect {
                        x: cx - size / 2.0,
                        y: cy + size / 2.0,
                        width: size,
                        height: size,
                    };
                    doc.place_image(image, &rect, ImageFit::Fit);
                    have_logo = true;
                }
                Err(err) => {
                    warn!(error = %err, "logo unusable, falling back to initials circle");
                }
            }
        }
        if !have_logo {
            doc.set_fill_color(self.accent());
            doc.circle(cx, cy, 11.0 * MM);
            doc.fill();
            let initials: String = business
                .name
                .split_whitespace()
                .take(2)
                .filter_map(|word| word.chars().next())
                .flat_map(char::to_uppercase)
                .collect();
            doc.set_fill_color(white());
            doc.place_text_centered(&initials, cx, cy - 1.5 * MM, &bold(10.0));
        }

        doc.set_fill_color(self.dark());
        doc.place_text_styled(&business.name, MARGIN + 26.0 * MM, A4_HEIGHT - 19.0 * MM, &bold(18.0));

        doc.set_fill_color(text_muted());
        doc.place_text_styled(&business.address, MARGIN + 26.0 * MM, A4_HEIGHT - 27.0 * MM, &regular(8.5));
        doc.place_text_styled(
            &format!(
                "Ph: {}  |  GSTIN: {}  |  FSSAI: {}",
                business.phone, business.tax_id, business.reg_no
            ),
            MARGIN + 26.0 * MM,
            A4_HEIGHT - 34.0 * MM,
            &regular(8.5),
        );

        doc.set_fill_color(self.accent());
        doc.place_text_right("INVOICE", A4_WIDTH - MARGIN, A4_HEIGHT - 20.0 * MM, &bold(22.0));
        doc.set_fill_color(text_muted());
        doc.place_text_right(
            "Tax Invoice (GSTIN)",
            A4_WIDTH - MARGIN,
            A4_HEIGHT - 28.0 * MM,
            &regular(8.5),
        );

        doc.set_fill_color(self.accent());
        doc.rect(0.0, A4_HEIGHT - 54.0 * MM, A4_WIDTH, 2.0 * MM);
        doc.fill();
    }

    /// Tinted rounded box with invoice number, date and visit period.
    fn draw_meta_box<W: Write>(&self, doc: &mut PdfDocument<W>) {
        let box_y = A4_HEIGHT - 78.0 * MM;
        let inner = A4_WIDTH - 2.0 * MARGIN;

        doc.set_fill_color(meta_tint());
        doc.round_rect(MARGIN, box_y, inner, 21.0 * MM, 3.0);
        doc.fill();

        let col1 = MARGIN + 5.0 * MM;
        let col2 = MARGIN + inner * 0.33;
        let col3 = MARGIN + inner * 0.62;
        self.meta_pair(doc, col1, box_y, "INVOICE NUMBER", &self.data.invoice_number);
        self.meta_pair(doc, col2, box_y, "INVOICE DATE", &self.data.invoice_date);
        self.meta_pair(doc, col3, box_y, "STAY / VISIT PERIOD", &self.data.visit_period);
    }

    fn meta_pair<W: Write>(&self, doc: &mut PdfDocument<W>, x: f64, y: f64, label: &str, value: &str) {
        doc.set_fill_color(text_muted());
        doc.place_text_styled(label, x, y + 5.0 * MM, &regular(7.5));
        doc.set_fill_color(text_body());
        doc.place_text_styled(value, x, y + 1.5 * MM, &bold(9.0));
    }

    /// Billed-to / served-by block. Returns the separator line's y — the
    /// anchor for table placement.
    fn draw_billing_info<W: Write>(&self, doc: &mut PdfDocument<W>) -> f64 {
        let bill_y = A4_HEIGHT - 103.0 * MM;
        let customer = &self.data.customer;
        let staff = &self.data.staff;

        doc.set_fill_color(self.dark());
        doc.place_text_styled("BILLED TO", MARGIN, bill_y + 3.0 * MM, &bold(9.0));
        doc.set_fill_color(text_body());
        let mut guest = customer.name.clone();
        if let Some(covers) = customer.covers {
            guest.push_str(&format!(" ({} Covers)", covers));
        }
        doc.place_text_styled(&guest, MARGIN, bill_y - 2.0 * MM, &regular(9.0));
        doc.set_fill_color(text_muted());
        doc.place_text_styled(
            &format!("Table / Booking Ref: {}", customer.reference),
            MARGIN,
            bill_y - 7.0 * MM,
            &regular(8.5),
        );

        doc.set_fill_color(self.dark());
        doc.place_text_right("SERVED BY", A4_WIDTH - MARGIN, bill_y + 3.0 * MM, &bold(9.0));
        doc.set_fill_color(text_body());
        let served = if staff.staff_id.is_empty() {
            staff.served_by.clone()
        } else {
            format!("{} (Staff ID: {})", staff.served_by, staff.staff_id)
        };
        doc.place_text_right(&served, A4_WIDTH - MARGIN, bill_y - 2.0 * MM, &regular(9.0));
        doc.set_fill_color(text_muted());
        doc.place_text_right(
            "Manager Approved: Yes",
            A4_WIDTH - MARGIN,
            bill_y - 7.0 * MM,
            &regular(8.5),
        );

        let sep_y = A4_HEIGHT - 115.0 * MM;
        doc.set_stroke_color(light_border());
        doc.set_line_width(0.5);
        doc.move_to(MARGIN, sep_y);
        doc.line_to(A4_WIDTH - MARGIN, sep_y);
        doc.stroke();
        sep_y
    }

    /// Compact top bar for pages 2+. Returns the y where the table resumes.
    fn draw_continuation_header<W: Write>(&self, doc: &mut PdfDocument<W>) -> f64 {
        doc.set_fill_color(self.dark());
        doc.rect(0.0, A4_HEIGHT - CONT_BAR_H, A4_WIDTH, CONT_BAR_H);
        doc.fill();

        let text_y = A4_HEIGHT - CONT_BAR_H + 4.0 * MM;
        doc.set_fill_color(white());
        doc.place_text_styled(&self.data.business.name, MARGIN, text_y, &bold(9.0));
        doc.set_fill_color(footer_muted());
        doc.place_text_right(
            &format!("Invoice {}  (continued)", self.data.invoice_number),
            A4_WIDTH - MARGIN,
            text_y,
            &regular(8.0),
        );

        doc.set_fill_color(self.accent());
        doc.rect(0.0, A4_HEIGHT - CONT_BAR_H - 1.0 * MM, A4_WIDTH, 1.0 * MM);
        doc.fill();

        A4_HEIGHT - CONT_BAR_H - 3.0 * MM
    }

    /// Dark footer bar. The page-number line is stamped separately once
    /// the total page count is known.
    fn draw_footer<W: Write>(&self, doc: &mut PdfDocument<W>) {
        let business = &self.data.business;
        let host = if business.name.is_empty() { "us" } else { &business.name };
        let lines = [
            format!("Thank you for dining at {}! We hope to see you again soon.", host),
            "All prices are inclusive of applicable taxes as listed. Service charge as per invoice."
                .to_string(),
            format!("GSTIN: {}  |  Subject to local jurisdiction.", business.tax_id),
            "This is a computer-generated invoice and does not require a physical signature."
                .to_string(),
        ];

        doc.set_fill_color(self.data.theme.footer);
        doc.rect(0.0, 0.0, A4_WIDTH, FOOTER_H);
        doc.fill();
        doc.set_fill_color(self.accent());
        doc.rect(0.0, 15.5 * MM, A4_WIDTH, 0.5 * MM);
        doc.fill();

        for (i, line) in lines.iter().enumerate() {
            doc.set_fill_color(if i == 0 { white() } else { footer_muted() });
            let style = if i == 0 { bold(8.0) } else { regular(7.0) };
            doc.place_text_centered(line, A4_WIDTH / 2.0, 12.0 * MM - i as f64 * 3.5 * MM, &style);
        }
    }

    /// Overlay "Page X of Y | business" on every page. Runs after
    /// pagination so Y is final — no provisional totals ever appear.
    fn stamp_page_numbers<W: Write>(&self, doc: &mut PdfDocument<W>) -> Result<(), RenderError> {
        let total = doc.page_count();
        for page in 1..=total {
            doc.open_page(page)?;
            doc.set_fill_color(footer_dim());
            doc.place_text_right(
                &format!("Page {} of {}  |  {}", page, total, self.data.business.name),
                A4_WIDTH - MARGIN,
                3.0 * MM,
                &regular(7.0),
            );
            doc.end_page();
        }
        Ok(())
    }

    /// Right-aligned totals card. Returns the y for the words line below.
    fn draw_totals<W: Write>(&self, doc: &mut PdfDocument<W>, tot_y: f64) -> f64 {
        let totals = &self.data.totals;
        let box_right = A4_WIDTH - MARGIN;
        let box_left = A4_WIDTH - MARGIN - 80.0 * MM;

        let row = |doc: &mut PdfDocument<W>, y: f64, label: String, value: String| {
            doc.set_fill_color(text_body());
            doc.place_text_styled(&label, box_left + 2.0 * MM, y + 1.5 * MM, &regular(9.0));
            doc.place_text_right(&value, box_right - 2.0 * MM, y + 1.5 * MM, &regular(9.0));
        };

        row(
            doc,
            tot_y,
            "Subtotal (excl. extra tax)".to_string(),
            format!("Rs. {}", format_money(totals.subtotal)),
        );
        row(
            doc,
            tot_y - TOTALS_ROW_H,
            format!("CGST @ {}", format_pct(totals.cgst_pct)),
            format!("Rs. {}", format_money(totals.cgst)),
        );
        row(
            doc,
            tot_y - 2.0 * TOTALS_ROW_H,
            format!("SGST @ {}", format_pct(totals.sgst_pct)),
            format!("Rs. {}", format_money(totals.sgst)),
        );

        doc.set_stroke_color(light_border());
        doc.set_line_width(0.4);
        let rule_y = tot_y - 3.0 * TOTALS_ROW_H + 5.0 * MM;
        doc.move_to(box_left, rule_y);
        doc.line_to(box_right, rule_y);
        doc.stroke();

        row(
            doc,
            tot_y - 3.0 * TOTALS_ROW_H,
            format!("Service Charge @ {}", format_pct(totals.service_charge_pct)),
            format!("Rs. {}", format_money(totals.service_charge)),
        );

        // Inverted grand-total bar.
        let bar_bottom = tot_y - 4.0 * TOTALS_ROW_H - 2.0 * MM;
        let bar_height = TOTALS_ROW_H + 2.0 * MM;
        doc.set_fill_color(self.accent());
        doc.rect(box_left - 2.0, bar_bottom, box_right - box_left + 4.0, bar_height);
        doc.fill();

        doc.set_fill_color(white());
        let text_y = bar_bottom + (bar_height - 3.0 * MM) / 2.0;
        doc.place_text_styled("GRAND TOTAL", box_left + 2.0 * MM, text_y, &bold(11.0));
        doc.place_text_right(
            &format!("Rs. {}", format_money(totals.grand_total)),
            box_right - 2.0 * MM,
            text_y,
            &bold(11.0),
        );

        bar_bottom - 5.0 * MM
    }

    fn draw_words_line<W: Write>(&self, doc: &mut PdfDocument<W>, words_y: f64) {
        doc.set_fill_color(text_muted());
        doc.place_text_styled(
            &format!("Amount in words: {}", self.data.amount_in_words),
            MARGIN,
            words_y,
            &oblique(8.0),
        );
    }

    /// Bordered rounded stamp with the payment mode and optional reference.
    fn draw_payment_stamp<W: Write>(&self, doc: &mut PdfDocument<W>, words_y: f64) {
        let payment = &self.data.payment;
        let stamp_y = words_y - 1.5 * TOTALS_ROW_H;

        doc.set_fill_color(white());
        doc.round_rect(MARGIN, stamp_y - 4.0 * MM, 80.0 * MM, 10.0 * MM, 2.0);
        doc.fill();
        doc.set_stroke_color(light_border());
        doc.set_line_width(0.8);
        doc.round_rect(MARGIN, stamp_y - 4.0 * MM, 80.0 * MM, 10.0 * MM, 2.0);
        doc.stroke();

        doc.set_fill_color(text_body());
        doc.place_text_styled(&payment.mode.to_uppercase(), MARGIN + 3.0 * MM, stamp_y, &bold(9.0));
        if !payment.reference.is_empty() {
            doc.place_text_styled(
                &format!("|  Ref: {}", payment.reference),
                MARGIN + 18.0 * MM,
                stamp_y,
                &regular(8.0),
            );
        }
    }
}
