//! # invoice-core
//!
//! Renders a structured invoice into a paginated A4 PDF.
//!
//! The pipeline is deliberately one-way: the caller supplies a fully
//! resolved [`InvoiceData`]; the item grouper and table builder turn its
//! rows into a splittable tabular block; the layout engine flows that
//! block across pages around fixed chrome (header, meta box, billing
//! block, totals card, payment stamp, footer); and the document canvas
//! serializes everything to bytes in one shot.
//!
//! ```text
//! InvoiceData
//!     ↓
//! [grouping] → [table]     — sections, styles, split contract
//!     ↓
//! [layout]                 — chrome + pagination + page numbers
//!     ↓
//! [document] → [writer]    — buffered pages → PDF bytes
//! ```
//!
//! Every `generate` call owns its canvas and buffers exclusively; there is
//! no shared mutable state, so concurrent calls from multiple threads are
//! independent by construction.

pub mod document;
mod error;
pub mod fonts;
pub mod graphics;
pub mod grouping;
pub mod images;
pub mod layout;
pub mod model;
pub mod objects;
pub mod table;
pub mod text;
pub mod totals;
pub mod words;
pub mod writer;

pub use document::PdfDocument;
pub use error::RenderError;
pub use fonts::{BuiltinFont, FontMetrics};
pub use graphics::Color;
pub use grouping::{group_items, Section};
pub use images::{ImageFit, ImageId};
pub use layout::{A4_HEIGHT, A4_WIDTH};
pub use model::{
    format_money, format_pct, format_qty, suggested_filename, BusinessInfo, CustomerInfo,
    InvoiceData, LineItem, Logo, PaymentInfo, StaffInfo, Theme,
};
pub use table::{Cell, CellStyle, FitResult, ItemTable, Row, RowKind, Table, TableCursor};
pub use text::{Rect, TextAlign, TextStyle};
pub use totals::{compute_item_amount, round2, TaxRates, Totals};
pub use words::amount_in_words;

/// Points per millimetre.
pub const MM: f64 = 72.0 / 25.4;

/// Rendering knobs beyond the invoice data itself.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// FlateDecode compression of content streams. On by default;
    /// turn off to inspect the raw operators.
    pub compress: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions { compress: true }
    }
}

/// Render `invoice` to a complete PDF byte stream.
///
/// This is the primary entry point. Fails before producing any bytes —
/// callers never see a truncated document. Missing optional strings
/// render as empty; a failed logo decode falls back to the initials
/// circle rather than failing the document.
pub fn generate(invoice: &InvoiceData) -> Result<Vec<u8>, RenderError> {
    generate_with_options(invoice, &RenderOptions::default())
}

/// `generate` with explicit [`RenderOptions`].
pub fn generate_with_options(
    invoice: &InvoiceData,
    options: &RenderOptions,
) -> Result<Vec<u8>, RenderError> {
    validate_numbers(invoice)?;

    let mut doc = PdfDocument::new(Vec::new());
    doc.set_compression(options.compress);
    doc.set_info(
        "Title",
        &format!("{} – Invoice {}", invoice.business.name, invoice.invoice_number),
    );
    doc.set_info("Author", &invoice.business.name);
    doc.set_info("Subject", &format!("Invoice {}", invoice.invoice_number));

    layout::render_invoice(&mut doc, invoice)?;
    doc.end_document()
}

/// The totals drive text the customer pays by; refuse NaN/infinity
/// outright instead of printing them.
fn validate_numbers(invoice: &InvoiceData) -> Result<(), RenderError> {
    let totals = &invoice.totals;
    let checks = [
        (totals.subtotal, "totals.subtotal"),
        (totals.cgst, "totals.cgst"),
        (totals.sgst, "totals.sgst"),
        (totals.service_charge, "totals.service_charge"),
        (totals.grand_total, "totals.grand_total"),
    ];
    for (value, field) in checks {
        if !value.is_finite() {
            return Err(RenderError::NonFinite(field));
        }
    }
    Ok(())
}
