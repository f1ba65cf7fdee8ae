use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graphics::Color;
use crate::totals::{round2, Totals};

/// Business identity shown in the header, footer and metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Tax registration number; rendered with the "GSTIN" label.
    pub tax_id: String,
    /// Food-business registration number; rendered with the "FSSAI" label.
    pub reg_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
}

/// A logo supplied either as a file path or as raw PNG/JPEG bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Logo {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    /// Table / booking reference.
    pub reference: String,
    /// Number of covers (guests), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covers: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffInfo {
    pub served_by: String,
    pub staff_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// Payment mode label (e.g. "UPI", "Cash"); rendered uppercased.
    pub mode: String,
    /// Payment reference / UTR, if any.
    pub reference: String,
}

/// One billable row. `amount` is always derived from the other numeric
/// fields; it is never edited independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    /// Free-text date label such as "27 Jan" — not a parsed date.
    pub date: String,
    /// Grouping category (meal type).
    pub category: String,
    pub description: String,
    pub qty: f64,
    pub unit_price: f64,
    pub tax_pct: f64,
    pub amount: f64,
}

impl LineItem {
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        qty: f64,
        unit_price: f64,
        tax_pct: f64,
    ) -> Self {
        let mut item = LineItem {
            date: date.into(),
            category: category.into(),
            description: description.into(),
            qty,
            unit_price,
            tax_pct,
            amount: 0.0,
        };
        item.recompute_amount();
        item
    }

    /// Re-derive `amount` after qty / unit_price / tax_pct change:
    /// `round2(qty * unit_price * (1 + tax_pct / 100))`.
    pub fn recompute_amount(&mut self) {
        self.amount = round2(self.qty * self.unit_price * (1.0 + self.tax_pct / 100.0));
    }
}

/// Chrome colors. `accent` drives the divider stripes, section labels and
/// grand-total bar; `header` the table header row; `footer` the footer bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub accent: Color,
    pub header: Color,
    pub footer: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            accent: Color::from_hex(0xE8650A),
            header: Color::from_hex(0x1A1A2E),
            footer: Color::from_hex(0x1A1A2E),
        }
    }
}

/// Fully-resolved input to `generate`. Optional strings render as empty;
/// only `items` and `totals` carry numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceData {
    pub business: BusinessInfo,
    pub invoice_number: String,
    pub invoice_date: String,
    /// Stay / visit period shown in the meta box.
    pub visit_period: String,
    pub customer: CustomerInfo,
    pub staff: StaffInfo,
    pub items: Vec<LineItem>,
    pub totals: Totals,
    pub payment: PaymentInfo,
    pub amount_in_words: String,
    #[serde(default)]
    pub theme: Theme,
}

/// Safe download filename: `{number}_{business}.pdf` with spaces
/// underscored and slashes dashed.
pub fn suggested_filename(data: &InvoiceData) -> String {
    let number = data.invoice_number.replace(' ', "_").replace('/', "-");
    let name = data.business.name.replace(' ', "_").replace('/', "-");
    format!("{}_{}.pdf", number, name)
}

// ---------------------------------------------------
// Display formatting shared by the table and chrome
// ---------------------------------------------------

/// Two-decimal, comma-grouped money string: 9600.5 → "9,600.50".
pub fn format_money(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let grouped = whole
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect::<Vec<_>>()
        .join(",");

    let sign = if negative { "-" } else { "" };
    format!("{}{}.{:02}", sign, grouped, frac)
}

/// Quantity with no trailing zeros: 3.0 → "3", 2.5 → "2.5".
pub fn format_qty(qty: f64) -> String {
    format!("{}", qty)
}

/// Percentage with no trailing zeros, suffixed with `%`.
pub fn format_pct(pct: f64) -> String {
    format!("{}%", pct)
}
