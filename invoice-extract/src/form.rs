use invoice_core::{
    amount_in_words, BusinessInfo, CustomerInfo, InvoiceData, LineItem, PaymentInfo, StaffInfo,
    TaxRates, Theme, Totals,
};
use serde::{Deserialize, Serialize};

use crate::client::ExtractedInvoice;

/// Caller-owned editor state: everything the user fills in before asking
/// for a PDF. Handlers take it in and hand it back — no hidden session
/// state, and the rendering core never touches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormState {
    pub business: BusinessInfo,
    pub invoice_number: String,
    pub invoice_date: String,
    pub visit_period: String,
    pub customer: CustomerInfo,
    pub staff: StaffInfo,
    pub items: Vec<LineItem>,
    pub rates: TaxRates,
    pub payment: PaymentInfo,
    pub theme: Theme,
}

impl Default for FormState {
    fn default() -> Self {
        FormState {
            business: BusinessInfo::default(),
            invoice_number: String::new(),
            invoice_date: String::new(),
            visit_period: String::new(),
            customer: CustomerInfo {
                name: "Walk-in Guest".to_string(),
                reference: "TBL-01 / WALK-IN".to_string(),
                covers: Some(2),
            },
            staff: StaffInfo::default(),
            items: Vec::new(),
            rates: TaxRates::default(),
            payment: PaymentInfo {
                mode: "UPI".to_string(),
                reference: String::new(),
            },
            theme: Theme::default(),
        }
    }
}

impl FormState {
    /// The demo order: three days of a small group dining at Dine & Spoon.
    pub fn sample() -> Self {
        let raw: &[(&str, &str, f64, f64, &str)] = &[
            ("27 Jan", "Masala Chai", 3.0, 50.0, "Breakfast"),
            ("27 Jan", "Aloo Paratha (w/ Butter)", 3.0, 110.0, "Breakfast"),
            ("27 Jan", "Poha", 3.0, 90.0, "Breakfast"),
            ("27 Jan", "Fresh Fruit Curd Bowl", 3.0, 80.0, "Breakfast"),
            ("27 Jan", "Dal Tadka", 1.0, 180.0, "Lunch"),
            ("27 Jan", "Paneer Matar Sabji", 1.0, 220.0, "Lunch"),
            ("27 Jan", "Jeera Rice", 2.0, 120.0, "Lunch"),
            ("27 Jan", "Butter Roti", 6.0, 25.0, "Lunch"),
            ("27 Jan", "Sweet Lassi", 3.0, 90.0, "Lunch"),
            ("27 Jan", "Gulab Jamun (2 pcs)", 3.0, 65.0, "Lunch"),
            ("27 Jan", "Paneer Tikka (Starter)", 1.0, 280.0, "Dinner"),
            ("27 Jan", "Paneer Butter Masala", 1.0, 280.0, "Dinner"),
            ("27 Jan", "Dal Makhani", 1.0, 220.0, "Dinner"),
            ("27 Jan", "Butter Naan", 6.0, 45.0, "Dinner"),
            ("27 Jan", "Raita", 1.0, 80.0, "Dinner"),
            ("27 Jan", "Masala Cold Drink", 3.0, 65.0, "Dinner"),
            ("28 Jan", "Hara Bhara Kabab", 1.0, 200.0, "Dinner"),
            ("28 Jan", "Kadai Paneer", 1.0, 260.0, "Dinner"),
            ("28 Jan", "Veg Biryani", 2.0, 200.0, "Dinner"),
            ("28 Jan", "Garlic Naan", 4.0, 50.0, "Dinner"),
            ("28 Jan", "Fresh Lime Soda", 3.0, 60.0, "Dinner"),
            ("29 Jan", "Veg Spring Rolls", 1.0, 180.0, "Dinner"),
            ("29 Jan", "Shahi Paneer", 1.0, 280.0, "Dinner"),
            ("29 Jan", "Veg Manchurian Dry", 1.0, 200.0, "Dinner"),
            ("29 Jan", "Laccha Paratha", 4.0, 50.0, "Dinner"),
            ("29 Jan", "Masala Chaas", 3.0, 55.0, "Dinner"),
        ];
        let items = raw
            .iter()
            .map(|&(date, description, qty, unit_price, category)| {
                LineItem::new(date, category, description, qty, unit_price, 5.0)
            })
            .collect();

        FormState {
            business: BusinessInfo {
                name: "Dine & Spoon".to_string(),
                address: "12 MG Road, Indore, MP 452001".to_string(),
                phone: "+91 98765 43210".to_string(),
                tax_id: "23ABCDE1234F1Z5".to_string(),
                reg_no: "11419850000000".to_string(),
                logo: None,
            },
            invoice_number: "INV-2026-0127".to_string(),
            invoice_date: "29 January 2026".to_string(),
            visit_period: "27 Jan \u{2013} 29 Jan 2026".to_string(),
            customer: CustomerInfo {
                name: "Walk-in Guest".to_string(),
                reference: "TBL-01 / WALK-IN".to_string(),
                covers: Some(3),
            },
            staff: StaffInfo {
                served_by: "Ravi Kumar".to_string(),
                staff_id: "S-11".to_string(),
            },
            items,
            rates: TaxRates::default(),
            payment: PaymentInfo {
                mode: "UPI".to_string(),
                reference: "UTR-20260129-4821".to_string(),
            },
            theme: Theme::default(),
        }
    }

    /// Re-derive every row's amount. Call after any edit to qty,
    /// unit price or GST.
    pub fn refresh_amounts(&mut self) {
        for item in &mut self.items {
            item.recompute_amount();
        }
    }

    /// Merge an extraction result: replace the item rows, patch only the
    /// business/staff fields the model actually returned, and take the
    /// invoice date unless it is the "Today" sentinel.
    pub fn apply(&mut self, extracted: &ExtractedInvoice) {
        self.items = extracted
            .items
            .iter()
            .map(|item| {
                LineItem::new(
                    item.date.clone(),
                    item.category.clone(),
                    item.description.clone(),
                    item.qty,
                    item.unit_price,
                    item.gst_pct,
                )
            })
            .collect();

        let business = &extracted.business;
        if let Some(name) = &business.name {
            self.business.name = name.clone();
        }
        if let Some(address) = &business.address {
            self.business.address = address.clone();
        }
        if let Some(phone) = &business.phone {
            self.business.phone = phone.clone();
        }
        if let Some(tax_id) = &business.tax_id {
            self.business.tax_id = tax_id.clone();
        }
        if let Some(reg_no) = &business.reg_no {
            self.business.reg_no = reg_no.clone();
        }
        if let Some(served_by) = &extracted.staff.served_by {
            self.staff.served_by = served_by.clone();
        }
        if let Some(staff_id) = &extracted.staff.staff_id {
            self.staff.staff_id = staff_id.clone();
        }
        if extracted.invoice_date != "Today" {
            self.invoice_date = extracted.invoice_date.clone();
        }
    }

    /// Resolve the form into the immutable input the renderer consumes:
    /// totals and the amount-in-words line are computed here, and an empty
    /// visit period falls back to the invoice date.
    pub fn to_invoice(&self) -> InvoiceData {
        let totals = Totals::calculate(&self.items, self.rates);
        let visit_period = if self.visit_period.is_empty() {
            self.invoice_date.clone()
        } else {
            self.visit_period.clone()
        };
        InvoiceData {
            business: self.business.clone(),
            invoice_number: self.invoice_number.clone(),
            invoice_date: self.invoice_date.clone(),
            visit_period,
            customer: self.customer.clone(),
            staff: self.staff.clone(),
            items: self.items.clone(),
            amount_in_words: amount_in_words(totals.grand_total),
            totals,
            payment: self.payment.clone(),
            theme: self.theme.clone(),
        }
    }
}
