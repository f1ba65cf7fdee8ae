use serde::{Deserialize, Serialize};

use crate::model::LineItem;

/// Round to two decimal places. Applied at every intermediate step of the
/// totals calculation so regenerated invoices are bit-reproducible.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Amount for a single row: base price plus its own GST.
pub fn compute_item_amount(qty: f64, unit_price: f64, tax_pct: f64) -> f64 {
    round2(qty * unit_price * (1.0 + tax_pct / 100.0))
}

/// The overall charge percentages applied on top of the subtotal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaxRates {
    pub cgst_pct: f64,
    pub sgst_pct: f64,
    pub service_charge_pct: f64,
}

impl Default for TaxRates {
    fn default() -> Self {
        TaxRates {
            cgst_pct: 2.5,
            sgst_pct: 2.5,
            service_charge_pct: 5.0,
        }
    }
}

/// Computed invoice totals. The subtotal is tax-inclusive (it already
/// contains each item's own GST); CGST, SGST and the service charge are
/// percentages of that inclusive figure. Intentional, however unusual —
/// changing the base would change every computed total.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub service_charge: f64,
    pub grand_total: f64,
    /// The rates used, carried alongside for display.
    pub cgst_pct: f64,
    pub sgst_pct: f64,
    pub service_charge_pct: f64,
}

impl Totals {
    /// Sum the items and apply the overall charges.
    ///
    /// Rows whose numeric fields are not finite contribute nothing — a
    /// malformed row must not abort an entire invoice.
    pub fn calculate(items: &[LineItem], rates: TaxRates) -> Totals {
        let mut subtotal = 0.0;
        for item in items {
            if !item.qty.is_finite() || !item.unit_price.is_finite() || !item.tax_pct.is_finite() {
                continue;
            }
            subtotal += compute_item_amount(item.qty, item.unit_price, item.tax_pct);
        }
        let subtotal = round2(subtotal);
        let cgst = round2(subtotal * rates.cgst_pct / 100.0);
        let sgst = round2(subtotal * rates.sgst_pct / 100.0);
        let service_charge = round2(subtotal * rates.service_charge_pct / 100.0);
        let grand_total = round2(subtotal + cgst + sgst + service_charge);

        Totals {
            subtotal,
            cgst,
            sgst,
            service_charge,
            grand_total,
            cgst_pct: rates.cgst_pct,
            sgst_pct: rates.sgst_pct,
            service_charge_pct: rates.service_charge_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: f64, unit_price: f64, tax_pct: f64) -> LineItem {
        LineItem::new("27 Jan", "Dinner", "x", qty, unit_price, tax_pct)
    }

    #[test]
    fn single_item_totals() {
        // 1 x 280 @ 5% GST = 294.00 inclusive.
        let totals = Totals::calculate(&[item(1.0, 280.0, 5.0)], TaxRates::default());
        assert!((totals.subtotal - 294.0).abs() < 1e-9);
        assert!((totals.cgst - 7.35).abs() < 1e-9);
        assert!((totals.sgst - 7.35).abs() < 1e-9);
        assert!((totals.service_charge - 14.7).abs() < 1e-9);
        assert!((totals.grand_total - 323.4).abs() < 1e-9);
    }

    #[test]
    fn grand_total_invariant() {
        let items: Vec<LineItem> = (0..40)
            .map(|i| item(1.0 + i as f64 * 0.5, 37.35 + i as f64, 5.0))
            .collect();
        for rates in [
            TaxRates::default(),
            TaxRates { cgst_pct: 9.0, sgst_pct: 9.0, service_charge_pct: 10.0 },
            TaxRates { cgst_pct: 0.0, sgst_pct: 0.0, service_charge_pct: 0.0 },
        ] {
            let t = Totals::calculate(&items, rates);
            let sum = t.subtotal + t.cgst + t.sgst + t.service_charge;
            assert!((t.grand_total - sum).abs() < 0.01);
        }
    }

    #[test]
    fn non_finite_rows_are_skipped() {
        let good = item(2.0, 50.0, 5.0);
        let mut bad = item(1.0, 100.0, 5.0);
        bad.qty = f64::NAN;
        let totals = Totals::calculate(&[good.clone(), bad], TaxRates::default());
        let alone = Totals::calculate(&[good], TaxRates::default());
        assert!((totals.subtotal - alone.subtotal).abs() < 1e-9);
        assert!((totals.grand_total - alone.grand_total).abs() < 1e-9);
    }

    #[test]
    fn empty_items_yield_zero_totals() {
        let totals = Totals::calculate(&[], TaxRates::default());
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.grand_total, 0.0);
        // Rates are still carried for display.
        assert!((totals.service_charge_pct - 5.0).abs() < 1e-9);
    }

    #[test]
    fn rates_are_echoed() {
        let rates = TaxRates { cgst_pct: 6.0, sgst_pct: 6.0, service_charge_pct: 8.0 };
        let totals = Totals::calculate(&[item(1.0, 100.0, 0.0)], rates);
        assert!((totals.cgst_pct - 6.0).abs() < 1e-9);
        assert!((totals.sgst_pct - 6.0).abs() < 1e-9);
        assert!((totals.service_charge_pct - 8.0).abs() < 1e-9);
    }
}
