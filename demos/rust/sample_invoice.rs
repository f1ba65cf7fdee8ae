/// Sample invoice — renders the built-in three-day demo order to a PDF.
///
/// Run with:
///   cargo run --example sample_invoice -p invoice-demos
///
/// Output lands at: demos/output/<suggested filename>
use invoice_core::suggested_filename;
use invoice_extract::FormState;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let form = FormState::sample();
    let invoice = form.to_invoice();

    let bytes = invoice_core::generate(&invoice).expect("render invoice");

    std::fs::create_dir_all("demos/output").expect("create output dir");
    let path = format!("demos/output/{}", suggested_filename(&invoice));
    std::fs::write(&path, &bytes).expect("write pdf");

    println!(
        "Wrote {} ({} bytes, grand total Rs. {})",
        path,
        bytes.len(),
        invoice_core::format_money(invoice.totals.grand_total),
    );
}
