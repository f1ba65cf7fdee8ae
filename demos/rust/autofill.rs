/// AI autofill — parses a natural-language order into invoice rows, then
/// renders the result.
///
/// Needs an OpenAI-compatible endpoint:
///   export OPENAI_API_KEY=sk-...
///   export OPENAI_BASE_URL=https://api.openai.com/v1   # optional
///   cargo run --example autofill -p invoice-demos -- \
///       "3 guests had paneer tikka, butter naan and sweet lassi"
use invoice_extract::{ChatExtractor, FormState, OrderExtractor};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let description = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "2 guests had dal makhani, 3 butter naans and 2 mango lassis".into());
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    let base_url =
        std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());

    let extractor = ChatExtractor::new(api_key, base_url, "gpt-4o-mini");
    let extracted = match extractor.extract(&description, None) {
        Ok(extracted) => extracted,
        Err(err) => {
            eprintln!("extraction failed: {}", err);
            std::process::exit(1);
        }
    };

    println!("{} item(s) extracted:", extracted.items.len());
    for item in &extracted.items {
        println!(
            "  {} x {} @ {} ({}% GST)",
            item.qty, item.description, item.unit_price, item.gst_pct
        );
    }

    let mut form = FormState::default();
    form.business.name = "Dine & Spoon".to_string();
    form.invoice_number = "INV-AI-001".to_string();
    form.invoice_date = "Today".to_string();
    form.apply(&extracted);

    let invoice = form.to_invoice();
    let bytes = invoice_core::generate(&invoice).expect("render invoice");
    std::fs::create_dir_all("demos/output").expect("create output dir");
    let path = "demos/output/autofill-invoice.pdf";
    std::fs::write(path, &bytes).expect("write pdf");
    println!("Wrote {} ({} bytes)", path, bytes.len());
}
