//! Rupee amounts in Indian-English words.
//!
//! Uses the Indian numbering scale: ones/tens/hundreds, then thousand,
//! lakh (10^5) and crore (10^7). This is a fixed-grammar formatter for
//! invoice amounts, not a general number-to-words library.

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn under_hundred(n: u64) -> String {
    if n < 20 {
        return ONES[n as usize].to_string();
    }
    let tens = TENS[(n / 10) as usize];
    match n % 10 {
        0 => tens.to_string(),
        unit => format!("{} {}", tens, ONES[unit as usize]),
    }
}

fn under_thousand(n: u64) -> String {
    if n < 100 {
        return under_hundred(n);
    }
    let hundreds = format!("{} Hundred", ONES[(n / 100) as usize]);
    match n % 100 {
        0 => hundreds,
        rest => format!("{} {}", hundreds, under_hundred(rest)),
    }
}

fn rupee_words(mut n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }
    let mut parts: Vec<String> = Vec::new();
    if n >= 10_000_000 {
        parts.push(format!("{} Crore", under_thousand(n / 10_000_000)));
        n %= 10_000_000;
    }
    if n >= 100_000 {
        parts.push(format!("{} Lakh", under_hundred(n / 100_000)));
        n %= 100_000;
    }
    if n >= 1000 {
        parts.push(format!("{} Thousand", under_hundred(n / 1000)));
        n %= 1000;
    }
    if n >= 100 {
        parts.push(format!("{} Hundred", ONES[(n / 100) as usize]));
        n %= 100;
    }
    if n > 0 {
        parts.push(under_hundred(n));
    }
    parts.join(" ")
}

/// Convert a non-negative rupee amount to words, e.g.
/// `1234.50` → `"Rupees One Thousand Two Hundred Thirty Four and 50 Paise Only"`.
pub fn amount_in_words(amount: f64) -> String {
    let amount = amount.max(0.0);
    let rupees = amount.trunc() as u64;
    let paise = ((amount - amount.trunc()) * 100.0).round() as u64;

    let mut result = format!("Rupees {}", rupee_words(rupees));
    if paise > 0 {
        result.push_str(&format!(" and {} Paise", paise));
    }
    result.push_str(" Only");
    result
}
