//! Number formatting shared by every text the engine produces.
//!
//! Probabilities are stored as fractions everywhere and converted to
//! percentages only here, exactly once.

/// Fraction to percentage text, e.g. `0.1234` -> `"12.34%"`
pub fn pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Currency amount with thousands separators, e.g. `-1234.5` -> `"-€1,234.50"`
pub fn eur(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}€{}.{}", sign, grouped, frac_part)
}

pub fn ratio(value: f64) -> String {
    format!("{:.2}", value)
}
