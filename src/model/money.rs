/// Format a money amount with two decimal places and thousands separators
pub fn format_money(value: f64, currency_symbol: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let rounded = format!("{:.2}", value.abs());
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };

    format!("{}{}{}.{}", sign, currency_symbol, group_digits(whole), frac)
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}
