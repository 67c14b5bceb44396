//! Display helpers shared by the CLI views.

/// Two decimals with comma thousands separators: `1234.5` → `1,234.50`.
pub fn format_eco_amount(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac_part}")
}

/// First six and last four characters: `0x1234...abcd`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_amounts() {
        assert_eq!(format_eco_amount(0.0), "0.00");
        assert_eq!(format_eco_amount(12.346), "12.35");
        assert_eq!(format_eco_amount(1234.5), "1,234.50");
        assert_eq!(format_eco_amount(1_234_567.0), "1,234,567.00");
        assert_eq!(format_eco_amount(-1500.0), "-1,500.00");
    }

    #[test]
    fn shortens_addresses() {
        assert_eq!(short_address("0x1eEEEE08C989155cA0AA46A3b37d611622e94c1d"), "0x1eEE...4c1d");
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}
