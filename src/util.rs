// Utility helpers for parsing and number formatting.
//
// Form fields and CSV cells arrive as loosely-typed text. Everything that
// turns such text into numbers lives here so the calculator can work on
// plain `f64`s.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64`.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Reads the longest leading number and ignores the rest, so
///   `"1000000 m3"` is 1000000 and `"1,5"` is 1.
/// - Returns `None` when no leading number exists or it is not finite.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    let end = numeric_prefix_len(s);
    if end == 0 {
        return None;
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Byte length of the leading `[+-]digits[.digits][(e|E)[+-]digits]` run.
/// An exponent without digits is not part of the number.
fn numeric_prefix_len(s: &str) -> usize {
    let b = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = usize::from(matches!(b.first(), Some(b'+' | b'-')));
    let int_end = digits_from(i);
    let mut has_digits = int_end > i;
    i = int_end;
    if b.get(i) == Some(&b'.') {
        let frac_end = digits_from(i + 1);
        if has_digits || frac_end > i + 1 {
            has_digits = true;
            i = frac_end;
        }
    }
    if !has_digits {
        return 0;
    }
    if matches!(b.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            i = exp_end;
        }
    }
    i
}

/// Parse a count, truncating any fractional part (`"1200.7"` -> 1200).
pub fn parse_count_safe(s: Option<&str>) -> Option<i64> {
    parse_f64_safe(s).map(|v| v.trunc() as i64)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with `,` thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Render a Rupiah amount with the short Indonesian scale suffixes
/// (`Jt` = juta, `M` = miliar, `T` = triliun).
pub fn format_rupiah(n: f64) -> String {
    let abs = n.abs();
    let sign = if n < 0.0 { "-" } else { "" };
    if abs >= 1e12 {
        format!("Rp {}{:.2} T", sign, abs / 1e12)
    } else if abs >= 1e9 {
        format!("Rp {}{:.2} M", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("Rp {}{:.2} Jt", sign, abs / 1e6)
    } else {
        format!("Rp {}", format_number(n, 0))
    }
}
