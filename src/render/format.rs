//! Number and text formatting shared by the HTML and terminal renderers.

/// Format a count with comma thousands separators: `12345` → `"12,345"`.
pub fn group_thousands(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Extra digits inspected to tell an exact tie from a near one.
const TIE_DIGITS: usize = 24;

/// Fixed-point text with `decimals` places.
///
/// Exact ties round away from zero (`2.25` → `"2.3"`, `-2.25` → `"-2.3"`);
/// everything else rounds to nearest. `{:.N}` alone would round ties to even.
pub fn to_fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let digits = format!("{:.*}", decimals + TIE_DIGITS, value.abs());
    let (kept, rest) = digits.split_at(digits.len() - TIE_DIGITS);
    let is_tie = rest.starts_with('5') && rest[1..].bytes().all(|b| b == b'0');
    if !is_tie {
        return format!("{:.*}", decimals, value);
    }

    let magnitude = increment_last_digit(kept.trim_end_matches('.'));
    if value < 0.0 {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

/// `"56.2"` → `"56.3"`, `"9.99"` → `"10.00"`.
fn increment_last_digit(number: &str) -> String {
    let mut chars: Vec<char> = number.chars().collect();
    let mut i = chars.len();
    loop {
        if i == 0 {
            chars.insert(0, '1');
            break;
        }
        i -= 1;
        match chars[i] {
            '9' => chars[i] = '0',
            '.' => {}
            d => {
                chars[i] = char::from(d as u8 + 1);
                break;
            }
        }
    }
    chars.into_iter().collect()
}

/// A `[0, 1]` ratio as a percentage with `decimals` places: `0.8123` → `"81.2%"`.
pub fn ratio_pct(ratio: f64, decimals: usize) -> String {
    format!("{}%", to_fixed(ratio * 100.0, decimals))
}

/// A value already in percent, one decimal place: `4.26` → `"4.3%"`.
pub fn pct1(value: f64) -> String {
    format!("{}%", to_fixed(value, 1))
}

/// A percentage-point value with an explicit sign: `3.21` → `"+3.2%"`.
pub fn signed_pct1(value: f64) -> String {
    let fixed = to_fixed(value, 1);
    if fixed.starts_with('-') {
        format!("{fixed}%")
    } else {
        format!("+{fixed}%")
    }
}

/// Bar width for a ratio, as a CSS percentage without rounding.
pub fn bar_width(ratio: f64) -> String {
    format!("{}%", ratio * 100.0)
}

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// Coarse bucket for a predicted outperformance probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// `p >= 0.7` is High, `0.6 <= p < 0.7` is Medium, anything else Low.
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.7 {
            Self::High
        } else if p >= 0.6 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(12345), "12,345");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_ratio_pct_precision() {
        assert_eq!(ratio_pct(0.8123, 1), "81.2%");
        assert_eq!(ratio_pct(0.04567, 2), "4.57%");
        assert_eq!(ratio_pct(1.0, 1), "100.0%");
        assert_eq!(ratio_pct(0.0, 2), "0.00%");
    }

    #[test]
    fn test_signed_pct() {
        assert_eq!(signed_pct1(3.21), "+3.2%");
        assert_eq!(signed_pct1(-1.04), "-1.0%");
        assert_eq!(pct1(-1.04), "-1.0%");
    }

    #[test]
    fn test_exact_ties_round_away_from_zero() {
        assert_eq!(ratio_pct(0.5625, 1), "56.3%");
        assert_eq!(pct1(2.25), "2.3%");
        assert_eq!(pct1(-2.25), "-2.3%");
        assert_eq!(signed_pct1(2.25), "+2.3%");
        assert_eq!(signed_pct1(-2.25), "-2.3%");
        assert_eq!(ratio_pct(0.03125, 2), "3.13%");
        assert_eq!(to_fixed(9.95, 1), "9.9"); // 9.95 is below the tie as a double
        assert_eq!(to_fixed(9.75, 1), "9.8");
        assert_eq!(to_fixed(99.5, 0), "100");
        assert_eq!(to_fixed(0.5, 0), "1");
    }

    #[test]
    fn test_zero_keeps_a_plus_sign() {
        assert_eq!(signed_pct1(0.0), "+0.0%");
        assert_eq!(signed_pct1(-0.01), "-0.0%");
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(0.75), "75%");
        assert_eq!(bar_width(0.0), "0%");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("BRK.B"), "BRK.B");
        assert_eq!(
            escape_html(r#"<b>"x" & 'y'</b>"#),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(Confidence::from_probability(0.75), Confidence::High);
        assert_eq!(Confidence::from_probability(0.7), Confidence::High);
        assert_eq!(Confidence::from_probability(0.65), Confidence::Medium);
        assert_eq!(Confidence::from_probability(0.6), Confidence::Medium);
        assert_eq!(Confidence::from_probability(0.5), Confidence::Low);
        assert_eq!(Confidence::from_probability(0.59999), Confidence::Low);
    }
}
