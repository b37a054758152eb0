// src/utils/text.rs

//! Regex cleanup for scraped text.

use std::sync::LazyLock;

use regex::Regex;

/// Digits with optional `.`/`,` or no-break-space grouping. Plain spaces end the number.
static PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("[0-9]+(?:[.,\u{00A0}\u{202F}][0-9]+)*").expect("valid price regex")
});

/// A number, optionally followed by a scale marker ("/5", "out of 10", "stars").
static RATING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:[.,][0-9]+)?)(\s*(?:/\s*(10|5)\b|out\s+of\s+(10|5)\b|stars?\b|★))?")
        .expect("valid rating regex")
});

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+(?:[.,]\d+)?)\s*(?:-\s*\d+(?:[.,]\d+)?\s*)?(hours?|hrs?|h|minutes?|mins?|m|days?|d)\b",
    )
    .expect("valid duration regex")
});

/// Collapse runs of whitespace and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters, on a char boundary.
/// The ellipsis marking a cut counts towards the limit.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    match max_chars.checked_sub(1).and_then(|keep| s.char_indices().nth(keep)) {
        Some((idx, _)) => format!("{}…", s[..idx].trim_end()),
        None => String::new(),
    }
}

/// Extract the first number from a price label, e.g. "From US$1,234.50".
///
/// A `,` followed by exactly three digits groups thousands. Euro labels
/// also read `.` that way, so "€1.234,50" is 1234.5.
pub fn parse_price(text: &str) -> Option<f64> {
    let token = PRICE.find(text)?.as_str();
    let euro = detect_currency(text) == Some("EUR");
    parse_amount(token, euro)
}

fn parse_amount(token: &str, euro: bool) -> Option<f64> {
    let token: String = token
        .chars()
        .filter(|c| !matches!(c, '\u{00A0}' | '\u{202F}'))
        .collect();

    let decimal = match (token.rfind('.'), token.rfind(',')) {
        (Some(dot), Some(comma)) => Some(dot.max(comma)),
        (Some(dot), None) => decimal_at(&token, '.', dot, !euro),
        (None, Some(comma)) => decimal_at(&token, ',', comma, false),
        (None, None) => None,
    };

    let normalized: String = token
        .char_indices()
        .filter_map(|(i, c)| match c {
            '0'..='9' => Some(c),
            _ if Some(i) == decimal => Some('.'),
            _ => None,
        })
        .collect();
    normalized.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Position of the decimal point when `sep` is the only separator in `token`.
fn decimal_at(token: &str, sep: char, idx: usize, three_digit_fraction: bool) -> Option<usize> {
    let repeated = token.matches(sep).count() > 1;
    let fraction_len = token.len() - idx - 1;
    if repeated || (fraction_len == 3 && !three_digit_fraction) {
        None
    } else {
        Some(idx)
    }
}

/// Detect the currency of a price label.
pub fn detect_currency(text: &str) -> Option<&'static str> {
    let upper = text.to_uppercase();
    let table: [(&[&str], &'static str); 5] = [
        (&["€", "EUR"], "EUR"),
        (&["£", "GBP"], "GBP"),
        (&["¥", "JPY"], "JPY"),
        (&["₹", "INR"], "INR"),
        (&["$", "USD"], "USD"),
    ];
    table
        .iter()
        .find(|(markers, _)| markers.iter().any(|m| upper.contains(m)))
        .map(|(_, code)| *code)
}

/// Extract a rating and normalize it to a 0-5 scale.
///
/// A number with a scale marker wins. Otherwise the first decimal (or a
/// label that is only a number) is used, so review counts such as
/// "1,204 reviews" are skipped. Values in (5, 10] are treated as 10-point
/// scores and halved; anything above 10 is discarded.
pub fn parse_rating(text: &str) -> Option<f32> {
    let whole = text.trim();
    let mut fallback = None;

    for caps in RATING.captures_iter(text) {
        let number = &caps[1];
        if number
            .split_once(',')
            .is_some_and(|(_, rest)| rest.len() == 3)
        {
            continue;
        }
        let Ok(value) = number.replace(',', ".").parse::<f32>() else {
            continue;
        };

        if caps.get(2).is_some() {
            let out_of_ten = caps.get(3).or(caps.get(4)).is_some_and(|m| m.as_str() == "10");
            return normalize_rating(if out_of_ten { value / 2.0 } else { value });
        }
        if fallback.is_none() && (number.contains(['.', ',']) || number == whole) {
            fallback = normalize_rating(value);
        }
    }

    fallback
}

fn normalize_rating(value: f32) -> Option<f32> {
    match value {
        v if (0.0..=5.0).contains(&v) => Some(v),
        v if v <= 10.0 => Some(v / 2.0),
        _ => None,
    }
}

/// Extract a duration and normalize its unit, e.g. "Duration: 2-3 hrs" → "2 hours".
pub fn parse_duration(text: &str) -> Option<String> {
    let caps = DURATION.captures(text)?;
    let amount = caps[1].replace(',', ".");
    let unit = caps[2].to_lowercase();
    let singular = amount == "1";

    let unit = match unit.as_str() {
        u if u.starts_with('h') => {
            if singular {
                "hour"
            } else {
                "hours"
            }
        }
        u if u.starts_with('m') => {
            if singular {
                "minute"
            } else {
                "minutes"
            }
        }
        _ => {
            if singular {
                "day"
            } else {
                "days"
            }
        }
    };
    Some(format!("{amount} {unit}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("From US$1,234.50 per adult"), Some(1234.5));
        assert_eq!(parse_price("€ 89"), Some(89.0));
        assert_eq!(parse_price("Price: 12.99"), Some(12.99));
        assert_eq!(parse_price("Free cancellation"), None);
    }

    #[test]
    fn test_parse_price_separators() {
        // a plain space separates two numbers
        assert_eq!(parse_price("for 2 150 USD"), Some(2.0));
        assert_eq!(parse_price("US$1,250,000"), Some(1_250_000.0));
        assert_eq!(parse_price("2\u{202F}150 €"), Some(2150.0));
        assert_eq!(parse_price("€1.234,50"), Some(1234.5));
        assert_eq!(parse_price("€1.234"), Some(1234.0));
        assert_eq!(parse_price("12,50 EUR"), Some(12.5));
        assert_eq!(parse_price("$1,234"), Some(1234.0));
    }

    #[test]
    fn test_detect_currency() {
        assert_eq!(detect_currency("€ 89"), Some("EUR"));
        assert_eq!(detect_currency("From US$45"), Some("USD"));
        assert_eq!(detect_currency("£12"), Some("GBP"));
        assert_eq!(detect_currency("120"), None);
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4.7 (2,345 reviews)"), Some(4.7));
        assert_eq!(parse_rating("Scored 8.6"), Some(4.3));
        assert_eq!(parse_rating("4,5"), Some(4.5));
        assert_eq!(parse_rating("2345 reviews"), None);
        assert_eq!(parse_rating("no rating"), None);
    }

    #[test]
    fn test_parse_rating_skips_review_counts() {
        assert_eq!(parse_rating("(2,345 reviews)"), None);
        assert_eq!(parse_rating("1,204 reviews 4.6"), Some(4.6));
        assert_eq!(parse_rating("12 reviews"), None);
        assert_eq!(parse_rating("4"), Some(4.0));
        assert_eq!(parse_rating("Rated 4 out of 5"), Some(4.0));
        assert_eq!(parse_rating("312 reviews, 5 stars"), Some(5.0));
        assert_eq!(parse_rating("9.2/10"), Some(4.6));
        assert_eq!(parse_rating("8/10"), Some(4.0));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("Duration: 3 hours"), Some("3 hours".into()));
        assert_eq!(parse_duration("2-3 hrs"), Some("2 hours".into()));
        assert_eq!(parse_duration("45 mins"), Some("45 minutes".into()));
        assert_eq!(parse_duration("1 day"), Some("1 day".into()));
        assert_eq!(parse_duration("Skip the line"), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("ação longa", 4), "açã…");
        assert_eq!(truncate_chars("exact", 5), "exact");
        assert_eq!(truncate_chars("abc", 0), "");

        let long = "a".repeat(400);
        let cut = truncate_chars(&long, 300);
        assert_eq!(cut.chars().count(), 300);
        assert!(cut.ends_with('…'));
    }
}
