// src/utils/console.rs

//! Console report formatting for the CLI.
//!
//! Diagnostics go through the `log` facade; this module only renders the
//! human-facing reports (headers, indented items, key/value summaries).

use chrono::Local;

fn stamp(tag: &str, message: &str) -> String {
    format!("[{}] [{}] {}", Local::now().format("%H:%M:%S"), tag, message)
}

/// Print a boxed section header.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("{border}");
    println!("  {title}");
    println!("{border}");
}

/// Print a step in a multi-step run.
pub fn step(step_num: usize, total: usize, message: &str) {
    println!("{}", stamp(&format!("STEP {step_num}/{total}"), message));
}

/// Print a success line.
pub fn success(message: &str) {
    println!("{}", stamp("OK", &format!("✓ {message}")));
}

/// Print an indented item.
pub fn sub_item(message: &str) {
    println!("    {message}");
}

/// Print a titled list of key/value pairs.
pub fn summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("{}", stamp("SUMMARY", title));
    let width = items.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (key, value) in items {
        println!("    {key:<width$}  {value}");
    }
}

/// Format a money amount with two decimals.
pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money() {
        assert_eq!(money(12.0), "12.00");
        assert_eq!(money(1234.5), "1234.50");
    }
}
