//! Number format standardization
//!
//! Raw workbook format strings come in locale- and accounting-flavoured
//! variants. Numeric formats are reduced to plain `#,##0`-style forms with
//! their decimal count preserved; non-numeric formats (dates, times) have no
//! standard form and are omitted from the output.

/// Canonical monetary format
pub const FMT_MONEY: &str = "#,##0.00";
/// Canonical integer-with-thousands format
pub const FMT_THOUSANDS: &str = "#,##0";
/// Canonical unit price format (seven decimals)
pub const FMT_UNIT_PRICE: &str = "#,##0.0000000";

/// Reduce a raw number format string to its canonical form.
///
/// Idempotent: feeding a canonical string back returns it unchanged.
pub fn standardize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "General" {
        return String::new();
    }

    // Text and percentage formats pass through untouched
    if trimmed == "@" || trimmed.contains('%') {
        return trimmed.to_string();
    }

    // Already canonical
    if trimmed == FMT_MONEY || trimmed == FMT_THOUSANDS || trimmed == FMT_UNIT_PRICE {
        return trimmed.to_string();
    }

    // Accounting / currency variants like `_-* #,##0.00_-;-* #,##0.00_-;…`
    // reduce to the plain numeric form with the same decimal count
    if trimmed.contains("_-") || trimmed.contains("_ ") || trimmed.contains('*') {
        return numeric_with_decimals(decimal_places(trimmed));
    }

    match decimal_places(trimmed) {
        0 if is_numeric_shape(trimmed) => FMT_THOUSANDS.to_string(),
        // Dates, times and other literal formats carry no standard form;
        // the column style is omitted rather than coerced to an integer
        0 => String::new(),
        n => numeric_with_decimals(n),
    }
}

fn numeric_with_decimals(places: usize) -> String {
    if places == 0 {
        return FMT_THOUSANDS.to_string();
    }
    format!("#,##0.{}", "0".repeat(places))
}

/// Digit placeholders and separators only; a letter anywhere means the
/// format is a date/time or literal pattern
fn is_numeric_shape(fmt: &str) -> bool {
    !fmt.is_empty()
        && fmt.chars().all(|c| {
            matches!(c, '0' | '#' | ',' | '.' | '?' | ';' | '(' | ')' | '-' | ' ')
        })
}

/// Count decimal placeholders in the first section of a format string
fn decimal_places(fmt: &str) -> usize {
    let section = fmt.split(';').next().unwrap_or(fmt);
    let Some(dot) = section.find('.') else {
        return 0;
    };
    section[dot + 1..]
        .chars()
        .take_while(|c| *c == '0' || *c == '#')
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accounting_to_money() {
        let raw = r#"_-* #,##0.00_-;-* #,##0.00_-;_-* "-"??_-;_-@_-"#;
        assert_eq!(standardize(raw), FMT_MONEY);
    }

    #[test]
    fn test_percent_and_text_kept() {
        assert_eq!(standardize("0.00%"), "0.00%");
        assert_eq!(standardize("@"), "@");
    }

    #[test]
    fn test_unit_price_seven_decimals() {
        assert_eq!(standardize("0.0000000"), FMT_UNIT_PRICE);
        assert_eq!(standardize("#,##0.0000000"), FMT_UNIT_PRICE);
    }

    #[test]
    fn test_integer_thousands() {
        assert_eq!(standardize("#,##0"), FMT_THOUSANDS);
        assert_eq!(standardize("0"), FMT_THOUSANDS);
    }

    #[test]
    fn test_decimal_counting_fallback() {
        assert_eq!(standardize("0.00"), FMT_MONEY);
        assert_eq!(standardize("0.0"), "#,##0.0");
    }

    #[test]
    fn test_decimal_count_preserved() {
        assert_eq!(standardize("0.000"), "#,##0.000");
        assert_eq!(standardize("#,##0.000"), "#,##0.000");
    }

    #[test]
    fn test_date_and_time_formats_omitted() {
        assert_eq!(standardize("mm-dd-yy"), "");
        assert_eq!(standardize("d-mmm-yy"), "");
        assert_eq!(standardize("h:mm:ss"), "");
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            r#"_-* #,##0.00_-;-* #,##0.00_-;_-* "-"??_-;_-@_-"#,
            "0.00%",
            "@",
            "0.0000000",
            "#,##0",
            "0.00",
            "0.000",
            "mm-dd-yy",
        ] {
            let once = standardize(raw);
            assert_eq!(standardize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_general_is_dropped() {
        assert_eq!(standardize("General"), "");
        assert_eq!(standardize(""), "");
    }
}
