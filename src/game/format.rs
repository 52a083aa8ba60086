//! Display helpers for quantities and identifiers.

/// Plain rendering of a quantity: integral values print without a fraction.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Compact K/M/B notation used by the resource bar.
pub fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude < 1_000.0 {
        format_quantity(value)
    } else if magnitude < 1_000_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if magnitude < 1_000_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude < 1_000_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else {
        let raw = format!("{value:.2e}");
        match raw.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => raw,
        }
    }
}

pub fn format_change(change: f64) -> String {
    if change > 0.0 {
        format!("+{}", format_number(change))
    } else if change == 0.0 {
        "-".to_string()
    } else {
        format_number(change)
    }
}

pub fn format_capacity(capacity: Option<f64>) -> String {
    capacity.map(format_number).unwrap_or_else(|| "∞".to_string())
}

/// `"alloy_foundry"` -> `"Alloy Foundry"`.
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_numbers() {
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(1_500.0), "1.5K");
        assert_eq!(format_number(2_260_000.0), "2.3M");
        assert_eq!(format_number(7_000_000_000.0), "7.0B");
        assert_eq!(format_number(1_234_000_000_000.0), "1.23e+12");
        assert_eq!(format_number(-4_200.0), "-4.2K");
    }

    #[test]
    fn change_and_capacity_labels() {
        assert_eq!(format_change(25.0), "+25");
        assert_eq!(format_change(0.0), "-");
        assert_eq!(format_change(-3.0), "-3");
        assert_eq!(format_capacity(None), "∞");
        assert_eq!(format_capacity(Some(5_000.0)), "5.0K");
    }

    #[test]
    fn titles_from_keys() {
        assert_eq!(title_case("energy"), "Energy");
        assert_eq!(title_case("alloy_foundry"), "Alloy Foundry");
    }
}
