/// Collapse a numeric range to a single value when both ends are equal,
/// e.g. `(2, 6)` → `"2-6"` but `(2, 2)` → `"2"`.
pub fn compact_range(min_value: u32, max_value: u32) -> String {
    if min_value == max_value {
        min_value.to_string()
    } else {
        format!("{}-{}", min_value, max_value)
    }
}

/// Compact display for large counts, with a K/M suffix from 1000/1000000
/// upwards. Truncates rather than rounds.
pub fn compact_number(number: u64) -> String {
    if number < 1_000 {
        number.to_string()
    } else if number < 1_000_000 {
        format!("{}K", number / 1_000)
    } else {
        format!("{}M", number / 1_000_000)
    }
}
