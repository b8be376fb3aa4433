/// Converts an optional cell into a number
///
/// Absent, empty and `nan` (in any case) cells become `0.0`, as does anything
/// that does not parse as a decimal number or parses to a non-finite value.
/// This never fails.
pub fn coerce(cell: Option<&str>) -> f64 {
    parse_number(cell).unwrap_or(0.0)
}

/// Parses a cell, or returns `None` where [`coerce`] falls back to `0.0`
pub fn parse_number(cell: Option<&str>) -> Option<f64> {
    let text = cell?.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("nan") {
        return None;
    }

    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Passes an already computed value through the same rules as [`coerce`]
///
/// Sums of finite values can still overflow, so a non-finite result is
/// replaced by `0.0`.
pub fn coerce_sum(value: f64) -> f64 {
    match value.is_finite() {
        true => value,
        false => 0.0,
    }
}
