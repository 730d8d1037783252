//! Number rendering for submission files.
//!
//! The benchmark format is consumed by tools that expect C/Python style
//! output, e.g. `1.000000E+09` rather than Rust's `1.000000E9`.

/// Renders `value` in scientific notation with `precision` fractional digits
/// and a signed exponent of at least two digits (`%.{precision}E`).
///
/// Negative zero is rendered like zero.
pub fn scientific(value: f64, precision: usize) -> String {
    if let Some(special) = non_finite(value, true) {
        return special;
    }

    let rendered = format!("{:.*E}", precision, value + 0.0);
    match rendered.split_once('E') {
        Some((mantissa, exponent)) => format!("{mantissa}E{}", pad_exponent(exponent)),
        None => rendered,
    }
}

/// Renders `value` with the shortest representation that round-trips, the
/// way Python's `str(float)` does (`0.1`, `-5.0`, `1e-05`, `1e+16`).
///
/// Negative zero is rendered like zero.
pub fn shortest(value: f64) -> String {
    if let Some(special) = non_finite(value, false) {
        return special;
    }

    let rendered = format!("{:?}", value + 0.0);
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => format!("{mantissa}e{}", pad_exponent(exponent)),
        None => rendered,
    }
}

fn non_finite(value: f64, upper: bool) -> Option<String> {
    let special = if value.is_nan() {
        "nan"
    } else if value == f64::INFINITY {
        "inf"
    } else if value == f64::NEG_INFINITY {
        "-inf"
    } else {
        return None;
    };

    Some(if upper {
        special.to_uppercase()
    } else {
        special.to_owned()
    })
}

fn pad_exponent(exponent: &str) -> String {
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent.trim_start_matches('+')),
    };

    format!("{sign}{digits:0>2}")
}
