use crate::parse_humdrum;

pub fn format_float(value: f64) -> String {
    let trimmed_zeros = format!("{:.5}", value).trim_end_matches('0').to_string();

    if trimmed_zeros.ends_with('.') {
        trimmed_zeros + "0"
    } else {
        trimmed_zeros
    }
}

/// Parses `input` and checks every line's `(duration, duration_from_start)`,
/// written the way `RationalNumber` displays them.
pub fn assert_line_timings(input: &str, expected: &[(&str, &str)]) {
    let file = parse_humdrum(input).expect("Failed to parse input");
    let timings: Vec<(String, String)> = file
        .lines()
        .iter()
        .map(|line| {
            (
                line.duration().to_string(),
                line.duration_from_start().to_string(),
            )
        })
        .collect();
    assert_eq!(
        timings.len(),
        expected.len(),
        "length mismatch {} != {}, timings={:?}",
        timings.len(),
        expected.len(),
        timings,
    );
    for (index, (timing, expected)) in timings.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            (timing.0.as_str(), timing.1.as_str()),
            *expected,
            "line {}: {}",
            index + 1,
            file[index].text()
        );
    }
}
