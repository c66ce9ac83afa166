use crate::RationalNumber;
use thiserror::Error;

const MAX_DOTS: u32 = 30;

/// A rhythm code that cannot be turned into a duration.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Cannot convert rhythm \"{recip}\": {reason}")]
pub struct ConversionError {
    pub recip: String,
    pub reason: String,
}

impl ConversionError {
    fn new(recip: &str, reason: &str) -> Self {
        Self {
            recip: recip.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn read_number(bytes: &[u8], start: usize, recip: &str) -> Result<(i64, usize), ConversionError> {
    let mut end = start;
    let mut value: i64 = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((bytes[end] - b'0') as i64))
            .ok_or_else(|| ConversionError::new(recip, "number too large"))?;
        end += 1;
    }
    Ok((value, end))
}

/// Duration of a rhythm code such as `4.`, `00` or `3%2`, in `scale` units per
/// whole note. Only the first `separator`-delimited subtoken is read.
pub fn recip_to_duration(
    recip: &str,
    scale: RationalNumber,
    separator: &str,
) -> Result<RationalNumber, ConversionError> {
    let subtoken = if separator.is_empty() {
        recip
    } else {
        recip.split(separator).next().unwrap_or(recip)
    };

    if subtoken.contains('q') {
        return Ok(RationalNumber::zero());
    }

    let bytes = subtoken.as_bytes();
    let start = bytes
        .iter()
        .position(|b| b.is_ascii_digit())
        .ok_or_else(|| ConversionError::new(recip, "no rhythm found"))?;
    let dots = bytes.iter().filter(|b| **b == b'.').count() as u32;
    if dots > MAX_DOTS {
        return Err(ConversionError::new(recip, "too many augmentation dots"));
    }

    let (first, end) = read_number(bytes, start, recip)?;
    let base = if bytes.get(end) == Some(&b'%') {
        let numerator = match bytes.get(end + 1) {
            Some(b) if b.is_ascii_digit() => read_number(bytes, end + 1, recip)?.0,
            _ => 1,
        };
        if first == 0 {
            return Err(ConversionError::new(recip, "zero rational denominator"));
        }
        RationalNumber::new(numerator, first)
    } else if bytes[start] == b'0' {
        let zeros = bytes[start..end].iter().take_while(|b| **b == b'0').count() as u32;
        if end - start != zeros as usize || zeros > 60 {
            return Err(ConversionError::new(recip, "malformed breve rhythm"));
        }
        RationalNumber::from_integer(1i64 << zeros)
    } else {
        RationalNumber::new(1, first)
    };

    if dots == 0 {
        return Ok(base * scale);
    }
    let factor = RationalNumber::new((1i64 << (dots + 1)) - 1, 1i64 << dots);
    Ok(base * factor * scale)
}
