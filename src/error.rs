use crate::RationalNumber;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HumdrumError>;

#[derive(Error, Debug)]
pub enum HumdrumError {
    #[error("Structural error on line {}: {message}", .line + 1)]
    Structural { line: usize, message: String },

    #[error(
        "Inconsistent rhythm on line {}: expected start time {expected} but found {found}",
        .line + 1
    )]
    RhythmMismatch {
        line: usize,
        expected: RationalNumber,
        found: RationalNumber,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HumdrumError {
    pub(crate) fn structural(line: usize, message: impl Into<String>) -> Self {
        HumdrumError::Structural {
            line,
            message: message.into(),
        }
    }

    /// Zero-based index of the offending line, when the error has one.
    pub fn line_index(&self) -> Option<usize> {
        match self {
            HumdrumError::Structural { line, .. } | HumdrumError::RhythmMismatch { line, .. } => {
                Some(*line)
            }
            HumdrumError::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = HumdrumError::structural(2, "expected 2 fields but found 3");
        assert_eq!(
            err.to_string(),
            "Structural error on line 3: expected 2 fields but found 3"
        );
        assert_eq!(err.line_index(), Some(2));

        let err = HumdrumError::RhythmMismatch {
            line: 0,
            expected: RationalNumber::new(1, 2),
            found: RationalNumber::new(3, 4),
        };
        assert_eq!(
            err.to_string(),
            "Inconsistent rhythm on line 1: expected start time 1/2 but found 3/4"
        );
    }
}
