use crate::RationalNumber;
use crate::file::HumdrumFile;
use anyhow::{Context, Result};

/// Settings for loading and analyzing a file.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Run the rhythm and meter passes after building the spine graph.
    pub analyze_rhythm: bool,
    /// Duration units per whole note: 1 measures in whole notes, 4 in quarters.
    pub rhythm_scale: RationalNumber,
    /// Separates chord notes inside a token; only the first carries the rhythm.
    pub subtoken_separator: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            analyze_rhythm: true,
            rhythm_scale: RationalNumber::one(),
            subtoken_separator: " ".to_string(),
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rhythm(mut self, analyze_rhythm: bool) -> Self {
        self.analyze_rhythm = analyze_rhythm;
        self
    }

    pub fn with_scale(mut self, scale: impl Into<RationalNumber>) -> Self {
        self.rhythm_scale = scale.into();
        self
    }

    pub fn with_separator(mut self, separator: &str) -> Self {
        self.subtoken_separator = separator.to_string();
        self
    }
}

pub struct HumdrumParser {
    options: ParseOptions,
}

/// Parses and analyzes a Humdrum document with default options.
pub fn parse_humdrum(content: &str) -> Result<HumdrumFile> {
    let mut parser = HumdrumParser::new();
    parser.parse(content)
}

impl Default for HumdrumParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HumdrumParser {
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn parse(&mut self, content: &str) -> Result<HumdrumFile> {
        let mut file = HumdrumFile::with_options(self.options.clone());
        for line in content.lines() {
            file.append(line);
        }
        file.analyze().context("Failed to analyze Humdrum data")?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let file = parse_humdrum("**kern\n4c\n*-\n").unwrap();
        assert_eq!(file.line_count(), 3);
        assert_eq!(file.max_track(), 1);
    }

    #[test]
    fn test_parse_error_context() {
        let err = parse_humdrum("**kern\n4c\t4d\n*-").unwrap_err();
        assert_eq!(err.to_string(), "Failed to analyze Humdrum data");
        assert_eq!(
            err.root_cause().to_string(),
            "Structural error on line 2: expected 1 fields but found 2"
        );
    }

    #[test]
    fn test_options() {
        let options = ParseOptions::new()
            .with_scale(4)
            .with_rhythm(false)
            .with_separator(";");
        assert_eq!(options.rhythm_scale, 4);
        assert!(!options.analyze_rhythm);
        assert_eq!(options.subtoken_separator, ";");

        let mut parser = HumdrumParser::with_options(ParseOptions::new().with_scale(4));
        let file = parser.parse("**kern\n4c\n4d\n*-").unwrap();
        assert_eq!(file.score_duration(), 2);
    }
}
