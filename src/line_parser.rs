use crate::types::line::LineType;
use crate::types::token::Token;

pub const FIELD_SEPARATOR: char = '\t';

/// Splits a line into its tokens. Global records and empty lines are not
/// spined: a global record is kept whole as a single token and an empty line
/// has none.
pub fn tokenize_line(text: &str, line_index: usize) -> Vec<Token> {
    if text.is_empty() {
        return Vec::new();
    }
    if text.starts_with("!!") {
        return vec![Token::new(text, line_index, 0)];
    }
    text.split(FIELD_SEPARATOR)
        .enumerate()
        .map(|(field, part)| Token::new(part, line_index, field))
        .collect()
}

/// Classifies a line from its text and its tokens.
pub fn classify_line(text: &str, tokens: &[Token]) -> LineType {
    if text.is_empty() {
        return LineType::Empty;
    }
    if text.starts_with("!!!") {
        return LineType::Reference;
    }
    if text.starts_with("!!") {
        return LineType::GlobalComment;
    }
    if text.starts_with('!') {
        return LineType::LocalComment;
    }
    if text.starts_with("**") {
        return LineType::Exclusive;
    }
    if text.starts_with('*') {
        if tokens.iter().all(|t| t.is_terminate_interpretation()) {
            return LineType::Terminator;
        }
        if tokens.iter().any(|t| t.is_manipulator()) {
            return LineType::Manipulator;
        }
        return LineType::Interpretation;
    }
    if text.starts_with('=') {
        return LineType::Barline;
    }
    LineType::Data
}

/// Splits a `!!!key: value` reference record into its key and value.
pub fn parse_reference_record(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix("!!!")?;
    let (key, value) = body.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
