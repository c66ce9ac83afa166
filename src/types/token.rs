use crate::RationalNumber;
use crate::types::barline::{self, MeasureStyle};
use std::fmt;

pub const NULL_DATA: &str = ".";
pub const NULL_INTERPRETATION: &str = "*";
pub const NULL_LOCAL_COMMENT: &str = "!";
pub const SPLIT: &str = "*^";
pub const MERGE: &str = "*v";
pub const EXCHANGE: &str = "*x";
pub const TERMINATE: &str = "*-";
pub const ADD: &str = "*+";

/// Stable handle of a token inside its file: line index and field index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId {
    pub line: usize,
    pub field: usize,
}

impl TokenId {
    pub fn new(line: usize, field: usize) -> Self {
        Self { line, field }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.field + 1)
    }
}

/// Location of a token in the file and in the spine structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAddress {
    line_index: usize,
    field_index: usize,
    // 0 until the spine pass runs
    track: usize,
    // 0 while the track has a single subspine on the line, else 1..n
    subtrack: usize,
    // e.g. "1", "(1)a", "((2)b)a", or "1 2" after merging two tracks
    spine_info: String,
}

impl TokenAddress {
    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn line_number(&self) -> usize {
        self.line_index + 1
    }

    pub fn field_index(&self) -> usize {
        self.field_index
    }

    pub fn track(&self) -> usize {
        self.track
    }

    pub fn subtrack(&self) -> usize {
        self.subtrack
    }

    pub fn spine_info(&self) -> &str {
        &self.spine_info
    }

    /// `"2"` for an unsplit track, `"2.1"` for the first subtrack of track 2.
    pub fn track_string(&self) -> String {
        if self.subtrack > 0 {
            format!("{}.{}", self.track, self.subtrack)
        } else {
            self.track.to_string()
        }
    }
}

/// One tab-separated field of a Humdrum line.
#[derive(Debug, Clone)]
pub struct Token {
    text: String,
    address: TokenAddress,
    data_type: String,
    // negative for content without rhythm
    duration: RationalNumber,
    duration_from_start: RationalNumber,
    next_tokens: Vec<TokenId>,
    previous_tokens: Vec<TokenId>,
    next_non_null: Vec<TokenId>,
    previous_non_null: Vec<TokenId>,
}

impl Token {
    pub(crate) fn new(text: &str, line_index: usize, field_index: usize) -> Self {
        Self {
            text: text.to_string(),
            address: TokenAddress {
                line_index,
                field_index,
                ..TokenAddress::default()
            },
            data_type: String::new(),
            duration: RationalNumber::from_integer(-1),
            duration_from_start: RationalNumber::zero(),
            next_tokens: Vec::new(),
            previous_tokens: Vec::new(),
            next_non_null: Vec::new(),
            previous_non_null: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the token text. The owning line's text and the file's
    /// analysis are stale until `Line::create_line_from_tokens` and
    /// `HumdrumFile::analyze` run again.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn id(&self) -> TokenId {
        TokenId::new(self.address.line_index, self.address.field_index)
    }

    pub fn address(&self) -> &TokenAddress {
        &self.address
    }

    pub fn line_index(&self) -> usize {
        self.address.line_index
    }

    pub fn field_index(&self) -> usize {
        self.address.field_index
    }

    pub fn track(&self) -> usize {
        self.address.track
    }

    pub fn subtrack(&self) -> usize {
        self.address.subtrack
    }

    pub fn spine_info(&self) -> &str {
        &self.address.spine_info
    }

    /// Exclusive interpretation governing this token, e.g. `**kern`.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self.text.as_str(),
            NULL_DATA | NULL_INTERPRETATION | NULL_LOCAL_COMMENT
        )
    }

    pub fn is_data(&self) -> bool {
        !(self.text.is_empty()
            || self.text.starts_with('*')
            || self.text.starts_with('!')
            || self.text.starts_with('='))
    }

    pub fn is_null_data(&self) -> bool {
        self.text == NULL_DATA
    }

    pub fn is_non_null_data(&self) -> bool {
        self.is_data() && !self.is_null()
    }

    pub fn is_interpretation(&self) -> bool {
        self.text.starts_with('*')
    }

    pub fn is_exclusive_interpretation(&self) -> bool {
        self.text.starts_with("**")
    }

    pub fn is_split_interpretation(&self) -> bool {
        self.text == SPLIT
    }

    pub fn is_merge_interpretation(&self) -> bool {
        self.text == MERGE
    }

    pub fn is_exchange_interpretation(&self) -> bool {
        self.text == EXCHANGE
    }

    pub fn is_terminate_interpretation(&self) -> bool {
        self.text == TERMINATE
    }

    pub fn is_add_interpretation(&self) -> bool {
        self.text == ADD
    }

    pub fn is_manipulator(&self) -> bool {
        matches!(self.text.as_str(), SPLIT | MERGE | EXCHANGE | TERMINATE | ADD)
    }

    pub fn is_barline(&self) -> bool {
        self.text.starts_with('=')
    }

    pub fn is_comment(&self) -> bool {
        self.text.starts_with('!')
    }

    /// True for tokens of spines whose data carries durations.
    pub fn has_rhythm(&self) -> bool {
        matches!(self.data_type.as_str(), "**kern" | "**recip")
    }

    /// Self-duration, or a negative value for content without rhythm.
    pub fn duration(&self) -> RationalNumber {
        self.duration
    }

    pub fn duration_from_start(&self) -> RationalNumber {
        self.duration_from_start
    }

    pub fn barline_style(&self) -> Option<MeasureStyle> {
        MeasureStyle::from_barline(&self.text)
    }

    pub fn bar_number(&self) -> Option<u32> {
        barline::bar_number(&self.text)
    }

    pub fn subtoken_count(&self, separator: &str) -> usize {
        if separator.is_empty() {
            return 1;
        }
        self.text.split(separator).count()
    }

    pub fn subtoken(&self, index: usize, separator: &str) -> Option<&str> {
        if separator.is_empty() {
            return (index == 0).then_some(self.text.as_str());
        }
        self.text.split(separator).nth(index)
    }

    pub fn next_tokens(&self) -> &[TokenId] {
        &self.next_tokens
    }

    pub fn previous_tokens(&self) -> &[TokenId] {
        &self.previous_tokens
    }

    pub fn next_token(&self, index: usize) -> Option<TokenId> {
        self.next_tokens.get(index).copied()
    }

    pub fn previous_token(&self, index: usize) -> Option<TokenId> {
        self.previous_tokens.get(index).copied()
    }

    pub fn next_token_count(&self) -> usize {
        self.next_tokens.len()
    }

    pub fn previous_token_count(&self) -> usize {
        self.previous_tokens.len()
    }

    /// Nearest non-null data tokens later in the spine. More than one when
    /// the spine splits before the next event.
    pub fn next_non_null_data_tokens(&self) -> &[TokenId] {
        &self.next_non_null
    }

    /// Nearest non-null data tokens earlier in the spine. More than one when
    /// subspines merged since the last event.
    pub fn previous_non_null_data_tokens(&self) -> &[TokenId] {
        &self.previous_non_null
    }

    /// For a null data token, the event it continues.
    pub fn null_resolution(&self) -> Option<TokenId> {
        if !self.is_null_data() {
            return None;
        }
        self.previous_non_null.first().copied()
    }

    pub(crate) fn reset_analysis(&mut self) {
        self.address.track = 0;
        self.address.subtrack = 0;
        self.address.spine_info.clear();
        self.data_type.clear();
        self.duration = RationalNumber::from_integer(-1);
        self.duration_from_start = RationalNumber::zero();
        self.next_tokens.clear();
        self.previous_tokens.clear();
        self.next_non_null.clear();
        self.previous_non_null.clear();
    }

    pub(crate) fn set_position(&mut self, line_index: usize, field_index: usize) {
        self.address.line_index = line_index;
        self.address.field_index = field_index;
    }

    pub(crate) fn set_spine_info(&mut self, spine_info: &str) {
        self.address.spine_info = spine_info.to_string();
    }

    pub(crate) fn set_track(&mut self, track: usize, subtrack: usize) {
        self.address.track = track;
        self.address.subtrack = subtrack;
    }

    pub(crate) fn set_data_type(&mut self, data_type: &str) {
        self.data_type = data_type.to_string();
    }

    pub(crate) fn set_duration(&mut self, duration: RationalNumber) {
        self.duration = duration;
    }

    pub(crate) fn set_duration_from_start(&mut self, duration: RationalNumber) {
        self.duration_from_start = duration;
    }

    pub(crate) fn add_next_token(&mut self, id: TokenId) {
        self.next_tokens.push(id);
    }

    pub(crate) fn add_previous_token(&mut self, id: TokenId) {
        self.previous_tokens.push(id);
    }

    pub(crate) fn set_next_non_null(&mut self, ids: Vec<TokenId>) {
        self.next_non_null = ids;
    }

    pub(crate) fn set_previous_non_null(&mut self, ids: Vec<TokenId>) {
        self.previous_non_null = ids;
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let token = Token::new("4c#", 3, 1);
        assert!(token.is_data() && token.is_non_null_data());
        assert!(!token.is_manipulator());
        assert_eq!(token.id(), TokenId::new(3, 1));
        assert_eq!(token.duration(), -1);

        let null = Token::new(".", 0, 0);
        assert!(null.is_null() && null.is_null_data() && null.is_data());

        for text in [SPLIT, MERGE, EXCHANGE, TERMINATE, ADD] {
            assert!(Token::new(text, 0, 0).is_manipulator(), "{}", text);
        }
        assert!(!Token::new("**kern", 0, 0).is_manipulator());
        assert!(Token::new("**kern", 0, 0).is_exclusive_interpretation());
        assert!(Token::new("*", 0, 0).is_null());
        assert!(Token::new("=3:|!", 0, 0).is_barline());
        assert_eq!(Token::new("=3:|!", 0, 0).bar_number(), Some(3));
        assert!(Token::new("!local", 0, 0).is_comment());
    }

    #[test]
    fn test_subtokens() {
        let chord = Token::new("4c 4e 4g", 0, 0);
        assert_eq!(chord.subtoken_count(" "), 3);
        assert_eq!(chord.subtoken(1, " "), Some("4e"));
        assert_eq!(chord.subtoken(3, " "), None);
        assert_eq!(chord.subtoken(0, ""), Some("4c 4e 4g"));
    }

    #[test]
    fn test_track_string() {
        let mut token = Token::new("4c", 0, 0);
        token.set_track(2, 0);
        assert_eq!(token.address().track_string(), "2");
        token.set_track(2, 1);
        assert_eq!(token.address().track_string(), "2.1");
    }
}
