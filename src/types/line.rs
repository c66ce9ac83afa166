use crate::RationalNumber;
use crate::line_parser::{self, FIELD_SEPARATOR};
use crate::types::barline::MeasureStyle;
use crate::types::token::Token;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineType {
    Empty,
    /// `!!!key: value` record.
    Reference,
    GlobalComment,
    LocalComment,
    Exclusive,
    Interpretation,
    /// Interpretation line holding at least one spine manipulator.
    Manipulator,
    /// Interpretation line on which every spine terminates.
    Terminator,
    Barline,
    Data,
}

/// One record of a Humdrum file and its tokens.
///
/// The text and the tokens are two views of the same record. Editing one
/// does not update the other: call [`Line::create_line_from_tokens`] or
/// [`Line::create_tokens_from_line`] afterwards.
#[derive(Debug, Clone)]
pub struct Line {
    text: String,
    tokens: Vec<Token>,
    line_type: LineType,
    line_index: usize,
    duration: RationalNumber,
    duration_from_start: RationalNumber,
    duration_from_barline: RationalNumber,
    duration_to_barline: RationalNumber,
}

impl Line {
    pub(crate) fn new(text: &str, line_index: usize) -> Self {
        let tokens = line_parser::tokenize_line(text, line_index);
        let line_type = line_parser::classify_line(text, &tokens);
        Self {
            text: text.to_string(),
            tokens,
            line_type,
            line_index,
            duration: RationalNumber::zero(),
            duration_from_start: RationalNumber::zero(),
            duration_from_barline: RationalNumber::zero(),
            duration_to_barline: RationalNumber::zero(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the line text. Tokens are stale until
    /// [`Line::create_tokens_from_line`] runs.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn line_number(&self) -> usize {
        self.line_index + 1
    }

    pub fn is_empty(&self) -> bool {
        self.line_type == LineType::Empty
    }

    pub fn is_comment(&self) -> bool {
        matches!(
            self.line_type,
            LineType::Reference | LineType::GlobalComment | LineType::LocalComment
        )
    }

    pub fn is_global_comment(&self) -> bool {
        matches!(self.line_type, LineType::Reference | LineType::GlobalComment)
    }

    pub fn is_local_comment(&self) -> bool {
        self.line_type == LineType::LocalComment
    }

    pub fn is_reference(&self) -> bool {
        self.line_type == LineType::Reference
    }

    pub fn is_exclusive(&self) -> bool {
        self.line_type == LineType::Exclusive
    }

    /// Any `*` line: exclusive interpretations, manipulators and terminators
    /// included.
    pub fn is_interpretation(&self) -> bool {
        matches!(
            self.line_type,
            LineType::Exclusive
                | LineType::Interpretation
                | LineType::Manipulator
                | LineType::Terminator
        )
    }

    pub fn is_manipulator(&self) -> bool {
        matches!(self.line_type, LineType::Manipulator | LineType::Terminator)
    }

    pub fn is_terminator(&self) -> bool {
        self.line_type == LineType::Terminator
    }

    pub fn is_barline(&self) -> bool {
        self.line_type == LineType::Barline
    }

    pub fn is_data(&self) -> bool {
        self.line_type == LineType::Data
    }

    /// True for lines whose tokens belong to spines.
    pub fn has_spines(&self) -> bool {
        !(self.is_empty() || self.is_global_comment())
    }

    pub fn is_all_null(&self) -> bool {
        self.has_spines() && self.tokens.iter().all(|t| t.is_null())
    }

    /// True when every token of a rhythmic spine on the line is null.
    pub fn is_all_rhythmic_null(&self) -> bool {
        self.has_spines()
            && self
                .tokens
                .iter()
                .filter(|t| t.has_rhythm())
                .all(|t| t.is_null())
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, field: usize) -> Option<&Token> {
        self.tokens.get(field)
    }

    /// Mutable access for editing token text; see [`Token::set_text`].
    pub fn token_mut(&mut self, field: usize) -> Option<&mut Token> {
        self.tokens.get_mut(field)
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn field_count(&self) -> usize {
        self.token_count()
    }

    /// Rebuilds the text by joining the tokens with tabs.
    pub fn create_line_from_tokens(&mut self) {
        self.text = self
            .tokens
            .iter()
            .map(|t| t.text())
            .collect::<Vec<_>>()
            .join(&FIELD_SEPARATOR.to_string());
        self.line_type = line_parser::classify_line(&self.text, &self.tokens);
    }

    /// Re-splits the text into fresh tokens, dropping any spine analysis.
    pub fn create_tokens_from_line(&mut self) {
        self.tokens = line_parser::tokenize_line(&self.text, self.line_index);
        self.line_type = line_parser::classify_line(&self.text, &self.tokens);
    }

    /// Reference record key and value for `!!!key: value` lines.
    pub fn reference(&self) -> Option<(&str, &str)> {
        if !self.is_reference() {
            return None;
        }
        line_parser::parse_reference_record(&self.text)
    }

    pub fn barline_style(&self) -> Option<MeasureStyle> {
        if !self.is_barline() {
            return None;
        }
        self.tokens.first().and_then(|t| t.barline_style())
    }

    pub fn bar_number(&self) -> Option<u32> {
        if !self.is_barline() {
            return None;
        }
        self.tokens.first().and_then(|t| t.bar_number())
    }

    /// Time until the next line starts.
    pub fn duration(&self) -> RationalNumber {
        self.duration
    }

    pub fn duration_from_start(&self) -> RationalNumber {
        self.duration_from_start
    }

    pub fn duration_from_barline(&self) -> RationalNumber {
        self.duration_from_barline
    }

    pub fn duration_to_barline(&self) -> RationalNumber {
        self.duration_to_barline
    }

    /// One-based beat position within the measure for beats lasting
    /// `beat_duration`. Zero when the beat duration is zero.
    pub fn beat(&self, beat_duration: RationalNumber) -> RationalNumber {
        if beat_duration.is_zero() {
            return RationalNumber::zero();
        }
        self.duration_from_barline / beat_duration + 1
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    pub(crate) fn set_line_index(&mut self, line_index: usize) {
        self.line_index = line_index;
        for (field, token) in self.tokens.iter_mut().enumerate() {
            token.set_position(line_index, field);
        }
    }

    pub(crate) fn reset_analysis(&mut self) {
        self.duration = RationalNumber::zero();
        self.duration_from_start = RationalNumber::zero();
        self.duration_from_barline = RationalNumber::zero();
        self.duration_to_barline = RationalNumber::zero();
        for token in &mut self.tokens {
            token.reset_analysis();
        }
    }

    pub(crate) fn set_duration(&mut self, duration: RationalNumber) {
        self.duration = duration;
    }

    pub(crate) fn set_duration_from_start(&mut self, duration: RationalNumber) {
        self.duration_from_start = duration;
    }

    pub(crate) fn set_duration_from_barline(&mut self, duration: RationalNumber) {
        self.duration_from_barline = duration;
    }

    pub(crate) fn set_duration_to_barline(&mut self, duration: RationalNumber) {
        self.duration_to_barline = duration;
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
