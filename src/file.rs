use crate::RationalNumber;
use crate::analysis::{links, meter, rhythm, spines};
use crate::error::Result;
use crate::parser::ParseOptions;
use crate::types::line::Line;
use crate::types::token::{Token, TokenId};
use log::debug;
use std::fmt;
use std::fs;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::Path;

/// A Humdrum document: its lines, the spine graph linking their tokens, and
/// the timing computed from it.
///
/// Loading runs every analysis pass. When a pass fails the file keeps what
/// was built up to the failing line, so it can still be inspected.
#[derive(Debug, Clone, Default)]
pub struct HumdrumFile {
    pub(crate) lines: Vec<Line>,
    pub(crate) options: ParseOptions,
    // entry token of track n at index n - 1
    pub(crate) track_starts: Vec<TokenId>,
    // terminators of track n at index n - 1
    pub(crate) track_ends: Vec<Vec<TokenId>>,
    // line indices; entry 0 is the first spined line when the music has a pickup
    pub(crate) barlines: Vec<usize>,
    pub(crate) pickup: bool,
}

impl HumdrumFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Replaces the contents with the lines of `reader` and analyzes them.
    pub fn read<R: BufRead>(&mut self, reader: R) -> Result<()> {
        self.lines.clear();
        for line in reader.lines() {
            self.append(&line?);
        }
        self.analyze()
    }

    /// Replaces the contents with `content` and analyzes it.
    pub fn read_string(&mut self, content: &str) -> Result<()> {
        self.lines.clear();
        for line in content.lines() {
            self.append(line);
        }
        self.analyze()
    }

    pub fn read_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = fs::File::open(path)?;
        self.read(BufReader::new(file))
    }

    /// Adds a line without analyzing it; call [`HumdrumFile::analyze`] once
    /// every line is in.
    pub fn append(&mut self, text: &str) {
        let index = self.lines.len();
        self.lines
            .push(Line::new(text.trim_end_matches('\r'), index));
    }

    /// Runs every analysis pass from scratch: spine graph, null-token links,
    /// then rhythm and meter when enabled.
    pub fn analyze(&mut self) -> Result<()> {
        self.reset_analysis();

        spines::analyze_spines(self)?;
        debug!(
            "Built spine graph: {} lines, {} tracks",
            self.lines.len(),
            self.max_track()
        );

        links::analyze_links(self);

        if self.options.analyze_rhythm {
            rhythm::analyze_token_durations(self);
            rhythm::analyze_rhythm(self)?;
            meter::analyze_meter(self);
            debug!(
                "Analyzed rhythm: score duration {}, {} barlines",
                self.score_duration(),
                self.barlines.len()
            );
        }
        Ok(())
    }

    fn reset_analysis(&mut self) {
        self.track_starts.clear();
        self.track_ends.clear();
        self.barlines.clear();
        self.pickup = false;
        for (index, line) in self.lines.iter_mut().enumerate() {
            line.set_line_index(index);
            line.reset_analysis();
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Mutable access for editing; the analysis is stale until
    /// [`HumdrumFile::analyze`] runs again.
    pub fn line_mut(&mut self, index: usize) -> Option<&mut Line> {
        self.lines.get_mut(index)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.lines.get(id.line).and_then(|line| line.token(id.field))
    }

    pub fn max_track(&self) -> usize {
        self.track_starts.len()
    }

    /// Exclusive interpretation that opens `track` (1-based).
    pub fn track_start(&self, track: usize) -> Option<&Token> {
        let id = *self.track_starts.get(track.checked_sub(1)?)?;
        self.token(id)
    }

    pub fn track_end_count(&self, track: usize) -> usize {
        track
            .checked_sub(1)
            .and_then(|index| self.track_ends.get(index))
            .map_or(0, |ends| ends.len())
    }

    pub fn track_end(&self, track: usize, index: usize) -> Option<&Token> {
        let id = *self.track_ends.get(track.checked_sub(1)?)?.get(index)?;
        self.token(id)
    }

    /// Tokens of one track and subtrack, in line order.
    pub fn track_tokens(&self, track: usize, subtrack: usize) -> impl Iterator<Item = &Token> {
        self.lines
            .iter()
            .filter(|line| line.has_spines())
            .flat_map(|line| line.tokens())
            .filter(move |t| t.track() == track && t.subtrack() == subtrack)
    }

    /// Time at which the last line starts, i.e. the length of the music.
    pub fn score_duration(&self) -> RationalNumber {
        self.lines
            .last()
            .map_or(RationalNumber::zero(), |line| line.duration_from_start())
    }

    pub fn duration_to_end(&self, line_index: usize) -> Option<RationalNumber> {
        let line = self.lines.get(line_index)?;
        Some(self.score_duration() - line.duration_from_start())
    }

    pub fn barline_count(&self) -> usize {
        self.barlines.len()
    }

    /// Line opening measure `index`. With a pickup, index 0 is the line where
    /// the spines start rather than a barline.
    pub fn barline(&self, index: usize) -> Option<&Line> {
        self.lines.get(*self.barlines.get(index)?)
    }

    /// True when data comes before the first barline.
    pub fn has_pickup(&self) -> bool {
        self.pickup
    }

    /// Length of measure `index`; the last one is measured to the end of
    /// the score.
    pub fn barline_duration(&self, index: usize) -> Option<RationalNumber> {
        let start = self.barline_duration_from_start(index)?;
        let end = match self.barlines.get(index + 1) {
            Some(line) => self.lines[*line].duration_from_start(),
            None => self.score_duration(),
        };
        Some(end - start)
    }

    pub fn barline_duration_from_start(&self, index: usize) -> Option<RationalNumber> {
        self.barline(index).map(|line| line.duration_from_start())
    }

    pub fn barline_duration_to_end(&self, index: usize) -> Option<RationalNumber> {
        self.barline_duration_from_start(index)
            .map(|start| self.score_duration() - start)
    }

    /// Key/value pairs of the `!!!` reference records, in file order.
    pub fn reference_records(&self) -> Vec<(&str, &str)> {
        self.lines.iter().filter_map(|line| line.reference()).collect()
    }

    pub fn reference_value(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .filter_map(|line| line.reference())
            .find_map(|(k, value)| (k == key).then_some(value))
    }

    /// Rebuilds every line's text from its tokens.
    pub fn create_lines_from_tokens(&mut self) {
        for line in &mut self.lines {
            if line.has_spines() {
                line.create_line_from_tokens();
            }
        }
    }
}

impl Index<usize> for HumdrumFile {
    type Output = Line;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lines[index]
    }
}

impl fmt::Display for HumdrumFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HumdrumError;
    use pretty_assertions::assert_eq;

    const CHORALE: &str = "!!!COM: Bach, Johann Sebastian
!!!OTL: Ach Gott und Herr
**kern\t**kern
*M4/4\t*M4/4
4G\t4d
=1\t=1
4G\t4d
4A\t4e
*-\t*-
!!!RDF: end";

    #[test]
    fn test_read_string() {
        let mut file = HumdrumFile::new();
        file.read_string(CHORALE).unwrap();
        assert_eq!(file.line_count(), 10);
        assert_eq!(file.max_track(), 2);
        assert_eq!(file[2].text(), "**kern\t**kern");
        assert_eq!(file.track_start(2).map(|t| t.text()), Some("**kern"));
        assert_eq!(file.track_end_count(1), 1);
        assert_eq!(file.track_end(1, 0).map(|t| t.line_index()), Some(8));
        assert!(file.track_start(0).is_none());
        assert!(file.track_end(3, 0).is_none());
    }

    #[test]
    fn test_read_from_reader() {
        let mut file = HumdrumFile::new();
        file.read(CHORALE.as_bytes()).unwrap();
        assert_eq!(file.score_duration(), RationalNumber::new(3, 4));
        assert_eq!(file.duration_to_end(6), Some(RationalNumber::new(1, 2)));
        assert_eq!(file.duration_to_end(10), None);
        assert_eq!(file.to_string(), format!("{}\n", CHORALE));
    }

    #[test]
    fn test_read_missing_path() {
        let mut file = HumdrumFile::new();
        let err = file.read_path("/nonexistent/score.krn").unwrap_err();
        assert!(matches!(err, HumdrumError::Io(_)));
    }

    #[test]
    fn test_reference_records() {
        let file = crate::parse_humdrum(CHORALE).unwrap();
        assert_eq!(
            file.reference_records(),
            vec![
                ("COM", "Bach, Johann Sebastian"),
                ("OTL", "Ach Gott und Herr"),
                ("RDF", "end"),
            ]
        );
        assert_eq!(file.reference_value("OTL"), Some("Ach Gott und Herr"));
        assert_eq!(file.reference_value("XYZ"), None);
    }

    #[test]
    fn test_track_tokens() {
        let file = crate::parse_humdrum(CHORALE).unwrap();
        let texts: Vec<&str> = file.track_tokens(2, 0).map(|t| t.text()).collect();
        assert_eq!(texts, vec!["**kern", "*M4/4", "4d", "=1", "4d", "4e", "*-"]);
        assert_eq!(file.track_tokens(3, 0).count(), 0);
    }

    #[test]
    fn test_append_then_analyze() {
        let mut file = HumdrumFile::new();
        for line in ["**kern", "2c", "*-"] {
            file.append(line);
        }
        assert_eq!(file.max_track(), 0);
        file.analyze().unwrap();
        assert_eq!(file.max_track(), 1);
        assert_eq!(file.score_duration(), RationalNumber::new(1, 2));
    }

    #[test]
    fn test_edit_and_reanalyze() {
        let mut file = crate::parse_humdrum("**kern\n4c\n4d\n*-").unwrap();
        if let Some(token) = file.line_mut(1).and_then(|line| line.token_mut(0)) {
            token.set_text("2c");
        }
        file.create_lines_from_tokens();
        file.analyze().unwrap();
        assert_eq!(file[1].text(), "2c");
        assert_eq!(file.score_duration(), RationalNumber::new(3, 4));
    }

    #[test]
    fn test_windows_line_endings() {
        let file = crate::parse_humdrum("**kern\r\n4c\r\n*-\r\n").unwrap();
        assert_eq!(file[0].text(), "**kern");
        assert_eq!(file.track_start(1).map(|t| t.data_type()), Some("**kern"));
    }
}
