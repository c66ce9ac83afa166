use crate::RationalNumber;
use crate::convert::recip_to_duration;
use crate::error::{HumdrumError, Result};
use crate::file::HumdrumFile;
use crate::types::line::Line;
use crate::types::token::{Token, TokenId};
use log::{trace, warn};
use std::collections::HashMap;

pub(crate) fn analyze_token_durations(file: &mut HumdrumFile) {
    let scale = file.options.rhythm_scale;
    let separator = file.options.subtoken_separator.clone();

    for line in &mut file.lines {
        for token in line.tokens_mut() {
            if !(token.has_rhythm() && token.is_non_null_data()) {
                token.set_duration(RationalNumber::from_integer(-1));
                continue;
            }
            match recip_to_duration(token.text(), scale, &separator) {
                Ok(duration) => token.set_duration(duration),
                Err(err) => {
                    warn!("{} at {}", err, token.id());
                    token.set_duration(RationalNumber::from_integer(-1));
                }
            }
        }
    }
}

fn token_at(lines: &[Line], id: TokenId) -> Option<&Token> {
    lines.get(id.line).and_then(|line| line.token(id.field))
}

fn sets_line_time(token: &Token) -> bool {
    token.has_rhythm()
        && (token.duration().is_non_negative() || token.is_terminate_interpretation())
}

struct TrackWalker<'a> {
    lines: &'a [Line],
    times: Vec<Option<RationalNumber>>,
    arrivals: HashMap<TokenId, RationalNumber>,
}

impl<'a> TrackWalker<'a> {
    fn new(lines: &'a [Line]) -> Self {
        Self {
            lines,
            times: vec![None; lines.len()],
            arrivals: HashMap::new(),
        }
    }

    fn set_line_time(&mut self, line: usize, time: RationalNumber) -> Result<()> {
        match self.times[line] {
            Some(expected) if expected != time => Err(HumdrumError::RhythmMismatch {
                line,
                expected,
                found: time,
            }),
            _ => {
                self.times[line] = Some(time);
                Ok(())
            }
        }
    }

    fn walk(&mut self, start: TokenId, start_time: RationalNumber) -> Result<()> {
        let mut stack = vec![(start, start_time)];

        while let Some((id, time)) = stack.pop() {
            if let Some(expected) = self.arrivals.get(&id) {
                if *expected != time {
                    return Err(HumdrumError::RhythmMismatch {
                        line: id.line,
                        expected: *expected,
                        found: time,
                    });
                }
                continue;
            }
            self.arrivals.insert(id, time);

            let Some(token) = token_at(self.lines, id) else {
                continue;
            };
            if sets_line_time(token) {
                self.set_line_time(id.line, time)?;
            }

            let duration = token.duration();
            let next_time = if duration.is_positive() {
                time + duration
            } else {
                time
            };
            for next in token.next_tokens().iter().rev() {
                stack.push((*next, next_time));
            }
        }
        Ok(())
    }

    /// Start of a track entering mid-score, anchored on its first timed event.
    fn floating_start(&self, start: TokenId) -> Option<RationalNumber> {
        let mut accumulated = RationalNumber::zero();
        let mut current = Some(start);

        while let Some(id) = current {
            let token = token_at(self.lines, id)?;
            if sets_line_time(token)
                && let Some(time) = self.times[id.line]
            {
                return Some(time - accumulated);
            }
            if token.duration().is_positive() {
                accumulated += token.duration();
            }
            current = token.next_token(0);
        }
        None
    }
}

fn interpolate_data_lines(lines: &[Line], times: &mut [Option<RationalNumber>]) {
    let timed: Vec<usize> = (0..times.len()).filter(|i| times[*i].is_some()).collect();

    for pair in timed.windows(2) {
        let (first, last) = (pair[0], pair[1]);
        let (Some(start), Some(end)) = (times[first], times[last]) else {
            continue;
        };
        let untimed: Vec<usize> = (first + 1..last).filter(|i| lines[*i].is_data()).collect();
        if untimed.is_empty() {
            continue;
        }

        let step = (end - start) / (untimed.len() as i64 + 1);
        for (n, index) in untimed.into_iter().enumerate() {
            times[index] = Some(start + step * (n as i64 + 1));
        }
    }
}

fn fill_untimed_lines(times: &mut [Option<RationalNumber>]) -> Vec<RationalNumber> {
    let mut next = None;
    for time in times.iter_mut().rev() {
        if let Some(value) = *time {
            next = Some(value);
        } else {
            *time = next;
        }
    }

    let mut last = RationalNumber::zero();
    times
        .iter()
        .map(|time| {
            if let Some(value) = time {
                last = *value;
            }
            last
        })
        .collect()
}

pub(crate) fn analyze_rhythm(file: &mut HumdrumFile) -> Result<()> {
    let first_entry_line = file.track_starts.first().map(|id| id.line);
    let mut walker = TrackWalker::new(&file.lines);

    let rhythmic: Vec<TokenId> = file
        .track_starts
        .iter()
        .copied()
        .filter(|id| token_at(&file.lines, *id).is_some_and(|t| t.has_rhythm()))
        .collect();

    for start in rhythmic.iter().filter(|id| Some(id.line) == first_entry_line) {
        walker.walk(*start, RationalNumber::zero())?;
    }
    for start in rhythmic.iter().filter(|id| Some(id.line) != first_entry_line) {
        match walker.floating_start(*start) {
            Some(time) => walker.walk(*start, time)?,
            None => warn!("Cannot find a start time for the spine entering at {}", start),
        }
    }

    let mut times = walker.times;
    interpolate_data_lines(&file.lines, &mut times);
    let starts = fill_untimed_lines(&mut times);

    for index in 0..starts.len() {
        let duration = match starts.get(index + 1) {
            Some(next) => *next - starts[index],
            None => RationalNumber::zero(),
        };
        if duration.is_negative() {
            return Err(HumdrumError::RhythmMismatch {
                line: index + 1,
                expected: starts[index],
                found: starts[index + 1],
            });
        }

        let line = &mut file.lines[index];
        line.set_duration_from_start(starts[index]);
        line.set_duration(duration);
        for token in line.tokens_mut() {
            token.set_duration_from_start(starts[index]);
        }
        trace!("line {}: starts at {}, lasts {}", index + 1, starts[index], duration);
    }
    Ok(())
}
