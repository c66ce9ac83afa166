use crate::error::{HumdrumError, Result};
use crate::file::HumdrumFile;
use crate::types::line::Line;
use crate::types::token::TokenId;
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct ActiveSpine {
    // tokens the next token links back to; empty for a spine being added
    predecessors: Vec<TokenId>,
    // None until the exclusive interpretation of an added spine arrives
    spine_info: Option<String>,
    data_type: String,
}

impl ActiveSpine {
    fn added() -> Self {
        Self {
            predecessors: Vec::new(),
            spine_info: None,
            data_type: String::new(),
        }
    }

    fn continuing(predecessor: TokenId, spine_info: String, data_type: &str) -> Self {
        Self {
            predecessors: vec![predecessor],
            spine_info: Some(spine_info),
            data_type: data_type.to_string(),
        }
    }
}

fn link(lines: &mut [Line], from: TokenId, to: TokenId) {
    if let Some(token) = lines[from.line].tokens_mut().get_mut(from.field) {
        token.add_next_token(to);
    }
    if let Some(token) = lines[to.line].tokens_mut().get_mut(to.field) {
        token.add_previous_token(from);
    }
}

fn track_from_spine_info(spine_info: &str) -> usize {
    let digits: String = spine_info
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

fn collapse_split_pair(left: &str, right: &str) -> Option<String> {
    let matches = left.len() == right.len()
        && left.len() >= 4
        && left.starts_with('(')
        && left.ends_with(")a")
        && right.ends_with(")b")
        && left[..left.len() - 1] == right[..right.len() - 1];
    matches.then(|| left[1..left.len() - 2].to_string())
}

// `(p)a (p)b` pairs collapse to `p`, repeatedly
pub(crate) fn merged_spine_info(infos: &[&str]) -> String {
    let mut parts: Vec<String> = infos.iter().map(|info| info.to_string()).collect();
    loop {
        let found = parts
            .windows(2)
            .enumerate()
            .find_map(|(i, pair)| collapse_split_pair(&pair[0], &pair[1]).map(|c| (i, c)));
        let Some((index, collapsed)) = found else {
            break;
        };
        parts.splice(index..index + 2, [collapsed]);
    }
    parts.join(" ")
}

struct SpineBuilder {
    active: Vec<ActiveSpine>,
    started: bool,
    track_starts: Vec<TokenId>,
    track_ends: Vec<Vec<TokenId>>,
}

impl SpineBuilder {
    fn new() -> Self {
        Self {
            active: Vec::new(),
            started: false,
            track_starts: Vec::new(),
            track_ends: Vec::new(),
        }
    }

    fn process_line(&mut self, lines: &mut [Line], index: usize) -> Result<()> {
        if !self.started {
            // every token of the first spined line opens a new track
            self.active = vec![ActiveSpine::added(); lines[index].token_count()];
            self.started = true;
        } else if self.active.is_empty() {
            return Err(HumdrumError::structural(
                index,
                "data found after every spine has terminated",
            ));
        }

        let count = lines[index].token_count();
        if count != self.active.len() {
            return Err(HumdrumError::structural(
                index,
                format!(
                    "expected {} fields but found {}",
                    self.active.len(),
                    count
                ),
            ));
        }

        self.link_line(lines, index)?;
        assign_tracks(&mut lines[index]);
        self.active = self.apply_manipulators(&lines[index], index)?;
        Ok(())
    }

    fn link_line(&mut self, lines: &mut [Line], index: usize) -> Result<()> {
        for field in 0..self.active.len() {
            let id = TokenId::new(index, field);
            let (text, is_exclusive) = {
                let token = &lines[index].tokens()[field];
                (token.text().to_string(), token.is_exclusive_interpretation())
            };

            let entry = &mut self.active[field];
            if entry.spine_info.is_none() {
                if !is_exclusive {
                    return Err(HumdrumError::structural(
                        index,
                        format!(
                            "field {} must be an exclusive interpretation to start a spine, found \"{}\"",
                            field + 1,
                            text
                        ),
                    ));
                }
                self.track_starts.push(id);
                self.track_ends.push(Vec::new());
                entry.spine_info = Some(self.track_starts.len().to_string());
            }
            if is_exclusive {
                entry.data_type = text;
            }

            for predecessor in &entry.predecessors {
                link(lines, *predecessor, id);
            }
            let token = &mut lines[index].tokens_mut()[field];
            token.set_spine_info(entry.spine_info.as_deref().unwrap_or_default());
            token.set_data_type(&entry.data_type);
        }
        Ok(())
    }

    fn apply_manipulators(&mut self, line: &Line, index: usize) -> Result<Vec<ActiveSpine>> {
        let tokens = line.tokens();
        let mut next = Vec::with_capacity(tokens.len() + 1);
        let mut field = 0;

        while field < tokens.len() {
            let token = &tokens[field];
            let id = TokenId::new(index, field);
            let info = token.spine_info();
            let data_type = token.data_type();

            if token.is_split_interpretation() {
                next.push(ActiveSpine::continuing(id, format!("({})a", info), data_type));
                next.push(ActiveSpine::continuing(id, format!("({})b", info), data_type));
            } else if token.is_merge_interpretation() {
                let end = field
                    + tokens[field..]
                        .iter()
                        .take_while(|t| t.is_merge_interpretation())
                        .count();
                if end - field < 2 {
                    return Err(HumdrumError::structural(
                        index,
                        format!("merge in field {} has no adjacent spine to merge with", field + 1),
                    ));
                }
                let infos: Vec<&str> = tokens[field..end].iter().map(|t| t.spine_info()).collect();
                next.push(ActiveSpine {
                    predecessors: (field..end).map(|f| TokenId::new(index, f)).collect(),
                    spine_info: Some(merged_spine_info(&infos)),
                    data_type: data_type.to_string(),
                });
                field = end;
                continue;
            } else if token.is_exchange_interpretation() {
                let partner = tokens
                    .get(field + 1)
                    .filter(|t| t.is_exchange_interpretation())
                    .ok_or_else(|| {
                        HumdrumError::structural(
                            index,
                            format!("exchange in field {} has no partner", field + 1),
                        )
                    })?;
                next.push(ActiveSpine::continuing(
                    TokenId::new(index, field + 1),
                    partner.spine_info().to_string(),
                    partner.data_type(),
                ));
                next.push(ActiveSpine::continuing(id, info.to_string(), data_type));
                field += 2;
                continue;
            } else if token.is_terminate_interpretation() {
                if let Some(ends) = token
                    .track()
                    .checked_sub(1)
                    .and_then(|track| self.track_ends.get_mut(track))
                {
                    ends.push(id);
                }
            } else if token.is_add_interpretation() {
                next.push(ActiveSpine::continuing(id, info.to_string(), data_type));
                next.push(ActiveSpine::added());
            } else {
                next.push(ActiveSpine::continuing(id, info.to_string(), data_type));
            }
            field += 1;
        }

        Ok(next)
    }
}

fn assign_tracks(line: &mut Line) {
    let tracks: Vec<usize> = line
        .tokens()
        .iter()
        .map(|t| track_from_spine_info(t.spine_info()))
        .collect();

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for track in &tracks {
        *counts.entry(*track).or_insert(0) += 1;
    }

    let mut current: HashMap<usize, usize> = HashMap::new();
    for (token, track) in line.tokens_mut().iter_mut().zip(tracks) {
        let subtrack = if counts.get(&track).copied().unwrap_or(0) > 1 {
            let next = current.entry(track).or_insert(0);
            *next += 1;
            *next
        } else {
            0
        };
        token.set_track(track, subtrack);
    }
}

pub(crate) fn analyze_spines(file: &mut HumdrumFile) -> Result<()> {
    let mut builder = SpineBuilder::new();

    let mut result = Ok(());
    for index in 0..file.lines.len() {
        if !file.lines[index].has_spines() {
            continue;
        }
        result = builder.process_line(&mut file.lines, index);
        if result.is_err() {
            break;
        }
    }

    // keep the graph built so far, even on failure
    file.track_starts = builder.track_starts;
    file.track_ends = builder.track_ends;
    result?;

    if !builder.active.is_empty() {
        warn!(
            "{} spine(s) still open at the end of the file",
            builder.active.len()
        );
    }
    Ok(())
}
