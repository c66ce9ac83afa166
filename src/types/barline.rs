use std::fmt;

/// Ending style of a measure, read from its barline token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureStyle {
    Invisible,
    Plain,
    RepeatBackward,
    RepeatForward,
    RepeatBoth,
    Double,
    Final,
}

impl MeasureStyle {
    /// Style of a barline token such as `=12`, `=:|!`, `==` or `=-`.
    /// Returns `None` when the text is not a barline.
    pub fn from_barline(text: &str) -> Option<Self> {
        let body = text.strip_prefix('=')?;
        if body.contains('-') {
            return Some(MeasureStyle::Invisible);
        }
        if body.starts_with('=') {
            return Some(MeasureStyle::Final);
        }

        let backward = body.contains(":|") || body.contains(":!");
        let forward = body.contains("|:") || body.contains("!:");
        let style = match (backward, forward) {
            (true, true) => MeasureStyle::RepeatBoth,
            (true, false) => MeasureStyle::RepeatBackward,
            (false, true) => MeasureStyle::RepeatForward,
            (false, false) if body.contains("||") => MeasureStyle::Double,
            (false, false) => MeasureStyle::Plain,
        };
        Some(style)
    }
}

impl fmt::Display for MeasureStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeasureStyle::Invisible => "invisible",
            MeasureStyle::Plain => "plain",
            MeasureStyle::RepeatBackward => "repeat-backward",
            MeasureStyle::RepeatForward => "repeat-forward",
            MeasureStyle::RepeatBoth => "repeat-both",
            MeasureStyle::Double => "double",
            MeasureStyle::Final => "final",
        };
        write!(f, "{}", name)
    }
}

/// Measure number written right after the `=` of a barline, e.g. `=12a` → 12.
pub fn bar_number(text: &str) -> Option<u32> {
    let body = text.strip_prefix('=')?;
    let digits: String = body.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
