use humdrum::{
    HumdrumError, HumdrumFile, HumdrumParser, LineType, MeasureStyle, ParseOptions,
    RationalNumber, TokenId, parse_humdrum,
};
use pretty_assertions::assert_eq;

const INVENTION: &str = "!!!COM: Bach, Johann Sebastian
!!!OTL: Invention in C major
**kern\t**kern
*clefF4\t*clefG2
*M4/4\t*M4/4
=1-\t=1-
2r\t16r
.\t16c
.\t16d
.\t16e
.\t16f
.\t16d
.\t16e
.\t16c
*\t*^
8C\t8g\t4cc
8E\t8g\t.
*\t*v\t*v
4G\t8b
.\t8cc
=2\t=2
1c\t1c
==\t==
*-\t*-
!!!RDF: end";

fn r(n: i64, d: i64) -> RationalNumber {
    RationalNumber::new(n, d)
}

#[test]
fn test_single_spine_scenario() {
    let file = parse_humdrum("**kern\n4c\n4d\n*-").unwrap();
    assert_eq!(file.max_track(), 1);
    assert_eq!(file[1].duration(), r(1, 4));
    assert_eq!(file[2].duration_from_start(), r(1, 2));
}

#[test]
fn test_invention_structure() {
    let file = parse_humdrum(INVENTION).unwrap();
    assert_eq!(file.max_track(), 2);
    assert_eq!(file.reference_value("COM"), Some("Bach, Johann Sebastian"));
    assert_eq!(file[14].line_type(), LineType::Manipulator);

    let tracks: Vec<String> = file[15]
        .tokens()
        .iter()
        .map(|t| t.address().track_string())
        .collect();
    assert_eq!(tracks, vec!["1", "2.1", "2.2"]);

    let merged = file[18].token(1).unwrap();
    assert_eq!(merged.address().track_string(), "2");
    assert_eq!(merged.spine_info(), "2");
    assert_eq!(merged.previous_tokens(), &[TokenId::new(17, 1), TokenId::new(17, 2)]);
    assert_eq!(file[5].barline_style(), Some(MeasureStyle::Invisible));
}

#[test]
fn test_invention_timing() {
    let file = parse_humdrum(INVENTION).unwrap();
    assert_eq!(file.score_duration(), r(2, 1));
    assert_eq!(file[15].duration_from_start(), r(1, 2));
    assert_eq!(file[16].duration_from_start(), r(5, 8));
    assert_eq!(file[18].duration_from_start(), r(3, 4));
    assert_eq!(file[19].duration_from_start(), r(7, 8));
    assert_eq!(file[20].duration_from_start(), r(1, 1));

    let total: RationalNumber = file.lines().iter().map(|l| l.duration()).sum();
    assert_eq!(total, file.score_duration());
}

#[test]
fn test_terminators_end_at_score_duration() {
    let file = parse_humdrum(INVENTION).unwrap();
    for track in 1..=file.max_track() {
        for index in 0..file.track_end_count(track) {
            let end = file.track_end(track, index).unwrap();
            assert_eq!(end.duration_from_start(), file.score_duration());
        }
    }
}

#[test]
fn test_terminated_branch_sums_line_durations() {
    let file = parse_humdrum("**kern\n*^\n4c\t2e\n*-\t*\n4f\n*-").unwrap();
    let entry = file.track_start(1).unwrap().line_index();
    assert_eq!(file.track_end_count(1), 2);

    for index in 0..file.track_end_count(1) {
        let end = file.track_end(1, index).unwrap();
        let elapsed: RationalNumber = file.lines()[entry..end.line_index()]
            .iter()
            .map(|line| line.duration())
            .sum();
        assert_eq!(end.duration_from_start(), elapsed);
    }
    assert_eq!(file.track_end(1, 0).unwrap().duration_from_start(), r(1, 4));
    assert_eq!(file.track_end(1, 1).unwrap().duration_from_start(), r(3, 4));
}

#[test]
fn test_invention_measures() {
    let file = parse_humdrum(INVENTION).unwrap();
    assert!(!file.has_pickup());
    assert_eq!(file.barline_count(), 3);
    assert_eq!(file.barline_duration(0), Some(r(1, 1)));
    assert_eq!(file.barline_duration(1), Some(r(1, 1)));
    assert_eq!(file.barline_duration(2), Some(r(0, 1)));

    let total: RationalNumber = (0..file.barline_count())
        .filter_map(|i| file.barline_duration(i))
        .sum();
    assert_eq!(total, file.score_duration());
    assert_eq!(file[13].beat(r(1, 4)), r(11, 4));
}

#[test]
fn test_null_token_resolution_across_lines() {
    let file = parse_humdrum(INVENTION).unwrap();
    let rest = TokenId::new(6, 0);
    for line in 7..=13 {
        assert_eq!(file[line].token(0).unwrap().null_resolution(), Some(rest));
    }
    assert_eq!(
        file[16].token(2).unwrap().null_resolution(),
        Some(TokenId::new(15, 2))
    );
}

#[test]
fn test_scaled_durations() {
    let mut parser = HumdrumParser::with_options(ParseOptions::new().with_scale(4));
    let file = parser.parse(INVENTION).unwrap();
    assert_eq!(file.score_duration(), 8);
    assert_eq!(file[7].duration(), r(1, 4));
}

#[test]
fn test_field_count_mismatch_fails_without_panic() {
    let result = parse_humdrum("**kern\t**kern\n4c\t4e\n4d\n*-\t*-");
    assert!(result.is_err());

    let mut file = HumdrumFile::new();
    let err = file.read_string("**kern\t**kern\n4c\t4e\n4d\n*-\t*-").unwrap_err();
    assert_eq!(err.line_index(), Some(2));
    assert_eq!(file.line_count(), 4);
    assert_eq!(file[1].token(0).unwrap().track(), 1);
}

#[test]
fn test_rhythm_mismatch_leaves_graph_queryable() {
    let input = "**kern\n*^\n4c\t2d\n*v\t*v\n4e\n*-";
    let mut file = HumdrumFile::new();
    let err = file.read_string(input).unwrap_err();
    assert!(matches!(err, HumdrumError::RhythmMismatch { .. }));
    assert_eq!(file.max_track(), 1);
    assert_eq!(file[4].token(0).unwrap().previous_token_count(), 2);
}

#[test]
fn test_roundtrip_text() {
    let file = parse_humdrum(INVENTION).unwrap();
    assert_eq!(file.to_string(), format!("{}\n", INVENTION));
}
