use crate::RationalNumber;
use crate::file::HumdrumFile;

/// Measures the time from and to the nearest barline of every line and
/// collects the barlines. Data before the first barline is a pickup measure,
/// opened by the line where the spines start.
pub(crate) fn analyze_meter(file: &mut HumdrumFile) {
    let pickup_line = file.track_starts.first().map_or(0, |id| id.line);
    let mut barlines = Vec::new();
    let mut pickup = false;
    let mut sum = RationalNumber::zero();

    for (index, line) in file.lines.iter_mut().enumerate() {
        line.set_duration_from_barline(sum);
        sum += line.duration();
        if line.is_barline() {
            barlines.push(index);
            sum = RationalNumber::zero();
        } else if line.is_data() && barlines.is_empty() {
            barlines.push(pickup_line);
            pickup = true;
        }
    }

    sum = RationalNumber::zero();
    for line in file.lines.iter_mut().rev() {
        sum += line.duration();
        line.set_duration_to_barline(sum);
        if line.is_barline() {
            sum = RationalNumber::zero();
        }
    }

    file.barlines = barlines;
    file.pickup = pickup;
}

#[cfg(test)]
mod tests {
    use crate::parse_humdrum;
    use crate::types::barline::MeasureStyle;
    use crate::{HumdrumFile, RationalNumber};
    use pretty_assertions::assert_eq;

    const PICKUP: &str = "!! pickup into two measures of 2/4
**kern
*M2/4
8c
=1
4d
4e
=2
2f
==
*-";

    fn r(n: i64, d: i64) -> RationalNumber {
        RationalNumber::new(n, d)
    }

    #[test]
    fn test_pickup() {
        let file = parse_humdrum(PICKUP).unwrap();
        assert!(file.has_pickup());
        assert_eq!(file.barline_count(), 4);
        assert_eq!(file.barline(0).map(|l| l.line_index()), Some(1));
        assert_eq!(file.barline(1).and_then(|l| l.bar_number()), Some(1));
        assert_eq!(
            file.barline(3).and_then(|l| l.barline_style()),
            Some(MeasureStyle::Final)
        );

        let durations: Vec<RationalNumber> = (0..file.barline_count())
            .filter_map(|i| file.barline_duration(i))
            .collect();
        assert_eq!(durations, vec![r(1, 8), r(1, 2), r(1, 2), r(0, 1)]);
        assert_eq!(file.barline_duration(4), None);
        assert_eq!(file.barline_duration_from_start(2), Some(r(5, 8)));
        assert_eq!(file.barline_duration_to_end(1), Some(r(1, 1)));
    }

    #[test]
    fn test_barline_partition_sums_to_score_duration() {
        let file = parse_humdrum(PICKUP).unwrap();
        let total: RationalNumber = (0..file.barline_count())
            .filter_map(|i| file.barline_duration(i))
            .sum();
        assert_eq!(total, file.score_duration());
    }

    #[test]
    fn test_durations_from_and_to_barline() {
        let file = parse_humdrum(PICKUP).unwrap();
        // 4e, second beat of measure 1
        assert_eq!(file[6].duration_from_barline(), r(1, 4));
        assert_eq!(file[6].duration_to_barline(), r(1, 4));
        assert_eq!(file[6].beat(r(1, 4)), 2);
        // 4d, the downbeat
        assert_eq!(file[5].duration_from_barline(), 0);
        assert_eq!(file[5].duration_to_barline(), r(1, 2));
        // pickup note
        assert_eq!(file[3].duration_to_barline(), r(1, 8));
        // a barline closes the measure before it and opens the one after
        assert_eq!(file[7].duration_from_barline(), r(1, 2));
        assert_eq!(file[7].duration_to_barline(), r(1, 2));
    }

    #[test]
    fn test_no_pickup() {
        let file = parse_humdrum("**kern\n=1\n4c\n4d\n=2\n2e\n*-").unwrap();
        assert!(!file.has_pickup());
        assert_eq!(file.barline(0).map(|l| l.line_index()), Some(1));
        assert_eq!(file.barline_duration(0), Some(r(1, 2)));
        assert_eq!(file.barline_duration(1), Some(r(1, 2)));
    }

    #[test]
    fn test_meter_skipped_without_rhythm() {
        let mut file = HumdrumFile::with_options(crate::ParseOptions::new().with_rhythm(false));
        file.read_string(PICKUP).unwrap();
        assert_eq!(file.barline_count(), 0);
        assert!(file.lines().iter().all(|l| l.duration() == 0));
    }
}
