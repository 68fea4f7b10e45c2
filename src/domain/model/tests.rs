// Unit tests for domain models

use super::*;

#[test]
fn test_timespec_parse_mm_ss() {
    let time = TimeSpec::parse("05:30").unwrap();
    assert_eq!(time.seconds, 330.0);

    let time = TimeSpec::parse(" 00:45 ").unwrap();
    assert_eq!(time.seconds, 45.0);
}

#[test]
fn test_timespec_parse_fractional_seconds() {
    let time = TimeSpec::parse("01:02.5").unwrap();
    assert_eq!(time.seconds, 62.5);
}

#[test]
fn test_timespec_parse_hh_mm_ss() {
    let time = TimeSpec::parse("1:02:30").unwrap();
    assert_eq!(time.seconds, 3750.0);
}

#[test]
fn test_timespec_parse_minutes_past_the_hour() {
    let time = TimeSpec::parse("75:30").unwrap();
    assert_eq!(time.seconds, 4530.0);
}

#[test]
fn test_timespec_parse_rejects_other_shapes() {
    for raw in ["", "90", "1:2:3:4", "ab:cd", "-1:30", "05:-3", "05:NaN", "05:inf", "1::2"] {
        let err = TimeSpec::parse(raw).unwrap_err();
        assert!(
            matches!(err, HighlightError::Validation { .. }),
            "expected validation error for {:?}",
            raw
        );
    }
}

#[test]
fn test_timespec_format() {
    assert_eq!(TimeSpec::from_seconds(330.7).format_mm_ss(), "05:30");
    assert_eq!(TimeSpec::from_seconds(4530.0).format_mm_ss(), "75:30");
    assert_eq!(TimeSpec::from_seconds(3750.0).format_hms(), "1:02:30");
    assert_eq!(TimeSpec::from_seconds(62.0).format_hms(), "1:02");
}

#[test]
fn test_timestamp_round_trip_within_one_second() {
    let mut value = 0.0;
    while value < 7300.0 {
        let formatted = TimeSpec::from_seconds(value).format_mm_ss();
        let parsed = TimeSpec::parse(&formatted).unwrap();
        assert!(
            (parsed.seconds - value).abs() < 1.0,
            "{} -> {} -> {}",
            value,
            formatted,
            parsed.seconds
        );
        value += 13.37;
    }
}

#[test]
fn test_transcript_segment_overlap() {
    let segment = TranscriptSegment::new(10.0, 20.0, "hello");
    assert!(segment.overlaps(15.0, 30.0));
    assert!(segment.overlaps(0.0, 11.0));
    assert!(!segment.overlaps(20.0, 30.0));
    assert!(!segment.overlaps(0.0, 10.0));
}

#[test]
fn test_segment_duration_and_total() {
    let segments = vec![
        Segment::new(0.0, 45.0, "", 9, "intro"),
        Segment::new(50.0, 110.0, "", 10, "point"),
    ];
    assert_eq!(segments[1].duration(), 60.0);
    assert_eq!(total_duration(&segments), 105.0);
    assert_eq!(segments[1].start_formatted(), "00:50");
    assert_eq!(segments[1].end_formatted(), "01:50");
}
