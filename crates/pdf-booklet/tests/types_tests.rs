use pdf_booklet::*;
use std::path::Path;

#[test]
fn test_rotation_degrees() {
    assert_eq!(Rotation::None.degrees(), 0);
    assert_eq!(Rotation::Clockwise90.degrees(), 90);
    assert_eq!(Rotation::Clockwise180.degrees(), 180);
    assert_eq!(Rotation::Clockwise270.degrees(), 270);
}

#[test]
fn test_rotation_from_degrees_normalizes() {
    assert_eq!(Rotation::from_degrees(0), Rotation::None);
    assert_eq!(Rotation::from_degrees(450), Rotation::Clockwise90);
    assert_eq!(Rotation::from_degrees(-90), Rotation::Clockwise270);
    assert_eq!(Rotation::from_degrees(45), Rotation::None);
}

#[test]
fn test_rotation_flipped() {
    assert_eq!(Rotation::None.flipped(), Rotation::Clockwise180);
    assert_eq!(Rotation::Clockwise90.flipped(), Rotation::Clockwise270);
    assert_eq!(Rotation::Clockwise180.flipped(), Rotation::None);
    assert_eq!(Rotation::Clockwise270.flipped(), Rotation::Clockwise90);
}

#[test]
fn test_page_range() {
    let range = PageRange::new(4, 7);
    assert_eq!(range.len(), 4);
    assert!(range.contains(4));
    assert!(range.contains(7));
    assert!(!range.contains(8));
}

#[test]
fn test_split_plan_dropped_pages() {
    let plan = SplitPlan {
        page_count: 5,
        ranges: vec![PageRange::new(0, 0), PageRange::new(2, 4)],
    };
    assert_eq!(plan.dropped_pages(), vec![1]);
    assert_eq!(plan.split_sizes(), vec![1, 3]);
}

#[test]
fn test_job_output_names() {
    let dir = Path::new("/out");
    assert_eq!(
        JobKind::Booklets.output_path(dir, "abc"),
        dir.join("abc_booklets_for_printing.pdf")
    );
    assert_eq!(JobKind::Join.output_path(dir, "abc"), dir.join("abc_joined.pdf"));
}

#[test]
fn test_error_messages() {
    let err = BookletError::PageOutOfRange { index: 5, count: 3 };
    assert_eq!(
        err.to_string(),
        "Page index 5 out of range (document has 3 pages)"
    );

    let err = BookletError::MissingSource("missing.pdf".into());
    assert!(err.to_string().contains("missing.pdf"));
}
