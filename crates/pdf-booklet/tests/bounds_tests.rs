use lopdf::{Dictionary, Document, Object, Stream};
use pdf_booklet::*;

/// Single-page document with the given content stream, resources and media box
fn create_test_pdf(content: &[u8], resources: Dictionary, media_box: [i64; 4]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.to_vec()));
    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(media_box.iter().map(|&v| Object::Integer(v)).collect()),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]));

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

fn page_with(content: &[u8]) -> PdfDocument {
    PdfDocument::from_lopdf(create_test_pdf(content, Dictionary::new(), [0, 0, 600, 800]))
}

fn assert_rect_close(actual: Rect, expected: Rect) {
    let diffs = [
        actual.x0 - expected.x0,
        actual.y0 - expected.y0,
        actual.x1 - expected.x1,
        actual.y1 - expected.y1,
    ];
    assert!(
        diffs.iter().all(|d| d.abs() < 0.01),
        "{:?} != {:?}",
        actual,
        expected
    );
}

#[test]
fn test_blank_page_is_full_rect() {
    let doc = page_with(b"");
    let bounds = detect_content_bounds(&doc, 0, 28.0).unwrap();
    assert_eq!(bounds, Rect::new(0.0, 0.0, 600.0, 800.0));
}

#[test]
fn test_drawing_with_margin() {
    let doc = page_with(b"q 1 0 0 RG 200 300 100 50 re S Q");
    let bounds = detect_content_bounds(&doc, 0, 10.0).unwrap();
    assert_rect_close(bounds, Rect::new(190.0, 290.0, 310.0, 360.0));
}

#[test]
fn test_text_and_drawing_union() {
    let doc = page_with(b"BT /F1 20 Tf 100 700 Td (Title) Tj ET 0 g 400 100 m 500 150 l S");
    let bounds = detect_content_bounds(&doc, 0, 0.0).unwrap();
    // Text: 5 glyphs x 10pt wide, 4pt descent, 16pt ascent
    assert_rect_close(bounds, Rect::new(100.0, 100.0, 500.0, 716.0));
}

#[test]
fn test_bounds_stay_on_page() {
    let doc = page_with(b"0 0 600 800 re f");
    let bounds = detect_content_bounds(&doc, 0, 50.0).unwrap();
    assert_eq!(bounds, Rect::new(0.0, 0.0, 600.0, 800.0));
}

#[test]
fn test_offset_page_box_is_normalized() {
    let doc = PdfDocument::from_lopdf(create_test_pdf(
        b"150 250 10 10 re f",
        Dictionary::new(),
        [100, 200, 700, 1000],
    ));
    let bounds = detect_content_bounds(&doc, 0, 0.0).unwrap();
    assert_rect_close(bounds, Rect::new(50.0, 50.0, 60.0, 60.0));
}

#[test]
fn test_form_xobject_content_is_followed() {
    let mut doc = create_test_pdf(b"", Dictionary::new(), [0, 0, 600, 800]);
    let form_id = doc.add_object(Stream::new(
        Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Form".to_vec())),
            (
                "BBox",
                Object::Array([0, 0, 100, 100].into_iter().map(Object::Integer).collect()),
            ),
            (
                "Matrix",
                Object::Array(
                    [1, 0, 0, 1, 300, 400]
                        .into_iter()
                        .map(Object::Integer)
                        .collect(),
                ),
            ),
        ]),
        b"0 0 20 20 re f".to_vec(),
    ));

    // Rebuild the page with resources and a content stream drawing the form
    let page_id = doc.get_pages()[&1];
    let content_id = doc.add_object(Stream::new(Dictionary::new(), b"/Fm1 Do".to_vec()));
    let page = doc.get_dictionary_mut(page_id).unwrap();
    page.set("Contents", Object::Reference(content_id));
    page.set(
        "Resources",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "XObject",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "Fm1",
                Object::Reference(form_id),
            )])),
        )])),
    );

    let doc = PdfDocument::from_lopdf(doc);
    let bounds = detect_content_bounds(&doc, 0, 0.0).unwrap();
    assert_rect_close(bounds, Rect::new(300.0, 400.0, 320.0, 420.0));
}

#[test]
fn test_scan_page_classifies_content() {
    let doc = page_with(b"BT /F1 10 Tf 10 10 Td (a) Tj ET 0 0 5 5 re f");
    let content = bounds::scan_page(&doc, 0).unwrap();
    assert_eq!(content.text_blocks.len(), 1);
    assert_eq!(content.drawings.len(), 1);
    assert!(content.image_blocks.is_empty());
}

#[test]
fn test_missing_page_is_an_error() {
    let doc = page_with(b"");
    assert!(matches!(
        detect_content_bounds(&doc, 3, 0.0),
        Err(BookletError::PageOutOfRange { index: 3, count: 1 })
    ));
}

#[test]
fn test_bounds_always_inside_page() {
    let page = Rect::new(0.0, 0.0, 600.0, 800.0);
    let contents: [&[u8]; 5] = [
        b"",
        b"10 10 5 5 re f",
        b"-50 -50 100 100 re f",
        b"550 750 200 200 re f",
        b"BT /F1 40 Tf 580 790 Td (Overflowing) Tj ET",
    ];

    for content in contents {
        let doc = page_with(content);
        for margin in [0.0, 28.35, 500.0] {
            let bounds = detect_content_bounds(&doc, 0, margin).unwrap();
            assert!(
                page.contains(&bounds),
                "{:?} escapes the page (margin {})",
                bounds,
                margin
            );
            assert!(bounds.has_area());
        }
    }
}
