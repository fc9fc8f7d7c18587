//! Tests for the loading stage: structural errors, skipped elements, and the
//! different ways of handing data to the loader.

use minisvg::{Loader, LoadingError, Session};

use std::io::Write;

fn loader() -> Loader {
    Loader::new().with_session(Session::new_for_test_suite())
}

#[test]
fn structural_errors_fail_the_whole_load() {
    for svg in [
        "<svg>",
        "<svg></g>",
        "<svg><rect></svg>",
        r#"<svg width="10></svg>"#,
        "<svg/><svg/>",
    ] {
        assert!(
            matches!(
                loader().read_data(svg),
                Err(LoadingError::XmlParseError { .. })
            ),
            "{} should not load",
            svg
        );
    }
}

#[test]
fn root_must_be_svg() {
    assert_eq!(
        loader().read_data("<g/>").unwrap_err(),
        LoadingError::NoSvgRoot
    );
    assert_eq!(loader().read_data("").unwrap_err(), LoadingError::NoSvgRoot);
}

#[test]
fn unknown_subtrees_are_skipped() {
    let svg = r#"<svg width="10" height="10">
  <metadata>
    <rect id="hidden" width="5" height="5"/>
    <foo><g></rect><bar/></foo>
  </metadata>
  <text><tspan id="text">hello</tspan></text>
  <rect id="shown" width="1" height="1"/>
</svg>"#;

    let document = loader().read_data(svg).unwrap();

    assert!(document.element_by_id("hidden").is_none());
    assert!(document.element_by_id("text").is_none());
    assert!(document.element_by_id("shown").is_some());
}

#[test]
fn deeply_nested_documents_fail_to_load() {
    let nested = |levels: usize| {
        format!(
            "<svg>{}{}</svg>",
            "<g>".repeat(levels - 1),
            "</g>".repeat(levels - 1)
        )
    };

    assert!(loader().read_data(&nested(256)).is_ok());
    assert!(matches!(
        loader().read_data(&nested(257)),
        Err(LoadingError::XmlParseError { .. })
    ));
}

#[test]
fn text_is_only_allowed_inside_the_root() {
    assert!(loader().read_data("<foo>text</foo><svg/>").is_err());
    assert!(loader().read_data("<svg><foo>text</foo></svg>").is_ok());
}

#[test]
fn last_id_wins() {
    let svg = r#"<svg width="10" height="10">
  <rect id="dup" width="1" height="1"/>
  <circle id="dup" r="1"/>
</svg>"#;

    let document = loader().read_data(svg).unwrap();
    let node = document.element_by_id("dup").unwrap();

    assert_eq!(document.element_name(node), "circle");
    assert!(document.element_by_id("").is_none());
}

#[test]
fn reads_bytes() {
    let document = loader()
        .read_bytes(br#"<svg width="7" height="3"/>"#)
        .unwrap();
    assert_eq!((document.width(), document.height()), (7.0, 3.0));

    assert_eq!(
        loader().read_bytes(b"<svg width=\"7\xff\"/>").unwrap_err(),
        LoadingError::BadUtf8
    );
}

#[test]
fn owned_data_outlives_the_caller_buffer() {
    let document = {
        let data = String::from(r#"<svg width="4" height="5"><rect id="r" width="1" height="1"/></svg>"#);
        loader().read_data_owned(data).unwrap()
    };

    assert_eq!(document.width(), 4.0);
    assert!(document.element_by_id("r").is_some());
}

#[test]
fn reads_files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"<svg width="12" height="34"/>"#).unwrap();
    file.flush().unwrap();

    let document = loader().read_path(file.path()).unwrap();
    assert_eq!((document.width(), document.height()), (12.0, 34.0));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nonexistent.svg");

    assert!(matches!(
        loader().read_path(path),
        Err(LoadingError::Io(_))
    ));
}
