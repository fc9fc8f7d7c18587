use minisvg::{Document, Loader, LoadingError, Session};

fn load_with_container(svg: &str, width: f64, height: f64) -> Result<Document<'_>, LoadingError> {
    Loader::new()
        .with_session(Session::new_for_test_suite())
        .with_container_size(width, height)
        .read_data(svg)
}

fn size(svg: &str, width: f64, height: f64) -> (f64, f64) {
    let document = load_with_container(svg, width, height).unwrap();
    (document.width(), document.height())
}

#[test]
fn absolute_dimensions() {
    assert_eq!(
        size(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="10" height="20" viewBox="0 0 100 200"/>
"#,
            -1.0,
            -1.0
        ),
        (10.0, 20.0)
    );
}

#[test]
fn percentages_of_container() {
    assert_eq!(
        size(r#"<svg width="50%" height="50%"/>"#, 200.0, 100.0),
        (100.0, 50.0)
    );
}

#[test]
fn view_box_without_container() {
    assert_eq!(size(r#"<svg viewBox="0 0 40 20"/>"#, -1.0, -1.0), (40.0, 20.0));
    assert_eq!(size(r#"<svg viewBox="0 0 40 20"/>"#, 0.0, 0.0), (40.0, 20.0));
}

#[test]
fn view_box_with_one_container_dimension() {
    assert_eq!(size(r#"<svg viewBox="0 0 40 20"/>"#, 100.0, -1.0), (100.0, 50.0));
    assert_eq!(size(r#"<svg viewBox="0 0 40 20"/>"#, -1.0, 100.0), (200.0, 100.0));
}

#[test]
fn default_size() {
    assert_eq!(size(r#"<svg/>"#, -1.0, -1.0), (300.0, 150.0));
    assert_eq!(size(r#"<svg height="40"/>"#, -1.0, -1.0), (300.0, 40.0));
}

#[test]
fn physical_units() {
    assert_eq!(size(r#"<svg width="1in" height="72pt"/>"#, -1.0, -1.0), (96.0, 96.0));
}

#[test]
fn zero_size_is_an_error() {
    assert_eq!(
        load_with_container(r#"<svg width="0" height="0"/>"#, -1.0, -1.0).unwrap_err(),
        LoadingError::InvalidSize
    );
    assert_eq!(
        load_with_container(r#"<svg width="10"/>"#, 100.0, 0.0).unwrap_err(),
        LoadingError::InvalidSize
    );
}
