//! The attribute parsers must never panic, whatever the input.

use minisvg::doctest_only::{AspectRatio, Both, Horizontal, Length, Parse, ULength};
use minisvg::tests_only::parse_path;
use minisvg::{Color, Loader, PathBuilder, Session, Transform};

use proptest::prelude::*;

proptest! {
    #[test]
    fn path_data_does_not_panic(s in "[MmLlHhVvCcSsQqTtAaZz0-9eE.,+\\- ]{0,64}") {
        let mut builder = PathBuilder::new();
        let _ = parse_path(&mut builder, &s);
    }

    #[test]
    fn path_data_error_keeps_prefix(n in 1usize..20) {
        let mut s = String::from("M 0 0");
        for i in 0..n {
            s.push_str(&format!(" L {} {}", i, i));
        }
        s.push_str(" L 1");

        let mut builder = PathBuilder::new();
        prop_assert!(parse_path(&mut builder, &s).is_err());
        prop_assert_eq!(builder.segments().len(), n + 1);
    }

    #[test]
    fn transforms_do_not_panic(s in "(matrix|translate|scale|rotate|skewX|skewY)?[(),0-9. -]{0,32}") {
        let _ = Transform::parse_str(&s);
    }

    #[test]
    fn lengths_do_not_panic(s in "\\PC{0,16}") {
        let _ = Length::<Horizontal>::parse_str(&s);
        let _ = ULength::<Both>::parse_str(&s);
    }

    #[test]
    fn colors_and_aspect_ratios_do_not_panic(s in "\\PC{0,24}") {
        let _ = Color::parse_str(&s);
        let _ = AspectRatio::parse_str(&s);
    }

    #[test]
    fn loading_does_not_panic(s in "[<>/=\"a-z !?-]{0,64}") {
        let _ = Loader::new()
            .with_session(Session::new_for_test_suite())
            .read_data(&s);
    }

    #[test]
    fn attribute_values_do_not_panic(value in "\\PC{0,24}") {
        let svg = format!(
            r#"<svg width="{0}" height="10" viewBox="{0}"><rect x="{0}" width="10" height="10" fill="{0}" stroke="{0}" stroke-dasharray="{0}" transform="{0}"/><path d="{0}"/><polygon points="{0}"/></svg>"#,
            value.replace(['"', '<', '&'], "")
        );

        if let Ok(document) = Loader::new()
            .with_session(Session::new_for_test_suite())
            .read_data(&svg)
        {
            let _ = document.extents(None);
        };
    }
}
