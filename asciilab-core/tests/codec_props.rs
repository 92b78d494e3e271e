use asciilab_core::codec::{decode, encode};
use asciilab_core::params::{Layout, RenderParameters, DEFAULT_TEXT, DEFAULT_TYPEFACE};
use proptest::prelude::*;

fn layout() -> impl Strategy<Value = Layout> {
    prop::sample::select(Layout::ALL.to_vec())
}

prop_compose! {
    fn valid_params()(
        text in "\\PC{0,100}",
        typeface in "[A-Za-z0-9][A-Za-z0-9 \\-]{0,20}",
        width in 10u16..=200,
        auto_width in any::<bool>(),
        preview_size in 10u8..=20,
        horizontal_layout in layout(),
        vertical_layout in layout(),
    ) -> RenderParameters {
        RenderParameters {
            text,
            typeface,
            width,
            auto_width,
            preview_size,
            horizontal_layout,
            vertical_layout,
        }
    }
}

proptest! {
    #[test]
    fn encode_then_decode_is_identity(params in valid_params()) {
        prop_assert_eq!(decode(&encode(&params)), params);
    }

    #[test]
    fn arbitrary_input_decodes_within_bounds(raw in "\\PC*") {
        let params = decode(&raw);
        prop_assert!(params.is_within_bounds());
        prop_assert!(!params.typeface.trim().is_empty());
    }

    #[test]
    fn numeric_fields_clamp_to_nearest_bound(w in any::<i64>(), fs in any::<i64>()) {
        let params = decode(&format!("w={w}&fs={fs}"));
        prop_assert_eq!(params.width as i64, w.clamp(10, 200));
        prop_assert_eq!(params.preview_size as i64, fs.clamp(10, 20));
    }
}

#[test]
fn scrambled_fields_fall_back_one_by_one() {
    let params = decode("?t=HI&f=&w=abc&aw=yes&hl=sideways&vl=fitted&fs=12px");
    assert_eq!(params.text, "HI");
    assert_eq!(params.typeface, DEFAULT_TYPEFACE);
    assert_eq!(params.width, 80);
    assert!(!params.auto_width);
    assert_eq!(params.horizontal_layout, Layout::Default);
    assert_eq!(params.vertical_layout, Layout::Fitted);
    assert_eq!(params.preview_size, 12);
}

#[test]
fn missing_text_uses_default_but_empty_text_survives() {
    assert_eq!(decode("f=Big").text, DEFAULT_TEXT);
    assert_eq!(decode("t=&f=Big").text, "");
}

#[test]
fn first_occurrence_of_a_key_wins() {
    assert_eq!(decode("t=one&t=two").text, "one");
}
