use ephemeral::{Envelope, Error};
use proptest::prelude::*;

/// Names as they come back from unmarshal: upper case, trimmed, no delimiter.
fn name() -> impl Strategy<Value = String> {
    "[A-Z0-9][A-Z0-9 _]{0,30}[A-Z0-9]"
}

/// Free text without the delimiter and without surrounding whitespace.
fn text() -> impl Strategy<Value = String> {
    "([a-zA-Z0-9.,'!?:;()\"]{1,12}( |\n|\t|-)?){0,12}"
        .prop_map(|s| s.trim().to_string())
        .prop_filter("no delimiter", |s| !s.contains("-----"))
}

proptest! {
    #[test]
    fn roundtrip(
        name in name(),
        prelude in text(),
        data in prop::collection::vec(any::<u8>(), 0..2048),
        postlude in text(),
    ) {
        let e = Envelope { name, prelude, data, postlude };
        let text = e.marshal().unwrap();
        prop_assert_eq!(Envelope::unmarshal(&text).unwrap(), e);
    }

    #[test]
    fn body_lines_never_exceed_wrap(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let e = Envelope { name: "X".into(), data, ..Envelope::default() };
        let text = e.marshal().unwrap();
        for line in text.lines() {
            prop_assert!(line.len() <= ephemeral::wire::WRAP_WIDTH || line.starts_with("-----"));
        }
    }

    #[test]
    fn wrong_delimiter_count_is_rejected(extra in 1usize..4, remove in 1usize..4, data in prop::collection::vec(any::<u8>(), 0..64)) {
        let e = Envelope { name: "X".into(), data, ..Envelope::default() };
        let text = e.marshal().unwrap();

        let more = format!("{}{}", "----- ".repeat(extra), text);
        prop_assert!(matches!(Envelope::unmarshal(&more), Err(Error::Format(_))));

        let fewer = text.replacen("-----", "", remove);
        prop_assert!(matches!(Envelope::unmarshal(&fewer), Err(Error::Format(_))));
    }
}

#[test]
fn lower_case_name_comes_back_upper_case() {
    let e = Envelope::new("private request", "keep this");
    let back = Envelope::unmarshal(&e.marshal().unwrap()).unwrap();
    assert_eq!(back.name, "PRIVATE REQUEST");
    assert_eq!(back.prelude, "keep this");
}

#[test]
fn surrounding_whitespace_is_trimmed() {
    let e = Envelope {
        name: "X".into(),
        prelude: "  padded\n\n".into(),
        data: vec![1, 2, 3],
        postlude: "\ttail  ".into(),
    };
    let back = Envelope::unmarshal(&e.marshal().unwrap()).unwrap();
    assert_eq!(back.prelude, "padded");
    assert_eq!(back.postlude, "tail");
    assert_eq!(back.data, vec![1, 2, 3]);
}

#[test]
fn pasted_with_chat_noise() {
    let e = Envelope {
        name: "RESPONSE".into(),
        prelude: "here you go".into(),
        data: (0..=255).collect(),
        postlude: String::new(),
    };
    let pasted = format!("\n\n{}\n\n", e.marshal().unwrap().replace('\n', "\r\n"));
    assert_eq!(Envelope::unmarshal(&pasted).unwrap(), e);
}
