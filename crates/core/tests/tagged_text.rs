use pseudoview_core::tagged::{
    envelope, ColorClass, ResolvedWord, TaggedText, TextPosition, Token, COLOR_ESC, COLOR_INV,
};
use pseudoview_core::ViewerError;

fn sample() -> TaggedText {
    TaggedText::parse(format!(
        "int {}(int {}) {{ \u{3}\u{1} \u{4}x }}",
        envelope(ColorClass::Default, "main"),
        envelope(ColorClass::Identifier, "argc"),
    ))
}

#[test]
fn tokenizes_spans_and_escapes() {
    let text = sample();
    assert_eq!(
        text.tokens(),
        &[
            Token::Literal("int ".into()),
            Token::SpanStart(ColorClass::Default),
            Token::Literal("main".into()),
            Token::SpanEnd(ColorClass::Default),
            Token::Literal("(int ".into()),
            Token::SpanStart(ColorClass::Identifier),
            Token::Literal("argc".into()),
            Token::SpanEnd(ColorClass::Identifier),
            Token::Literal(") { ".into()),
            Token::Escape(COLOR_ESC),
            Token::Literal("\u{1} ".into()),
            Token::Escape(COLOR_INV),
            Token::Literal("x }".into()),
        ]
    );
    assert_eq!(text.plain(), "int main(int argc) { \u{1} x }");
}

#[test]
fn unknown_colours_are_preserved() {
    let text = TaggedText::parse("\u{1}\u{6}main\u{2}\u{6}(void)");
    assert_eq!(text.tokens()[0], Token::SpanStart(ColorClass::Other(6)));
    assert_eq!(ColorClass::Other(6).byte(), 6);
    assert_eq!(ColorClass::from_byte(0x22), ColorClass::ImportName);
}

#[test]
fn truncated_marker_is_a_single_escape() {
    let text = TaggedText::parse("abc\u{1}");
    assert_eq!(text.tokens(), &[Token::Literal("abc".into()), Token::Escape(0x01)]);
    assert_eq!(text.plain_len(), 3);
}

#[test]
fn map_to_raw_skips_markers_in_front_of_the_character() {
    let text = sample();
    let raw = text.map_to_raw(4).expect("column 4");
    assert_eq!(&text.raw()[raw..raw + 1], "m");

    // The quoted control byte sits right after its escape.
    let quoted = text.plain().find('\u{1}').expect("quoted byte");
    let raw = text.map_to_raw(quoted).expect("quoted column");
    assert_eq!(text.raw().as_bytes()[raw - 1], COLOR_ESC);
}

#[test]
fn raw_to_plain_inverts_map_to_raw_on_every_column() {
    let text = sample();
    for plain in 0..text.plain_len() {
        let raw = text.map_to_raw(plain).expect("column in range");
        assert_eq!(text.raw_to_plain(raw), plain, "column {plain}");
    }
}

#[test]
fn column_past_the_end_has_no_word() {
    let text = sample();
    assert_eq!(text.map_to_raw(text.plain_len()), Err(ViewerError::NoWordUnderCursor));
    assert_eq!(text.map_to_raw(usize::MAX), Err(ViewerError::NoWordUnderCursor));
}

#[test]
fn resolves_word_inside_symmetric_span() {
    let text = TaggedText::parse("\u{1}\u{6}main\u{2}\u{6}(void)");
    let resolved = text.resolve_word(3).expect("word");
    assert_eq!(resolved, ResolvedWord { word: "main".into(), color: ColorClass::Other(6) });
    assert_eq!(resolved.color.byte(), 6);
    // Deterministic.
    assert_eq!(text.resolve_word(3), Some(resolved));
}

#[test]
fn asymmetric_span_is_unclassified() {
    let text = TaggedText::parse("\u{1}\u{1}main\u{2}\u{6}(void)");
    assert_eq!(text.resolve_word(3), None);
}

#[test]
fn text_after_a_closed_span_is_unclassified() {
    let text = sample();
    let raw = text.map_to_raw(8).expect("column of '('");
    assert_eq!(text.resolve_word(raw), None);
    assert_eq!(text.resolve_word(0), None);
}

#[test]
fn nested_span_resolves_to_the_innermost_word() {
    let inner = envelope(ColorClass::Default, "inner");
    let text = TaggedText::parse(envelope(ColorClass::Other(0x0C), &format!("x{inner}y")));
    let raw = text.map_to_raw(2).expect("column inside inner");
    assert_eq!(
        text.resolve_word(raw),
        Some(ResolvedWord { word: "inner".into(), color: ColorClass::Default })
    );
    // Outer text next to an inner span is not a clean envelope.
    let raw = text.map_to_raw(6).expect("column of y");
    assert_eq!(text.resolve_word(raw), None);
}

#[test]
fn word_at_works_per_line() {
    let text = TaggedText::parse(format!(
        "void f(void)\n{{\n  {}();\n}}",
        envelope(ColorClass::Default, "callee")
    ));
    assert_eq!(text.line_count(), 4);
    let resolved = text.word_at(TextPosition::new(2, 4)).expect("callee");
    assert_eq!(resolved.word, "callee");
    assert_eq!(text.word_at(TextPosition::new(2, 0)), Err(ViewerError::Unclassified));
    assert_eq!(text.word_at(TextPosition::new(9, 0)), Err(ViewerError::NoWordUnderCursor));
}

#[test]
fn newline_colour_byte_does_not_split_lines() {
    let text = TaggedText::parse(format!(
        "{};\n{}();",
        envelope(ColorClass::Other(0x0A), "'a'"),
        envelope(ColorClass::Default, "main")
    ));
    let lines: Vec<_> = text.plain().lines().map(str::to_string).collect();
    assert_eq!(lines, ["'a';", "main();"]);
    assert_eq!(text.line_count(), 2);

    let char_literal = text.word_at(TextPosition::new(0, 1)).expect("char literal");
    assert_eq!(char_literal.word, "'a'");
    assert_eq!(char_literal.color, ColorClass::Other(0x0A));

    let resolved = text.word_at(TextPosition::new(1, 0)).expect("main");
    assert_eq!(resolved, ResolvedWord { word: "main".into(), color: ColorClass::Default });
    assert_eq!(text.line(1).expect("second line").plain(), "main();");
}

#[test]
fn replace_envelope_rewrites_every_match_and_keeps_markup() {
    let old = envelope(ColorClass::Default, "helper");
    let text = TaggedText::parse(format!("{old}();\n{old}(1); helper; {}", envelope(ColorClass::Identifier, "helper")));
    let updated = text.replace_envelope(ColorClass::Default, "helper", "do_work").expect("match");

    let new = envelope(ColorClass::Default, "do_work");
    assert_eq!(updated.raw().matches(new.as_str()).count(), 2);
    assert!(!updated.raw().contains(old.as_str()));
    // Bare text and other colours are left alone.
    assert!(updated.raw().contains(" helper; "));
    assert!(updated.contains_envelope(ColorClass::Identifier, "helper"));
}

#[test]
fn replace_envelope_without_match_returns_none() {
    let text = TaggedText::parse(envelope(ColorClass::Default, "helpers"));
    assert!(text.replace_envelope(ColorClass::Default, "helper", "x").is_none());
}

#[test]
fn serializes_as_raw_string() {
    let text = TaggedText::parse("\u{1}\u{1}main\u{2}\u{1}");
    let json = serde_json::to_string(&text).expect("serialize");
    assert_eq!(json, "\"\\u0001\\u0001main\\u0002\\u0001\"");
    let back: TaggedText = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, text);
}
