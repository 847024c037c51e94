//! Property-based invariant tests for the JSON input layer.
//!
//! Verifies:
//! 1. Arbitrary text never panics the decoder
//! 2. Secret clicks keep their token through encode → decode
//! 3. Printable single-character keys decode to exactly that character
//! 4. Modifier bits outside the 4-bit mask are dropped

#![cfg(not(target_arch = "wasm32"))]

use eggshell_core::event::{InputEvent, KeyCode, Modifiers, Target};
use eggshell_web::input::{decode_input, decode_inputs, encode_input};
use proptest::prelude::*;

proptest! {
    // 1
    #[test]
    fn decoder_never_panics(text in ".{0,64}") {
        let _ = decode_inputs(&text);
    }

    // 2
    #[test]
    fn secret_token_survives(token in any::<u8>()) {
        let event = InputEvent::secret_button(token);
        let decoded = decode_input(&encode_input(&event).unwrap()).unwrap();
        prop_assert_eq!(decoded, InputEvent::Click { target: Target::SecretButton(token) });
    }

    // 3
    #[test]
    fn printable_keys_are_verbatim(c in any::<char>().prop_filter("printable", |c| !c.is_control())) {
        let json = serde_json::json!({ "kind": "key", "key": c.to_string() }).to_string();
        match decode_input(&json).unwrap() {
            InputEvent::Key(key) => prop_assert_eq!(key.code, KeyCode::Char(c)),
            other => prop_assert!(false, "unexpected event {:?}", other),
        }
    }

    // 4
    #[test]
    fn modifier_bits_truncated(mods in any::<u8>()) {
        let json = format!(r#"{{"kind":"key","key":"x","mods":{mods}}}"#);
        match decode_input(&json).unwrap() {
            InputEvent::Key(key) => prop_assert_eq!(key.mods.bits(), mods & Modifiers::all().bits()),
            other => prop_assert!(false, "unexpected event {:?}", other),
        }
    }
}
