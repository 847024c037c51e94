#![forbid(unsafe_code)]

//! JSON input schema.
//!
//! The page's listeners reduce DOM events to small JSON objects with a
//! `kind` tag and hand them to [`decode_input`]. The same schema serves
//! recorded sessions, so events also encode back through
//! [`encode_input`].
//!
//! ```json
//! {"kind":"pointer_move","x":120.5,"y":48}
//! {"kind":"pointer","phase":"down","target":"long_press"}
//! {"kind":"touch","phase":"end","target":"long_press"}
//! {"kind":"click","target":"secret","token":3}
//! {"kind":"double_click","target":"confetti"}
//! {"kind":"key","key":"ArrowUp"}
//! {"kind":"resize","width":1280,"height":720}
//! ```

use std::fmt;

use eggshell_core::event::{
    InputEvent, KeyCode, KeyInput, Modifiers, PointerPhase, Target, TouchPhase,
};
use serde::{Deserialize, Serialize};

/// Malformed input from the page.
#[derive(Debug)]
pub enum InputDecodeError {
    /// Not JSON, or not this schema.
    Json(serde_json::Error),
    /// A `secret` target without its `token`.
    MissingToken,
}

impl fmt::Display for InputDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid input event: {err}"),
            Self::MissingToken => write!(f, "secret button event without a token"),
        }
    }
}

impl std::error::Error for InputDecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::MissingToken => None,
        }
    }
}

impl From<serde_json::Error> for InputDecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Page element named by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetJson {
    LongPress,
    Confetti,
    Secret,
    Counter,
    Page,
}

/// Wire form of one input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEventJson {
    PointerMove {
        x: f64,
        y: f64,
    },
    Pointer {
        phase: PointerPhase,
        target: TargetJson,
    },
    Touch {
        phase: TouchPhase,
        target: TargetJson,
    },
    Click {
        target: TargetJson,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<u8>,
    },
    DoubleClick {
        target: TargetJson,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<u8>,
    },
    Key {
        key: String,
        #[serde(default)]
        mods: u8,
        #[serde(default)]
        repeat: bool,
    },
    Resize {
        width: u32,
        height: u32,
    },
}

fn target(json: TargetJson, token: Option<u8>) -> Result<Target, InputDecodeError> {
    Ok(match json {
        TargetJson::LongPress => Target::LongPressButton,
        TargetJson::Confetti => Target::ConfettiButton,
        TargetJson::Secret => Target::SecretButton(token.ok_or(InputDecodeError::MissingToken)?),
        TargetJson::Counter => Target::ClickCounter,
        TargetJson::Page => Target::Page,
    })
}

fn target_json(target: Target) -> (TargetJson, Option<u8>) {
    match target {
        Target::LongPressButton => (TargetJson::LongPress, None),
        Target::ConfettiButton => (TargetJson::Confetti, None),
        Target::SecretButton(token) => (TargetJson::Secret, Some(token)),
        Target::ClickCounter => (TargetJson::Counter, None),
        Target::Page => (TargetJson::Page, None),
    }
}

impl InputEventJson {
    /// Convert to the core event.
    pub fn into_event(self) -> Result<InputEvent, InputDecodeError> {
        Ok(match self {
            Self::PointerMove { x, y } => InputEvent::PointerMove { x, y },
            Self::Pointer { phase, target: t } => InputEvent::Pointer {
                phase,
                target: target(t, None)?,
            },
            Self::Touch { phase, target: t } => InputEvent::Touch {
                phase,
                target: target(t, None)?,
            },
            Self::Click { target: t, token } => InputEvent::Click {
                target: target(t, token)?,
            },
            Self::DoubleClick { target: t, token } => InputEvent::DoubleClick {
                target: target(t, token)?,
            },
            Self::Key { key, mods, repeat } => InputEvent::Key(KeyInput::from_dom(
                &key,
                Modifiers::from_bits_truncate(mods),
                repeat,
            )),
            Self::Resize { width, height } => InputEvent::Resize { width, height },
        })
    }
}

impl From<&InputEvent> for InputEventJson {
    fn from(event: &InputEvent) -> Self {
        match event {
            InputEvent::PointerMove { x, y } => Self::PointerMove { x: *x, y: *y },
            InputEvent::Pointer { phase, target } => Self::Pointer {
                phase: *phase,
                target: target_json(*target).0,
            },
            InputEvent::Touch { phase, target } => Self::Touch {
                phase: *phase,
                target: target_json(*target).0,
            },
            InputEvent::Click { target } => {
                let (target, token) = target_json(*target);
                Self::Click { target, token }
            }
            InputEvent::DoubleClick { target } => {
                let (target, token) = target_json(*target);
                Self::DoubleClick { target, token }
            }
            InputEvent::Key(key) => {
                // BackTab only exists as Shift+Tab in the DOM.
                let (name, mods) = match key.code {
                    KeyCode::BackTab => ("Tab".to_string(), key.mods | Modifiers::SHIFT),
                    ref code => (code.identifier(), key.mods),
                };
                Self::Key {
                    key: name,
                    mods: mods.bits(),
                    repeat: key.repeat,
                }
            }
            InputEvent::Resize { width, height } => Self::Resize {
                width: *width,
                height: *height,
            },
        }
    }
}

/// Decode one event.
pub fn decode_input(json: &str) -> Result<InputEvent, InputDecodeError> {
    serde_json::from_str::<InputEventJson>(json)?.into_event()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(InputEventJson),
    Many(Vec<InputEventJson>),
}

/// Decode a single event object or an array of them (coalesced listeners
/// flush batches).
pub fn decode_inputs(json: &str) -> Result<Vec<InputEvent>, InputDecodeError> {
    match serde_json::from_str::<OneOrMany>(json)? {
        OneOrMany::One(event) => Ok(vec![event.into_event()?]),
        OneOrMany::Many(events) => events.into_iter().map(InputEventJson::into_event).collect(),
    }
}

/// Encode one event in the wire schema.
pub fn encode_input(event: &InputEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&InputEventJson::from(event))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_secret_click_with_token() {
        let e = decode_input(r#"{"kind":"click","target":"secret","token":3}"#).unwrap();
        assert_eq!(e, InputEvent::secret_button(3));
    }

    #[test]
    fn secret_without_token_is_rejected() {
        let err = decode_input(r#"{"kind":"click","target":"secret"}"#).unwrap_err();
        assert!(matches!(err, InputDecodeError::MissingToken));
    }

    #[test]
    fn key_defaults_mods_and_repeat() {
        let e = decode_input(r#"{"kind":"key","key":"ArrowLeft"}"#).unwrap();
        assert_eq!(e, InputEvent::Key(KeyInput::plain(KeyCode::Left)));
    }

    #[test]
    fn shift_tab_encodes_as_tab_with_shift() {
        let e = decode_input(r#"{"kind":"key","key":"Tab","mods":1}"#).unwrap();
        let json = encode_input(&e).unwrap();
        assert_eq!(json, r#"{"kind":"key","key":"Tab","mods":1,"repeat":false}"#);
        assert_eq!(decode_input(&json).unwrap(), e);
    }

    #[test]
    fn unknown_kind_is_json_error() {
        let err = decode_input(r#"{"kind":"wheel","dx":1}"#).unwrap_err();
        assert!(matches!(err, InputDecodeError::Json(_)));
        assert!(err.to_string().starts_with("invalid input event"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn batches_decode_in_order() {
        let events = decode_inputs(
            r#"[{"kind":"pointer","phase":"down","target":"long_press"},
                {"kind":"pointer","phase":"leave","target":"long_press"}]"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                InputEvent::Pointer {
                    phase: PointerPhase::Down,
                    target: Target::LongPressButton
                },
                InputEvent::Pointer {
                    phase: PointerPhase::Leave,
                    target: Target::LongPressButton
                },
            ]
        );
        let single = decode_inputs(r#"{"kind":"resize","width":2,"height":3}"#).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn bad_element_in_batch_fails_whole_batch() {
        let err = decode_inputs(
            r#"[{"kind":"click","target":"counter"},{"kind":"click","target":"secret"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, InputDecodeError::MissingToken));
    }
}
