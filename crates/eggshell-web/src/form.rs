#![forbid(unsafe_code)]

//! Registration form bridge: field names from the page, state back as JSON.

use eggshell_core::validation::{Field, RegistrationForm};
use serde::Serialize;

/// Field for a DOM input id.
#[must_use]
pub fn parse_field(name: &str) -> Option<Field> {
    match name {
        "username" => Some(Field::Username),
        "email" => Some(Field::Email),
        "password" => Some(Field::Password),
        _ => None,
    }
}

const fn field_name(field: Field) -> &'static str {
    match field {
        Field::Username => "username",
        Field::Email => "email",
        Field::Password => "password",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldStateJson {
    pub field: &'static str,
    pub touched: bool,
    /// Message shown under the input; empty clears it.
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthJson {
    pub percent: u8,
    pub color: String,
    pub caption: String,
}

/// Everything the page needs to repaint the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormStateJson {
    pub fields: Vec<FieldStateJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<StrengthJson>,
}

impl From<&RegistrationForm> for FormStateJson {
    fn from(form: &RegistrationForm) -> Self {
        let fields = Field::ALL
            .iter()
            .map(|&field| FieldStateJson {
                field: field_name(field),
                touched: form.is_touched(field),
                error: form.error_message(field).unwrap_or_default(),
            })
            .collect();
        let strength = form.strength().map(|s| StrengthJson {
            percent: s.percent,
            color: s.level.color().to_string(),
            caption: s.caption(),
        });
        Self { fields, strength }
    }
}

/// Serialize the form state for the page.
pub fn form_state_json(form: &RegistrationForm) -> Result<String, serde_json::Error> {
    serde_json::to_string(&FormStateJson::from(form))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(parse_field(field_name(field)), Some(field));
        }
        assert_eq!(parse_field("phone"), None);
    }

    #[test]
    fn state_reports_errors_and_strength() {
        let mut form = RegistrationForm::new();
        form.blur(Field::Username);
        form.input(Field::Password, "Abcdefg1");
        let state = FormStateJson::from(&form);
        assert_eq!(state.fields[0].error, "Username is required");
        assert!(state.fields[0].touched);
        assert_eq!(state.fields[2].error, "");
        let strength = state.strength.unwrap();
        assert_eq!(strength.percent, 75);
        assert_eq!(strength.color, "#FCD34D");
        assert_eq!(strength.caption, "Password strength: Good");
    }

    #[test]
    fn pristine_form_omits_strength() {
        let json = form_state_json(&RegistrationForm::new()).unwrap();
        assert!(!json.contains("strength"));
        assert!(json.starts_with(r#"{"fields":[{"field":"username","touched":false,"error":""}"#));
    }
}
