#![forbid(unsafe_code)]

//! Registration form validation.
//!
//! Validators are pure predicates over `&str`; nothing here touches the DOM.
//! A [`FieldRules`] chain reports the first failing validator, and
//! [`RegistrationForm`] adds the page's touched-field behaviour on top:
//! errors appear after a field is blurred once, then follow every edit.
//!
//! ```
//! use eggshell_core::validation::{Field, RegistrationForm};
//!
//! let mut form = RegistrationForm::new();
//! form.input(Field::Username, "al");
//! assert!(form.error(Field::Username).is_none()); // not touched yet
//! form.blur(Field::Username);
//! assert_eq!(
//!     form.error_message(Field::Username).as_deref(),
//!     Some("Username must be at least 3 characters"),
//! );
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::notify::{Notification, NotificationSink, ToastKind};
use crate::render::Rgba;

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

pub const ERROR_CODE_REQUIRED: &str = "required";
pub const ERROR_CODE_MIN_LENGTH: &str = "too_short";
pub const ERROR_CODE_EMAIL: &str = "email";
pub const ERROR_CODE_UPPERCASE: &str = "uppercase";
pub const ERROR_CODE_DIGIT: &str = "digit";

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A validation failure with a stable code and a `{param}` message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
    pub params: HashMap<String, String>,
}

impl ValidationError {
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            params: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// The message with every `{key}` replaced by its parameter.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut result = self.message.clone();
        for (key, value) in &self.params {
            result = result.replace(&format!("{{{key}}}"), value);
        }
        result
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_message())
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of one validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationResult {
    #[default]
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Valid => None,
            Self::Invalid(e) => Some(e),
        }
    }

    /// First error wins.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::Valid => other,
            Self::Invalid(_) => self,
        }
    }
}

// ---------------------------------------------------------------------------
// Validator trait
// ---------------------------------------------------------------------------

/// A predicate over values of type `T`.
pub trait Validator<T: ?Sized>: Send + Sync {
    fn validate(&self, value: &T) -> ValidationResult;

    /// The message template reported on failure.
    fn error_message(&self) -> &str;
}

fn check(ok: bool, code: &'static str, message: &str) -> ValidationResult {
    if ok {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(ValidationError::new(code, message))
    }
}

// ---------------------------------------------------------------------------
// Built-in validators
// ---------------------------------------------------------------------------

/// Non-empty value. Whitespace counts as content, as in the page.
#[derive(Debug, Clone)]
pub struct Required {
    pub message: Cow<'static, str>,
}

impl Required {
    #[must_use]
    pub fn new() -> Self {
        Self {
            message: Cow::Borrowed("This field is required"),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }
}

impl Default for Required {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator<str> for Required {
    fn validate(&self, value: &str) -> ValidationResult {
        check(!value.is_empty(), ERROR_CODE_REQUIRED, &self.message)
    }

    fn error_message(&self) -> &str {
        &self.message
    }
}

/// At least `min` characters (Unicode scalar values).
#[derive(Debug, Clone)]
pub struct MinLength {
    pub min: usize,
    pub message: Cow<'static, str>,
}

impl MinLength {
    #[must_use]
    pub fn new(min: usize) -> Self {
        Self {
            min,
            message: Cow::Borrowed("Must be at least {min} characters"),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }
}

impl Validator<str> for MinLength {
    fn validate(&self, value: &str) -> ValidationResult {
        let len = value.chars().count();
        if len < self.min {
            ValidationResult::Invalid(
                ValidationError::new(ERROR_CODE_MIN_LENGTH, self.message.as_ref())
                    .with_param("min", self.min)
                    .with_param("actual", len),
            )
        } else {
            ValidationResult::Valid
        }
    }

    fn error_message(&self) -> &str {
        &self.message
    }
}

/// Email address of the form `local@label.label.tld`.
///
/// - local part: one or more of `[A-Za-z0-9_.-]`
/// - one or more domain labels of `[A-Za-z0-9_-]`, each followed by `.`
/// - a final label of 2 to 4 such characters
///
/// Empty input passes; pair with [`Required`].
#[derive(Debug, Clone)]
pub struct Email {
    pub message: Cow<'static, str>,
}

impl Email {
    #[must_use]
    pub fn new() -> Self {
        Self {
            message: Cow::Borrowed("Invalid email address"),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// The address check itself.
    #[must_use]
    pub fn is_valid_address(value: &str) -> bool {
        fn word(c: char) -> bool {
            c.is_ascii_alphanumeric() || c == '_' || c == '-'
        }

        let Some((local, domain)) = value.split_once('@') else {
            return false;
        };
        if local.is_empty() || !local.chars().all(|c| word(c) || c == '.') {
            return false;
        }
        let Some((labels, tld)) = domain.rsplit_once('.') else {
            return false;
        };
        let tld_len = tld.chars().count();
        labels.split('.').all(|l| !l.is_empty() && l.chars().all(word))
            && (2..=4).contains(&tld_len)
            && tld.chars().all(word)
    }
}

impl Default for Email {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator<str> for Email {
    fn validate(&self, value: &str) -> ValidationResult {
        if value.is_empty() {
            return ValidationResult::Valid;
        }
        check(Self::is_valid_address(value), ERROR_CODE_EMAIL, &self.message)
    }

    fn error_message(&self) -> &str {
        &self.message
    }
}

/// At least one ASCII uppercase letter.
#[derive(Debug, Clone)]
pub struct ContainsUppercase {
    pub message: Cow<'static, str>,
}

impl ContainsUppercase {
    #[must_use]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Validator<str> for ContainsUppercase {
    fn validate(&self, value: &str) -> ValidationResult {
        check(
            value.chars().any(|c| c.is_ascii_uppercase()),
            ERROR_CODE_UPPERCASE,
            &self.message,
        )
    }

    fn error_message(&self) -> &str {
        &self.message
    }
}

/// At least one ASCII digit.
#[derive(Debug, Clone)]
pub struct ContainsDigit {
    pub message: Cow<'static, str>,
}

impl ContainsDigit {
    #[must_use]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Validator<str> for ContainsDigit {
    fn validate(&self, value: &str) -> ValidationResult {
        check(
            value.chars().any(|c| c.is_ascii_digit()),
            ERROR_CODE_DIGIT,
            &self.message,
        )
    }

    fn error_message(&self) -> &str {
        &self.message
    }
}

// ---------------------------------------------------------------------------
// FieldRules
// ---------------------------------------------------------------------------

/// Ordered validator chain for one field; the first failure is reported.
#[derive(Default)]
pub struct FieldRules {
    validators: Vec<Box<dyn Validator<str>>>,
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRules")
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl FieldRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rule(mut self, validator: impl Validator<str> + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn validate(&self, value: &str) -> ValidationResult {
        for validator in &self.validators {
            let result = validator.validate(value);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Username: required, three characters minimum.
    #[must_use]
    pub fn username() -> Self {
        Self::new()
            .rule(Required::new().with_message("Username is required"))
            .rule(MinLength::new(3).with_message("Username must be at least {min} characters"))
    }

    /// Email: required, well-formed.
    #[must_use]
    pub fn email() -> Self {
        Self::new()
            .rule(Required::new().with_message("Email is required"))
            .rule(Email::new().with_message("Please enter a valid email address"))
    }

    /// Password: required, eight characters, an uppercase letter and a digit.
    #[must_use]
    pub fn password() -> Self {
        Self::new()
            .rule(Required::new().with_message("Password is required"))
            .rule(MinLength::new(8).with_message("Password must be at least {min} characters"))
            .rule(ContainsUppercase::new(
                "Password must contain at least one uppercase letter",
            ))
            .rule(ContainsDigit::new("Password must contain at least one number"))
    }
}

// ---------------------------------------------------------------------------
// Password strength
// ---------------------------------------------------------------------------

/// Strength percentage: 25 points each for length >= 8, an uppercase
/// letter, a digit, and a character outside `[A-Za-z0-9]`.
#[must_use]
pub fn password_strength(password: &str) -> u8 {
    let checks = [
        password.chars().count() >= 8,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    checks.iter().filter(|&&ok| ok).count() as u8 * 25
}

/// Strength bucket shown under the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrengthLevel {
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLevel {
    #[must_use]
    pub const fn from_percent(percent: u8) -> Self {
        match percent {
            0..=25 => Self::Weak,
            26..=50 => Self::Fair,
            51..=75 => Self::Good,
            _ => Self::Strong,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Strong => "Strong",
        }
    }

    /// Bar colour.
    #[must_use]
    pub const fn color(self) -> Rgba {
        match self {
            Self::Weak => Rgba::rgb(0xEF, 0x44, 0x44),
            Self::Fair => Rgba::rgb(0xF5, 0x9E, 0x0B),
            Self::Good => Rgba::rgb(0xFC, 0xD3, 0x4D),
            Self::Strong => Rgba::rgb(0x10, 0xB9, 0x81),
        }
    }
}

/// Strength meter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub percent: u8,
    pub level: StrengthLevel,
}

impl PasswordStrength {
    #[must_use]
    pub fn of(password: &str) -> Self {
        let percent = password_strength(password);
        Self {
            percent,
            level: StrengthLevel::from_percent(percent),
        }
    }

    /// Text under the bar.
    #[must_use]
    pub fn caption(&self) -> String {
        format!("Password strength: {}", self.level.label())
    }
}

// ---------------------------------------------------------------------------
// RegistrationForm
// ---------------------------------------------------------------------------

/// The three registration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Email,
    Password,
}

impl Field {
    pub const ALL: [Self; 3] = [Self::Username, Self::Email, Self::Password];

    const fn index(self) -> usize {
        match self {
            Self::Username => 0,
            Self::Email => 1,
            Self::Password => 2,
        }
    }
}

#[derive(Debug, Default)]
struct FieldState {
    value: String,
    touched: bool,
    error: Option<ValidationError>,
}

/// Registration form state with touched-field validation.
#[derive(Debug)]
pub struct RegistrationForm {
    rules: [FieldRules; 3],
    fields: [FieldState; 3],
    strength: Option<PasswordStrength>,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationForm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: [
                FieldRules::username(),
                FieldRules::email(),
                FieldRules::password(),
            ],
            fields: Default::default(),
            strength: None,
        }
    }

    /// Field edited. Re-validates only fields already touched; password
    /// edits always refresh the strength meter.
    pub fn input(&mut self, field: Field, value: impl Into<String>) {
        let state = &mut self.fields[field.index()];
        state.value = value.into();
        if field == Field::Password {
            self.strength = Some(PasswordStrength::of(&state.value));
        }
        if self.fields[field.index()].touched {
            self.validate_field(field);
        }
    }

    /// Field lost focus: mark touched and validate.
    pub fn blur(&mut self, field: Field) -> bool {
        self.fields[field.index()].touched = true;
        self.validate_field(field)
    }

    /// Validate every field. On success notify, reset, and return `true`;
    /// otherwise notify the failure and keep the values.
    pub fn submit<N: NotificationSink + ?Sized>(&mut self, sink: &mut N) -> bool {
        let mut valid = true;
        for field in Field::ALL {
            self.fields[field.index()].touched = true;
            valid &= self.validate_field(field);
        }
        if valid {
            crate::info!("registration form submitted");
            sink.notify(
                Notification::new(
                    "Form Submitted Successfully!",
                    "All validations passed. Your data would be processed now.",
                )
                .kind(ToastKind::Success),
            );
            self.reset();
        } else {
            crate::debug!("registration form rejected");
            sink.notify(
                Notification::new("Form Submission Failed", "Please fix the errors and try again.")
                    .kind(ToastKind::Error),
            );
        }
        valid
    }

    /// Clear values, errors, touched flags and the strength meter.
    pub fn reset(&mut self) {
        self.fields = Default::default();
        self.strength = None;
    }

    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        &self.fields[field.index()].value
    }

    #[must_use]
    pub fn is_touched(&self, field: Field) -> bool {
        self.fields[field.index()].touched
    }

    #[must_use]
    pub fn error(&self, field: Field) -> Option<&ValidationError> {
        self.fields[field.index()].error.as_ref()
    }

    #[must_use]
    pub fn error_message(&self, field: Field) -> Option<String> {
        self.error(field).map(ValidationError::format_message)
    }

    /// `None` until the password is edited (and again after a reset).
    #[must_use]
    pub fn strength(&self) -> Option<PasswordStrength> {
        self.strength
    }

    fn validate_field(&mut self, field: Field) -> bool {
        let i = field.index();
        let result = self.rules[i].validate(&self.fields[i].value);
        let valid = result.is_valid();
        self.fields[i].error = match result {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        };
        valid
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
