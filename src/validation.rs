//! Field Validation
//!
//! Required-ness, length bounds and email shape for submitted user forms. Lengths are counted in
//! characters, matching the `VARCHAR(n)` columns the records are stored in.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Maximum length of a user id.
pub const ID_MAX_LEN: usize = 20;

/// Maximum length of a display name.
pub const DISPLAY_NAME_MAX_LEN: usize = 60;

/// Maximum length of a secret.
pub const SECRET_MAX_LEN: usize = 255;

/// Maximum length of a contact address.
pub const CONTACT_MAX_LEN: usize = 255;

/// Maximum length of a note.
pub const NOTE_MAX_LEN: usize = 1000;

static EMAIL_PATTERN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
        r"@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
        r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    ))
});

/// Submitted form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// User id
    Id,

    /// Display name
    DisplayName,

    /// Secret
    Secret,

    /// Contact address
    Contact,

    /// Note
    Note,
}

impl Field {
    /// Form parameter name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::DisplayName => "display_name",
            Self::Secret => "secret",
            Self::Contact => "contact",
            Self::Note => "note",
        }
    }

    /// Maximum length in characters.
    #[must_use]
    pub const fn max_len(self) -> usize {
        match self {
            Self::Id => ID_MAX_LEN,
            Self::DisplayName => DISPLAY_NAME_MAX_LEN,
            Self::Secret => SECRET_MAX_LEN,
            Self::Contact => CONTACT_MAX_LEN,
            Self::Note => NOTE_MAX_LEN,
        }
    }

    /// Whether a blank value is rejected.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::Note)
    }
}

/// Reason a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The field is required but blank.
    #[error("must not be blank")]
    Required,

    /// The field exceeds its maximum length.
    #[error("size must be at most {max}")]
    TooLong {
        /// Maximum length in characters
        max: usize,
    },

    /// The field is not a well-formed email address.
    #[error("must be a well-formed email address")]
    InvalidEmail,

    /// A user with this id already exists.
    #[error("is already registered")]
    Duplicate,
}

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Offending field
    pub field: Field,

    /// What is wrong with it
    pub kind: ViolationKind,
}

/// Field-level violations collected while validating a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field violation(s)", .0.len())]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// Empty set of violations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation.
    pub fn push(&mut self, field: Field, kind: ViolationKind) {
        self.0.push(Violation { field, kind });
    }

    /// Whether no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the violations in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Whether any violation concerns `field`.
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.0.iter().any(|violation| violation.field == field)
    }

    /// Violation messages grouped by form parameter name.
    #[must_use]
    pub fn messages_by_field(&self) -> BTreeMap<&'static str, Vec<String>> {
        let mut grouped: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

        for violation in &self.0 {
            grouped
                .entry(violation.field.as_str())
                .or_default()
                .push(violation.kind.to_string());
        }

        grouped
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Check a single field against its required-ness and length bound.
pub fn check_field(field: Field, value: Option<&str>, violations: &mut Violations) {
    let value = value.unwrap_or_default();

    if value.trim().is_empty() {
        if field.is_required() {
            violations.push(field, ViolationKind::Required);
        }

        return;
    }

    if value.chars().count() > field.max_len() {
        violations.push(
            field,
            ViolationKind::TooLong {
                max: field.max_len(),
            },
        );
    }
}

/// Whether `value` is a syntactically valid email address.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, _domain)) = value.rsplit_once('@') else {
        return false;
    };

    if local.chars().count() > 64 {
        return false;
    }

    EMAIL_PATTERN
        .as_ref()
        .is_ok_and(|pattern| pattern.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_field_is_rejected() {
        let mut violations = Violations::new();

        check_field(Field::Id, Some("  "), &mut violations);
        check_field(Field::DisplayName, None, &mut violations);

        assert!(violations.has(Field::Id));
        assert!(violations.has(Field::DisplayName));
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn blank_optional_field_is_accepted() {
        let mut violations = Violations::new();

        check_field(Field::Note, None, &mut violations);
        check_field(Field::Note, Some(""), &mut violations);

        assert!(violations.is_empty());
    }

    #[test]
    fn length_is_counted_in_characters() {
        let mut violations = Violations::new();

        check_field(Field::Id, Some(&"é".repeat(ID_MAX_LEN)), &mut violations);

        assert!(violations.is_empty(), "20 characters should fit: {violations:?}");

        check_field(Field::Id, Some(&"a".repeat(ID_MAX_LEN + 1)), &mut violations);

        assert_eq!(
            violations.iter().map(|v| v.kind.clone()).collect::<Vec<_>>(),
            vec![ViolationKind::TooLong { max: ID_MAX_LEN }]
        );
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(is_valid_email("test@stnet.co.jp"));

        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a..b@x.com"));
        assert!(!is_valid_email(".a@x.com"));
        assert!(!is_valid_email("a@-x.com"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email(&format!("{}@x.com", "a".repeat(65))));
    }

    #[test]
    fn messages_are_grouped_by_field() {
        let mut violations = Violations::new();

        violations.push(Field::Contact, ViolationKind::InvalidEmail);
        violations.push(Field::Id, ViolationKind::Duplicate);

        let messages = violations.messages_by_field();

        assert_eq!(
            messages.get("contact"),
            Some(&vec!["must be a well-formed email address".to_string()])
        );
        assert_eq!(
            messages.get("id"),
            Some(&vec!["is already registered".to_string()])
        );
    }
}
