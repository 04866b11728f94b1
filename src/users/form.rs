//! Submitted User Forms

use serde::{Deserialize, Serialize};

use crate::{
    users::{
        draft::UserDraft,
        records::{User, UserId},
    },
    validation::{Field, ViolationKind, Violations, check_field, is_valid_email},
};

/// A detached, possibly incomplete user draft as submitted by a browser.
///
/// Forms are never persisted. Each workflow step rebuilds one from the request, so every value the
/// next step needs must be rendered back to the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserForm {
    /// User id
    pub id: Option<String>,

    /// Display name
    pub display_name: Option<String>,

    /// Secret
    pub secret: Option<String>,

    /// Contact address
    pub contact: Option<String>,

    /// Note
    pub note: Option<String>,
}

impl UserForm {
    /// Pre-populate a form from a stored user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: Some(user.id.as_str().to_string()),
            display_name: Some(user.display_name.clone()),
            secret: Some(user.secret.clone()),
            contact: Some(user.contact.clone()),
            note: user.note.clone(),
        }
    }

    /// The submitted id, if it is not blank.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(UserId::from)
    }

    /// Validate required fields, length bounds and the contact address shape.
    ///
    /// Uniqueness is not checked here; it needs storage.
    #[must_use]
    pub fn validate(&self) -> Violations {
        let mut violations = Violations::new();

        check_field(Field::Id, self.id.as_deref(), &mut violations);
        check_field(
            Field::DisplayName,
            self.display_name.as_deref(),
            &mut violations,
        );
        check_field(Field::Secret, self.secret.as_deref(), &mut violations);
        check_field(Field::Contact, self.contact.as_deref(), &mut violations);
        check_field(Field::Note, self.note.as_deref(), &mut violations);

        if let Some(contact) = self.contact.as_deref()
            && !contact.trim().is_empty()
            && !is_valid_email(contact)
        {
            violations.push(Field::Contact, ViolationKind::InvalidEmail);
        }

        violations
    }

    /// Validate the form and convert it into a draft.
    ///
    /// A blank note becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns every violation found when the form is invalid.
    pub fn to_draft(&self) -> Result<UserDraft, Violations> {
        let violations = self.validate();

        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(UserDraft {
            id: UserId::new(self.id.clone().unwrap_or_default()),
            display_name: self.display_name.clone().unwrap_or_default(),
            secret: self.secret.clone().unwrap_or_default(),
            contact: self.contact.clone().unwrap_or_default(),
            note: self.note.clone().filter(|note| !note.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::validation::{DISPLAY_NAME_MAX_LEN, NOTE_MAX_LEN};

    use super::*;

    fn valid_form() -> UserForm {
        UserForm {
            id: Some("u1".to_string()),
            display_name: Some("Alice".to_string()),
            secret: Some("p".to_string()),
            contact: Some("a@x.com".to_string()),
            note: Some("first user".to_string()),
        }
    }

    #[test]
    fn valid_form_has_no_violations() {
        assert!(valid_form().validate().is_empty());
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let violations = UserForm::default().validate();

        assert!(violations.has(Field::Id));
        assert!(violations.has(Field::DisplayName));
        assert!(violations.has(Field::Secret));
        assert!(violations.has(Field::Contact));
        assert!(!violations.has(Field::Note), "note is optional");
    }

    #[test]
    fn malformed_contact_is_rejected() {
        let form = UserForm {
            contact: Some("not-an-email".to_string()),
            ..valid_form()
        };

        let violations = form.validate();

        assert_eq!(violations.len(), 1);
        assert!(violations.has(Field::Contact));
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let form = UserForm {
            display_name: Some("n".repeat(DISPLAY_NAME_MAX_LEN + 1)),
            note: Some("c".repeat(NOTE_MAX_LEN + 1)),
            ..valid_form()
        };

        let violations = form.validate();

        assert!(violations.has(Field::DisplayName));
        assert!(violations.has(Field::Note));
    }

    #[test]
    fn to_draft_keeps_values_verbatim() -> TestResult {
        let draft = valid_form().to_draft()?;

        assert_eq!(draft.id, UserId::new("u1"));
        assert_eq!(draft.display_name, "Alice");
        assert_eq!(draft.secret, "p");
        assert_eq!(draft.contact, "a@x.com");
        assert_eq!(draft.note.as_deref(), Some("first user"));

        Ok(())
    }

    #[test]
    fn blank_note_becomes_none() -> TestResult {
        let form = UserForm {
            note: Some(String::new()),
            ..valid_form()
        };

        assert_eq!(form.to_draft()?.note, None);

        Ok(())
    }

    #[test]
    fn to_draft_returns_violations_for_invalid_form() {
        let result = UserForm::default().to_draft();

        assert!(
            matches!(&result, Err(violations) if violations.len() == 4),
            "expected four violations, got {result:?}"
        );
    }

    #[test]
    fn from_user_round_trips_through_to_draft() -> TestResult {
        let user = User::created(valid_form().to_draft()?, Timestamp::UNIX_EPOCH);

        let form = UserForm::from_user(&user);

        assert_eq!(form, valid_form());

        Ok(())
    }

    #[test]
    fn blank_id_has_no_user_id() {
        let form = UserForm {
            id: Some("  ".to_string()),
            ..valid_form()
        };

        assert_eq!(form.user_id(), None);
        assert_eq!(valid_form().user_id(), Some(UserId::new("u1")));
    }
}
