//! Views
//!
//! A view is a template name plus the model it is rendered with. Rendering is delegated to a
//! [`ViewRenderer`]; the default one answers with the view as JSON.

use salvo::prelude::{Json, Response};
use serde::Serialize;
use serde_json::{Map, Value, json};

pub(crate) const LIST: &str = "user/list";
pub(crate) const DETAIL: &str = "user/detail";
pub(crate) const CREATE_FORM: &str = "user/createForm";
pub(crate) const CREATE_CONFIRM: &str = "user/createConfirm";
pub(crate) const CREATE_COMPLETE: &str = "user/createComplete";
pub(crate) const UPDATE_FORM: &str = "user/updateForm";
pub(crate) const UPDATE_CONFIRM: &str = "user/updateConfirm";
pub(crate) const UPDATE_COMPLETE: &str = "user/updateComplete";
pub(crate) const DELETE_COMPLETE: &str = "user/deleteComplete";

/// Model keys.
pub(crate) mod keys {
    pub(crate) const USER_FORM: &str = "user_form";
    pub(crate) const FIELD_ERRORS: &str = "field_errors";
    pub(crate) const MESSAGES: &str = "messages";
    pub(crate) const USER: &str = "user";
    pub(crate) const USER_LIST: &str = "user_list";
    pub(crate) const FILTER: &str = "filter";
}

/// Message codes.
pub(crate) mod codes {
    pub(crate) const DUPLICATE_KEY: &str = "user.duplicateKey";
    pub(crate) const NOT_FOUND: &str = "user.notFound";
    pub(crate) const SQL_ERROR: &str = "common.sqlError";
}

/// A named view and its model.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct View {
    pub(crate) name: &'static str,
    pub(crate) model: Map<String, Value>,
}

impl View {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            model: Map::new(),
        }
    }

    /// Add a serialized value to the model.
    pub(crate) fn with<T>(mut self, key: &str, value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        self.model
            .insert(key.to_string(), serde_json::to_value(value)?);

        Ok(self)
    }

    /// Append an error message with its arguments to the model's `messages`.
    pub(crate) fn with_error(mut self, code: &str, args: &[&str]) -> Self {
        let message = json!({ "level": "error", "code": code, "args": args });

        match self
            .model
            .entry(keys::MESSAGES)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(messages) => messages.push(message),
            other => *other = Value::Array(vec![message]),
        }

        self
    }

    /// Message codes attached to the model, in order.
    #[cfg(test)]
    pub(crate) fn message_codes(&self) -> Vec<&str> {
        self.model
            .get(keys::MESSAGES)
            .and_then(Value::as_array)
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|message| message.get("code").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Renders views into responses.
pub(crate) trait ViewRenderer: Send + Sync {
    fn render(&self, view: View, res: &mut Response);
}

/// Renders `{ "view": <name>, "model": <model> }`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct JsonViewRenderer;

impl ViewRenderer for JsonViewRenderer {
    fn render(&self, view: View, res: &mut Response) {
        res.render(Json(json!({ "view": view.name, "model": view.model })));
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn with_serializes_into_model() -> TestResult {
        let view = View::new(LIST).with(keys::USER_LIST, &["u1", "u2"])?;

        assert_eq!(view.model.get(keys::USER_LIST), Some(&json!(["u1", "u2"])));

        Ok(())
    }

    #[test]
    fn with_error_appends_messages_in_order() {
        let view = View::new(CREATE_FORM)
            .with_error(codes::DUPLICATE_KEY, &["u1"])
            .with_error(codes::SQL_ERROR, &["too long"]);

        assert_eq!(
            view.message_codes(),
            vec![codes::DUPLICATE_KEY, codes::SQL_ERROR]
        );
        assert_eq!(
            view.model.get(keys::MESSAGES).and_then(|m| m.get(0)),
            Some(&json!({ "level": "error", "code": "user.duplicateKey", "args": ["u1"] }))
        );
    }
}
