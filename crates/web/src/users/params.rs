//! Request parameters
//!
//! Step names and form fields are read from the query string and, when present, a url-encoded
//! or multipart form body. Body values win over query values of the same name.

use std::collections::BTreeMap;

use salvo::Request;
use tracing::debug;

use roster::{
    users::{UserFilter, UserForm},
    validation::Field,
};

use crate::users::workflow::Step;

pub(crate) const NOT_FOUND_PARAM: &str = "notFound";

/// One workflow request: the step to run and the submitted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Submission {
    pub(crate) step: Step,
    pub(crate) form: UserForm,
}

impl Submission {
    pub(crate) async fn read(req: &mut Request) -> Self {
        let mut params: BTreeMap<String, String> = req
            .queries()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        match req.form_data().await {
            Ok(form_data) => params.extend(
                form_data
                    .fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone())),
            ),
            Err(source) => debug!("request has no form body: {source}"),
        }

        Self::from_params(&params)
    }

    fn from_params(params: &BTreeMap<String, String>) -> Self {
        let field = |field: Field| params.get(field.as_str()).cloned();

        Self {
            step: Step::select(|name| params.contains_key(name)),
            form: UserForm {
                id: field(Field::Id),
                display_name: field(Field::DisplayName),
                secret: field(Field::Secret),
                contact: field(Field::Contact),
                note: field(Field::Note),
            },
        }
    }
}

/// List filter from the query string. Blank values do not filter.
pub(crate) fn list_filter(req: &Request) -> UserFilter {
    let text = |name: &str| {
        req.query::<String>(name)
            .filter(|value| !value.trim().is_empty())
    };

    UserFilter {
        id_prefix: text("id_prefix"),
        name_contains: text("name_contains"),
        active: req.query::<bool>("active"),
    }
}
