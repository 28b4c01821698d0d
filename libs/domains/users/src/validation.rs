use validator::{Validate, ValidationError};

use crate::error::{UserError, UserResult};
use crate::models::{UserPayload, ValidUser};

/// Fields are reported in this order; only the first failure is returned.
const FIELD_ORDER: [&str; 3] = ["name", "email", "age"];

/// Check presence, range and format of a user payload.
///
/// Pure: email uniqueness is checked by the service against the store.
pub fn validate_user(payload: &UserPayload) -> UserResult<ValidUser> {
    if let Err(errors) = payload.validate() {
        let fields = errors.field_errors();
        for field in FIELD_ORDER {
            if let Some(errs) = fields.get(field).filter(|errs| !errs.is_empty()) {
                return Err(classify(field, errs, payload));
            }
        }
    }

    let name = payload.name.clone().ok_or(UserError::MissingField("name"))?;
    let email = payload.email.clone().ok_or(UserError::MissingField("email"))?;
    let age = payload.age.ok_or(UserError::MissingField("age"))?;
    let age = i32::try_from(age).map_err(|_| UserError::OutOfRange {
        field: "age",
        value: age,
    })?;

    Ok(ValidUser { name, age, email })
}

/// An empty value also fails the format rule, so absence takes precedence.
fn classify(field: &'static str, errors: &[ValidationError], payload: &UserPayload) -> UserError {
    let has = |code: &str| errors.iter().any(|e| e.code == code);

    if has("required") || has("length") {
        UserError::MissingField(field)
    } else if has("email") {
        UserError::InvalidEmail(payload.email.clone().unwrap_or_default())
    } else if has("range") {
        UserError::OutOfRange {
            field,
            value: payload.age.unwrap_or_default(),
        }
    } else {
        UserError::MissingField(field)
    }
}
