use url::Url;
use validator::ValidateEmail;

use super::domain::{ProfileFields, SubmittedProfile};

/// Validation errors raised before any store or storage call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("{field} must be an absolute http(s) URL")]
    InvalidUrl { field: &'static str },
    #[error("{field} is not a valid email address")]
    InvalidEmail { field: &'static str },
    #[error("profile photo must be an image (got '{content_type}')")]
    UnsupportedMediaType { content_type: String },
    #[error("profile photo is {size} bytes, limit is {limit}")]
    PayloadTooLarge { size: usize, limit: usize },
}

/// Normalizes form input: trims text, turns blank optionals into `None`, and
/// checks required fields, URLs and email addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn check_profile(&self, fields: ProfileFields) -> Result<ProfileFields, ValidationError> {
        let profile = ProfileFields {
            name: required("name", fields.name)?,
            specialization: required("specialization", fields.specialization)?,
            status: fields.status,
            description: required("description", fields.description)?,
            portfolio_link: url_field("portfolio_link", fields.portfolio_link)?,
            profile_photo_url: url_field("profile_photo_url", fields.profile_photo_url)?,
            email: optional(fields.email),
            phone_number: optional(fields.phone_number),
        };

        if let Some(email) = &profile.email {
            check_email("email", email)?;
        }

        Ok(profile)
    }

    pub fn check_submission(
        &self,
        submission: SubmittedProfile,
    ) -> Result<SubmittedProfile, ValidationError> {
        let email = required("email", submission.email)?;
        check_email("email", &email)?;

        Ok(SubmittedProfile {
            name: required("name", submission.name)?,
            email,
            specialization: required("specialization", submission.specialization)?,
            status: submission.status,
            description: required("description", submission.description)?,
            portfolio_link: url_field("portfolio_link", submission.portfolio_link)?,
            profile_photo_url: url_field("profile_photo_url", submission.profile_photo_url)?,
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn url_field(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ValidationError> {
    let Some(raw) = optional(value) else {
        return Ok(None);
    };

    match Url::parse(&raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(Some(raw)),
        _ => Err(ValidationError::InvalidUrl { field }),
    }
}

fn check_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail { field })
    }
}
