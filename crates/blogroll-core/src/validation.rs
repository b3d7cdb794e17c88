//! Form validation for posts, comments and sign-ups.
//!
//! Each `validate_*` function takes the raw submitted input and returns either
//! the cleaned, typed value or [`FieldErrors`] for re-rendering the form.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::Group;

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Field name -> messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed(REQUIRED)));
    }
    Ok(())
}

fn valid_username(value: &str) -> Result<(), ValidationError> {
    let ok = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !ok {
        return Err(ValidationError::new("invalid_username").with_message(Cow::Borrowed(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        )));
    }
    Ok(())
}

/// Text fields of the post form. The image travels separately as [`ImageUpload`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostInput {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    /// Group id as submitted by the select box; empty means "no group".
    #[serde(default)]
    pub group: Option<String>,
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPost {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<ImageUpload>,
}

/// Validate a post submission against the groups offered in the form.
pub fn validate_post(
    input: &PostInput,
    image: Option<ImageUpload>,
    groups: &[Group],
) -> Result<ValidatedPost, FieldErrors> {
    let mut errors = match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => e.into(),
    };

    let group_id = match input.group.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
            _ => {
                errors.add("group", INVALID_CHOICE);
                None
            }
        },
    };

    if let Some(upload) = &image {
        if sniff_image(&upload.bytes).is_none() {
            errors.add("image", INVALID_IMAGE);
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedPost {
        text: input.text.trim().to_string(),
        group_id,
        image,
    })
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub text: String,
}

/// Validate a comment submission, returning the cleaned text.
pub fn validate_comment(input: &CommentInput) -> Result<String, FieldErrors> {
    input.validate()?;
    Ok(input.text.trim().to_string())
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupInput {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1 to 150 characters."),
        custom(function = "valid_username")
    )]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,
}

/// Validate a sign-up form. Username uniqueness is checked by the caller.
pub fn validate_signup(input: &SignupInput) -> Result<SignupInput, FieldErrors> {
    let trimmed = SignupInput {
        username: input.username.trim().to_string(),
        email: input.email.trim().to_string(),
        password: input.password.clone(),
    };

    trimmed.validate()?;
    Ok(trimmed)
}

/// Detect the image format from magic bytes.
pub fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpeg")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}
