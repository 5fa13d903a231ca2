//! Multipart upload form parsing and validation.
//!
//! The create endpoint accepts `title`, `width`, `height` and `image` parts.
//! [`RawUpload`] collects them as sent; [`RawUpload::clean`] turns them into a
//! typed [`CleanUpload`] or a [`FieldErrors`] map keyed by field name.

use std::borrow::Cow;
use std::collections::BTreeMap;

use axum::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;
use serde::Serialize;
use validator::{Validate, ValidationError};

/// Maximum title length, in characters.
pub const MAX_TITLE_CHARS: usize = 80;

const REQUIRED: &str = "This field is required.";
const EMPTY_FILE: &str = "The submitted file is empty.";
const NOT_AN_INTEGER: &str = "Enter a whole number.";
const UNNAMED_TITLE: &str = "upload";
const TOO_LARGE: &str = "Ensure this value is less than or equal to 4294967295.";

/// Validation messages grouped by form field.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn extend_from(&mut self, errors: &validator::ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .clone()
                    .unwrap_or_else(|| Cow::Owned(err.code.to_string()));
                self.add(&field, message);
            }
        }
    }
}

/// An uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// Form fields exactly as received.
#[derive(Debug, Default)]
pub struct RawUpload {
    pub title: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub image: Option<UploadedFile>,
}

/// A validated upload.
#[derive(Debug, Clone)]
pub struct CleanUpload {
    /// Trimmed title, `None` when blank or omitted.
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    pub image: UploadedFile,
}

/// Declarative rules for the scalar fields.
#[derive(Debug, Validate)]
struct UploadFields {
    #[validate(custom(function = "validate_title"))]
    title: String,

    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    width: i64,

    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    height: i64,
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let length = title.chars().count();
    if length > MAX_TITLE_CHARS {
        return Err(ValidationError::new("max_length").with_message(Cow::Owned(format!(
            "Ensure this value has at most {} characters (it has {}).",
            MAX_TITLE_CHARS, length
        ))));
    }
    Ok(())
}

impl RawUpload {
    /// Collect the known parts of a multipart body. Unknown parts are
    /// ignored; a repeated part keeps the last value.
    ///
    /// An `image` part without a filename is a plain text field, not a file,
    /// and is treated as missing.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut raw = RawUpload::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "title" => raw.title = Some(field.text().await?),
                "width" => raw.width = Some(field.text().await?),
                "height" => raw.height = Some(field.text().await?),
                "image" => {
                    let filename = field.file_name().map(str::to_string);
                    let data = field.bytes().await?;
                    raw.image = filename.map(|filename| UploadedFile { filename, data });
                }
                _ => {}
            }
        }

        Ok(raw)
    }

    /// Validate every field, collecting all failures.
    pub fn clean(self) -> Result<CleanUpload, FieldErrors> {
        let mut errors = FieldErrors::default();

        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        let width = parse_integer(self.width.as_deref(), "width", &mut errors);
        let height = parse_integer(self.height.as_deref(), "height", &mut errors);

        let fields = UploadFields {
            title: title.to_string(),
            width: width.unwrap_or(0),
            height: height.unwrap_or(0),
        };
        if let Err(e) = fields.validate() {
            errors.extend_from(&e);
        }

        let width = to_dimension(fields.width, "width", &mut errors);
        let height = to_dimension(fields.height, "height", &mut errors);

        let image = match self.image {
            None => {
                errors.add("image", REQUIRED);
                None
            }
            Some(file) if file.filename.is_empty() => {
                errors.add("image", REQUIRED);
                None
            }
            Some(file) if file.data.is_empty() => {
                errors.add("image", EMPTY_FILE);
                None
            }
            Some(file) => Some(file),
        };

        match image {
            Some(image) if errors.is_empty() => Ok(CleanUpload {
                title: (!title.is_empty()).then(|| title.to_string()),
                width,
                height,
                image,
            }),
            _ => Err(errors),
        }
    }
}

/// Parse an optional integer field. Blank means absent.
fn parse_integer(value: Option<&str>, field: &str, errors: &mut FieldErrors) -> Option<i64> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match value.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, NOT_AN_INTEGER);
            None
        }
    }
}

/// Narrow a validated, non-negative value to a pixel dimension.
fn to_dimension(value: i64, field: &str, errors: &mut FieldErrors) -> u32 {
    if value < 0 {
        return 0;
    }
    u32::try_from(value).unwrap_or_else(|_| {
        errors.add(field, TOO_LARGE);
        0
    })
}

/// Title used when the client sent none: the filename up to its first `.`,
/// capped at [`MAX_TITLE_CHARS`].
///
/// Leading dots are skipped, so `.png` gives `png`. A name with nothing else
/// in it gives `upload`.
pub fn title_from_filename(filename: &str) -> String {
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = basename
        .trim()
        .trim_start_matches('.')
        .split('.')
        .next()
        .unwrap_or_default();

    if stem.is_empty() {
        return UNNAMED_TITLE.to_string();
    }
    stem.chars().take(MAX_TITLE_CHARS).collect()
}
