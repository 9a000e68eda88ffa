//! Mapping of AWS SDK errors onto the cs-core taxonomy
//!
//! Classification uses the service error code first and the HTTP status
//! second. Display text is only used for the message.

use aws_sdk_s3::error::SdkError;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

use cs_core::Error;

const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchBucket",
    "NoSuchKey",
    "NotFound",
    "InvalidInstanceID.NotFound",
];

const CONFLICT_CODES: &[&str] = &["BucketAlreadyExists", "BucketAlreadyOwnedByYou"];

const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "AuthFailure",
    "ExpiredToken",
    "InvalidAccessKeyId",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "UnauthorizedOperation",
];

/// Classify an SDK error; `subject` names what was being addressed
pub(crate) fn classify<E>(err: SdkError<E>, subject: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let code = err.code().map(str::to_owned);
    let status = err.raw_response().map(|r| r.status().as_u16());
    let message = DisplayErrorContext(&err).to_string();
    tracing::debug!(subject, ?code, ?status, "aws request failed");

    classify_parts(code.as_deref(), status, subject, message)
}

fn classify_parts(code: Option<&str>, status: Option<u16>, subject: &str, message: String) -> Error {
    match (code, status) {
        (Some(code), _) if NOT_FOUND_CODES.contains(&code) => Error::NotFound(subject.to_string()),
        (Some(code), _) if CONFLICT_CODES.contains(&code) => {
            Error::AlreadyExists(subject.to_string())
        }
        (Some("BucketNotEmpty"), _) => Error::NotEmpty(subject.to_string()),
        (Some(code), _) if AUTH_CODES.contains(&code) => Error::Auth(message),
        (_, Some(404)) => Error::NotFound(subject.to_string()),
        (_, Some(401 | 403)) => Error::Auth(message),
        _ => Error::Remote(message),
    }
}
