//! Client-side validation of user input, run before any request is issued.
//!
//! Each form returns the wire payload on success and an
//! [`ApiError::Validation`](crate::error::ApiError) with a form-level message
//! (and per-field messages where a specific field is at fault) on failure.

pub mod account;
pub mod ramp;

pub use account::{SignInForm, SignUpForm};
pub use ramp::RampForm;

pub const MSG_ALL_FIELDS_REQUIRED: &str = "모든 필드를 입력해주세요.";

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
