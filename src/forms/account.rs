use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::{SignInPayload, SignUpPayload};

use super::{is_blank, MSG_ALL_FIELDS_REQUIRED};

pub const MSG_CREDENTIALS_REQUIRED: &str = "이메일과 비밀번호를 입력해주세요.";
pub const MSG_INVALID_PHONE: &str = "유효한 휴대폰 번호를 입력해주세요.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
}

impl SignUpForm {
    pub fn validate(&self) -> ApiResult<SignUpPayload> {
        if [&self.email, &self.password, &self.name, &self.phone]
            .iter()
            .any(|v| is_blank(v))
        {
            return Err(ApiError::validation(MSG_ALL_FIELDS_REQUIRED));
        }
        if !is_valid_phone(&self.phone) {
            return Err(ApiError::validation_fields(
                MSG_INVALID_PHONE,
                [("phone".to_string(), MSG_INVALID_PHONE.to_string())].into(),
            ));
        }

        Ok(SignUpPayload {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> ApiResult<SignInPayload> {
        if is_blank(&self.email) || self.password.is_empty() {
            return Err(ApiError::validation(MSG_CREDENTIALS_REQUIRED));
        }
        Ok(SignInPayload {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

/// 9 to 11 digits once hyphens, spaces and other separators are removed
pub fn is_valid_phone(value: &str) -> bool {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    (9..=11).contains(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up() -> SignUpForm {
        SignUpForm {
            email: " admin@ramp.kr ".to_string(),
            password: "secret".to_string(),
            name: "관리자".to_string(),
            phone: "010-1234-5678".to_string(),
        }
    }

    #[test]
    fn phone_digits_ignore_separators() {
        assert!(is_valid_phone("010-1234-5678"));
        assert!(is_valid_phone("02 123 4567"));
        assert!(!is_valid_phone("1234-567"));
        assert!(!is_valid_phone("010-1234-56789"));
    }

    #[test]
    fn sign_up_requires_every_field() {
        let form = SignUpForm {
            name: "  ".to_string(),
            ..sign_up()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), MSG_ALL_FIELDS_REQUIRED);
    }

    #[test]
    fn sign_up_rejects_short_phone_with_field_error() {
        let form = SignUpForm {
            phone: "010-12".to_string(),
            ..sign_up()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(
            err.field_errors().and_then(|f| f.get("phone")).map(String::as_str),
            Some(MSG_INVALID_PHONE)
        );
    }

    #[test]
    fn sign_up_payload_is_trimmed() {
        let payload = sign_up().validate().unwrap();
        assert_eq!(payload.email, "admin@ramp.kr");
        assert_eq!(payload.phone, "010-1234-5678");
    }

    #[test]
    fn sign_in_needs_email_and_password() {
        let form = SignInForm {
            email: "a@b.kr".to_string(),
            password: String::new(),
        };
        assert_eq!(form.validate().unwrap_err().to_string(), MSG_CREDENTIALS_REQUIRED);
    }
}
