//! 인증 요청 DTO
//!
//! API Gateway를 거쳐 봉투 본문으로 도착하는 요청들의 역직렬화 대상입니다.
//! 필드 이름은 기존 클라이언트와의 호환을 위해 camelCase를 사용합니다.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 안드로이드 네이티브 Google OAuth 요청
///
/// 모바일 클라이언트가 Google SDK로 직접 발급받은 ID 토큰을
/// `code` 필드에 담아 전달합니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleOAuthRequest {
    /// Google이 발급한 ID 토큰 (JWT)
    #[validate(length(min = 1, message = "code는 필수 입력값입니다"))]
    pub code: String,

    /// 클라이언트가 사용한 리다이렉트 URI (선택)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

/// 토큰 검증 요청
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidationRequest {
    /// 검증할 자체 발급 액세스 토큰
    #[validate(length(min = 1, message = "token은 필수 입력값입니다"))]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_oauth_request_deserialization() {
        let json = r#"{"code":"eyJhbGciOi...","redirectUri":"app://callback"}"#;
        let request: GoogleOAuthRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.code, "eyJhbGciOi...");
        assert_eq!(request.redirect_uri.as_deref(), Some("app://callback"));
    }

    #[test]
    fn test_empty_code_fails_validation() {
        let request = GoogleOAuthRequest {
            code: String::new(),
            redirect_uri: None,
        };
        assert!(request.validate().is_err());
    }
}
