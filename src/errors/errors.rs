//! 애플리케이션 전역에서 사용하는 에러 시스템
//!
//! 브로커 기반 인증 마이크로서비스를 위한 통합 에러 처리 시스템입니다.
//! `thiserror`를 사용하여 타입 안전하고 일관된 에러 처리를 제공하며,
//! 모든 에러는 라우터 경계에서 단 한 번 응답 봉투(ResponseEnvelope)로 변환됩니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::errors::AppError;
//!
//! fn parse_request(body: &str) -> Result<GoogleOAuthRequest, AppError> {
//!     serde_json::from_str(body)
//!         .map_err(|e| AppError::BadRequest(format!("잘못된 요청 형식입니다: {}", e)))
//! }
//! ```

use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// 인증 서비스에서 발생할 수 있는 모든 종류의 에러를 포괄하는 열거형입니다.
/// 핸들러에서 값으로 반환되며, 라우터가 상태 코드와 JSON 본문으로 변환합니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 잘못된 입력 또는 검증 불가능한 프로바이더 토큰 (400 Bad Request)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 인증 정보 누락 또는 무효 (401 Unauthorized)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 자체 발급 토큰 검증 실패 (401 Unauthorized)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// 외부 프로바이더 호출 실패 또는 응답 파싱 불가 (502 Bad Gateway)
    #[error("Federation error: {0}")]
    FederationError(String),

    /// 피어 서비스가 보고한 실패 (피어가 지정한 상태 코드 그대로 전달)
    #[error("Remote error [{code}]: {message}")]
    RemoteError { code: u16, message: String },

    /// 피어 서비스 응답이 제한 시간 내에 도착하지 않음 (504 Gateway Timeout)
    #[error("Remote call timed out: {0}")]
    RemoteTimeout(String),

    /// 상관관계 대기가 제한 시간을 초과함 (504 Gateway Timeout)
    #[error("Correlation timed out: {0}")]
    CorrelationTimeout(String),

    /// 동일한 상관관계 ID가 이미 대기중 - 호출자 버그 (500 Internal Server Error)
    #[error("Duplicate correlation id: {0}")]
    DuplicateCorrelation(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 에러를 HTTP 호환 상태 코드로 변환합니다.
    ///
    /// 응답 봉투의 `statusCode` 필드에 그대로 실립니다.
    /// `RemoteError`는 피어가 보고한 코드를 투명하게 전달합니다.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::Unauthorized(_) | AppError::InvalidToken(_) => 401,
            AppError::FederationError(_) => 502,
            AppError::RemoteError { code, .. } => *code,
            AppError::RemoteTimeout(_) | AppError::CorrelationTimeout(_) => 504,
            AppError::DuplicateCorrelation(_) | AppError::InternalError(_) => 500,
        }
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_status_code() {
        let error = AppError::BadRequest("code is required".to_string());
        assert_eq!(error.status_code(), 400);
    }

    #[test]
    fn test_unauthorized_status_code() {
        let error = AppError::Unauthorized("Missing credentials".to_string());
        assert_eq!(error.status_code(), 401);
    }

    #[test]
    fn test_invalid_token_status_code() {
        let error = AppError::InvalidToken("signature mismatch".to_string());
        assert_eq!(error.status_code(), 401);
    }

    #[test]
    fn test_remote_error_passes_peer_code() {
        let error = AppError::RemoteError {
            code: 409,
            message: "email already exists".to_string(),
        };
        assert_eq!(error.status_code(), 409);
        assert!(error.to_string().contains("409"));
        assert!(error.to_string().contains("email already exists"));
    }

    #[test]
    fn test_timeout_status_codes() {
        assert_eq!(AppError::RemoteTimeout("account".into()).status_code(), 504);
        assert_eq!(AppError::CorrelationTimeout("id-1".into()).status_code(), 504);
    }

    #[test]
    fn test_internal_error_status_code() {
        let error = AppError::InternalError("Something went wrong".to_string());
        assert_eq!(error.status_code(), 500);
    }
}
