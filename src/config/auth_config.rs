//! # Authentication Configuration Module
//!
//! Google OAuth 프로바이더와 JWT 토큰 서명에 관련된 설정을 관리하는 모듈입니다.
//! 모든 값은 환경 변수에서 읽어오며, 민감한 필수 값이 누락된 경우
//! 서비스 기동 시점에 패닉으로 조기에 실패합니다.
//!
//! ## 필수 환경 변수 설정
//!
//! ### Google OAuth 설정
//! ```bash
//! export GOOGLE_CLIENT_ID="your-google-client-id"
//! export GOOGLE_CLIENT_SECRET="your-google-client-secret"
//! export GOOGLE_REDIRECT_URI="http://localhost:8080/oauth2/google/callback"
//! export GOOGLE_ANDROID_CLIENT_ID="your-android-client-id"
//! ```
//!
//! ### JWT 토큰 설정
//! ```bash
//! export JWT_SECRET="your-super-secret-jwt-key"
//! export JWT_EXPIRATION_HOURS="1"
//! export JWT_REFRESH_EXPIRATION_DAYS="30"
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::{GoogleOAuthConfig, JwtConfig};
//!
//! let client_id = GoogleOAuthConfig::client_id();
//! let secret = JwtConfig::secret();
//! ```

use std::env;

/// Google OAuth 2.0 설정을 관리하는 구조체
///
/// Google Cloud Console 에서 생성한 OAuth 2.0 클라이언트 정보를 관리합니다.
/// 웹 플로우(인증 코드 교환)와 안드로이드 네이티브 플로우(ID 토큰 검증)가
/// 서로 다른 클라이언트 ID를 사용합니다.
///
/// ## 보안 고려사항
///
/// - `client_secret`은 절대 클라이언트 사이드에 노출되어서는 안 됩니다
/// - 프로덕션에서는 HTTPS redirect URI만 사용하세요
pub struct GoogleOAuthConfig;

impl GoogleOAuthConfig {
    /// Google OAuth Client ID를 반환합니다.
    ///
    /// # Panics
    ///
    /// `GOOGLE_CLIENT_ID` 환경 변수가 설정되지 않은 경우 패닉이 발생합니다.
    pub fn client_id() -> String {
        env::var("GOOGLE_CLIENT_ID")
            .expect("GOOGLE_CLIENT_ID must be set")
    }

    /// Google OAuth Client Secret을 반환합니다.
    ///
    /// 토큰 교환 시에만 사용되는 민감한 값입니다.
    ///
    /// # Panics
    ///
    /// `GOOGLE_CLIENT_SECRET` 환경 변수가 설정되지 않은 경우 패닉이 발생합니다.
    pub fn client_secret() -> String {
        env::var("GOOGLE_CLIENT_SECRET")
            .expect("GOOGLE_CLIENT_SECRET must be set")
    }

    /// OAuth 콜백 리다이렉트 URI를 반환합니다.
    ///
    /// Google Cloud Console 의 승인된 리디렉션 URI와 정확히 일치해야 합니다.
    ///
    /// # Panics
    ///
    /// `GOOGLE_REDIRECT_URI` 환경 변수가 설정되지 않은 경우 패닉이 발생합니다.
    pub fn redirect_uri() -> String {
        env::var("GOOGLE_REDIRECT_URI")
            .expect("GOOGLE_REDIRECT_URI must be set")
    }

    /// 안드로이드 네이티브 클라이언트 ID를 반환합니다.
    ///
    /// 모바일 앱이 직접 발급받아 전달하는 Google ID 토큰의
    /// audience 검증에 사용됩니다.
    ///
    /// # Panics
    ///
    /// `GOOGLE_ANDROID_CLIENT_ID` 환경 변수가 설정되지 않은 경우 패닉이 발생합니다.
    pub fn android_client_id() -> String {
        env::var("GOOGLE_ANDROID_CLIENT_ID")
            .expect("GOOGLE_ANDROID_CLIENT_ID must be set")
    }

    /// Google 인증(authorization) 엔드포인트 URI를 반환합니다.
    pub fn auth_uri() -> String {
        env::var("GOOGLE_AUTH_URI")
            .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/auth".to_string())
    }

    /// Google 토큰 교환 엔드포인트 URI를 반환합니다.
    pub fn token_uri() -> String {
        env::var("GOOGLE_TOKEN_URI")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string())
    }

    /// Google 사용자 정보 엔드포인트 URI를 반환합니다.
    pub fn userinfo_uri() -> String {
        env::var("GOOGLE_USERINFO_URI")
            .unwrap_or_else(|_| "https://www.googleapis.com/oauth2/v3/userinfo".to_string())
    }

    /// Google 공개키(JWKS) 엔드포인트 URI를 반환합니다.
    ///
    /// 안드로이드 ID 토큰의 RS256 서명 검증에 사용됩니다.
    pub fn jwks_uri() -> String {
        env::var("GOOGLE_JWKS_URI")
            .unwrap_or_else(|_| "https://www.googleapis.com/oauth2/v3/certs".to_string())
    }
}

/// JWT 토큰 서명 설정을 관리하는 구조체
///
/// 액세스 토큰과 리프레시 토큰은 동일한 HMAC 비밀키로 서명되며
/// 만료 시간만 다르게 설정됩니다. 서버 측 세션 저장소는 없습니다.
pub struct JwtConfig;

impl JwtConfig {
    /// JWT 서명 비밀키를 반환합니다.
    ///
    /// # Panics
    ///
    /// `JWT_SECRET` 환경 변수가 설정되지 않은 경우 패닉이 발생합니다.
    pub fn secret() -> String {
        env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set")
    }

    /// 액세스 토큰 만료 시간(시간 단위)을 반환합니다. 기본값 1시간.
    pub fn expiration_hours() -> i64 {
        env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1)
    }

    /// 리프레시 토큰 만료 시간(일 단위)을 반환합니다. 기본값 30일.
    pub fn refresh_expiration_days() -> i64 {
        env::var("JWT_REFRESH_EXPIRATION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30)
    }
}
