//! # Google OAuth 통합 모델
//!
//! Google OAuth 2.0 플로우에서 주고받는 페이로드의 역직렬화 대상입니다.
//! 와이어 호환성을 위해 필드 이름(`access_token`, `id_token`, `email`,
//! `name`, `picture`, `sub`)은 Google의 응답 형식을 그대로 따릅니다.

use serde::{Deserialize, Serialize};

/// Google 토큰 엔드포인트의 교환 응답
///
/// 인증 코드를 form-encoded POST로 교환했을 때 돌아오는 페이로드입니다.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    /// Google API 접근용 액세스 토큰
    pub access_token: String,
    /// OpenID Connect ID 토큰 (scope에 openid가 포함된 경우)
    #[serde(default)]
    pub id_token: Option<String>,
    /// 액세스 토큰 만료 시간(초)
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// 토큰 타입 (일반적으로 "Bearer")
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Google 사용자 정보 엔드포인트의 응답
///
/// `https://www.googleapis.com/oauth2/v3/userinfo` 의 응답 형식입니다.
/// 프로바이더별 페이로드에서 추출되고 나면 이 구조체가
/// 파이프라인 전체에서 쓰이는 프로바이더 중립적 신원 클레임이 됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleUserInfo {
    /// 프로바이더 주체 식별자
    pub sub: String,
    /// 사용자 이메일
    pub email: String,
    /// 사용자 표시 이름
    pub name: String,
    /// 프로필 사진 URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// Google ID 토큰의 페이로드 클레임
///
/// 안드로이드 네이티브 플로우에서 서명/audience 검증을 통과한 뒤
/// 신원 클레임으로 변환됩니다. 만료/audience 검증은 `jsonwebtoken` 의
/// `Validation` 이 수행하므로 여기에는 신원 필드만 둡니다.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleIdTokenClaims {
    /// 프로바이더 주체 식별자
    pub sub: String,
    /// 사용자 이메일
    pub email: String,
    /// 사용자 표시 이름
    #[serde(default)]
    pub name: Option<String>,
    /// 프로필 사진 URL
    #[serde(default)]
    pub picture: Option<String>,
}

impl From<GoogleIdTokenClaims> for GoogleUserInfo {
    fn from(claims: GoogleIdTokenClaims) -> Self {
        GoogleUserInfo {
            sub: claims.sub,
            email: claims.email,
            name: claims.name.unwrap_or_default(),
            picture: claims.picture,
        }
    }
}

/// Google 공개키 목록 (JWKS)
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleJwks {
    pub keys: Vec<GoogleJwk>,
}

/// JWKS 의 개별 RSA 공개키
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleJwk {
    /// 키 식별자 - ID 토큰 헤더의 kid와 대조
    pub kid: String,
    /// RSA modulus (base64url)
    pub n: String,
    /// RSA exponent (base64url)
    pub e: String,
}
