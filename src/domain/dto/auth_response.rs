//! 인증 응답 DTO

use serde::{Deserialize, Serialize};

/// 연합 인증(로그인/가입) 성공 응답
///
/// 자체 발급 토큰 쌍과 프로바이더에서 확인한 프로필 요약을 담습니다.
/// 기존 클라이언트와의 호환을 위해 camelCase로 직렬화됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// 자체 발급 액세스 토큰
    pub access_token: String,
    /// 자체 발급 리프레시 토큰
    pub refresh_token: String,
    /// 계정 이메일
    pub email: String,
    /// 계정 표시 이름
    pub name: String,
    /// 프로필 이미지 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}
