//! JWT 인증 토큰 클레임 및 토큰 쌍
//!
//! RFC 7519 표준 클레임과 계정 식별용 애플리케이션 클레임을 포함합니다.

use serde::{Deserialize, Serialize};

/// JWT 토큰의 클레임(Payload) 구조체
///
/// 액세스 토큰과 리프레시 토큰이 동일한 클레임 구조를 사용하며
/// 만료 시간만 다릅니다. 토큰은 자기완결적이므로 서버 측 세션
/// 테이블이 이를 뒷받침하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 토큰의 주체 (계정 이메일)
    pub sub: String,
    /// 계정 식별자
    #[serde(rename = "accountId")]
    pub account_id: i64,
    /// 계정 이메일
    pub email: String,
    /// 계정 표시 이름
    pub name: String,
    /// 계정 역할 목록
    pub roles: Vec<String>,
    /// 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
}

/// 액세스/리프레시 토큰 쌍
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// 액세스 토큰 (API 접근용 단기 토큰)
    pub access_token: String,
    /// 리프레시 토큰 (토큰 갱신용 장기 토큰)
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize_account_id_as_camel_case() {
        let claims = TokenClaims {
            sub: "a@b.com".to_string(),
            account_id: 7,
            email: "a@b.com".to_string(),
            name: "A B".to_string(),
            roles: vec!["USER".to_string()],
            iat: 0,
            exp: 10,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"accountId\":7"));
    }
}
