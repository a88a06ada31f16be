//! 계정 엔티티
//!
//! 계정 레코드는 외부 계정 서비스가 소유하고 변경합니다.
//! 이 서비스는 서비스 간 호출로 조회하거나 생성을 요청할 뿐,
//! 로컬에서 변경 가능한 사본을 유지하지 않습니다.

use serde::{Deserialize, Serialize};

fn default_role() -> String {
    "USER".to_string()
}

/// 계정 서비스가 관리하는 계정 레코드의 로컬 표현
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// 계정 식별자
    pub id: i64,
    /// 계정 이메일 (연합 인증의 조회 키)
    pub email: String,
    /// 표시 이름
    pub name: String,
    /// 프로필 이미지 URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// 계정 역할
    #[serde(default = "default_role")]
    pub role: String,
}
