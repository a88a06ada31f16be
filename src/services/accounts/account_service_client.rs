//! 계정 서비스 클라이언트
//!
//! 계정 레코드는 외부 계정 서비스가 소유합니다. 이 클라이언트는
//! 게이트웨이를 통해 조회("getFindByEmail")와 생성("postCreateAccount")
//! 두 작업만 호출하며, 계정을 직접 변경하지 않습니다.

use std::sync::Arc;
use std::time::Duration;

use crate::config::BrokerConfig;
use crate::domain::entities::Account;
use crate::domain::models::GoogleUserInfo;
use crate::errors::{AppError, AppResult};
use crate::messaging::gateway::ServiceMessageClient;

/// 계정 서비스의 논리 이름
const ACCOUNT_SERVICE: &str = "account";

/// 계정 서비스로의 RPC 경계
pub struct AccountServiceClient {
    gateway: Arc<ServiceMessageClient>,
    timeout: Duration,
}

impl AccountServiceClient {
    /// 설정된 서비스 호출 타임아웃으로 클라이언트를 만듭니다.
    pub fn new(gateway: Arc<ServiceMessageClient>) -> Self {
        Self::with_timeout(gateway, BrokerConfig::service_call_timeout())
    }

    /// 명시한 타임아웃으로 클라이언트를 만듭니다.
    pub fn with_timeout(gateway: Arc<ServiceMessageClient>, timeout: Duration) -> Self {
        AccountServiceClient { gateway, timeout }
    }

    /// 이메일로 계정을 조회합니다. 없으면 `None`.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let payload = self
            .gateway
            .call(
                ACCOUNT_SERVICE,
                "getFindByEmail",
                serde_json::json!(email),
                self.timeout,
            )
            .await?;

        if payload.is_null() {
            return Ok(None);
        }

        let account = serde_json::from_value(payload)
            .map_err(|e| AppError::InternalError(format!("계정 응답 파싱 실패: {}", e)))?;
        Ok(Some(account))
    }

    /// 신원 클레임으로 새 계정 생성을 요청합니다.
    ///
    /// 피어가 계정을 돌려주지 못하면 `InternalError`로 실패합니다.
    pub async fn create_account(&self, user_info: &GoogleUserInfo) -> AppResult<Account> {
        let payload = self
            .gateway
            .call(
                ACCOUNT_SERVICE,
                "postCreateAccount",
                serde_json::json!({
                    "email": user_info.email,
                    "name": user_info.name,
                    "picture": user_info.picture,
                    "provider": "google",
                    "providerId": user_info.sub,
                }),
                self.timeout,
            )
            .await?;

        if payload.is_null() {
            return Err(AppError::InternalError("계정을 생성할 수 없습니다".to_string()));
        }

        serde_json::from_value(payload)
            .map_err(|e| AppError::InternalError(format!("계정 응답 파싱 실패: {}", e)))
    }
}
