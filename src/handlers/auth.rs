//! 인증 요청 핸들러
//!
//! 라우터가 배분한 요청 봉투를 받아 서비스 계층을 호출하고 응답
//! 봉투를 만듭니다. 실패는 `AppError` 값으로 돌려주며, 상태 코드와
//! 본문으로의 변환은 라우터 경계가 담당합니다.
//!
//! 쿼리 파라미터(예: OAuth 콜백의 `code`)는 게이트웨이가 본문 JSON으로
//! 변환해 전달합니다.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use validator::Validate;

use crate::domain::dto::{GoogleOAuthRequest, TokenValidationRequest};
use crate::errors::{AppError, AppResult};
use crate::messaging::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::services::auth::{GoogleOAuthService, TokenService};

/// 봉투 본문을 요청 DTO로 역직렬화합니다.
fn parse_body<T: DeserializeOwned>(request: &RequestEnvelope) -> AppResult<T> {
    serde_json::from_str(&request.body)
        .map_err(|e| AppError::BadRequest(format!("잘못된 요청 형식입니다: {}", e)))
}

/// JSON 직렬화 가능한 값으로 성공 응답 봉투를 만듭니다.
fn json_response<T: serde::Serialize>(
    request: &RequestEnvelope,
    status_code: u16,
    body: &T,
) -> AppResult<ResponseEnvelope> {
    let body = serde_json::to_string(body)
        .map_err(|e| AppError::InternalError(format!("응답 생성 중 오류 발생: {}", e)))?;
    Ok(ResponseEnvelope::json(&request.correlation_id, status_code, body))
}

/// 인증 관련 봉투 핸들러 집합
pub struct AuthHandlers {
    oauth_service: Arc<GoogleOAuthService>,
    token_service: Arc<TokenService>,
}

impl AuthHandlers {
    /// 새 핸들러 집합을 만듭니다.
    pub fn new(oauth_service: Arc<GoogleOAuthService>, token_service: Arc<TokenService>) -> Self {
        AuthHandlers {
            oauth_service,
            token_service,
        }
    }

    /// 헬스체크
    ///
    /// `GET /api/auth/health`
    pub async fn health(&self, request: RequestEnvelope) -> AppResult<ResponseEnvelope> {
        Ok(ResponseEnvelope::json(
            &request.correlation_id,
            201,
            r#"{"success":true,"message":"I'm alive"}"#.to_string(),
        ))
    }

    /// 에러 경로 점검용
    ///
    /// `GET /api/auth/error`
    pub async fn error_test(&self, _request: RequestEnvelope) -> AppResult<ResponseEnvelope> {
        Err(AppError::Unauthorized("에러테스트".to_string()))
    }

    /// Google 인증 URL 반환
    ///
    /// `GET /api/auth/google`
    pub async fn google_auth_url(&self, request: RequestEnvelope) -> AppResult<ResponseEnvelope> {
        let url = self.oauth_service.get_google_auth_url();
        json_response(&request, 200, &serde_json::json!({ "url": url }))
    }

    /// Google OAuth 콜백 처리 (웹 플로우)
    ///
    /// `GET /api/auth/google/callback` - 본문의 `code`로 토큰 교환부터
    /// 토큰 발급까지 전체 파이프라인을 수행합니다.
    pub async fn google_callback(&self, request: RequestEnvelope) -> AppResult<ResponseEnvelope> {
        let params: serde_json::Value = parse_body(&request)?;
        let code = params["code"]
            .as_str()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AppError::BadRequest("code 파라미터가 없습니다".to_string()))?;

        let auth = self.oauth_service.authenticate_with_code(code).await?;
        json_response(&request, 200, &auth)
    }

    /// 안드로이드 네이티브 Google OAuth 처리
    ///
    /// `POST /api/auth/google/android` - 클라이언트가 받은 ID 토큰을
    /// 안드로이드 클라이언트 ID로 검증하고 자체 토큰 쌍을 발급합니다.
    pub async fn google_android(&self, request: RequestEnvelope) -> AppResult<ResponseEnvelope> {
        let oauth_request: GoogleOAuthRequest = parse_body(&request)?;
        oauth_request
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let auth = self
            .oauth_service
            .authenticate_with_id_token(&oauth_request.code)
            .await?;
        json_response(&request, 200, &auth)
    }

    /// 자체 발급 토큰 검증
    ///
    /// `POST /api/auth/validate`
    pub async fn validate_token(&self, request: RequestEnvelope) -> AppResult<ResponseEnvelope> {
        let validation_request: TokenValidationRequest = parse_body(&request)?;
        validation_request
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let claims = self.token_service.verify_token(&validation_request.token)?;
        json_response(
            &request,
            200,
            &serde_json::json!({ "valid": true, "claims": claims }),
        )
    }

    /// 로그아웃
    ///
    /// `POST /api/auth/logout` - 토큰이 자기완결적이고 서버 측 세션이
    /// 없으므로 확인 응답만 돌려줍니다. 토큰 폐기는 클라이언트의 몫입니다.
    pub async fn logout(&self, request: RequestEnvelope) -> AppResult<ResponseEnvelope> {
        json_response(
            &request,
            200,
            &serde_json::json!({ "success": true, "message": "로그아웃 되었습니다" }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Account;
    use crate::messaging::broker::InMemoryBroker;
    use crate::messaging::correlation::CorrelationRegistry;
    use crate::messaging::gateway::ServiceMessageClient;
    use crate::services::accounts::AccountServiceClient;
    use crate::services::auth::GoogleOAuthSettings;
    use std::collections::HashMap;
    use std::time::Duration;

    fn test_handlers() -> AuthHandlers {
        let registry = Arc::new(CorrelationRegistry::new());
        let gateway = Arc::new(ServiceMessageClient::new(
            Arc::new(InMemoryBroker::new()),
            registry,
            "auth".to_string(),
        ));
        let token_service = Arc::new(TokenService::new("test-secret".to_string(), 1, 30));
        let oauth_service = Arc::new(GoogleOAuthService::new(
            GoogleOAuthSettings {
                client_id: "web-client-id".to_string(),
                client_secret: "web-client-secret".to_string(),
                redirect_uri: "http://localhost:8080/oauth2/google/callback".to_string(),
                android_client_id: "android-client-id".to_string(),
                auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
                token_uri: "https://oauth2.googleapis.com/token".to_string(),
                userinfo_uri: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
                jwks_uri: "https://www.googleapis.com/oauth2/v3/certs".to_string(),
            },
            Arc::new(AccountServiceClient::with_timeout(gateway, Duration::from_secs(1))),
            token_service.clone(),
        ));
        AuthHandlers::new(oauth_service, token_service)
    }

    fn request(method: &str, path: &str, body: &str) -> RequestEnvelope {
        RequestEnvelope {
            method: method.to_string(),
            path: path.to_string(),
            body: body.to_string(),
            headers: HashMap::new(),
            correlation_id: "id-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_health_responds_alive() {
        let handlers = test_handlers();
        let response = handlers
            .health(request("GET", "/api/auth/health", ""))
            .await
            .unwrap();

        assert_eq!(response.status_code, 201);
        assert!(response.body.contains("I'm alive"));
    }

    #[tokio::test]
    async fn test_error_route_returns_unauthorized() {
        let handlers = test_handlers();
        let result = handlers.error_test(request("GET", "/api/auth/error", "")).await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_auth_url_contains_client_id() {
        let handlers = test_handlers();
        let response = handlers
            .google_auth_url(request("GET", "/api/auth/google", ""))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("client_id=web-client-id"));
    }

    #[tokio::test]
    async fn test_callback_without_code_is_bad_request() {
        let handlers = test_handlers();
        let result = handlers
            .google_callback(request("GET", "/api/auth/google/callback", "{}"))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_android_route_rejects_malformed_body() {
        let handlers = test_handlers();
        let result = handlers
            .google_android(request("POST", "/api/auth/google/android", "not-json"))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_validate_round_trips_issued_token() {
        let handlers = test_handlers();
        let account = Account {
            id: 7,
            email: "a@b.com".to_string(),
            name: "A B".to_string(),
            picture: None,
            role: "USER".to_string(),
        };
        let token = handlers.token_service.generate_access_token(&account).unwrap();

        let body = serde_json::json!({ "token": token }).to_string();
        let response = handlers
            .validate_token(request("POST", "/api/auth/validate", &body))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("\"valid\":true"));
        assert!(response.body.contains("a@b.com"));
    }

    #[tokio::test]
    async fn test_validate_rejects_garbage_token() {
        let handlers = test_handlers();
        let body = serde_json::json!({ "token": "garbage" }).to_string();
        let result = handlers
            .validate_token(request("POST", "/api/auth/validate", &body))
            .await;

        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_logout_acknowledges() {
        let handlers = test_handlers();
        let response = handlers
            .logout(request("POST", "/api/auth/logout", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("success"));
    }
}
