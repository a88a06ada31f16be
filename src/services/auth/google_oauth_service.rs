//! # Google OAuth 연합 인증 서비스
//!
//! Google OAuth 2.0 프로토콜을 통한 연합 인증의 클라이언트이자
//! 오케스트레이터입니다. 프로바이더로의 아웃바운드 호출 세 가지
//! (인증 URL 구성, 코드→토큰 교환, 토큰→사용자 정보 조회)와
//! 모바일용 네이티브 ID 토큰 검증, 그리고 이들을 계정 확보와
//! 토큰 발급으로 잇는 로그인/가입 파이프라인을 제공합니다.
//!
//! ## 로그인/가입 파이프라인
//!
//! ```text
//! 1. 신원 클레임 획득 (코드 교환 + 사용자 정보 조회, 또는 ID 토큰 검증)
//! 2. 계정 확보 (getFindByEmail → 없으면 postCreateAccount)
//! 3. 토큰 쌍 발급 ({accountId, email, name, roles} 클레임 서명)
//! 4. 연합 인증 응답 생성
//! ```
//!
//! 각 단계의 실패는 나머지 단계를 중단시키며, 첫 실패의 에러가
//! 그대로 전파됩니다. 프로바이더/네트워크 실패는 이 코어 안에서
//! 재시도하지 않습니다 - 단계당 시도는 한 번입니다.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use crate::config::{BrokerConfig, GoogleOAuthConfig};
use crate::domain::dto::AuthResponse;
use crate::domain::models::{GoogleIdTokenClaims, GoogleJwks, GoogleTokenResponse, GoogleUserInfo};
use crate::errors::{AppError, AppResult};
use crate::services::accounts::AccountServiceClient;
use crate::services::auth::TokenService;

/// Google OAuth 연동에 필요한 설정 묶음
///
/// 서비스 생성 시점에 한 번 고정됩니다.
#[derive(Debug, Clone)]
pub struct GoogleOAuthSettings {
    /// 웹 플로우용 클라이언트 ID
    pub client_id: String,
    /// 웹 플로우용 클라이언트 시크릿
    pub client_secret: String,
    /// 승인된 리다이렉트 URI
    pub redirect_uri: String,
    /// 안드로이드 ID 토큰의 기대 audience
    pub android_client_id: String,
    /// 인증 엔드포인트
    pub auth_uri: String,
    /// 토큰 교환 엔드포인트
    pub token_uri: String,
    /// 사용자 정보 엔드포인트
    pub userinfo_uri: String,
    /// 공개키(JWKS) 엔드포인트
    pub jwks_uri: String,
}

impl GoogleOAuthSettings {
    /// 환경 변수에서 설정을 읽어옵니다.
    ///
    /// # Panics
    ///
    /// 필수 Google OAuth 환경 변수가 누락된 경우 패닉이 발생합니다.
    pub fn from_env() -> Self {
        GoogleOAuthSettings {
            client_id: GoogleOAuthConfig::client_id(),
            client_secret: GoogleOAuthConfig::client_secret(),
            redirect_uri: GoogleOAuthConfig::redirect_uri(),
            android_client_id: GoogleOAuthConfig::android_client_id(),
            auth_uri: GoogleOAuthConfig::auth_uri(),
            token_uri: GoogleOAuthConfig::token_uri(),
            userinfo_uri: GoogleOAuthConfig::userinfo_uri(),
            jwks_uri: GoogleOAuthConfig::jwks_uri(),
        }
    }
}

/// Google OAuth 연합 인증 서비스
pub struct GoogleOAuthService {
    settings: GoogleOAuthSettings,
    account_client: Arc<AccountServiceClient>,
    token_service: Arc<TokenService>,
    http_timeout: Duration,
}

impl GoogleOAuthService {
    /// 새 서비스를 만듭니다.
    ///
    /// 프로바이더 HTTP 호출에는 외부 경로 타임아웃이 적용됩니다.
    pub fn new(
        settings: GoogleOAuthSettings,
        account_client: Arc<AccountServiceClient>,
        token_service: Arc<TokenService>,
    ) -> Self {
        GoogleOAuthService {
            settings,
            account_client,
            token_service,
            http_timeout: BrokerConfig::external_call_timeout(),
        }
    }

    fn http_client(&self) -> AppResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("HTTP 클라이언트 생성 실패: {}", e)))
    }

    /// Google 인증 URL을 생성합니다.
    ///
    /// 설정값만으로 만들어지는 순수 문자열 구성이며 실패하지 않습니다.
    pub fn get_google_auth_url(&self) -> String {
        let params = [
            ("client_id", self.settings.client_id.as_str()),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "email profile"),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.settings.auth_uri, query_string)
    }

    /// 인증 코드를 Google 토큰으로 교환합니다.
    ///
    /// # Errors
    ///
    /// * `FederationError` - 프로바이더가 비성공 상태를 반환하거나 응답을 파싱할 수 없음
    pub async fn get_google_token(&self, code: &str) -> AppResult<GoogleTokenResponse> {
        let params = [
            ("code", code),
            ("client_id", &self.settings.client_id),
            ("client_secret", &self.settings.client_secret),
            ("redirect_uri", &self.settings.redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http_client()?
            .post(&self.settings.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::FederationError(format!("Google 토큰 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::FederationError(format!(
                "Google 토큰 교환 실패: {}",
                error_text
            )));
        }

        response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| AppError::FederationError(format!("Google 토큰 응답 파싱 실패: {}", e)))
    }

    /// 액세스 토큰으로 Google 사용자 정보를 조회합니다.
    ///
    /// # Errors
    ///
    /// * `FederationError` - 프로바이더가 비성공 상태를 반환하거나 응답을 파싱할 수 없음
    pub async fn get_google_user_info(&self, access_token: &str) -> AppResult<GoogleUserInfo> {
        let response = self
            .http_client()?
            .get(&self.settings.userinfo_uri)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::FederationError(format!("Google 사용자 정보 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::FederationError(format!(
                "Google 사용자 정보 조회 실패: {}",
                error_text
            )));
        }

        response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| AppError::FederationError(format!("Google 사용자 정보 파싱 실패: {}", e)))
    }

    /// 모바일 클라이언트가 전달한 Google ID 토큰을 검증합니다.
    ///
    /// 서명을 Google 공개키로, audience를 안드로이드 클라이언트 ID로
    /// 확인한 뒤에만 토큰의 클레임을 신뢰합니다.
    ///
    /// # Errors
    ///
    /// * `BadRequest` - 토큰이 손상되었거나 검증에 실패함
    /// * `FederationError` - 공개키 조회 실패
    pub async fn verify_android_id_token(&self, id_token: &str) -> AppResult<GoogleUserInfo> {
        let header = decode_header(id_token)
            .map_err(|e| AppError::BadRequest(format!("유효하지 않은 ID 토큰입니다: {}", e)))?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::BadRequest("ID 토큰 헤더에 kid가 없습니다".to_string()))?;

        let jwks = self.fetch_google_jwks().await?;
        let jwk = jwks
            .keys
            .iter()
            .find(|key| key.kid == kid)
            .ok_or_else(|| AppError::BadRequest("ID 토큰의 서명 키를 찾을 수 없습니다".to_string()))?;

        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| AppError::InternalError(format!("공개키 구성 실패: {}", e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.settings.android_client_id]);
        validation.set_issuer(&["https://accounts.google.com", "accounts.google.com"]);

        let data = decode::<GoogleIdTokenClaims>(id_token, &decoding_key, &validation)
            .map_err(|e| AppError::BadRequest(format!("ID 토큰 검증 실패: {}", e)))?;

        Ok(data.claims.into())
    }

    async fn fetch_google_jwks(&self) -> AppResult<GoogleJwks> {
        let response = self
            .http_client()?
            .get(&self.settings.jwks_uri)
            .send()
            .await
            .map_err(|e| AppError::FederationError(format!("Google 공개키 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::FederationError(format!(
                "Google 공개키 조회 실패: status={}",
                response.status()
            )));
        }

        response
            .json::<GoogleJwks>()
            .await
            .map_err(|e| AppError::FederationError(format!("Google 공개키 파싱 실패: {}", e)))
    }

    /// 인증 코드로 전체 로그인/가입 파이프라인을 수행합니다.
    pub async fn authenticate_with_code(&self, code: &str) -> AppResult<AuthResponse> {
        let token_response = self.get_google_token(code).await?;
        let user_info = self.get_google_user_info(&token_response.access_token).await?;
        self.login_or_signup(user_info).await
    }

    /// 네이티브 ID 토큰으로 전체 로그인/가입 파이프라인을 수행합니다.
    pub async fn authenticate_with_id_token(&self, id_token: &str) -> AppResult<AuthResponse> {
        let user_info = self.verify_android_id_token(id_token).await?;
        self.login_or_signup(user_info).await
    }

    /// 신원 클레임으로 계정을 확보하고 토큰 쌍을 발급합니다.
    ///
    /// 이메일로 계정을 조회하고, 없으면 생성합니다. 호출 한 번에
    /// 두 원격 호출 중 정확히 하나만 계정을 확정하며, 둘 다 계정을
    /// 내놓지 못하면 `InternalError`로 중단합니다.
    pub async fn login_or_signup(&self, user_info: GoogleUserInfo) -> AppResult<AuthResponse> {
        let account = match self.account_client.find_by_email(&user_info.email).await? {
            Some(account) => account,
            None => {
                log::info!("미등록 이메일, 계정 생성 요청: {}", user_info.email);
                self.account_client.create_account(&user_info).await?
            }
        };

        let token_pair = self.token_service.generate_token_pair(&account)?;

        log::info!("Google 연합 인증 성공: {}", account.email);

        Ok(AuthResponse {
            access_token: token_pair.access_token,
            refresh_token: token_pair.refresh_token,
            email: account.email,
            name: account.name,
            profile_image: account.picture,
        })
    }
}
