//! JWT 토큰 관리 서비스
//!
//! 자체 발급 액세스/리프레시 토큰의 생성과 검증을 담당합니다.
//! HMAC-SHA256 서명을 사용하며, 두 토큰은 같은 비밀키로 서명되고
//! 만료 시간만 다릅니다. 순수 함수 계층으로 I/O가 없습니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::config::JwtConfig;
use crate::domain::entities::Account;
use crate::domain::models::{TokenClaims, TokenPair};
use crate::errors::{AppError, AppResult};

/// JWT 토큰 코덱
///
/// 서명키와 만료 설정을 생성 시점에 고정해 소유합니다.
pub struct TokenService {
    secret: String,
    expiration_hours: i64,
    refresh_expiration_days: i64,
}

impl TokenService {
    /// 주어진 비밀키와 만료 설정으로 코덱을 만듭니다.
    pub fn new(secret: String, expiration_hours: i64, refresh_expiration_days: i64) -> Self {
        TokenService {
            secret,
            expiration_hours,
            refresh_expiration_days,
        }
    }

    /// 환경 변수 설정으로 코덱을 만듭니다.
    ///
    /// # Panics
    ///
    /// `JWT_SECRET` 환경 변수가 설정되지 않은 경우 패닉이 발생합니다.
    pub fn from_env() -> Self {
        Self::new(
            JwtConfig::secret(),
            JwtConfig::expiration_hours(),
            JwtConfig::refresh_expiration_days(),
        )
    }

    /// 계정 정보와 수명으로 클레임을 구성합니다.
    fn build_claims(&self, account: &Account, lifetime: Duration) -> TokenClaims {
        let now = Utc::now();
        TokenClaims {
            sub: account.email.clone(),
            account_id: account.id,
            email: account.email.clone(),
            name: account.name.clone(),
            roles: vec![account.role.clone()],
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }

    fn sign(&self, claims: &TokenClaims) -> AppResult<String> {
        let encoding_key = EncodingKey::from_secret(self.secret.as_ref());
        encode(&Header::default(), claims, &encoding_key)
            .map_err(|e| AppError::InternalError(format!("JWT 토큰 생성 실패: {}", e)))
    }

    /// 계정을 위한 액세스 토큰을 생성합니다.
    pub fn generate_access_token(&self, account: &Account) -> AppResult<String> {
        let claims = self.build_claims(account, Duration::hours(self.expiration_hours));
        self.sign(&claims)
    }

    /// 계정을 위한 리프레시 토큰을 생성합니다.
    pub fn generate_refresh_token(&self, account: &Account) -> AppResult<String> {
        let claims = self.build_claims(account, Duration::days(self.refresh_expiration_days));
        self.sign(&claims)
    }

    /// 액세스/리프레시 토큰 쌍을 생성합니다.
    pub fn generate_token_pair(&self, account: &Account) -> AppResult<TokenPair> {
        let access_token = self.generate_access_token(account)?;
        let refresh_token = self.generate_refresh_token(account)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// 토큰을 검증하고 클레임을 추출합니다.
    ///
    /// # Errors
    ///
    /// * `InvalidToken` - 서명 불일치, 구조 손상, 또는 만료
    pub fn verify_token(&self, token: &str) -> AppResult<TokenClaims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_ref());
        let validation = Validation::new(Algorithm::HS256);

        decode::<TokenClaims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::InvalidToken(format!("토큰 검증 실패: {}", e)))
    }
}
