//! # 요청 라우터
//!
//! 인바운드 요청 봉투를 메서드+경로 디스패치 키로 핸들러에 배분하고,
//! 결과를 응답 봉투로 성형합니다. 핸들러 테이블은 기동 시점에 한 번
//! 구성되는 데이터이며, 매칭되지 않는 키는 코드 분기가 아니라 테이블
//! 미스로 처리됩니다.
//!
//! 에러 변환은 이 경계에서 단 한 번 일어납니다. 핸들러가 돌려준
//! `AppError`는 상태 코드와 JSON 본문으로 렌더링되고, 상관관계 ID는
//! 성공/실패/미매칭 모든 경로에서 인바운드 봉투로부터 복사됩니다.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::errors::AppResult;
use crate::handlers::AuthHandlers;
use crate::messaging::envelope::{RequestEnvelope, ResponseEnvelope};

/// 등록된 핸들러의 호출 형태
pub type Handler =
    Arc<dyn Fn(RequestEnvelope) -> BoxFuture<'static, AppResult<ResponseEnvelope>> + Send + Sync>;

/// 메서드+경로 → 핸들러 디스패치 테이블
pub struct Router {
    routes: HashMap<String, Handler>,
}

impl Router {
    /// 빈 라우터를 만듭니다.
    pub fn new() -> Self {
        Router {
            routes: HashMap::new(),
        }
    }

    /// 디스패치 키에 핸들러를 등록합니다.
    pub fn route<F, Fut>(&mut self, method: &str, path: &str, handler: F)
    where
        F: Fn(RequestEnvelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<ResponseEnvelope>> + Send + 'static,
    {
        let key = format!("{} {}", method, path);
        let boxed = move |request: RequestEnvelope| -> BoxFuture<'static, AppResult<ResponseEnvelope>> {
            Box::pin(handler(request))
        };
        self.routes.insert(key, Arc::new(boxed));
    }

    /// 요청 봉투 하나를 처리해 응답 봉투 하나를 만듭니다.
    ///
    /// 이 함수는 실패하지 않습니다. 모든 실패 경로는 에러 봉투로
    /// 렌더링되어 브로커 경계를 넘는 처리되지 않은 예외가 없도록 합니다.
    pub async fn handle(&self, request: RequestEnvelope) -> ResponseEnvelope {
        let correlation_id = request.correlation_id.clone();
        let key = format!("{} {}", request.method, request.path);

        let Some(handler) = self.routes.get(&key) else {
            log::warn!("매칭되지 않는 요청: {}", key);
            return ResponseEnvelope::error(
                &correlation_id,
                404,
                &format!("요청을 처리할 수 없습니다: {}", key),
            );
        };

        // 인식되지 않는 실패(패닉)도 워커를 죽이는 대신 500 봉투로 렌더링한다
        let outcome = std::panic::AssertUnwindSafe(handler(request))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(mut response)) => {
                response.correlation_id = correlation_id;
                response
            }
            Ok(Err(e)) => {
                log::warn!("요청 처리 실패: {} - {}", key, e);
                ResponseEnvelope::error(&correlation_id, e.status_code(), &e.to_string())
            }
            Err(_) => {
                log::error!("요청 처리 중 패닉: {}", key);
                ResponseEnvelope::error(
                    &correlation_id,
                    500,
                    "요청 처리 중 알 수 없는 오류가 발생했습니다",
                )
            }
        }
    }

    /// 등록된 라우트 수
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// 등록된 라우트가 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// 이 서비스가 제공하는 모든 라우트를 등록한 라우터를 만듭니다.
///
/// 기동 시점에 한 번 호출되어 디스패치 테이블을 구성합니다.
pub fn build_router(handlers: Arc<AuthHandlers>) -> Router {
    let mut router = Router::new();

    let shared = handlers.clone();
    router.route("GET", "/api/auth/health", move |request| {
        let shared = shared.clone();
        async move { shared.health(request).await }
    });

    let shared = handlers.clone();
    router.route("GET", "/api/auth/error", move |request| {
        let shared = shared.clone();
        async move { shared.error_test(request).await }
    });

    let shared = handlers.clone();
    router.route("GET", "/api/auth/google", move |request| {
        let shared = shared.clone();
        async move { shared.google_auth_url(request).await }
    });

    let shared = handlers.clone();
    router.route("GET", "/api/auth/google/callback", move |request| {
        let shared = shared.clone();
        async move { shared.google_callback(request).await }
    });

    let shared = handlers.clone();
    router.route("POST", "/api/auth/google/android", move |request| {
        let shared = shared.clone();
        async move { shared.google_android(request).await }
    });

    let shared = handlers.clone();
    router.route("POST", "/api/auth/validate", move |request| {
        let shared = shared.clone();
        async move { shared.validate_token(request).await }
    });

    let shared = handlers;
    router.route("POST", "/api/auth/logout", move |request| {
        let shared = shared.clone();
        async move { shared.logout(request).await }
    });

    router
}
