//! # 인바운드 큐 소비자
//!
//! 세 개의 구독 루프가 이 서비스의 브로커 수신면을 구성합니다.
//!
//! - [`ApiRequestConsumer`] - 게이트웨이발 API 요청을 라우터로 배분
//! - [`ServiceRequestConsumer`] - 피어발 서비스 요청을 작업 테이블로 배분
//! - [`ServiceReplyConsumer`] - 피어의 응답을 상관관계 레지스트리로 전달
//!
//! 핸들러 실행은 수신 루프와 분리된 태스크에서, 세마포어로 제한된
//! 워커 풀 크기만큼만 동시에 일어납니다. 게이트웨이 왕복을 수행하는
//! 느린 핸들러가 새 메시지 수신을 막지 않게 하기 위함입니다.
//! 수신 경로에서는 어떤 실패도 밖으로 던지지 않습니다 - 해석할 수 없는
//! 페이로드는 로그 후 버려지고, 처리 실패는 에러 봉투로 응답됩니다.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::config::{
    API_GATEWAY_RESPONSE_ROUTE, AUTH_API_QUEUE, AUTH_SERVICE_QUEUE, AUTH_SERVICE_RESPONSE_ROUTE,
    BrokerConfig, service_response_route,
};
use crate::errors::{AppError, AppResult};
use crate::messaging::broker::MessageBroker;
use crate::messaging::correlation::CorrelationRegistry;
use crate::messaging::envelope::{RequestEnvelope, ServiceMessage};
use crate::routes::Router;
use crate::services::auth::TokenService;

/// API 요청 소비 루프
///
/// `auth.api.queue`의 요청 봉투를 라우터에 넘기고, 만들어진 응답
/// 봉투를 게이트웨이 응답 라우트로 발행합니다.
pub struct ApiRequestConsumer {
    broker: Arc<dyn MessageBroker>,
    router: Arc<Router>,
    workers: Arc<Semaphore>,
}

impl ApiRequestConsumer {
    /// 새 소비자를 만듭니다. 워커 풀 크기는 `WORKER_COUNT` 설정을 따릅니다.
    pub fn new(broker: Arc<dyn MessageBroker>, router: Arc<Router>) -> Self {
        ApiRequestConsumer {
            broker,
            router,
            workers: Arc::new(Semaphore::new(BrokerConfig::worker_count())),
        }
    }

    /// 구독을 열고 수신 루프를 돌립니다. 구독이 끊길 때까지 반환하지 않습니다.
    pub async fn run(&self) -> AppResult<()> {
        let mut inbound = self.broker.subscribe(AUTH_API_QUEUE).await?;
        log::info!("📥 API 요청 소비 시작: {}", AUTH_API_QUEUE);

        while let Some(payload) = inbound.recv().await {
            let request: RequestEnvelope = match serde_json::from_str(&payload) {
                Ok(request) => request,
                Err(e) => {
                    log::warn!("해석할 수 없는 요청 봉투 무시: {}", e);
                    continue;
                }
            };

            let permit = match self.workers.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let broker = self.broker.clone();
            let router = self.router.clone();

            tokio::spawn(async move {
                log::info!(
                    "요청 수신: {} {} correlationId={}",
                    request.method,
                    request.path,
                    request.correlation_id
                );

                let response = router.handle(request).await;

                match serde_json::to_string(&response) {
                    Ok(json) => {
                        if let Err(e) = broker.publish(API_GATEWAY_RESPONSE_ROUTE, json).await {
                            log::error!("응답 발행 실패: {}", e);
                        } else {
                            log::info!(
                                "응답 전송: status={} correlationId={}",
                                response.status_code,
                                response.correlation_id
                            );
                        }
                    }
                    Err(e) => log::error!("응답 직렬화 실패: {}", e),
                }

                drop(permit);
            });
        }

        Ok(())
    }
}

/// 서비스 작업 핸들러의 호출 형태
pub type OperationHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, AppResult<Value>> + Send + Sync>;

/// 피어 서비스 요청 소비 루프
///
/// `auth.service.queue`의 서비스 메시지를 작업 이름으로 배분하고,
/// 발신 서비스의 응답 라우트로 결과를 돌려보냅니다. 작업 테이블은
/// 기동 시점에 한 번 구성됩니다.
pub struct ServiceRequestConsumer {
    broker: Arc<dyn MessageBroker>,
    service_name: String,
    operations: HashMap<String, OperationHandler>,
}

impl ServiceRequestConsumer {
    /// 이 서비스가 피어에게 제공하는 작업 테이블과 함께 소비자를 만듭니다.
    pub fn new(broker: Arc<dyn MessageBroker>, token_service: Arc<TokenService>) -> Self {
        let mut operations: HashMap<String, OperationHandler> = HashMap::new();

        let tokens = token_service.clone();
        let validate_token = move |payload: Value| -> BoxFuture<'static, AppResult<Value>> {
            let tokens = tokens.clone();
            Box::pin(async move {
                let token = payload.as_str().ok_or_else(|| {
                    AppError::BadRequest("validateToken 페이로드는 토큰 문자열이어야 합니다".to_string())
                })?;
                let claims = tokens.verify_token(token)?;
                serde_json::to_value(claims)
                    .map_err(|e| AppError::InternalError(format!("클레임 직렬화 실패: {}", e)))
            })
        };
        operations.insert("validateToken".to_string(), Arc::new(validate_token));

        ServiceRequestConsumer {
            broker,
            service_name: BrokerConfig::service_name(),
            operations,
        }
    }

    /// 구독을 열고 수신 루프를 돌립니다.
    pub async fn run(self: Arc<Self>) -> AppResult<()> {
        let mut inbound = self.broker.subscribe(AUTH_SERVICE_QUEUE).await?;
        log::info!("📥 서비스 요청 소비 시작: {}", AUTH_SERVICE_QUEUE);

        while let Some(payload) = inbound.recv().await {
            let request: ServiceMessage = match serde_json::from_str(&payload) {
                Ok(request) => request,
                Err(e) => {
                    log::warn!("해석할 수 없는 서비스 메시지 무시: {}", e);
                    continue;
                }
            };

            let consumer = self.clone();
            tokio::spawn(async move {
                consumer.process(request).await;
            });
        }

        Ok(())
    }

    async fn process(&self, request: ServiceMessage) {
        log::info!(
            "서비스 요청 수신: operation={} sender={} correlationId={}",
            request.operation,
            request.sender_service,
            request.correlation_id
        );

        let reply = match self.operations.get(&request.operation) {
            Some(handler) => match handler(request.payload.clone()).await {
                Ok(payload) => ServiceMessage::reply(&request, &self.service_name, payload),
                Err(e) => ServiceMessage::error_reply(
                    &request,
                    &self.service_name,
                    e.status_code(),
                    &e.to_string(),
                ),
            },
            None => ServiceMessage::error_reply(
                &request,
                &self.service_name,
                404,
                &format!("지원하지 않는 작업: {}", request.operation),
            ),
        };

        let route = service_response_route(&request.sender_service);
        match serde_json::to_string(&reply) {
            Ok(json) => {
                if let Err(e) = self.broker.publish(&route, json).await {
                    log::error!("서비스 응답 발행 실패: {}", e);
                }
            }
            Err(e) => log::error!("서비스 응답 직렬화 실패: {}", e),
        }
    }
}

/// 응답 소비 루프
///
/// 이 서비스가 보낸 서비스 호출의 응답을 받아 상관관계 레지스트리를
/// 완료시킵니다. `complete`는 절대 실패하지 않으므로 이 루프에서
/// 브로커 장애와 구분되지 않는 예외가 발생할 일이 없습니다.
pub struct ServiceReplyConsumer {
    broker: Arc<dyn MessageBroker>,
    registry: Arc<CorrelationRegistry>,
}

impl ServiceReplyConsumer {
    /// 새 응답 소비자를 만듭니다.
    pub fn new(broker: Arc<dyn MessageBroker>, registry: Arc<CorrelationRegistry>) -> Self {
        ServiceReplyConsumer { broker, registry }
    }

    /// 구독을 열고 수신 루프를 돌립니다.
    pub async fn run(&self) -> AppResult<()> {
        let mut inbound = self.broker.subscribe(AUTH_SERVICE_RESPONSE_ROUTE).await?;
        log::info!("📥 서비스 응답 소비 시작: {}", AUTH_SERVICE_RESPONSE_ROUTE);

        while let Some(payload) = inbound.recv().await {
            let reply: ServiceMessage = match serde_json::from_str(&payload) {
                Ok(reply) => reply,
                Err(e) => {
                    log::warn!("해석할 수 없는 서비스 응답 무시: {}", e);
                    continue;
                }
            };

            let correlation_id = reply.correlation_id.clone();
            self.registry.complete(&correlation_id, reply);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::broker::InMemoryBroker;
    use crate::messaging::envelope::ResponseEnvelope;

    fn envelope(method: &str, path: &str, correlation_id: &str) -> String {
        serde_json::to_string(&RequestEnvelope {
            method: method.to_string(),
            path: path.to_string(),
            body: String::new(),
            headers: HashMap::new(),
            correlation_id: correlation_id.to_string(),
        })
        .unwrap()
    }

    fn test_router() -> Router {
        let mut router = Router::new();
        router.route("GET", "/api/auth/health", |request| async move {
            Ok(ResponseEnvelope::json(
                &request.correlation_id,
                201,
                r#"{"success":true,"message":"I'm alive"}"#.to_string(),
            ))
        });
        router
    }

    #[tokio::test]
    async fn test_api_consumer_publishes_correlated_response() {
        let broker = Arc::new(InMemoryBroker::new());
        let mut responses = broker.subscribe(API_GATEWAY_RESPONSE_ROUTE).await.unwrap();

        let consumer = ApiRequestConsumer::new(broker.clone(), Arc::new(test_router()));
        tokio::spawn(async move {
            let _ = consumer.run().await;
        });
        // 구독이 열릴 때까지 잠시 양보
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        broker
            .publish(AUTH_API_QUEUE, envelope("GET", "/api/auth/health", "id-1"))
            .await
            .unwrap();

        let raw = responses.recv().await.unwrap();
        let response: ResponseEnvelope = serde_json::from_str(&raw).unwrap();
        assert_eq!(response.status_code, 201);
        assert_eq!(response.correlation_id, "id-1");
    }

    #[tokio::test]
    async fn test_api_consumer_answers_unmatched_route_with_404() {
        let broker = Arc::new(InMemoryBroker::new());
        let mut responses = broker.subscribe(API_GATEWAY_RESPONSE_ROUTE).await.unwrap();

        let consumer = ApiRequestConsumer::new(broker.clone(), Arc::new(test_router()));
        tokio::spawn(async move {
            let _ = consumer.run().await;
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        broker
            .publish(AUTH_API_QUEUE, envelope("GET", "/unknown", "id-2"))
            .await
            .unwrap();

        let raw = responses.recv().await.unwrap();
        let response: ResponseEnvelope = serde_json::from_str(&raw).unwrap();
        assert_eq!(response.status_code, 404);
        assert_eq!(response.correlation_id, "id-2");
        assert!(response.body.contains("GET /unknown"));
    }

    #[tokio::test]
    async fn test_service_consumer_rejects_unknown_operation() {
        let broker = Arc::new(InMemoryBroker::new());
        let mut replies = broker.subscribe("gateway.service.response").await.unwrap();

        let token_service = Arc::new(TokenService::new("test-secret".to_string(), 1, 30));
        let consumer = Arc::new(ServiceRequestConsumer::new(broker.clone(), token_service));
        tokio::spawn(async move {
            let _ = consumer.run().await;
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let request = ServiceMessage::request("id-3", "gateway", "unknownOp", Value::Null);
        broker
            .publish(AUTH_SERVICE_QUEUE, serde_json::to_string(&request).unwrap())
            .await
            .unwrap();

        let raw = replies.recv().await.unwrap();
        let reply: ServiceMessage = serde_json::from_str(&raw).unwrap();
        assert_eq!(reply.correlation_id, "id-3");
        assert_eq!(reply.operation, "unknownOpResponse");
        let error = reply.error.unwrap();
        assert_eq!(error.status_code, 404);
        assert!(error.message.contains("unknownOp"));
    }

    #[tokio::test]
    async fn test_service_consumer_validates_token() {
        let broker = Arc::new(InMemoryBroker::new());
        let mut replies = broker.subscribe("gateway.service.response").await.unwrap();

        let token_service = Arc::new(TokenService::new("test-secret".to_string(), 1, 30));
        let account = crate::domain::entities::Account {
            id: 1,
            email: "a@b.com".to_string(),
            name: "A B".to_string(),
            picture: None,
            role: "USER".to_string(),
        };
        let token = token_service.generate_access_token(&account).unwrap();

        let consumer = Arc::new(ServiceRequestConsumer::new(broker.clone(), token_service));
        tokio::spawn(async move {
            let _ = consumer.run().await;
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let request = ServiceMessage::request("id-4", "gateway", "validateToken", Value::String(token));
        broker
            .publish(AUTH_SERVICE_QUEUE, serde_json::to_string(&request).unwrap())
            .await
            .unwrap();

        let raw = replies.recv().await.unwrap();
        let reply: ServiceMessage = serde_json::from_str(&raw).unwrap();
        assert!(reply.error.is_none());
        assert_eq!(reply.payload["email"], "a@b.com");
    }
}
