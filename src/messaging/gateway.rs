//! # 서비스 호출 게이트웨이
//!
//! 피어 서비스로의 발행 후 대기(fire-and-await) 호출을 제공합니다.
//! 상관관계 ID를 발급해 레지스트리에 등록하고, 대상 서비스의 요청
//! 큐로 메시지를 발행한 뒤, 제한 시간 안에 응답이 짝지어지기를
//! 기다립니다. 상관관계 ID당 미결 호출은 최대 하나이며, 같은 대상에
//! 대한 서로 다른 호출 간 순서는 보장하지 않습니다.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::config::service_request_route;
use crate::errors::{AppError, AppResult};
use crate::messaging::broker::MessageBroker;
use crate::messaging::correlation::CorrelationRegistry;
use crate::messaging::envelope::ServiceMessage;

/// 피어 서비스 RPC 클라이언트
///
/// 레지스트리와 브로커는 프로세스 단위로 만들어 공유 핸들로 주입합니다.
pub struct ServiceMessageClient {
    broker: Arc<dyn MessageBroker>,
    registry: Arc<CorrelationRegistry>,
    service_name: String,
}

impl ServiceMessageClient {
    /// 새 게이트웨이를 만듭니다.
    ///
    /// `service_name`은 메시지의 `senderService` 필드로 실려, 피어가
    /// 응답을 돌려보낼 라우트를 유도하는 데 쓰입니다.
    pub fn new(
        broker: Arc<dyn MessageBroker>,
        registry: Arc<CorrelationRegistry>,
        service_name: String,
    ) -> Self {
        ServiceMessageClient {
            broker,
            registry,
            service_name,
        }
    }

    /// 피어 서비스의 작업을 호출하고 응답 페이로드를 돌려받습니다.
    ///
    /// # Errors
    ///
    /// * `RemoteTimeout` - 제한 시간 안에 응답이 도착하지 않음
    /// * `RemoteError` - 피어가 실패를 보고함 (피어의 상태 코드/메시지 전달)
    /// * `InternalError` - 직렬화 또는 발행 실패
    pub async fn call(
        &self,
        target_service: &str,
        operation: &str,
        payload: Value,
        timeout: Duration,
    ) -> AppResult<Value> {
        let correlation_id = Uuid::new_v4().to_string();
        let pending = self.registry.register(&correlation_id)?;

        let message =
            ServiceMessage::request(&correlation_id, &self.service_name, operation, payload);
        let serialized = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                self.registry.discard(&correlation_id);
                return Err(AppError::InternalError(format!(
                    "서비스 메시지 직렬화 실패: {}",
                    e
                )));
            }
        };

        let route = service_request_route(target_service);
        log::debug!(
            "서비스 호출 발행: {} {} correlationId={}",
            target_service,
            operation,
            correlation_id
        );
        if let Err(e) = self.broker.publish(&route, serialized).await {
            // 발행하지 못한 등록은 남겨둘 이유가 없다
            self.registry.discard(&correlation_id);
            return Err(e);
        }

        let reply = match self.registry.wait(pending, timeout).await {
            Ok(reply) => reply,
            Err(AppError::CorrelationTimeout(id)) => {
                return Err(AppError::RemoteTimeout(format!(
                    "{} {} (correlationId={})",
                    target_service, operation, id
                )));
            }
            Err(e) => return Err(e),
        };

        if let Some(error) = reply.error {
            return Err(AppError::RemoteError {
                code: error.status_code,
                message: error.message,
            });
        }

        Ok(reply.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::broker::InMemoryBroker;

    fn gateway_over(broker: Arc<InMemoryBroker>) -> (ServiceMessageClient, Arc<CorrelationRegistry>) {
        let registry = Arc::new(CorrelationRegistry::new());
        let client = ServiceMessageClient::new(broker, registry.clone(), "auth".to_string());
        (client, registry)
    }

    /// 계정 서비스 흉내: 요청 큐를 구독해 주어진 응답으로 답한다
    async fn spawn_echo_peer(
        broker: Arc<InMemoryBroker>,
        reply_with: impl Fn(&ServiceMessage) -> ServiceMessage + Send + 'static,
    ) {
        let mut inbound = broker.subscribe("account.service.queue").await.unwrap();
        tokio::spawn(async move {
            while let Some(payload) = inbound.recv().await {
                let request: ServiceMessage = serde_json::from_str(&payload).unwrap();
                let reply = reply_with(&request);
                let route = format!("{}.service.response", request.sender_service);
                broker
                    .publish(&route, serde_json::to_string(&reply).unwrap())
                    .await
                    .unwrap();
            }
        });
    }

    /// 응답 라우트의 메시지를 레지스트리로 흘려보낸다
    async fn spawn_reply_pump(broker: Arc<InMemoryBroker>, registry: Arc<CorrelationRegistry>) {
        let mut inbound = broker.subscribe("auth.service.response").await.unwrap();
        tokio::spawn(async move {
            while let Some(payload) = inbound.recv().await {
                let reply: ServiceMessage = serde_json::from_str(&payload).unwrap();
                let id = reply.correlation_id.clone();
                registry.complete(&id, reply);
            }
        });
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        let broker = Arc::new(InMemoryBroker::new());
        let (client, registry) = gateway_over(broker.clone());
        spawn_echo_peer(broker.clone(), |request| {
            ServiceMessage::reply(request, "account", serde_json::json!({"id": 1}))
        })
        .await;
        spawn_reply_pump(broker.clone(), registry.clone()).await;

        let payload = client
            .call(
                "account",
                "getFindByEmail",
                serde_json::json!("a@b.com"),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(payload, serde_json::json!({"id": 1}));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_call_maps_peer_error_to_remote_error() {
        let broker = Arc::new(InMemoryBroker::new());
        let (client, registry) = gateway_over(broker.clone());
        spawn_echo_peer(broker.clone(), |request| {
            ServiceMessage::error_reply(request, "account", 409, "email already exists")
        })
        .await;
        spawn_reply_pump(broker.clone(), registry.clone()).await;

        let result = client
            .call(
                "account",
                "postCreateAccount",
                serde_json::json!({}),
                Duration::from_secs(1),
            )
            .await;

        match result {
            Err(AppError::RemoteError { code, message }) => {
                assert_eq!(code, 409);
                assert_eq!(message, "email already exists");
            }
            other => panic!("RemoteError 가 아님: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_call_times_out_without_peer() {
        let broker = Arc::new(InMemoryBroker::new());
        let (client, registry) = gateway_over(broker.clone());

        let result = client
            .call(
                "account",
                "getFindByEmail",
                serde_json::json!("a@b.com"),
                Duration::from_millis(100),
            )
            .await;

        assert!(matches!(result, Err(AppError::RemoteTimeout(_))));
        assert!(registry.is_empty());
    }
}
