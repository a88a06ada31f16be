//! # 메시지 브로커 추상화
//!
//! 이 서비스는 브로커를 최소한의 계약(라우트에 발행, 라우트 구독)으로만
//! 사용합니다. 전달 보장은 전송 계층의 몫이며, 이 코어는 최소-한-번
//! 전달과 큐 내 비순서를 전제로 동작합니다 - 비순서 전달을 안전하게
//! 만드는 것이 바로 상관관계 메커니즘입니다.
//!
//! 기본 구현은 Redis pub/sub이며, 테스트와 로컬 실행을 위한
//! 인메모리 구현을 함께 제공합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::{Mutex, mpsc};

use crate::config::BrokerConfig;
use crate::errors::{AppError, AppResult};

/// 구독으로 얻는 인바운드 메시지 수신 채널
pub type InboundReceiver = mpsc::Receiver<String>;

/// 브로커 경계 트레이트
///
/// 발행은 fire-and-forget이고, 구독은 라우트의 메시지를 순서 보장 없이
/// 흘려보내는 수신 채널을 돌려줍니다.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// 라우트로 페이로드를 발행합니다.
    async fn publish(&self, route: &str, payload: String) -> AppResult<()>;

    /// 라우트를 구독하고 수신 채널을 돌려받습니다.
    async fn subscribe(&self, route: &str) -> AppResult<InboundReceiver>;
}

/// Redis pub/sub 기반 브로커
///
/// 발행은 멀티플렉싱된 관리 연결(ConnectionManager)을 공유하고,
/// 구독마다 전용 pub/sub 연결을 하나씩 엽니다.
pub struct RedisBroker {
    client: redis::Client,
    publish_conn: ConnectionManager,
}

impl RedisBroker {
    /// 환경 변수 `BROKER_URL`로 브로커에 연결합니다.
    ///
    /// 연결 직후 PING으로 서버 가용성을 확인합니다.
    pub async fn connect() -> AppResult<Self> {
        let url = BrokerConfig::url();
        let client = redis::Client::open(url.clone())
            .map_err(|e| AppError::InternalError(format!("브로커 URL 해석 실패: {}", e)))?;

        let mut publish_conn = ConnectionManager::new(client.clone())
            .await
            .map_err(|e| AppError::InternalError(format!("브로커 연결 실패: {}", e)))?;

        redis::cmd("PING")
            .query_async::<()>(&mut publish_conn)
            .await
            .map_err(|e| AppError::InternalError(format!("브로커 응답 없음: {}", e)))?;

        log::info!("✅ 브로커 연결 성공: {}", url);

        Ok(RedisBroker {
            client,
            publish_conn,
        })
    }
}

#[async_trait]
impl MessageBroker for RedisBroker {
    async fn publish(&self, route: &str, payload: String) -> AppResult<()> {
        let mut conn = self.publish_conn.clone();
        conn.publish::<_, _, ()>(route, payload)
            .await
            .map_err(|e| AppError::InternalError(format!("{} 발행 실패: {}", route, e)))
    }

    async fn subscribe(&self, route: &str) -> AppResult<InboundReceiver> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| AppError::InternalError(format!("구독 연결 실패: {}", e)))?;
        pubsub
            .subscribe(route)
            .await
            .map_err(|e| AppError::InternalError(format!("{} 구독 실패: {}", route, e)))?;

        let (sender, receiver) = mpsc::channel(256);
        let route = route.to_string();

        tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            while let Some(message) = stream.next().await {
                match message.get_payload::<String>() {
                    Ok(payload) => {
                        if sender.send(payload).await.is_err() {
                            // 수신측이 내려갔으면 구독 유지 이유가 없다
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("{} 에서 해석할 수 없는 페이로드 무시: {}", route, e);
                    }
                }
            }
            log::info!("{} 구독 종료", route);
        });

        Ok(receiver)
    }
}

/// 인메모리 브로커
///
/// 외부 브로커 없이 테스트와 로컬 실행을 지원합니다.
/// 라우트별 구독자 전원에게 페이로드를 복제 전달합니다.
pub struct InMemoryBroker {
    topics: Mutex<HashMap<String, Vec<mpsc::Sender<String>>>>,
}

impl InMemoryBroker {
    /// 빈 브로커를 만듭니다.
    pub fn new() -> Self {
        InMemoryBroker {
            topics: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBroker for InMemoryBroker {
    async fn publish(&self, route: &str, payload: String) -> AppResult<()> {
        let mut topics = self.topics.lock().await;
        if let Some(subscribers) = topics.get_mut(route) {
            // 닫힌 구독자는 전달 시점에 정리
            let mut alive = Vec::with_capacity(subscribers.len());
            for subscriber in subscribers.drain(..) {
                if subscriber.send(payload.clone()).await.is_ok() {
                    alive.push(subscriber);
                }
            }
            *subscribers = alive;
        }
        Ok(())
    }

    async fn subscribe(&self, route: &str) -> AppResult<InboundReceiver> {
        let (sender, receiver) = mpsc::channel(256);
        let mut topics = self.topics.lock().await;
        topics.entry(route.to_string()).or_default().push(sender);
        Ok(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_broker_delivers_to_subscriber() {
        let broker = InMemoryBroker::new();
        let mut inbound = broker.subscribe("auth.api.queue").await.unwrap();

        broker
            .publish("auth.api.queue", "hello".to_string())
            .await
            .unwrap();

        assert_eq!(inbound.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_in_memory_broker_routes_are_isolated() {
        let broker = InMemoryBroker::new();
        let mut inbound = broker.subscribe("route.a").await.unwrap();

        broker.publish("route.b", "b".to_string()).await.unwrap();
        broker.publish("route.a", "a".to_string()).await.unwrap();

        assert_eq!(inbound.recv().await.unwrap(), "a");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_not_an_error() {
        let broker = InMemoryBroker::new();
        assert!(broker.publish("nobody", "x".to_string()).await.is_ok());
    }
}
