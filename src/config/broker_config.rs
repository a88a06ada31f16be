//! # Broker Configuration Module
//!
//! 메시지 브로커 연결 정보와 논리 채널(큐/라우팅 키) 이름,
//! 그리고 호출 단위 타임아웃을 관리하는 모듈입니다.
//!
//! ## 논리 채널 구성
//!
//! ```text
//! API Gateway ──(auth.api.queue)──────────► Auth Service
//! Auth Service ──(api.gateway.response)───► API Gateway
//! Peer Service ──(auth.service.queue)─────► Auth Service
//! Auth Service ──(account.service.queue)──► Account Service
//! Account Service ──(auth.service.response)► Auth Service
//! ```
//!
//! 상관관계 ID는 브로커 네이티브 속성이 없는 전송 계층에서도 동작하도록
//! 항상 페이로드 내부에 함께 실립니다.

use std::env;
use std::time::Duration;

/// API Gateway가 이 서비스로 보내는 외부 요청 큐
pub const AUTH_API_QUEUE: &str = "auth.api.queue";

/// 피어 서비스가 이 서비스로 보내는 서비스 간 요청 큐
pub const AUTH_SERVICE_QUEUE: &str = "auth.service.queue";

/// 이 서비스가 보낸 서비스 간 요청에 대한 응답이 돌아오는 라우트
pub const AUTH_SERVICE_RESPONSE_ROUTE: &str = "auth.service.response";

/// API 요청에 대한 응답을 게이트웨이로 돌려보내는 라우트
pub const API_GATEWAY_RESPONSE_ROUTE: &str = "api.gateway.response";

/// 계정 서비스의 요청 큐
pub const ACCOUNT_SERVICE_QUEUE: &str = "account.service.queue";

/// 대상 서비스 이름으로 요청 큐 이름을 만듭니다.
pub fn service_request_route(service: &str) -> String {
    format!("{}.service.queue", service)
}

/// 발신 서비스 이름으로 응답 라우트 이름을 만듭니다.
///
/// 피어는 요청 메시지의 `senderService` 필드를 보고 이 라우트로 응답합니다.
pub fn service_response_route(service: &str) -> String {
    format!("{}.service.response", service)
}

/// 메시지 브로커 및 워커 풀 설정을 관리하는 구조체
///
/// 타임아웃 값들은 설정이지 계약이 아니지만, 모든 대기 지점에는
/// 반드시 타임아웃이 존재해야 합니다.
pub struct BrokerConfig;

impl BrokerConfig {
    /// 브로커 접속 URL을 반환합니다. 기본값 `redis://localhost:6379`.
    pub fn url() -> String {
        env::var("BROKER_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// 이 서비스의 논리 이름을 반환합니다.
    ///
    /// 서비스 간 메시지의 `senderService` 필드와 응답 라우트 유도에 사용됩니다.
    pub fn service_name() -> String {
        env::var("SERVICE_NAME")
            .unwrap_or_else(|_| "auth".to_string())
    }

    /// 핸들러 워커 풀 크기를 반환합니다. 기본값 16.
    ///
    /// 느린 핸들러가 브로커 수신 루프를 막지 않도록, 핸들러는 이 크기로
    /// 제한된 별도 태스크에서 실행됩니다.
    pub fn worker_count() -> usize {
        env::var("WORKER_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(16)
    }

    /// 외부(프로바이더) 경로의 호출 타임아웃. 기본값 10초.
    pub fn external_call_timeout() -> Duration {
        let secs = env::var("EXTERNAL_CALL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        Duration::from_secs(secs)
    }

    /// 서비스 간 요청/응답 호출 타임아웃. 기본값 5초.
    pub fn service_call_timeout() -> Duration {
        let secs = env::var("SERVICE_CALL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        Duration::from_secs(secs)
    }
}
