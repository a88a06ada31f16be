//! 브로커 전송 봉투
//!
//! 브로커를 오가는 모든 메시지의 JSON 형태를 정의합니다.
//! 상관관계 ID는 브로커 네이티브 메시지 속성이 없는 전송 계층에서도
//! 짝짓기가 가능하도록 항상 페이로드 내부에 실립니다.
//! 필드 이름은 기존 게이트웨이/피어와의 와이어 호환을 위해 camelCase입니다.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API Gateway가 전달하는 요청 봉투
///
/// 수신 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    /// HTTP 메서드 (디스패치 키의 앞부분)
    pub method: String,
    /// 요청 경로 (디스패치 키의 뒷부분)
    pub path: String,
    /// 요청 본문 (JSON 문자열, 쿼리 파라미터도 게이트웨이가 본문으로 변환)
    #[serde(default)]
    pub body: String,
    /// 요청 헤더
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// 요청/응답 쌍을 잇는 상관관계 ID
    pub correlation_id: String,
}

/// 게이트웨이로 돌려보내는 응답 봉투
///
/// 요청마다 새로 만들어지며, 상관관계 ID는 성공/실패와 무관하게
/// 항상 인바운드 봉투에서 복사됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// HTTP 호환 상태 코드
    pub status_code: u16,
    /// 응답 헤더
    pub headers: HashMap<String, String>,
    /// 응답 본문 (JSON 문자열)
    pub body: String,
    /// 인바운드 봉투에서 복사한 상관관계 ID
    pub correlation_id: String,
}

impl ResponseEnvelope {
    /// JSON 본문을 담은 응답 봉투를 만듭니다.
    pub fn json(correlation_id: &str, status_code: u16, body: String) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        ResponseEnvelope {
            status_code,
            headers,
            body,
            correlation_id: correlation_id.to_string(),
        }
    }

    /// 에러 응답 봉투를 만듭니다.
    ///
    /// 모든 실패는 최소한 에러 메시지를 담은 JSON 본문을 갖습니다.
    pub fn error(correlation_id: &str, status_code: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::json(correlation_id, status_code, body)
    }
}

/// 서비스 간 RPC 봉투
///
/// 피어 서비스로의 요청과 그 응답이 같은 형태를 공유합니다.
/// 응답은 요청의 `operation`에 `Response`를 붙여 돌아옵니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMessage {
    /// 요청/응답 쌍을 잇는 상관관계 ID
    pub correlation_id: String,
    /// 발신 서비스 이름 (응답 라우트 유도에 사용)
    pub sender_service: String,
    /// 작업 이름 (예: "getFindByEmail")
    pub operation: String,
    /// 작업 페이로드 - 형태는 각 작업이 소유
    #[serde(default)]
    pub payload: Value,
    /// 피어가 보고한 실패 (성공 시 없음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceErrorPayload>,
}

/// 피어 실패의 불투명한 에러 서술자
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceErrorPayload {
    /// HTTP 호환 상태 코드
    pub status_code: u16,
    /// 에러 메시지
    pub message: String,
}

impl ServiceMessage {
    /// 피어 서비스로 보낼 요청 메시지를 만듭니다.
    pub fn request(
        correlation_id: &str,
        sender_service: &str,
        operation: &str,
        payload: Value,
    ) -> Self {
        ServiceMessage {
            correlation_id: correlation_id.to_string(),
            sender_service: sender_service.to_string(),
            operation: operation.to_string(),
            payload,
            error: None,
        }
    }

    /// 요청에 대한 성공 응답 메시지를 만듭니다.
    pub fn reply(request: &ServiceMessage, sender_service: &str, payload: Value) -> Self {
        ServiceMessage {
            correlation_id: request.correlation_id.clone(),
            sender_service: sender_service.to_string(),
            operation: format!("{}Response", request.operation),
            payload,
            error: None,
        }
    }

    /// 요청에 대한 에러 응답 메시지를 만듭니다.
    pub fn error_reply(
        request: &ServiceMessage,
        sender_service: &str,
        status_code: u16,
        message: &str,
    ) -> Self {
        ServiceMessage {
            correlation_id: request.correlation_id.clone(),
            sender_service: sender_service.to_string(),
            operation: format!("{}Response", request.operation),
            payload: Value::Null,
            error: Some(ServiceErrorPayload {
                status_code,
                message: message.to_string(),
            }),
        }
    }
}
