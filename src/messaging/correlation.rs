//! # 상관관계 레지스트리
//!
//! 브로커로 비동기 도착하는 응답을 대기중인 호출자와 짝지어주는
//! 프로세스 단위 테이블입니다. 응답 수신 스레드와 호출자 태스크가
//! 서로 다른 실행 단위이므로, 상관관계 ID를 키로 한 일회성 완료
//! 슬롯(oneshot 채널)으로 둘을 연결합니다.
//!
//! ## 수명 주기
//!
//! ```text
//! register(id) ──► 테이블에 슬롯 등록
//!       │
//!       ├─ complete(id, msg) 도착 ──► 슬롯 제거 + 값 전달 (첫 완료만 유효)
//!       │
//!       └─ 타임아웃 ──► 슬롯 제거 + CorrelationTimeout
//! ```
//!
//! 등록된 항목은 완료 또는 타임아웃으로 반드시 테이블에서 제거되므로,
//! 테이블의 현재 크기가 곧 누수 지표입니다. 타임아웃 이후에 도착한
//! 응답은 항목을 찾지 못하고 조용히 버려집니다(기록된 경쟁 조건 -
//! 호출자는 이미 타임아웃 에러를 받았고, 늦은 응답은 낭비된 작업일 뿐
//! 정합성 위반이 아닙니다).
//!
//! 레지스트리는 프로세스당 한 번 생성되어 게이트웨이와 응답 소비자에
//! 공유 핸들로 전달됩니다. 전역 정적 상태가 아니므로 테스트마다
//! 독립된 인스턴스를 만들 수 있습니다.

use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::oneshot;

use crate::errors::{AppError, AppResult};
use crate::messaging::envelope::ServiceMessage;

/// 등록으로 얻는 대기 슬롯
///
/// `CorrelationRegistry::wait`에 넘겨 응답을 기다립니다.
/// 슬롯은 정확히 한 번 소비됩니다.
pub struct PendingCall {
    id: String,
    receiver: oneshot::Receiver<ServiceMessage>,
}

impl PendingCall {
    /// 이 슬롯의 상관관계 ID
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// 상관관계 ID → 대기 슬롯 테이블
///
/// 임의의 워커 태스크에서 동시에 등록/완료/제거가 일어나므로
/// 동시성 맵(`DashMap`)으로 보관합니다. 이 테이블이 이 코어에서
/// 유일하게 동시 변경되는 공유 구조입니다.
pub struct CorrelationRegistry {
    pending: DashMap<String, oneshot::Sender<ServiceMessage>>,
}

impl CorrelationRegistry {
    /// 빈 레지스트리를 만듭니다.
    pub fn new() -> Self {
        CorrelationRegistry {
            pending: DashMap::new(),
        }
    }

    /// 상관관계 ID를 등록하고 대기 슬롯을 돌려받습니다.
    ///
    /// ID는 호출자가 생성한 고유값(UUID)이어야 합니다. 이미 대기중인
    /// ID로 다시 등록하는 것은 복구 가능한 상황이 아니라 호출자 버그이며
    /// `DuplicateCorrelation`으로 실패합니다.
    pub fn register(&self, id: &str) -> AppResult<PendingCall> {
        match self.pending.entry(id.to_string()) {
            Entry::Occupied(_) => Err(AppError::DuplicateCorrelation(id.to_string())),
            Entry::Vacant(vacant) => {
                let (sender, receiver) = oneshot::channel();
                vacant.insert(sender);
                Ok(PendingCall {
                    id: id.to_string(),
                    receiver,
                })
            }
        }
    }

    /// 도착한 응답으로 대기 슬롯을 완료합니다.
    ///
    /// 브로커 수신 경로에서 실행되므로 절대 실패하지 않습니다.
    /// ID가 없으면(이미 완료되었거나 타임아웃으로 제거됨) 응답을
    /// 버리고 로그만 남깁니다. 같은 ID에 대한 두 번째 완료 역시
    /// 항목이 없으므로 아무 효과가 없습니다.
    pub fn complete(&self, id: &str, message: ServiceMessage) {
        match self.pending.remove(id) {
            Some((_, sender)) => {
                if sender.send(message).is_err() {
                    log::warn!("상관관계 {} 의 대기자가 이미 떠났습니다. 응답을 버립니다", id);
                }
            }
            None => {
                log::warn!(
                    "상관관계 {} 에 대한 늦은 응답을 버립니다 (이미 완료되었거나 시간 초과)",
                    id
                );
            }
        }
    }

    /// 완료 또는 타임아웃까지 호출 태스크를 대기시킵니다.
    ///
    /// 프로세스 전체가 아니라 호출한 태스크만 대기합니다.
    /// 타임아웃 시 항목을 제거하고 `CorrelationTimeout`으로 실패하며,
    /// 성공 시 항목은 `complete` 쪽에서 이미 제거된 상태입니다.
    pub async fn wait(&self, call: PendingCall, timeout: Duration) -> AppResult<ServiceMessage> {
        match tokio::time::timeout(timeout, call.receiver).await {
            Ok(Ok(message)) => Ok(message),
            Ok(Err(_)) => {
                // 송신 슬롯이 전달 없이 사라진 경우 - 레지스트리 외부에서
                // 일어날 수 없는 상태이므로 내부 에러로 취급
                self.pending.remove(&call.id);
                Err(AppError::InternalError(format!(
                    "상관관계 {} 의 응답 슬롯이 닫혔습니다",
                    call.id
                )))
            }
            Err(_) => {
                self.pending.remove(&call.id);
                Err(AppError::CorrelationTimeout(call.id))
            }
        }
    }

    /// 발행 실패 등으로 대기를 포기할 때 등록을 정리합니다.
    pub fn discard(&self, id: &str) {
        self.pending.remove(id);
    }

    /// 현재 대기중인 항목 수 - 누수 지표
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// 대기중인 항목이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for CorrelationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
