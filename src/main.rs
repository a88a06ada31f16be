//! 인증 서비스 메인 애플리케이션
//!
//! 브로커에 연결하고 상관관계 레지스트리, 게이트웨이, 서비스,
//! 라우터를 구성한 뒤 세 개의 소비 루프를 시작합니다.

use std::sync::Arc;

use dotenv::dotenv;
use env_logger::Env;
use log::info;

use auth_service::config::BrokerConfig;
use auth_service::errors::AppResult;
use auth_service::handlers::AuthHandlers;
use auth_service::messaging::{
    ApiRequestConsumer, CorrelationRegistry, MessageBroker, RedisBroker, ServiceMessageClient,
    ServiceReplyConsumer, ServiceRequestConsumer,
};
use auth_service::routes::build_router;
use auth_service::services::accounts::AccountServiceClient;
use auth_service::services::auth::{GoogleOAuthService, GoogleOAuthSettings, TokenService};

#[tokio::main]
async fn main() -> AppResult<()> {
    load_env_file();
    init_logging();

    info!("🚀 인증 서비스 시작중...");

    // 브로커 연결과 상관관계 레지스트리 - 프로세스당 하나씩 만들어
    // 공유 핸들로 전달한다
    let broker: Arc<dyn MessageBroker> = Arc::new(RedisBroker::connect().await?);
    let registry = Arc::new(CorrelationRegistry::new());

    // 서비스 계층 구성
    let gateway = Arc::new(ServiceMessageClient::new(
        broker.clone(),
        registry.clone(),
        BrokerConfig::service_name(),
    ));
    let account_client = Arc::new(AccountServiceClient::new(gateway));
    let token_service = Arc::new(TokenService::from_env());
    let oauth_service = Arc::new(GoogleOAuthService::new(
        GoogleOAuthSettings::from_env(),
        account_client,
        token_service.clone(),
    ));

    // 라우터는 기동 시점에 한 번 구성된다
    let handlers = Arc::new(AuthHandlers::new(oauth_service, token_service.clone()));
    let router = Arc::new(build_router(handlers));
    info!("✅ {}개 라우트 등록 완료", router.len());

    // 소비 루프 시작
    let api_consumer = ApiRequestConsumer::new(broker.clone(), router);
    let service_consumer = Arc::new(ServiceRequestConsumer::new(broker.clone(), token_service));
    let reply_consumer = ServiceReplyConsumer::new(broker.clone(), registry.clone());

    tokio::spawn(async move {
        if let Err(e) = api_consumer.run().await {
            log::error!("API 요청 소비자 비정상 종료: {}", e);
        }
    });
    tokio::spawn(async move {
        if let Err(e) = service_consumer.run().await {
            log::error!("서비스 요청 소비자 비정상 종료: {}", e);
        }
    });
    tokio::spawn(async move {
        if let Err(e) = reply_consumer.run().await {
            log::error!("서비스 응답 소비자 비정상 종료: {}", e);
        }
    });

    info!("✅ 모든 소비자가 시작되었습니다");

    // 종료 신호까지 대기
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("종료 신호 대기 실패: {}", e);
    }
    info!("종료 신호 수신, 인증 서비스를 종료합니다. 대기중 호출 {}건", registry.len());

    Ok(())
}

/// .env 파일을 로드합니다
///
/// 파일이 없는 것은 정상입니다 (프로덕션은 실제 환경 변수 사용).
fn load_env_file() {
    match dotenv() {
        Ok(path) => println!("✅ 환경 파일 로드: {:?}", path),
        Err(_) => println!("ℹ️ .env 파일 없음, 시스템 환경 변수 사용"),
    }
}

/// 로깅을 초기화합니다. 기본 필터는 `info` 입니다.
fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
