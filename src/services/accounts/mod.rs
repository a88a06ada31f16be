//! 계정 서비스 경계 모듈

pub mod account_service_client;

pub use account_service_client::*;
