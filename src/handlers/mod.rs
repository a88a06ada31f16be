//! 봉투 요청 핸들러 모듈

pub mod auth;

pub use auth::AuthHandlers;
