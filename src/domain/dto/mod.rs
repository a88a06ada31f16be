//! 봉투 본문으로 주고받는 요청/응답 DTO 모듈

pub mod auth_request;
pub mod auth_response;

pub use auth_request::*;
pub use auth_response::*;
