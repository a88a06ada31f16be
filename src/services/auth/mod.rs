//! 인증 및 보안 서비스 모듈
//!
//! JWT 토큰 코덱과 Google OAuth 연합 인증 오케스트레이터를 제공합니다.
//!
//! # Security
//!
//! - HMAC-SHA256 자체 토큰 서명
//! - Google ID 토큰의 RS256 서명/audience 검증
//! - 토큰 만료 시간 관리

pub mod google_oauth_service;
pub mod token_service;

pub use google_oauth_service::*;
pub use token_service::*;
