//! 업비트 거래소 REST 커넥터.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `UpbitClient`: 계좌/시세/주문 REST API 클라이언트
//! - JWT 형식 Bearer 자격증명 서명 (HMAC-SHA256 + SHA-512 쿼리 해시)
//! - 업비트 에러 페이로드를 보존하는 에러 타입
//!
//! 재시도나 자동 복구는 없습니다. 네트워크 실패와 비정상 응답은 즉시
//! 호출자에게 그대로 전달됩니다 (주문의 이중 제출 방지).

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::UpbitClient;
pub use config::UpbitConfig;
pub use error::{UpbitError, UpbitResult};
pub use types::*;
