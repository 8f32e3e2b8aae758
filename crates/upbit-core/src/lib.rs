//! # Upbit Core
//!
//! 업비트 수동 거래 도구의 핵심 도메인 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 자연어 명령에서 도출되는 거래 의도 타입
//! - 마켓 코드 정규화 (코인 별칭 → `KRW-` 마켓 코드)
//! - 원화/변동률 표시 포맷팅
//! - 로깅 인프라

pub mod format;
pub mod intent;
pub mod logging;
pub mod market;

pub use format::*;
pub use intent::*;
pub use market::*;
