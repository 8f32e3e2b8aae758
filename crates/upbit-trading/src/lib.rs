//! 업비트 수동 거래 로직.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 자연어 명령 해석기 (잔고/시세/매수/매도 분류 및 항목 추출)
//! - 주문 안전 장치 (수수료 여유분 포함 잔고 검증, 매도 수량 클램핑)
//! - 다섯 가지 액션(잔고/시세/매수/매도/자연어 명령)을 노출하는
//!   `ManualTrader` 서비스

pub mod actions;
pub mod interpreter;
pub mod safety;

pub use actions::{ActionReply, ManualTrader};
pub use interpreter::interpret;
pub use safety::{BuyReport, OrderGuard, SellReport, TradeConfig, TradeError, TradeResult};
