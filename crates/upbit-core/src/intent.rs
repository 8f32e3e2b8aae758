//! 거래 의도 타입.
//!
//! 자연어 명령 해석기의 출력이자 안전 장치 계층의 입력입니다.
//! 닫힌 sum type이므로 모든 소비자가 네 가지 의도와 미해석 케이스를
//! 전부 처리해야 합니다.

use rust_decimal::Decimal;

/// 매도 수량 지정.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellVolume {
    /// 보유 수량 전부
    All,
    /// 지정 수량
    Amount(Decimal),
}

impl SellVolume {
    /// 문자열에서 파싱. `"all"`/`"전부"`는 전량 매도를 의미합니다.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "all" | "전부" => Some(SellVolume::All),
            other => other.parse().ok().map(SellVolume::Amount),
        }
    }
}

/// 자연어 명령에서 도출된 거래 의도.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradingIntent {
    /// 잔고 조회 (원문을 검색어로 유지)
    Balance { query: String },
    /// 시세 조회
    Price { coin: String },
    /// 시장가 매수 (원화 금액 기준)
    Buy { coin: String, amount_krw: Decimal },
    /// 시장가 매도 (수량 또는 전량)
    Sell { coin: String, volume: SellVolume },
    /// 카테고리는 식별했으나 필수 항목 추출 실패 → 사용법 안내
    Malformed { usage: Usage },
    /// 어떤 카테고리에도 해당하지 않는 입력
    Unknown,
}

/// 추출 실패 시 안내할 명령 카테고리.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Price,
    Buy,
    Sell,
}

impl Usage {
    /// 카테고리별 사용법 안내 메시지.
    pub fn hint(&self) -> &'static str {
        match self {
            Usage::Price => "❌ 코인 이름을 찾을 수 없습니다. 예: \"비트코인 시세\"",
            Usage::Buy => "❌ 형식 오류. 예: \"비트코인 10만원 매수\"",
            Usage::Sell => {
                "❌ 형식 오류. 예: \"비트코인 전부 매도\" 또는 \"이더 0.1 매도\""
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sell_volume_parse() {
        assert_eq!(SellVolume::parse("all"), Some(SellVolume::All));
        assert_eq!(SellVolume::parse("전부"), Some(SellVolume::All));
        assert_eq!(SellVolume::parse("0.5"), Some(SellVolume::Amount(dec!(0.5))));
        assert_eq!(SellVolume::parse(" 2 "), Some(SellVolume::Amount(dec!(2))));
        assert_eq!(SellVolume::parse("절반"), None);
    }

    #[test]
    fn test_usage_hints_name_an_example() {
        assert!(Usage::Price.hint().contains("비트코인 시세"));
        assert!(Usage::Buy.hint().contains("10만원 매수"));
        assert!(Usage::Sell.hint().contains("전부 매도"));
    }
}
