//! 자연어 명령 해석기.
//!
//! 키워드 기반 분류 후 정규식으로 항목을 추출합니다. 문법이 아닌
//! 최선-노력 휴리스틱이므로, 모호하거나 창의적인 입력은 주문을
//! 잘못 실행하는 대신 사용법 안내로 빠집니다.
//!
//! 분류는 순서에 민감합니다: 잔고 → 시세 → 매수 → 매도 순으로
//! 검사하며 먼저 일치한 카테고리가 이깁니다.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use upbit_core::intent::{SellVolume, TradingIntent, Usage};

static PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([가-힣a-zA-Z]+)\s*(시세|가격|price)").expect("price pattern"));

static BUY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([가-힣a-zA-Z]+)\s*([\d,]+)\s*(원|만원)?\s*(어치)?\s*(매수|사)")
        .expect("buy pattern")
});

static SELL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([가-힣a-zA-Z]+)\s*(전부|[\d.]+)?\s*(매도|팔)").expect("sell pattern")
});

const BALANCE_KEYWORDS: &[&str] = &["잔고", "balance", "얼마"];
const PRICE_KEYWORDS: &[&str] = &["시세", "가격", "price"];
const BUY_KEYWORDS: &[&str] = &["매수", "사", "buy"];
const SELL_KEYWORDS: &[&str] = &["매도", "팔", "sell"];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// 자유 텍스트를 거래 의도로 해석.
///
/// 키워드 검사는 소문자화한 텍스트에, 항목 추출은 원문에 수행합니다.
pub fn interpret(text: &str) -> TradingIntent {
    let lowered = text.to_lowercase();

    if contains_any(&lowered, BALANCE_KEYWORDS) {
        return TradingIntent::Balance {
            query: text.to_string(),
        };
    }

    if contains_any(&lowered, PRICE_KEYWORDS) {
        return match PRICE_PATTERN.captures(text) {
            Some(caps) => TradingIntent::Price {
                coin: caps[1].to_string(),
            },
            None => TradingIntent::Malformed {
                usage: Usage::Price,
            },
        };
    }

    if contains_any(&lowered, BUY_KEYWORDS) {
        return interpret_buy(text);
    }

    if contains_any(&lowered, SELL_KEYWORDS) {
        return interpret_sell(text);
    }

    TradingIntent::Unknown
}

fn interpret_buy(text: &str) -> TradingIntent {
    let Some(caps) = BUY_PATTERN.captures(text) else {
        return TradingIntent::Malformed { usage: Usage::Buy };
    };

    let digits = caps[2].replace(',', "");
    let Ok(mut amount) = digits.parse::<Decimal>() else {
        return TradingIntent::Malformed { usage: Usage::Buy };
    };

    // "만원" 단위는 10,000배
    if caps.get(3).map(|m| m.as_str()) == Some("만원") {
        amount *= Decimal::from(10_000);
    }

    TradingIntent::Buy {
        coin: caps[1].to_string(),
        amount_krw: amount,
    }
}

fn interpret_sell(text: &str) -> TradingIntent {
    let Some(caps) = SELL_PATTERN.captures(text) else {
        return TradingIntent::Malformed { usage: Usage::Sell };
    };

    let volume = match caps.get(2).map(|m| m.as_str()) {
        Some("전부") => SellVolume::All,
        Some(raw) => match raw.parse::<Decimal>() {
            Ok(value) => SellVolume::Amount(value),
            Err(_) => return TradingIntent::Malformed { usage: Usage::Sell },
        },
        // 수량 생략은 0으로 두고 안전 장치가 거부하게 한다
        None => SellVolume::Amount(Decimal::ZERO),
    };

    TradingIntent::Sell {
        coin: caps[1].to_string(),
        volume,
    }
}
