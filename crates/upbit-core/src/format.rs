//! 표시 포맷팅 헬퍼.
//!
//! 사용자에게 보여줄 원화 금액과 변동률 문자열을 만듭니다.

use rust_decimal::{Decimal, RoundingStrategy};

/// 원화 금액 포맷팅. 원 단위로 반올림하고 천 단위 구분 기호를 붙입니다.
///
/// 예: `1234567` → `"₩1,234,567"`
pub fn format_krw(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-₩{}", grouped)
    } else {
        format!("₩{}", grouped)
    }
}

/// 변동률 포맷팅. 비율(0.0123 = 1.23%)을 부호가 붙은 백분율로 바꿉니다.
///
/// 예: `0.0123` → `"+1.23%"`, `-0.005` → `"-0.50%"`
pub fn format_change_rate(rate: Decimal) -> String {
    let pct = rate * Decimal::ONE_HUNDRED;
    if rate >= Decimal::ZERO {
        format!("+{:.2}%", pct)
    } else {
        format!("{:.2}%", pct)
    }
}
