//! 마켓 코드 정규화.
//!
//! 코인 별칭(한글 이름, 심볼, 이미 정규화된 마켓 코드)을 업비트의
//! `KRW-<심볼>` 마켓 코드로 변환합니다. 네트워크 접근이 없는 순수
//! 함수이며, 모르는 별칭은 심볼로 간주해 대문자화만 하므로 실패하지
//! 않습니다. 상장되지 않은 코드는 이후 시세 조회 단계에서 걸러집니다.

/// 원화 마켓 접두사.
pub const KRW_PREFIX: &str = "KRW-";

/// 코인 별칭 테이블 (한글 이름/축약형 → 심볼).
const COIN_ALIASES: &[(&str, &str)] = &[
    ("비트코인", "BTC"),
    ("비트", "BTC"),
    ("이더리움", "ETH"),
    ("이더", "ETH"),
    ("리플", "XRP"),
    ("도지코인", "DOGE"),
    ("도지", "DOGE"),
    ("솔라나", "SOL"),
];

/// 별칭 테이블이 아는 심볼 목록.
const KNOWN_SYMBOLS: &[&str] = &["BTC", "ETH", "XRP", "DOGE", "SOL"];

/// 코인 별칭을 마켓 코드로 정규화.
///
/// 해석 순서:
/// 1. 별칭 테이블 정확 일치 (`"비트코인"` → `"BTC"`)
/// 2. 불일치 시 입력을 심볼로 간주해 대문자화
/// 3. 이미 `KRW-` 접두사가 있으면 그대로 반환
/// 4. 아니면 `KRW-` 접두사를 붙여 반환
///
/// 자기 출력에 대해 멱등입니다: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(input: &str) -> String {
    let symbol = COIN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == input)
        .map(|(_, symbol)| (*symbol).to_string())
        .unwrap_or_else(|| input.to_uppercase());

    if symbol.starts_with(KRW_PREFIX) {
        symbol
    } else {
        format!("{}{}", KRW_PREFIX, symbol)
    }
}

/// 자유 텍스트에서 언급된 코인을 찾아 심볼을 반환.
///
/// 잔고 조회의 검색어 처리에 사용합니다. 별칭 테이블을 먼저 훑고,
/// 없으면 대문자화한 텍스트에서 알려진 심볼을 찾습니다.
pub fn detect_coin(text: &str) -> Option<&'static str> {
    for (alias, symbol) in COIN_ALIASES.iter().copied() {
        if text.contains(alias) {
            return Some(symbol);
        }
    }

    let upper = text.to_uppercase();
    KNOWN_SYMBOLS
        .iter()
        .find(|symbol| upper.contains(*symbol))
        .copied()
}
