//! 信頼度の表示整形
//!
//! 小数点以下2桁、四捨五入（half-up）。
//! 丸めは f64 の最短10進表現に対して行うため、`99.995` は `100.00` になる
//! （2進表現そのままを丸めると `99.99` になってしまう）。

/// 信頼度を小数点以下2桁の文字列にする
///
/// # Examples
/// ```
/// use gym_label_common::format_confidence;
///
/// assert_eq!(format_confidence(7.0), "7.00");
/// assert_eq!(format_confidence(12.345), "12.35");
/// assert_eq!(format_confidence(99.995), "100.00");
/// ```
pub fn format_confidence(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // f64 の Display は指数表記を使わない
    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().map(|b| b - b'0').collect();
    let mut frac = frac_part.bytes().map(|b| b - b'0');
    digits.push(frac.next().unwrap_or(0));
    digits.push(frac.next().unwrap_or(0));

    if frac.next().is_some_and(|d| d >= 5) {
        carry(&mut digits);
    }

    let split = digits.len() - 2;
    let to_str = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let is_zero = digits.iter().all(|&d| d == 0);
    let sign = if value.is_sign_negative() && !is_zero { "-" } else { "" };

    format!("{}{}.{}", sign, to_str(&digits[..split]), to_str(&digits[split..]))
}

/// 末尾の桁に1を足して繰り上げる
fn carry(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == 9 {
            *d = 0;
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, 1);
}

/// 検出結果1件を `"Name (NN.NN%)"` 形式にする
pub fn format_detection(name: &str, confidence: f64) -> String {
    format!("{} ({}%)", name, format_confidence(confidence))
}
