use std::time::Duration;

/// 解析持续时间字符串，支持组合格式：
/// - 单一单位：500ms, 30s, 1m, 2h, 1d
/// - 组合格式：1h30m, 1m30s
/// - 纯数字按秒处理：60
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty duration".to_string());
    }

    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut remaining = input;

    while !remaining.is_empty() {
        let digits = remaining
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(remaining.len());
        if digits == 0 {
            return Err(format!("Invalid duration: '{}'", input));
        }
        let num: u64 = remaining[..digits]
            .parse()
            .map_err(|_| format!("Invalid number in duration: '{}'", input))?;
        remaining = &remaining[digits..];

        let unit_len = remaining
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(remaining.len());
        if unit_len == 0 {
            return Err(format!("Missing unit after '{}' in '{}'", num, input));
        }
        let unit = &remaining[..unit_len];
        remaining = &remaining[unit_len..];

        let overflow = || format!("Duration overflow in '{}'", input);
        let secs_times = |factor: u64| {
            num.checked_mul(factor)
                .map(Duration::from_secs)
                .ok_or_else(overflow)
        };
        let part = match unit.to_lowercase().as_str() {
            "ms" | "milli" | "millis" => Duration::from_millis(num),
            "s" | "sec" | "second" | "seconds" => Duration::from_secs(num),
            "m" | "min" | "minute" | "minutes" => secs_times(60)?,
            "h" | "hour" | "hours" => secs_times(3600)?,
            "d" | "day" | "days" => secs_times(86400)?,
            _ => return Err(format!("Unsupported duration unit: '{}'", unit)),
        };
        total = total.checked_add(part).ok_or_else(overflow)?;
    }

    Ok(total)
}

/// 将持续时间格式化为紧凑形式，例如 `1m30s`
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    let millis = duration.subsec_millis();
    if secs == 0 {
        return format!("{}ms", millis);
    }

    let mut out = String::new();
    for (unit, size) in [("d", 86400), ("h", 3600), ("m", 60), ("s", 1)] {
        if secs >= size {
            out.push_str(&format!("{}{}", secs / size, unit));
            secs %= size;
        }
    }
    if millis > 0 {
        out.push_str(&format!("{}ms", millis));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_units() {
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_duration("2h"), Ok(Duration::from_secs(7200)));
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("15"), Ok(Duration::from_secs(15)));
    }

    #[test]
    fn test_parse_combined() {
        assert_eq!(parse_duration("1m30s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration(" 1h1m "), Ok(Duration::from_secs(3660)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("10").is_ok());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("1m30").is_err());
    }

    #[test]
    fn test_parse_overflow_is_error() {
        let err = parse_duration("999999999999999999d").unwrap_err();
        assert!(err.contains("overflow"));
        assert!(parse_duration("18446744073709551615s1s").is_err());
        assert!(parse_duration("307445734561825861m").is_err());
        assert_eq!(
            parse_duration("18446744073709551615s"),
            Ok(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
    }
}
