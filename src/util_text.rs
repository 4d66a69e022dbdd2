use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Format a count with thousands separators
/// Examples: "0", "999", "1,234", "12,345,678"
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Convert an ISO 8601 video duration to a clock string
/// Examples: "PT1H2M3S" -> "1:02:03", "PT4M5S" -> "04:05", "PT45S" -> "00:45"
pub fn format_duration(iso: &str) -> String {
    let Some(body) = iso.trim().strip_prefix("PT") else {
        return "00:00".to_string();
    };

    let (mut hours, mut minutes, mut seconds) = (None, None, None);
    let mut acc = String::new();
    for ch in body.chars() {
        match ch {
            '0'..='9' => acc.push(ch),
            'H' => hours = Some(std::mem::take(&mut acc)),
            'M' => minutes = Some(std::mem::take(&mut acc)),
            'S' => seconds = Some(std::mem::take(&mut acc)),
            _ => return "00:00".to_string(),
        }
    }

    let mut result = String::new();
    if let Some(h) = hours.filter(|h| !h.is_empty()) {
        result.push_str(&h);
        result.push(':');
    }
    result.push_str(&format!("{:0>2}:", minutes.unwrap_or_default()));
    result.push_str(&format!("{:0>2}", seconds.unwrap_or_default()));
    result
}

/// Human-friendly age of a timestamp relative to `now`
pub fn format_relative(when: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(when) = when else {
        return "Unknown date".to_string();
    };

    let diff = (now - when).abs();
    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if minutes < 60 {
        format!("{minutes} {} ago", if minutes == 1 { "minute" } else { "minutes" })
    } else if hours < 24 {
        format!("{hours} {} ago", if hours == 1 { "hour" } else { "hours" })
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{days} days ago")
    } else {
        when.format("%b %-d, %Y").to_string()
    }
}

/// Link that opens a comment in the context of its video
pub fn comment_permalink(video_id: &str, comment_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}&lc={comment_id}")
}

/// Parse RFC 3339 or naive ISO timestamps (the backend emits both)
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn value_as_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accept counts as JSON numbers or numeric strings; anything else reads as 0
pub fn de_lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(value_as_u64(&v).unwrap_or(0))
}

/// Same as [`de_lenient_u64`] for fractional amounts such as earnings
pub fn de_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&v).unwrap_or(0.0))
}

/// Timestamps that fail to parse become `None` instead of failing the payload
pub fn de_lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(v.as_str().and_then(parse_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration("PT1H2M3S"), "1:02:03");
        assert_eq!(format_duration("PT4M5S"), "04:05");
        assert_eq!(format_duration("PT45S"), "00:45");
        assert_eq!(format_duration("PT10M"), "10:00");
        assert_eq!(format_duration("garbage"), "00:00");
    }

    #[test]
    fn test_format_relative() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        assert_eq!(format_relative(None, now), "Unknown date");
        assert_eq!(format_relative(Some(now - Duration::minutes(1)), now), "1 minute ago");
        assert_eq!(format_relative(Some(now - Duration::minutes(5)), now), "5 minutes ago");
        assert_eq!(format_relative(Some(now - Duration::hours(3)), now), "3 hours ago");
        assert_eq!(format_relative(Some(now - Duration::hours(30)), now), "Yesterday");
        assert_eq!(format_relative(Some(now - Duration::days(4)), now), "4 days ago");
        assert_eq!(format_relative(Some(now - Duration::days(30)), now), "Feb 19, 2024");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let rfc = parse_timestamp("2024-03-20T12:00:00Z").unwrap();
        let naive = parse_timestamp("2024-03-20T12:00:00.250000").unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap());
        assert_eq!(naive.timestamp(), rfc.timestamp());
        assert!(parse_timestamp("yesterday-ish").is_none());
    }

    #[test]
    fn test_lenient_numbers() {
        #[derive(Deserialize)]
        struct Counts {
            #[serde(deserialize_with = "de_lenient_u64")]
            a: u64,
            #[serde(deserialize_with = "de_lenient_u64")]
            b: u64,
            #[serde(deserialize_with = "de_lenient_u64")]
            c: u64,
            #[serde(deserialize_with = "de_lenient_f64")]
            earnings: f64,
        }
        let c: Counts =
            serde_json::from_str(r#"{"a": 12, "b": "3400", "c": null, "earnings": "12.50"}"#)
                .unwrap();
        assert_eq!((c.a, c.b, c.c), (12, 3400, 0));
        assert_eq!(c.earnings, 12.5);
    }

    #[test]
    fn test_permalink() {
        assert_eq!(
            comment_permalink("vid1", "c9"),
            "https://www.youtube.com/watch?v=vid1&lc=c9"
        );
    }
}
