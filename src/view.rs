//! Renders a dashboard `Frame` as plain text.

use crate::clock::month_day_label;
use crate::dashboard::Frame;
use crate::model::{Transaction, WeatherStatus};
use crate::shortcuts::{shortcuts, Target};
use crate::weather::WeatherView;
use chrono_tz::Tz;
use std::fmt::Write;

pub const IMAGE_FAILED: &str = "이미지 생성 실패";
const IMAGE_LOADING: &str = "이미지 생성 중...";
const WEATHER_LOADING: &str = "날씨 정보를 불러오는 중...";
const NO_TRANSACTIONS: &str = "기록된 지출이 없습니다.";
const RULE: &str = "────────────────────────────────";

/// Draws the whole dashboard.
pub fn render(frame: &Frame) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        frame.clock.day_label, frame.clock.weekday_label
    );
    out.push_str(RULE);
    out.push('\n');
    if frame.shortcuts_open {
        out.push_str(&render_shortcuts(news_link(&frame.weather)));
    } else {
        let _ = writeln!(out, "    {}", frame.clock.time_label);
    }
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&render_weather(&frame.weather));
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&render_ledger(frame));
    out
}

fn news_link(view: &WeatherView) -> Option<&str> {
    view.snapshot.as_ref().and_then(|s| s.news_link.as_deref())
}

/// Lists the shortcuts, numbered from 1.
pub fn render_shortcuts(news_link: Option<&str>) -> String {
    let mut out = String::new();
    for (ix, shortcut) in shortcuts(news_link).iter().enumerate() {
        let _ = match &shortcut.target {
            Target::Ledger => writeln!(out, "{:>2}. {}", ix + 1, shortcut.label),
            Target::Link { url } => writeln!(out, "{:>2}. {}  {url}", ix + 1, shortcut.label),
        };
    }
    out
}

pub fn render_weather(view: &WeatherView) -> String {
    let mut out = String::new();
    let Some(snapshot) = view.snapshot.as_ref() else {
        let _ = writeln!(out, "{WEATHER_LOADING}");
        return out;
    };
    let _ = writeln!(
        out,
        "{} {}  {}°  (최저 {}° / 최고 {}°)  {}",
        snapshot.kind().glyph(),
        snapshot.location,
        format_temp(snapshot.current_temp),
        format_temp(snapshot.low_temp),
        format_temp(snapshot.high_temp),
        snapshot.condition
    );
    let _ = writeln!(out, "{}", snapshot.comment);

    match (&view.image, view.status) {
        (Some(image), _) => {
            let size = image.bytes().map(|b| b.len()).unwrap_or_default();
            let _ = writeln!(out, "[{} 이미지, {size} bytes]", image.mime_type());
        }
        (None, WeatherStatus::Loading) if !snapshot.image_prompt.trim().is_empty() => {
            let _ = writeln!(out, "{IMAGE_LOADING}");
        }
        (None, WeatherStatus::Success) if !snapshot.image_prompt.trim().is_empty() => {
            let _ = writeln!(out, "{IMAGE_FAILED}");
        }
        _ => {}
    }

    if view.status == WeatherStatus::Error {
        let _ = writeln!(out, "(날씨 업데이트 실패)");
    }
    for source in &snapshot.sources {
        let _ = writeln!(out, "  출처: {}  {}", source.title, source.uri);
    }
    out
}

/// The selected day's total, the commentary and the transaction list.
pub fn render_ledger(frame: &Frame) -> String {
    let mut out = String::new();
    let day = month_day_label(frame.selected_day);
    let _ = writeln!(out, "{day} 쓴 돈  ₩{}", frame.total);
    if frame.commentary.loading {
        let _ = writeln!(out, "💬 ...");
    } else if !frame.commentary.comment.is_empty() {
        let _ = writeln!(out, "💬 {}", frame.commentary.comment);
    }
    out.push_str(&render_transactions(&frame.transactions, frame.timezone));
    out
}

/// One numbered line per transaction, e.g. ` 1. 🛍 쇼핑  ₩60,000  14:03  <id>`.
pub fn render_transactions(transactions: &[Transaction], tz: Tz) -> String {
    if transactions.is_empty() {
        return format!("{NO_TRANSACTIONS}\n");
    }
    let mut out = String::new();
    for (ix, t) in transactions.iter().enumerate() {
        let info = t.category().info();
        let _ = writeln!(
            out,
            "{:>2}. {} {}  ₩{}  {}  {}",
            ix + 1,
            info.glyph,
            info.label,
            t.amount(),
            t.date().with_timezone(&tz).format("%H:%M"),
            t.id()
        );
    }
    out
}

/// Whole degrees are shown without a fraction.
fn format_temp(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockFace;
    use crate::commentary::Commentary;
    use crate::model::{Amount, Category, GeneratedImage, WeatherSnapshot};
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Asia::Seoul;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            location: "Busan".to_string(),
            current_temp: 17.0,
            low_temp: 12.5,
            high_temp: 21.0,
            condition: "Light Rain".to_string(),
            comment: "우산을 챙기세요".to_string(),
            image_prompt: "rain".to_string(),
            news_link: Some("https://n.news.naver.com/article/001/1".to_string()),
            sources: Vec::new(),
        }
    }

    fn frame() -> Frame {
        let now = Utc.with_ymd_and_hms(2025, 3, 7, 6, 7, 0).unwrap();
        let t = Transaction::with_id("tx-1", 60000, Category::Shopping, now);
        Frame {
            timezone: Seoul,
            clock: ClockFace::at(now.with_timezone(&Seoul)),
            weather: WeatherView {
                status: WeatherStatus::Success,
                snapshot: Some(snapshot()),
                image: Some(GeneratedImage::new("image/png", "aGVsbG8=")),
            },
            selected_day: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            transactions: vec![t],
            total: Amount::new(60000).unwrap(),
            commentary: Commentary {
                comment: "지갑이 울고 있어요".to_string(),
                loading: false,
            },
            shortcuts_open: false,
        }
    }

    #[test]
    fn test_render_clock_mode() {
        let text = render(&frame());
        assert!(text.starts_with("7일 금요일\n"));
        assert!(text.contains("    03:07\n"));
        assert!(text.contains("🌧 Busan  17°  (최저 12.5° / 최고 21°)  Light Rain"));
        assert!(text.contains("[image/png 이미지, 5 bytes]"));
        assert!(text.contains("3월 7일 쓴 돈  ₩60,000"));
        assert!(text.contains("💬 지갑이 울고 있어요"));
        assert!(text.contains(" 1. 🛍 쇼핑  ₩60,000  15:07  tx-1"));
        assert!(!text.contains("가계부"));
    }

    #[test]
    fn test_render_shortcut_mode() {
        let mut frame = frame();
        frame.shortcuts_open = true;
        let text = render(&frame);
        assert!(!text.contains("03:07\n"));
        assert!(text.contains(" 1. 가계부\n"));
        assert!(text.contains(" 3. 메일  https://mail.naver.com"));
        assert!(text.contains(" 6. 오늘의 뉴스  https://n.news.naver.com/article/001/1"));
    }

    #[test]
    fn test_render_weather_states() {
        let loading = WeatherView {
            status: WeatherStatus::Loading,
            snapshot: None,
            image: None,
        };
        assert_eq!(render_weather(&loading), format!("{WEATHER_LOADING}\n"));

        let image_failed = WeatherView {
            status: WeatherStatus::Success,
            snapshot: Some(snapshot()),
            image: None,
        };
        assert!(render_weather(&image_failed).contains(IMAGE_FAILED));

        let image_pending = WeatherView {
            status: WeatherStatus::Loading,
            ..image_failed.clone()
        };
        assert!(render_weather(&image_pending).contains(IMAGE_LOADING));

        let failed = WeatherView {
            status: WeatherStatus::Error,
            snapshot: Some(WeatherSnapshot::fallback("Busan")),
            image: None,
        };
        let text = render_weather(&failed);
        assert!(text.contains("날씨 정보를 불러올 수 없습니다."));
        assert!(text.contains("날씨 업데이트 실패"));
    }

    #[test]
    fn test_render_empty_ledger_and_loading_comment() {
        let mut frame = frame();
        frame.transactions.clear();
        frame.total = Amount::ZERO;
        frame.commentary.loading = true;
        let text = render_ledger(&frame);
        assert_eq!(
            text,
            format!("3월 7일 쓴 돈  ₩0\n💬 ...\n{NO_TRANSACTIONS}\n")
        );
    }
}
