//! The shortcut panel: a fixed set of links plus the spending ledger.

use serde::Serialize;

/// Where a shortcut leads.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// Opens the spending ledger inside the dashboard.
    Ledger,
    Link { url: String },
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Shortcut {
    pub label: String,
    #[serde(flatten)]
    pub target: Target,
}

const LINKS: [(&str, &str); 4] = [
    ("뉴스", "https://news.naver.com"),
    ("메일", "https://mail.naver.com"),
    ("Gemini", "https://gemini.google.com"),
    ("음악", "https://music.youtube.com"),
];

/// The shortcuts in display order. `news_link` is the article picked by the latest weather
/// report, if any, and is listed after the fixed links.
pub fn shortcuts(news_link: Option<&str>) -> Vec<Shortcut> {
    let ledger = Shortcut {
        label: "가계부".to_string(),
        target: Target::Ledger,
    };
    let links = LINKS.iter().map(|(label, url)| Shortcut {
        label: label.to_string(),
        target: Target::Link {
            url: url.to_string(),
        },
    });
    let article = news_link.map(|url| Shortcut {
        label: "오늘의 뉴스".to_string(),
        target: Target::Link {
            url: url.to_string(),
        },
    });
    std::iter::once(ledger).chain(links).chain(article).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts_without_article() {
        let list = shortcuts(None);
        assert_eq!(list.len(), 5);
        assert_eq!(list[0].target, Target::Ledger);
        assert_eq!(
            list[1].target,
            Target::Link {
                url: "https://news.naver.com".to_string()
            }
        );
        assert_eq!(list[4].label, "음악");
    }

    #[test]
    fn test_shortcuts_with_article() {
        let list = shortcuts(Some("https://n.news.naver.com/article/001/1"));
        assert_eq!(list.len(), 6);
        assert_eq!(list[5].label, "오늘의 뉴스");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(&shortcuts(None)[..2]).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"label": "가계부", "kind": "ledger"},
                {"label": "뉴스", "kind": "link", "url": "https://news.naver.com"}
            ])
        );
    }
}
