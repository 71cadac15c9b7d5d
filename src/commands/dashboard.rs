//! The interactive terminal dashboard.
//!
//! The frame is redrawn on every clock tick and whenever the weather or the commentary changes.
//! User actions are typed as line commands, see `HELP`.

use crate::api::{self, Mode};
use crate::commands::{open_ledger, Out};
use crate::dashboard::Dashboard;
use crate::model::Category;
use crate::view::render;
use crate::{Config, Result};
use anyhow::Context;
use chrono::{Days, NaiveDate};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};

const HELP: &str = "add <amount> <category> | del <n|id> | day <YYYY-MM-DD|today|prev|next> | \
weather | shortcuts | quit";

/// A parsed line of user input.
#[derive(Debug, Clone, Eq, PartialEq)]
enum Input {
    Empty,
    Add {
        amount: String,
        category: Option<Category>,
    },
    /// A 1-based position in the displayed list, or a transaction id.
    Delete(String),
    Day(DayChange),
    Weather,
    Shortcuts,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum DayChange {
    Today,
    Previous,
    Next,
    On(NaiveDate),
}

/// Runs the dashboard until the user quits or stdin closes.
pub async fn dashboard(config: Config, mode: Mode) -> Result<Out<()>> {
    let ledger = open_ledger(&config).await?;
    let assistant = api::assistant(&config, mode)?;
    let mut dashboard = Dashboard::mount(&config, ledger, assistant).await;

    let mut clock = dashboard.clock().subscribe();
    let mut weather = dashboard.weather().subscribe();
    let mut commentary = dashboard.commentary().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut notice = Some(HELP.to_string());

    draw(&dashboard, notice.as_deref())?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Unable to read from stdin")? else {
                    debug!("stdin closed");
                    break;
                };
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => notice = handle(&mut dashboard, input).await,
                    Err(message) => notice = Some(message),
                }
            }
            Ok(()) = clock.changed() => {}
            Ok(()) = weather.changed() => {}
            Ok(()) = commentary.changed() => {}
        }
        draw(&dashboard, notice.as_deref())?;
    }

    Ok("Closed the dashboard".into())
}

/// Applies `input` and returns a notice to show under the frame.
async fn handle(dashboard: &mut Dashboard, input: Input) -> Option<String> {
    match input {
        Input::Empty | Input::Quit => None,
        Input::Help => Some(HELP.to_string()),
        Input::Add { amount, category } => match dashboard.add(&amount, category).await {
            Ok(Some(t)) => Some(format!("₩{} {} 기록 완료", t.amount(), t.category().label())),
            Ok(None) => Some("금액과 카테고리를 확인해 주세요.".to_string()),
            Err(e) => {
                error!("Unable to save the ledger: {e:#}");
                Some(format!("저장하지 못했습니다: {e}"))
            }
        },
        Input::Delete(target) => {
            let id = match target.parse::<usize>() {
                Ok(n) if n >= 1 => dashboard
                    .selected_transactions()
                    .get(n - 1)
                    .map(|t| t.id().to_string()),
                _ => Some(target),
            };
            let Some(id) = id else {
                return Some("그 번호의 지출이 없습니다.".to_string());
            };
            match dashboard.remove(&id).await {
                Ok(Some(t)) => Some(format!("₩{} {} 삭제", t.amount(), t.category().label())),
                Ok(None) => Some("그 지출을 찾을 수 없습니다.".to_string()),
                Err(e) => {
                    error!("Unable to save the ledger: {e:#}");
                    Some(format!("저장하지 못했습니다: {e}"))
                }
            }
        }
        Input::Day(change) => {
            let current = dashboard.selected_day();
            let day = match change {
                DayChange::Today => Some(dashboard.ledger().today()),
                DayChange::Previous => current.checked_sub_days(Days::new(1)),
                DayChange::Next => current.checked_add_days(Days::new(1)),
                DayChange::On(day) => Some(day),
            };
            match day {
                Some(day) => {
                    dashboard.select_day(day).await;
                    None
                }
                None => Some("날짜를 바꿀 수 없습니다.".to_string()),
            }
        }
        Input::Weather => {
            dashboard.refresh_weather();
            None
        }
        Input::Shortcuts => {
            dashboard.toggle_shortcuts();
            None
        }
    }
}

fn draw(dashboard: &Dashboard, notice: Option<&str>) -> Result<()> {
    let mut stdout = std::io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0)).context("Unable to clear the terminal")?;
    let mut text = render(&dashboard.frame());
    if let Some(notice) = notice {
        text.push('\n');
        text.push_str(notice);
        text.push('\n');
    }
    text.push_str("> ");
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Unable to draw the dashboard")
}

fn parse_input(line: &str) -> std::result::Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Input::Empty);
    };
    let rest: Vec<&str> = words.collect();
    match (command.to_lowercase().as_str(), rest.as_slice()) {
        ("add" | "a", [amount, category]) => Ok(Input::Add {
            amount: amount.to_string(),
            category: parse_category(category),
        }),
        ("add" | "a", [amount]) => Ok(Input::Add {
            amount: amount.to_string(),
            category: None,
        }),
        ("del" | "delete" | "d", [target]) => Ok(Input::Delete(target.to_string())),
        ("day", []) | ("day", ["today"]) => Ok(Input::Day(DayChange::Today)),
        ("day", ["prev"]) => Ok(Input::Day(DayChange::Previous)),
        ("day", ["next"]) => Ok(Input::Day(DayChange::Next)),
        ("day", [date]) => date
            .parse::<NaiveDate>()
            .map(|d| Input::Day(DayChange::On(d)))
            .map_err(|_| format!("날짜 형식은 YYYY-MM-DD 입니다: {date}")),
        ("weather" | "w", []) => Ok(Input::Weather),
        ("shortcuts" | "s", []) => Ok(Input::Shortcuts),
        ("help" | "?" | "h", _) => Ok(Input::Help),
        ("quit" | "q" | "exit", []) => Ok(Input::Quit),
        _ => Err(format!("알 수 없는 명령입니다. {HELP}")),
    }
}

/// Accepts a category tag (`food`) or its label (`밥값`).
fn parse_category(word: &str) -> Option<Category> {
    let word = word.to_lowercase();
    Category::all().find(|c| c.to_string() == word || c.label() == word)
}
