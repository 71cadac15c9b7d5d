//! These structs provide the CLI interface for the daydash CLI.

use crate::model::Category;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// daydash: a personal clock, weather and daily spending dashboard.
///
/// The dashboard shows the time, a weather report for your configured location with a generated
/// illustration, and a small ledger of today's discretionary spending with a one-line comment
/// about it. The weather report, the illustration and the comment come from Google Gemini; set
/// GEMINI_API_KEY to enable them. Without a key the dashboard still works and shows fallback text.
///
/// Set DAYDASH_IN_TEST_MODE to any non-empty value to run against canned data instead of Gemini.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and a default configuration file.
    ///
    /// This is the first command you should run. By default the data directory is $HOME/daydash,
    /// pass --daydash-home or set DAYDASH_HOME to put it somewhere else. Edit config.json inside it
    /// to change the weather location, the timezone or the models.
    Init,
    /// Record a spending entry.
    Add(AddArgs),
    /// Delete a spending entry by its id.
    Delete(DeleteArgs),
    /// List the spending entries and the total for a day.
    List(DayArgs),
    /// Ask for a one-line comment about a day's spending.
    Comment(DayArgs),
    /// Fetch the current weather report and its illustration.
    Weather(WeatherArgs),
    /// List the shortcut links.
    Shortcuts,
    /// Run the live dashboard in the terminal.
    Dashboard,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where daydash data and configuration is held. Defaults to ~/daydash
    #[arg(long, env = "DAYDASH_HOME", default_value_t = default_daydash_home())]
    daydash_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, daydash_home: PathBuf) -> Self {
        Self {
            log_level,
            daydash_home: daydash_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn daydash_home(&self) -> &DisplayPath {
        &self.daydash_home
    }
}

/// Args for the `daydash add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount in won. Separators are ignored, e.g. 12,000 and 12000 are the same.
    #[arg(long)]
    amount: String,

    /// One of: food, snack, shopping, other
    #[arg(long)]
    category: Category,

    /// The day to record the entry on, as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    day: Option<NaiveDate>,
}

impl AddArgs {
    pub fn new(amount: impl Into<String>, category: Category, day: Option<NaiveDate>) -> Self {
        Self {
            amount: amount.into(),
            category,
            day,
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.day
    }
}

/// Args for the `daydash delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the entry, as shown by `daydash list`.
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Args for commands that look at a single day.
#[derive(Debug, Parser, Clone)]
pub struct DayArgs {
    /// The day, as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    day: Option<NaiveDate>,
}

impl DayArgs {
    pub fn new(day: Option<NaiveDate>) -> Self {
        Self { day }
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.day
    }
}

/// Args for the `daydash weather` command.
#[derive(Debug, Parser, Clone)]
pub struct WeatherArgs {
    /// Write the generated illustration to this file.
    #[arg(long)]
    save_image: Option<PathBuf>,
}

impl WeatherArgs {
    pub fn new(save_image: Option<PathBuf>) -> Self {
        Self { save_image }
    }

    pub fn save_image(&self) -> Option<&Path> {
        self.save_image.as_deref()
    }
}

fn default_daydash_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("daydash"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --daydash-home or DAYDASH_HOME instead of relying on the default \
                daydash home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("daydash")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "daydash",
            "--daydash-home",
            "/tmp/dd",
            "add",
            "--amount",
            "12,000",
            "--category",
            "snack",
            "--day",
            "2025-03-07",
        ])
        .unwrap();
        assert_eq!(args.common().daydash_home().path(), Path::new("/tmp/dd"));
        let Command::Add(add) = args.command() else {
            panic!("expected add, got {:?}", args.command());
        };
        assert_eq!(add.amount(), "12,000");
        assert_eq!(add.category(), Category::Snack);
        assert_eq!(add.day(), NaiveDate::from_ymd_opt(2025, 3, 7));
    }

    #[test]
    fn test_parse_rejects_unknown_category() {
        let result = Args::try_parse_from([
            "daydash", "add", "--amount", "1", "--category", "rent",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_log_level_and_weather() {
        let args = Args::try_parse_from([
            "daydash",
            "--log-level",
            "debug",
            "weather",
            "--save-image",
            "out.png",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        let Command::Weather(weather) = args.command() else {
            panic!("expected weather");
        };
        assert_eq!(weather.save_image(), Some(Path::new("out.png")));
    }
}
