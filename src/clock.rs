//! The dashboard clock: "now" projected onto a fixed timezone, with Korean date labels.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const TICK: Duration = Duration::from_secs(1);

/// The labels shown by the clock.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ClockFace {
    pub date: NaiveDate,
    /// e.g. `17일`
    pub day_label: String,
    /// e.g. `금요일`
    pub weekday_label: String,
    /// 12-hour time with leading zeros, e.g. `03:07`
    pub time_label: String,
}

impl ClockFace {
    pub fn at(now: DateTime<Tz>) -> Self {
        Self {
            date: now.date_naive(),
            day_label: format!("{}일", now.day()),
            weekday_label: weekday_label(now.weekday()).to_string(),
            time_label: now.format("%I:%M").to_string(),
        }
    }
}

pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "월요일",
        Weekday::Tue => "화요일",
        Weekday::Wed => "수요일",
        Weekday::Thu => "목요일",
        Weekday::Fri => "금요일",
        Weekday::Sat => "토요일",
        Weekday::Sun => "일요일",
    }
}

/// e.g. `3월 7일`
pub fn month_day_label(date: NaiveDate) -> String {
    format!("{}월 {}일", date.month(), date.day())
}

/// Publishes a fresh `ClockFace` every second once started.
#[derive(Debug, Clone)]
pub struct Clock {
    tz: Tz,
    face: Arc<watch::Sender<ClockFace>>,
}

impl Clock {
    pub fn new(tz: Tz) -> Self {
        let (face, _) = watch::channel(ClockFace::at(Utc::now().with_timezone(&tz)));
        Self {
            tz,
            face: Arc::new(face),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClockFace> {
        self.face.subscribe()
    }

    pub fn current(&self) -> ClockFace {
        self.face.borrow().clone()
    }

    /// Re-reads the time. Subscribers are only notified when a label changed.
    pub fn tick(&self) {
        let face = ClockFace::at(self.now());
        self.face.send_if_modified(|current| {
            if *current == face {
                false
            } else {
                *current = face;
                true
            }
        });
    }

    /// Starts the one-second ticker. The returned task runs until aborted.
    pub fn spawn(&self) -> JoinHandle<()> {
        let clock = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                clock.tick();
            }
        })
    }
}
