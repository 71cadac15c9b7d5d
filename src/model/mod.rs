//! Types that represent the core data model, such as `Transaction` and `WeatherSnapshot`.
mod amount;
mod category;
mod transaction;
mod weather;

pub use amount::{Amount, AmountError, MAX_AMOUNT};
pub use category::{Category, CategoryInfo, CATEGORIES};
pub use transaction::Transaction;
pub use weather::{GeneratedImage, Source, WeatherKind, WeatherSnapshot, WeatherStatus};
