use crate::api::{self, Mode};
use crate::commands::Out;
use crate::shortcuts::Shortcut;
use crate::view::{render_shortcuts, render_weather};
use crate::weather::{WeatherPoller, WeatherView};
use crate::{utils, Config, Result};
use anyhow::Context;
use std::path::Path;
use tracing::warn;

/// Runs one weather fetch cycle and optionally writes the illustration to `save_image`.
///
/// A failed fetch is not an error; the message shows the fallback report instead.
pub async fn weather(
    config: Config,
    mode: Mode,
    save_image: Option<&Path>,
) -> Result<Out<WeatherView>> {
    let assistant = api::assistant(&config, mode)?;
    let poller = WeatherPoller::new(assistant, config.location());
    poller.refresh().await;
    let view = poller.current();
    let mut message = render_weather(&view);

    if let Some(path) = save_image {
        match view.image.as_ref() {
            Some(image) => {
                let bytes = image.bytes()?;
                utils::write(path, bytes)
                    .await
                    .with_context(|| format!("Unable to save the image to {}", path.display()))?;
                message.push_str(&format!("Saved the image to {}\n", path.display()));
            }
            None => warn!("There is no image to save to {}", path.display()),
        }
    }

    Ok(Out::new(message.trim_end(), view))
}

/// Lists the fixed shortcuts.
pub async fn shortcuts() -> Result<Out<Vec<Shortcut>>> {
    let list = crate::shortcuts::shortcuts(None);
    Ok(Out::new(render_shortcuts(None).trim_end(), list))
}
