//! Example hookstage host.
//!
//! Drives the demo hooks through load, enable, late, reload and disable.
//!
//! # Usage
//!
//! ```bash
//! hookstage-demo [plugin...]
//! ```
//!
//! Plugins named on the command line count as installed. The `test-hook`
//! config flag is always on.
//!
//! # Example
//!
//! ```bash
//! hookstage-demo PlaceholderAPI
//! ```

use core::time::Duration;

use example::DemoHost;
use example::hooks::{self, CacheWarmer};
use hookstage_engine::global;
use hookstage_engine::prelude::*;
use hookstage_runtime::TracingSetup;

const LATE_DELAY: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() {
    let host = std::env::args()
        .skip(1)
        .fold(DemoHost::new(), DemoHost::with_plugin)
        .with_config(hooks::REPORTER_KEY)
        .with_late_delay(LATE_DELAY)
        .with_tracing(TracingSetup::new());

    if let Err(err) = run(&host).await {
        tracing::error!(error = %err, "demo failed");
        std::process::exit(1);
    }
}

async fn run(host: &DemoHost) -> Result<(), HookerError> {
    global::register(
        &hooks::all(),
        host.options(tokio::runtime::Handle::current()),
    )?;
    global::requirement("config", host.config_check())?;

    global::load()?;
    global::enable()?;

    tokio::time::sleep(LATE_DELAY + Duration::from_millis(250)).await;
    if global::get::<CacheWarmer>()?.is_none() {
        tracing::warn!("late hooks have not started yet");
    }
    tracing::info!(active = global::loaded_hooks()?.len(), "host started");

    let reloaded = global::reload()?.await?;
    tracing::info!(count = reloaded, "reload finished");

    let disabled = global::shutdown()?;
    tracing::info!(count = disabled, "host stopped");
    Ok(())
}
