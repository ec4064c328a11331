//! Shared glue for the command-line tools.

use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::gamma::Gamma;
use crate::raster::Raster;
use crate::{pnm, Result};

/// Install the stderr logger; `RUST_LOG` overrides the default `pnmkit=warn`.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pnmkit=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// clap value parser for gamma parameters: `0` selects sRGB.
pub fn parse_gamma(s: &str) -> std::result::Result<Gamma, String> {
    let value: f32 = s.trim().parse().map_err(|e| format!("invalid gamma '{s}': {e}"))?;
    Gamma::from_param(value).map_err(|e| e.to_string())
}

pub fn load(path: &Path) -> Result<Raster> {
    let raster = pnm::read_file(path)?;
    tracing::info!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        max_color = raster.max_color(),
        "Loaded image"
    );
    Ok(raster)
}

pub fn save(path: &Path, raster: &Raster) -> Result<()> {
    pnm::write_file(path, raster)?;
    tracing::info!(path = %path.display(), "Wrote image");
    Ok(())
}
