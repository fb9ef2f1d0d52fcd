//! `pairview [ASSET]`
//!
//! Opens a window showing the asset as a mirrored pair. Without an argument
//! the placeholder stays on stage.
//!
//! Keys: 1-7 pick a color, R toggles auto-rotate, L reloads, Esc quits.
//! Drag with the left mouse button to orbit.

use std::path::PathBuf;

use anyhow::Result;
use pairview::{config::ViewerConfig, PairviewApp};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let asset = std::env::args_os().nth(1).map(PathBuf::from);
    if asset.is_none() {
        log::info!("No asset given; showing the placeholder");
    }

    PairviewApp::new(ViewerConfig::default(), asset)?.run()
}
