use std::{
    env,
    path::{Path, PathBuf},
    process,
};

use anyhow::{bail, Context};
use handgraph::{
    hand::tracker::{HandTracker, TrackerParams},
    image::Image,
    timer::FpsCounter,
};

const USAGE: &str = "usage: handgraph [--threshold N] [--no-fingers] <image>...";

fn main() -> anyhow::Result<()> {
    handgraph::init_logger!();

    let (params, paths) = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e:#}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let mut tracker = HandTracker::new(params)?;
    let mut fps = FpsCounter::new("handgraph");
    for path in &paths {
        let image = Image::load(path).with_context(|| format!("failed to load {}", path.display()))?;
        let candidate = tracker.detect(&image);
        let mut overlay = tracker.mask().to_image();
        match &candidate {
            Some(candidate) => {
                log::info!(
                    "{}: {} fingers, centroid ({:.1}, {:.1}), contour of {} points",
                    path.display(),
                    candidate.fingers().len(),
                    candidate.centroid().x,
                    candidate.centroid().y,
                    candidate.contour().len(),
                );
                candidate.draw(&mut overlay);
            }
            None => log::info!("{}: no hand found", path.display()),
        }

        let out = overlay_path(path);
        overlay
            .save(&out)
            .with_context(|| format!("failed to save {}", out.display()))?;
        log::debug!("wrote {}", out.display());

        fps.tick_with(tracker.timers());
    }

    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<(TrackerParams, Vec<PathBuf>)> {
    let mut params = TrackerParams::default();
    let mut paths = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--threshold" => {
                let value = args.next().context("missing value for --threshold")?;
                params.depth_threshold = value
                    .parse()
                    .with_context(|| format!("invalid threshold '{value}'"))?;
            }
            "--no-fingers" => params.fingers = false,
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'"),
            _ => paths.push(PathBuf::from(&arg)),
        }
    }

    if paths.is_empty() {
        bail!("no input images");
    }
    Ok((params, paths))
}

/// `dir/frame.png` -> `dir/frame.hand.png`
fn overlay_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}.hand.png"))
}
