use std::path::{Path, PathBuf};
use std::time::Instant;

use canopy_core::{TileLoad, ViewerConfig};
use canopy_ingest::TileSource;
use canopy_render::{Session, SessionCommand};
use canopy_tile::spawn_loader;

use crate::error::ViewerError;
use crate::ppm::write_ppm;
use crate::report::{FrameRecord, RunReport, TileSummary, TimingSeries};

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub frames: u32,
    pub width: u32,
    pub height: u32,
    pub out_dir: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

pub const USAGE: &str = "Usage: canopy-viewer <csv> [OPTIONS]
  --config <path>   RON viewer config (defaults apply when omitted)
  --frames <n>      Playback frames to render (default: 30)
  --width <px>      Frame width (default: 640)
  --height <px>     Frame height (default: 480)
  --out <dir>       Write each frame as a PPM image into <dir>
  --report <path>   Write a JSON run report";

impl ViewerOptions {
    /// Parse arguments (without the program name). `Ok(None)` means help
    /// was requested.
    pub fn parse(args: &[String]) -> Result<Option<Self>, ViewerError> {
        let mut input = None;
        let mut config = None;
        let mut frames = 30u32;
        let mut width = 640u32;
        let mut height = 480u32;
        let mut out_dir = None;
        let mut report = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |name: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| ViewerError::Usage(format!("{name} needs a value")))
            };
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(value("--config")?)),
                "--frames" => frames = parse_number("--frames", &value("--frames")?)?,
                "--width" => width = parse_number("--width", &value("--width")?)?,
                "--height" => height = parse_number("--height", &value("--height")?)?,
                "--out" => out_dir = Some(PathBuf::from(value("--out")?)),
                "--report" => report = Some(PathBuf::from(value("--report")?)),
                "--help" | "-h" => return Ok(None),
                other if other.starts_with("--") => {
                    return Err(ViewerError::Usage(format!("unknown argument: {other}")))
                }
                path if input.is_none() => input = Some(PathBuf::from(path)),
                extra => return Err(ViewerError::Usage(format!("unexpected argument: {extra}"))),
            }
        }

        let input = input.ok_or_else(|| ViewerError::Usage("missing input csv".to_string()))?;
        if width == 0 || height == 0 {
            return Err(ViewerError::Usage("frame size must be non-zero".to_string()));
        }
        Ok(Some(Self {
            input,
            config,
            frames,
            width,
            height,
            out_dir,
            report,
        }))
    }
}

fn parse_number(name: &str, value: &str) -> Result<u32, ViewerError> {
    value
        .parse()
        .map_err(|_| ViewerError::Usage(format!("invalid {name} value: {value}")))
}

/// Read a RON config file, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<ViewerConfig, ViewerError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| ViewerError::io(path, e))?;
            let config = ViewerConfig::from_ron_str(&text)?;
            log::info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(ViewerConfig::default()),
    }
}

/// Drives one load and a run of playback frames through a session.
pub struct ViewerRun {
    config: ViewerConfig,
    width: u32,
    height: u32,
    frames: u32,
}

impl ViewerRun {
    pub fn new(config: ViewerConfig, width: u32, height: u32, frames: u32) -> Self {
        Self {
            config,
            width,
            height,
            frames,
        }
    }

    /// Load a tile on the background loader, logging its progress.
    pub fn load(&self, source: TileSource) -> Result<TileLoad, ViewerError> {
        let name = source.describe();
        log::info!("Loading {name}");
        let handle = spawn_loader(source, self.config.tile.clone())
            .map_err(|e| ViewerError::Load(format!("could not start loader: {e}")))?;

        let mut last_task = String::new();
        let tile = handle
            .wait(|task, progress| {
                if task != last_task {
                    log::info!("{task}...");
                    last_task = task.to_string();
                }
                if let Some(p) = progress {
                    log::debug!("{task}: {:.0}%", p * 100.0);
                }
            })
            .map_err(ViewerError::Load)?;
        Ok(tile)
    }

    /// Install `tile` and render the configured number of playback frames,
    /// evenly spaced over one period.
    pub fn render(
        &self,
        source_name: &str,
        tile: TileLoad,
        out_dir: Option<&Path>,
    ) -> Result<RunReport, ViewerError> {
        let summary = TileSummary::from_tile(source_name, &tile);
        if let Some(dir) = out_dir {
            std::fs::create_dir_all(dir).map_err(|e| ViewerError::io(dir, e))?;
        }

        let mut session = Session::new(&self.config, self.width, self.height);
        session.push(SessionCommand::InstallTile(Box::new(tile)));

        let playing = self.config.playback.start_playing;
        let frames = self.frames.max(1);
        let dt = self.config.playback.period_secs / frames as f32;

        let mut records = Vec::with_capacity(self.frames as usize);
        for index in 0..self.frames {
            if !playing {
                session.push(SessionCommand::Scrub(index as f32 / frames as f32));
            }
            let start = Instant::now();
            let step = if index == 0 { 0.0 } else { dt };
            if !session.frame(step) {
                log::warn!("Frame {index} had nothing to draw");
                continue;
            }
            let render_ms = start.elapsed().as_secs_f64() * 1000.0;

            if let Some(dir) = out_dir {
                let path = dir.join(format!("frame_{index:04}.ppm"));
                write_ppm(&path, session.framebuffer()).map_err(|e| ViewerError::io(&path, e))?;
            }
            records.push(FrameRecord {
                index,
                time: session.time(),
                year: session.current_year().unwrap_or_default(),
                render_ms,
            });
        }

        let samples: Vec<f64> = records.iter().map(|r| r.render_ms).collect();
        let timings = TimingSeries::from_samples(&samples);
        log::info!(
            "Rendered {} frames: mean={:.2}ms, p95={:.2}ms",
            records.len(),
            timings.mean_ms,
            timings.p95_ms
        );

        Ok(RunReport {
            tile: summary,
            width: self.width,
            height: self.height,
            frames: records,
            timings,
        })
    }
}

/// Full command-line run: config, load, render, report.
pub fn run(options: &ViewerOptions) -> Result<RunReport, ViewerError> {
    let config = load_config(options.config.as_deref())?;
    let viewer = ViewerRun::new(config, options.width, options.height, options.frames);

    let source = TileSource::File(options.input.clone());
    let name = source.describe();
    let tile = viewer.load(source)?;
    let report = viewer.render(&name, tile, options.out_dir.as_deref())?;

    if let Some(path) = &options.report {
        crate::report::save_report(path, &report).map_err(|e| ViewerError::io(path, e))?;
        log::info!("Saved report to {}", path.display());
    }
    Ok(report)
}
