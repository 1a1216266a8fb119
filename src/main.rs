use rastermill::config::{self, EngineSettings};
use rastermill::domain::editing::Quality;
use rastermill::engine::{CropRatio, Editor};
use rastermill::error::{Error, Result};
use rastermill::media::{self, codec, ExportFormat};
use std::path::PathBuf;
use std::time::Duration;

const HELP: &str = "\
rastermill, a headless image editing engine

USAGE:
  rastermill [OPTIONS] <input>

OPTIONS:
  --width <N>         Target width in pixels (aspect lock derives the height)
  --height <N>        Target height in pixels (aspect lock derives the width)
  --no-lock           Disable the aspect lock
  --preset <WxH>      Apply a preset size (sets both targets, releases the lock)
  --crop <RATIO>      Ratio for the smart crop: free or W:H (e.g. 16:9)
  --smart             Apply a content-aware smart crop before processing
  --quality <N>       Compression quality 0-100 (default 85)
  --format <FMT>      Export format: jpeg, png, or webp (default jpeg)
  --output <PATH>     Output path (default: processed_image.<ext>)
  --estimate          Print the estimated output size before exporting
  --config <PATH>     Load settings from an explicit TOML file
  -h, --help          Print this help
";

#[derive(Debug)]
struct Args {
    input: PathBuf,
    width: Option<u32>,
    height: Option<u32>,
    no_lock: bool,
    preset: Option<(u32, u32)>,
    crop_ratio: Option<CropRatio>,
    smart: bool,
    quality: Option<u8>,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    estimate: bool,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Option<Args>> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let parsed = Args {
        width: opt(args.opt_value_from_str("--width"))?,
        height: opt(args.opt_value_from_str("--height"))?,
        no_lock: args.contains("--no-lock"),
        preset: opt(args.opt_value_from_fn("--preset", parse_preset))?,
        crop_ratio: opt(args.opt_value_from_fn("--crop", parse_ratio))?,
        smart: args.contains("--smart"),
        quality: opt(args.opt_value_from_str("--quality"))?,
        format: opt(args.opt_value_from_fn("--format", parse_format))?,
        output: opt(args.opt_value_from_str("--output"))?,
        estimate: args.contains("--estimate"),
        config: opt(args.opt_value_from_str("--config"))?,
        input: args
            .finish()
            .into_iter()
            .next()
            .and_then(|s| s.into_string().ok())
            .map(PathBuf::from)
            .ok_or_else(|| Error::Config("missing <input> argument".to_string()))?,
    };

    Ok(Some(parsed))
}

fn opt<T>(result: std::result::Result<Option<T>, pico_args::Error>) -> Result<Option<T>> {
    result.map_err(|e| Error::Config(e.to_string()))
}

fn parse_preset(value: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{value}'"))?;
    let w: u32 = w.parse().map_err(|_| format!("invalid width in '{value}'"))?;
    let h: u32 = h.parse().map_err(|_| format!("invalid height in '{value}'"))?;
    if w == 0 || h == 0 {
        return Err(format!("preset dimensions must be positive, got '{value}'"));
    }
    Ok((w, h))
}

fn parse_ratio(value: &str) -> std::result::Result<CropRatio, String> {
    CropRatio::parse(value).ok_or_else(|| format!("expected 'free' or 'W:H', got '{value}'"))
}

fn parse_format(value: &str) -> std::result::Result<ExportFormat, String> {
    ExportFormat::from_extension(value)
        .ok_or_else(|| format!("expected jpeg, png, or webp, got '{value}'"))
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let Some(args) = parse_args()? else {
        print!("{HELP}");
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => config::load_from_path(path)?,
        None => config::load()?,
    };
    let mut editor = Editor::with_settings(EngineSettings::from_config(&config));

    let bytes = std::fs::read(&args.input)?;
    let mime = args
        .input
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(media::guess_mime)
        .unwrap_or("application/octet-stream");

    let request = editor.begin_load(bytes, mime)?;
    let completion = run_with_progress(&mut editor, move || request.run()).await?;
    editor.commit_load(completion)?;
    println!(
        "Loaded {} ({})",
        editor.dimensions_label().unwrap_or_default(),
        editor.original_size_label().unwrap_or_default()
    );

    if let Some(ratio) = args.crop_ratio {
        editor.set_crop_ratio(ratio);
    }
    if let Some((width, height)) = args.preset {
        editor.apply_preset(width, height);
    }
    if args.no_lock {
        editor.set_aspect_lock(false);
    }
    if let Some(width) = args.width {
        editor.set_target_width(width);
    }
    if let Some(height) = args.height {
        editor.set_target_height(height);
    }
    if let Some(quality) = args.quality {
        editor.set_quality(Quality::new(quality));
    }
    if let Some(format) = args.format {
        editor.set_format(format);
    }

    if args.smart {
        if let Some(request) = editor.begin_smart_crop() {
            let completion = run_with_progress(&mut editor, move || request.run()).await?;
            editor.commit_smart_crop(completion)?;
            println!(
                "Smart crop -> {}",
                editor.dimensions_label().unwrap_or_default()
            );
        }
    }

    if let Some(request) = editor.begin_process() {
        let completion = run_with_progress(&mut editor, move || request.run()).await?;
        editor.commit_process(completion)?;
        println!(
            "Processed -> {}",
            editor.dimensions_label().unwrap_or_default()
        );
    }

    if args.estimate {
        if let Some(label) = editor.estimated_size_label()? {
            match editor.savings_label()? {
                Some(savings) => println!("Estimated size: {label} ({savings})"),
                None => println!("Estimated size: {label}"),
            }
        }
    }

    if let Some(payload) = editor.export_current()? {
        let output = args
            .output
            .unwrap_or_else(|| PathBuf::from(&payload.filename));
        let size = payload.bytes.len() as u64;
        std::fs::write(&output, &payload.bytes)?;
        println!(
            "Wrote {} ({})",
            output.display(),
            codec::format_file_size(size)
        );
    }

    Ok(())
}

/// Run a staged request on a worker thread, advancing the engine's
/// progress display in 10% steps (capped at 90%) until it completes.
async fn run_with_progress<T: Send + 'static>(
    editor: &mut Editor,
    work: impl FnOnce() -> T + Send + 'static,
) -> Result<T> {
    let mut handle = tokio::task::spawn_blocking(work);
    let mut interval = tokio::time::interval(Duration::from_millis(100));
    let mut progress = 0.0f32;

    loop {
        tokio::select! {
            result = &mut handle => {
                return result.map_err(|e| Error::Io(format!("worker thread failed: {e}")));
            }
            _ = interval.tick() => {
                if progress < 0.9 {
                    progress += 0.1;
                    editor.set_processing_progress(progress);
                }
            }
        }
    }
}
