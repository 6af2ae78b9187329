// ============================================================================
// sdraw command line
// ============================================================================
//
//   sdraw                          800x600 canvas (or the size from settings)
//   sdraw 1024x768                 custom canvas; malformed sizes fall back
//   sdraw --open photo.png         start with an image loaded
//   sdraw -i photo.png -o out.jpg -q 85        headless convert, no window
//   sdraw -i "shots/*.png" --output-dir jpg/   batch convert
//
// Headless conversion goes through the same import/export path as the GUI, so
// the output is exactly what "Open" followed by "Export" would produce.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use crate::components::tools::CanvasController;
use crate::io::{SaveFormat, export_image, load_image};
use crate::settings::{Settings, parse_canvas_size};

#[derive(Parser, Debug, Default)]
#[command(
    name = "sdraw",
    about = "A small raster paint program",
    long_about = "Paint with brush, bucket, line, rectangle and text tools, then export\n\
                  as JPEG, PNG or BMP. With --input, converts images without opening\n\
                  a window."
)]
pub struct CliArgs {
    /// Initial canvas size, e.g. 1024x768. Malformed values use the default.
    #[arg(value_name = "WxH")]
    pub size: Option<String>,

    /// Image to load into the canvas at startup.
    #[arg(long, value_name = "FILE")]
    pub open: Option<PathBuf>,

    /// Input file(s) for headless conversion. Glob patterns accepted.
    #[arg(short, long, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file. Only valid with a single input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch conversion.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: jpeg, png, bmp. Inferred from --output when omitted.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1-100). Defaults to the configured quality.
    #[arg(short, long, value_name = "1-100")]
    pub quality: Option<u8>,

    /// Print per-file timing.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Headless mode is selected by giving any input file.
    pub fn is_headless(&self) -> bool {
        !self.input.is_empty()
    }

    /// Canvas size for the GUI, falling back to the configured default.
    pub fn canvas_size(&self, settings: &Settings) -> (u32, u32) {
        let default = (settings.canvas_width, settings.canvas_height);
        match &self.size {
            Some(s) => parse_canvas_size(s, default),
            None => default,
        }
    }
}

/// Convert every input. Returns `true` only if every file converted.
pub fn run(args: &CliArgs, settings: &Settings) -> bool {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return false;
    }
    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output takes a single file.\n\
             Use --output-dir for batch conversion.",
            inputs.len()
        );
        return false;
    }

    let format = parse_format(args.format.as_deref(), args.output.as_deref());
    let quality = args.quality.unwrap_or(settings.jpeg_quality).clamp(1, 100);

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: cannot create output directory '{}': {}", dir.display(), e);
        return false;
    }

    let total = inputs.len();
    let mut any_failure = false;
    for (idx, input) in inputs.iter().enumerate() {
        if total > 1 || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input.display());
        }
        let started = Instant::now();
        let Some(output) = build_output_path(input, args.output.as_deref(), args.output_dir.as_deref(), format)
        else {
            eprintln!("  error: cannot derive an output path for '{}'.", input.display());
            any_failure = true;
            continue;
        };

        match convert_one(input, &output, format, quality, settings) {
            Ok(()) => {
                crate::log_info!("Converted {} -> {}", input.display(), output.display());
                if args.verbose || total > 1 {
                    println!("  -> {} ({:.0}ms)", output.display(), started.elapsed().as_secs_f64() * 1000.0);
                }
            }
            Err(e) => {
                crate::log_err!("Converting {} failed: {}", input.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    !any_failure
}

/// Load through the canvas import path and export the committed image.
pub fn convert_one(
    input: &Path,
    output: &Path,
    format: SaveFormat,
    quality: u8,
    settings: &Settings,
) -> Result<(), String> {
    let image = load_image(input).map_err(|e| format!("load failed: {}", e))?;
    let mut controller =
        CanvasController::new(image.width, image.height, settings.palette.clone(), settings.max_brush);
    if !controller.load_rgba(image.width, image.height, &image.rgba) {
        return Err("decoded image has inconsistent dimensions".to_string());
    }
    export_image(controller.canvas().base(), output, format, quality).map_err(|e| format!("save failed: {}", e))
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let as_path = Path::new(pattern);
        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }
        match glob::glob(pattern) {
            Ok(entries) => {
                let before = result.len();
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                }
                if result.len() == before {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => eprintln!("warning: invalid glob '{}': {}", pattern, e),
        }
    }
    result
}

/// `--format` wins, then the output extension, then JPEG.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> SaveFormat {
    if let Some(fmt) = format_arg.and_then(SaveFormat::from_name) {
        return fmt;
    }
    if let Some(f) = format_arg {
        eprintln!("warning: unknown format '{}', writing JPEG.", f);
        return SaveFormat::Jpeg;
    }
    output.and_then(SaveFormat::from_path).unwrap_or_default()
}

/// Output path for one input:
/// 1. `--output` as given
/// 2. `--output-dir/<stem>.<ext>`
/// 3. next to the input, with `_out` appended if that would overwrite it
fn build_output_path(input: &Path, output: Option<&Path>, output_dir: Option<&Path>, format: SaveFormat) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }
    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();
    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }
    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));
    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}
