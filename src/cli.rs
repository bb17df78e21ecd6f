// ============================================================================
// HousePaint CLI — headless painting, saved pictures and palette browsing
// ============================================================================
//
// Usage examples:
//   housepaint paint -i house.jpg --step fill:120,80,#A4343A -o painted.png
//   housepaint paint -i house.jpg -s "fill:10,10,Hale Navy" -s undo -s redo --save
//   housepaint paint -i shots/*.jpg -s fill:5,5,#FFFFFF --output-dir out/ --format jpg
//   housepaint saved list
//   housepaint saved export 5f1c... -o copy.png
//   housepaint palette --search gray --category Neutrals
//
// Everything runs synchronously on the current thread.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use crate::color::{ParsedHex, color_to_hex, parse_hex};
use crate::components::palette::{ALL_CATEGORIES, Palette};
use crate::io::{SaveFormat, decode_image, encode_and_write, load_image};
use crate::project::PaintSession;
use crate::settings::AppSettings;
use crate::store::{PictureStore, format_date};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// HousePaint: recolor regions of house photos from the command line.
#[derive(Parser, Debug)]
#[command(
    name = "housepaint",
    about = "Recolor regions of house photos with a tolerance flood fill",
    long_about = "Load a photo, paint connected regions with a chosen color, undo/redo,\n\
                  export the result and keep it in a local saved-pictures store.\n\n\
                  Example:\n  \
                  housepaint paint -i house.jpg -s fill:120,80,#A4343A -o painted.png"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay paint steps on one or more images.
    Paint(PaintArgs),
    /// Manage the saved pictures store.
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },
    /// Browse the paint palette.
    Palette(PaletteArgs),
    /// Show the settings file, or write it with current values.
    Config {
        /// Write the settings file (creating it with defaults if missing).
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args, Debug)]
pub struct PaintArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.jpg", "shots/*.png").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Step to apply, in order: fill:X,Y,COLOR | undo | redo | reset.
    /// COLOR is a 6-digit hex code or a palette color name.
    #[arg(short, long = "step", value_name = "STEP")]
    pub steps: Vec<Step>,

    /// Fill tolerance (max per-channel difference). Defaults to the settings file value.
    #[arg(short, long, value_name = "N")]
    pub tolerance: Option<u32>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, bmp, tga. Inferred from --output when omitted.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Also keep the result in the saved pictures store.
    #[arg(long)]
    pub save: bool,

    /// Print per-step and per-file details.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum SavedAction {
    /// List saved pictures, newest first.
    List,
    /// Delete a saved picture by id.
    Delete { id: String },
    /// Write a saved picture to a file.
    Export {
        id: String,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct PaletteArgs {
    /// Case-insensitive name filter.
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Category to show ("All" for every category).
    #[arg(short, long, default_value = ALL_CATEGORIES)]
    pub category: String,

    /// Report palette entries with malformed hex codes and fail if any exist.
    #[arg(long)]
    pub check: bool,
}

/// One replayable editing action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Fill { x: u32, y: u32, color: String },
    Undo,
    Redo,
    Reset,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "undo" => return Ok(Step::Undo),
            "redo" => return Ok(Step::Redo),
            "reset" => return Ok(Step::Reset),
            _ => {}
        }
        let Some(rest) = s.strip_prefix("fill:") else {
            return Err(format!("unknown step '{}' (expected fill:X,Y,COLOR, undo, redo or reset)", s));
        };
        let mut parts = rest.splitn(3, ',');
        let (Some(x), Some(y), Some(color)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("fill step '{}' needs X,Y,COLOR", s));
        };
        let x = x.trim().parse().map_err(|_| format!("bad X coordinate '{}'", x.trim()))?;
        let y = y.trim().parse().map_err(|_| format!("bad Y coordinate '{}'", y.trim()))?;
        let color = color.trim();
        if color.is_empty() {
            return Err(format!("fill step '{}' has no color", s));
        }
        Ok(Step::Fill { x, y, color: color.to_string() })
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the parsed command and return an OS exit code.
pub fn run(args: CliArgs, settings: &AppSettings) -> ExitCode {
    let result = match args.command {
        Command::Paint(paint) => return run_paint(&paint, settings),
        Command::Saved { action } => run_saved(action, settings),
        Command::Palette(palette) => run_palette(&palette, settings),
        Command::Config { write } => run_config(write, settings),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            crate::log_err!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_palette(settings: &AppSettings) -> Palette {
    if settings.palette_path.is_empty() {
        return Palette::builtin();
    }
    match Palette::load(Path::new(&settings.palette_path)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!(
                "warning: could not read palette '{}': {}; using the built-in palette.",
                settings.palette_path, e
            );
            crate::log_warn!("Palette {} unreadable: {}", settings.palette_path, e);
            Palette::builtin()
        }
    }
}

fn open_store(settings: &AppSettings) -> Result<PictureStore, String> {
    let path = settings.store_file();
    PictureStore::open(&path).map_err(|e| format!("could not open store '{}': {}", path.display(), e))
}

// ============================================================================
// paint
// ============================================================================

fn run_paint(args: &PaintArgs, settings: &AppSettings) -> ExitCode {
    // Resolve glob patterns / literal paths → concrete PathBufs
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if let Err(e) = check_outputs(inputs.len(), args.output.as_deref()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    let save_format = parse_format(args.format.as_deref(), args.output.as_deref());
    let palette = load_palette(settings);
    let mut settings = settings.clone();
    if let Some(t) = args.tolerance {
        settings.tolerance = t;
    }

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    let mut store = if args.save {
        match open_store(&settings) {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            save_format,
        ) else {
            eprintln!("  error: cannot determine output path for '{}'.", input_path.display());
            any_failure = true;
            continue;
        };

        let job = PaintJob {
            steps: &args.steps,
            palette: &palette,
            settings: &settings,
            format: save_format,
            quality: args.quality,
            verbose: args.verbose,
        };
        match job.run(input_path, &output_path, store.as_mut()) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                crate::log_err!("{}: {}", input_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Everything needed to replay the steps on one input.
struct PaintJob<'a> {
    steps: &'a [Step],
    palette: &'a Palette,
    settings: &'a AppSettings,
    format: SaveFormat,
    quality: u8,
    verbose: bool,
}

impl PaintJob<'_> {
    fn run(&self, input: &Path, output: &Path, store: Option<&mut PictureStore>) -> Result<(), String> {
        // -- Step 1: Load ----------------------------------------------------
        let image = load_image(input).map_err(|e| format!("load failed: {}", e))?;
        let name = input
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let mut session = PaintSession::new(&name, image, self.settings).map_err(|e| e.to_string())?;

        // -- Step 2: Replay --------------------------------------------------
        self.replay(&mut session)?;

        // -- Step 3: Save ----------------------------------------------------
        encode_and_write(session.current(), output, self.format, self.quality)
            .map_err(|e| format!("save failed: {}", e))?;

        if let Some(store) = store {
            let saved = session.save_to(store).map_err(|e| format!("store failed: {}", e))?;
            println!("  saved as {}", saved.id);
        }
        Ok(())
    }

    fn replay(&self, session: &mut PaintSession) -> Result<(), String> {
        for step in self.steps {
            match step {
                Step::Fill { x, y, color } => {
                    let hex = resolve_color(color, self.palette)?;
                    session.select_color(&hex);
                    let report = session.paint_at(*x, *y).unwrap_or_default();
                    if self.verbose {
                        match report.bounds {
                            Some((x0, y0, x1, y1)) => println!(
                                "  fill {} at ({}, {}): {} px in ({}, {})–({}, {})",
                                hex, x, y, report.filled, x0, y0, x1, y1
                            ),
                            None => println!("  fill {} at ({}, {}): nothing to paint", hex, x, y),
                        }
                    }
                }
                Step::Undo => {
                    if !session.undo() && self.verbose {
                        println!("  undo: nothing to undo");
                    }
                }
                Step::Redo => {
                    if !session.redo() && self.verbose {
                        println!("  redo: nothing to redo");
                    }
                }
                Step::Reset => session.reset(),
            }
        }
        Ok(())
    }
}

/// Accept a hex code as-is, otherwise look the name up in the palette.
fn resolve_color(color: &str, palette: &Palette) -> Result<String, String> {
    if let ParsedHex::Parsed(c) = parse_hex(color) {
        return Ok(color_to_hex(c));
    }
    let entry = palette
        .find(color)
        .ok_or_else(|| format!("'{}' is neither a hex color nor a palette color", color))?;
    if !parse_hex(&entry.hex).is_parsed() {
        return Err(format!("palette color '{}' has a malformed hex code '{}'", entry.name, entry.hex));
    }
    Ok(entry.hex.clone())
}

// ============================================================================
// saved / palette
// ============================================================================

fn run_saved(action: SavedAction, settings: &AppSettings) -> Result<ExitCode, String> {
    let mut store = open_store(settings)?;
    match action {
        SavedAction::List => {
            if store.list().is_empty() {
                println!("No saved pictures in {}", store.path().display());
            }
            for p in store.list() {
                println!(
                    "{}  {}  {} KB",
                    p.id,
                    format_date(p.created_at),
                    p.image_png.len().div_ceil(1024)
                );
            }
        }
        SavedAction::Delete { id } => {
            if store.delete(&id).map_err(|e| e.to_string())? {
                println!("Deleted {}", id);
            } else {
                eprintln!("warning: no saved picture with id {}", id);
            }
        }
        SavedAction::Export { id, output } => {
            let picture = store
                .get(&id)
                .ok_or_else(|| format!("no saved picture with id {}", id))?;
            let image = decode_image(&picture.image_png).map_err(|e| e.to_string())?;
            encode_and_write(&image, &output, SaveFormat::from_path(&output), 90)
                .map_err(|e| format!("save failed: {}", e))?;
            println!("Wrote {}", output.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_palette(args: &PaletteArgs, settings: &AppSettings) -> Result<ExitCode, String> {
    let palette = load_palette(settings);

    if args.check {
        let diagnostics = palette.diagnostics();
        for d in &diagnostics {
            println!("entry {} '{}': {:?} hex '{}'", d.index + 1, d.name, d.problem, d.hex);
        }
        return Ok(if diagnostics.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    if !palette.categories().contains(&args.category.as_str()) {
        return Err(format!(
            "unknown category '{}' (available: {})",
            args.category,
            palette.categories().join(", ")
        ));
    }
    for c in palette.filter(&args.search, &args.category) {
        println!("{:<10} {:<20} {}", c.category, c.name, c.hex);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_config(write: bool, settings: &AppSettings) -> Result<ExitCode, String> {
    let path = AppSettings::settings_path()
        .ok_or_else(|| "no location for the settings file".to_string())?;
    show_config(&path, write, settings)
}

fn show_config(path: &Path, write: bool, settings: &AppSettings) -> Result<ExitCode, String> {
    if write {
        settings
            .save_to(path)
            .map_err(|e| format!("could not write settings to '{}': {}", path.display(), e))?;
        crate::log_info!("Settings written to {}", path.display());
        println!("Wrote {}", path.display());
    } else {
        println!("# {}", path.display());
    }
    print!("{}", settings.to_config_string());
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Helpers
// ============================================================================

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
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// `--output` names one file, so it cannot take several inputs
/// (even alongside `--output-dir`).
fn check_outputs(input_count: usize, output: Option<&Path>) -> Result<(), String> {
    match output {
        Some(out) if input_count > 1 => Err(format!(
            "{} input files given but --output '{}' is a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            input_count,
            out.display()
        )),
        _ => Ok(()),
    }
}

/// Choose the [`SaveFormat`] from the `--format` string or infer it from the
/// output file extension. Defaults to PNG when neither is known.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> SaveFormat {
    match (format_arg, output) {
        (Some(f), _) => SaveFormat::from_name(f),
        (None, Some(out)) => SaveFormat::from_path(out),
        (None, None) => SaveFormat::Png,
    }
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: same directory as input, same stem, new extension
///    (appends `_out` to stem if it would collide with the input path)
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
) -> Option<PathBuf> {
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

    // Avoid silent overwrite of the input
    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_step_parsing() {
        assert_eq!("undo".parse::<Step>(), Ok(Step::Undo));
        assert_eq!(" REDO ".parse::<Step>(), Ok(Step::Redo));
        assert_eq!("reset".parse::<Step>(), Ok(Step::Reset));
        assert_eq!(
            "fill:3, 4,#FF0000".parse::<Step>(),
            Ok(Step::Fill { x: 3, y: 4, color: "#FF0000".to_string() })
        );
        assert_eq!(
            "fill:0,0,Hale Navy".parse::<Step>(),
            Ok(Step::Fill { x: 0, y: 0, color: "Hale Navy".to_string() })
        );
    }

    #[test]
    fn test_step_parsing_errors() {
        assert!("paint".parse::<Step>().is_err());
        assert!("fill:1,2".parse::<Step>().is_err());
        assert!("fill:-1,2,#FFFFFF".parse::<Step>().is_err());
        assert!("fill:1,2,".parse::<Step>().is_err());
    }

    #[test]
    fn test_clap_parses_paint_command() {
        let args = CliArgs::try_parse_from([
            "housepaint", "paint", "-i", "house.jpg", "-s", "fill:1,2,#00FF00", "-s", "undo",
            "--tolerance", "12", "-o", "out.jpg", "--save",
        ])
        .unwrap();
        let Command::Paint(paint) = args.command else { panic!("expected paint") };
        assert_eq!(paint.input, vec!["house.jpg".to_string()]);
        assert_eq!(paint.steps.len(), 2);
        assert_eq!(paint.steps[1], Step::Undo);
        assert_eq!(paint.tolerance, Some(12));
        assert!(paint.save);
        assert_eq!(parse_format(paint.format.as_deref(), paint.output.as_deref()), SaveFormat::Jpeg);
    }

    #[test]
    fn test_clap_rejects_bad_step() {
        assert!(CliArgs::try_parse_from(["housepaint", "paint", "-i", "a.png", "-s", "smudge"]).is_err());
    }

    #[test]
    fn test_resolve_color() {
        let palette = Palette::builtin();
        assert_eq!(resolve_color("#a4343a", &palette), Ok("#A4343A".to_string()));
        assert_eq!(resolve_color("caliente", &palette), Ok("#A4343A".to_string()));
        assert!(resolve_color("Chartreuse Dream", &palette).is_err());
    }

    #[test]
    fn test_resolve_color_malformed_palette_entry() {
        let palette = Palette::parse("Trim,Broken,#12");
        assert!(resolve_color("Broken", &palette).is_err());
    }

    #[test]
    fn test_build_output_path() {
        let input = Path::new("photos/house.png");
        assert_eq!(
            build_output_path(input, Some(Path::new("x.jpg")), None, SaveFormat::Jpeg),
            Some(PathBuf::from("x.jpg"))
        );
        assert_eq!(
            build_output_path(input, None, Some(Path::new("out")), SaveFormat::Jpeg),
            Some(PathBuf::from("out/house.jpg"))
        );
        assert_eq!(
            build_output_path(input, None, None, SaveFormat::Png),
            Some(PathBuf::from("photos/house_out.png"))
        );
        assert_eq!(
            build_output_path(input, None, None, SaveFormat::Bmp),
            Some(PathBuf::from("photos/house.bmp"))
        );
    }

    #[test]
    fn test_output_file_rejected_for_batches() {
        assert!(check_outputs(1, Some(Path::new("one.png"))).is_ok());
        assert!(check_outputs(3, None).is_ok());
        assert!(check_outputs(2, Some(Path::new("one.png"))).is_err());

        let args = CliArgs::try_parse_from([
            "housepaint", "paint", "-i", "a.png", "b.png", "-o", "one.png", "--output-dir", "out",
        ])
        .unwrap();
        let Command::Paint(paint) = args.command else { panic!("expected paint") };
        assert!(check_outputs(paint.input.len(), paint.output.as_deref()).is_err());
    }

    #[test]
    fn test_config_write_failure_is_an_error() {
        let dir = std::env::temp_dir().join(format!("housepaint-cfg-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("file");
        std::fs::write(&blocker, b"").unwrap();
        let settings = AppSettings::default();

        assert!(show_config(&blocker.join("housepaint_settings.cfg"), true, &settings).is_err());

        let good = dir.join("housepaint_settings.cfg");
        assert!(show_config(&good, true, &settings).is_ok());
        assert_eq!(AppSettings::load_from(&good), settings);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_paint_job_end_to_end() {
        let dir = std::env::temp_dir().join(format!("housepaint-cli-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("house.png");
        let output = dir.join("painted.png");
        let wall = Rgba([200, 50, 50, 255]);
        let trim = Rgba([255, 255, 255, 255]);
        let img = RgbaImage::from_fn(8, 8, |x, _| if x < 4 { wall } else { trim });
        img.save(&input).unwrap();

        let settings = AppSettings {
            store_path: dir.join("store.bin").to_string_lossy().into_owned(),
            ..AppSettings::default()
        };
        let steps = vec![
            "fill:0,0,#0000FF".parse().unwrap(),
            "fill:7,7,Tricorn Black".parse().unwrap(),
            Step::Undo,
        ];
        let palette = Palette::builtin();
        let job = PaintJob {
            steps: &steps,
            palette: &palette,
            settings: &settings,
            format: SaveFormat::Png,
            quality: 90,
            verbose: false,
        };
        let mut store = open_store(&settings).unwrap();
        job.run(&input, &output, Some(&mut store)).unwrap();

        let result = load_image(&output).unwrap();
        assert_eq!(*result.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*result.get_pixel(7, 7), trim);
        assert_eq!(PictureStore::open(dir.join("store.bin")).unwrap().list().len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
