use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use descreen::{codec, painter, sampling, Color, ColorRemover, PixelBuffer, Rect};

/// Side length of the default corner sampling squares.
const CORNER_SAMPLE: i32 = 50;

#[derive(Parser)]
#[command(
    name = "descreen",
    about = "Remove a screen background color from scanned images",
    version,
    after_help = "Simple usage: descreen <image>  (sample the top corners, remove, save)\n\n\
                  Without --color or --sample the reference color is averaged from\n\
                  the 50x50 top-left and top-right corners of each image."
)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output file or directory (default: {name}_descreened.{ext})
    #[arg(short, long)]
    output: Option<String>,

    /// Explicit reference color as #RRGGBB instead of sampling
    #[arg(short, long)]
    color: Option<String>,

    /// Sampling rectangle as LEFT,TOP,WIDTH,HEIGHT
    #[arg(short, long)]
    sample: Option<String>,

    /// Hue tolerance on the 0..1 color wheel
    #[arg(long, default_value = "0.1")]
    hue: f64,

    /// Strict hue tolerance; matches inside it erase fully
    #[arg(long, default_value = "0.01")]
    hue_strict: f64,

    /// Saturation tolerance
    #[arg(long, default_value = "0.1")]
    saturation: f64,

    /// Value (brightness) tolerance
    #[arg(long, default_value = "0.35")]
    value_tol: f64,

    /// Normalized RGB distance tolerance
    #[arg(long, default_value = "0.25")]
    rgb: f64,

    /// Value below which matched dark pixels get extra erasure
    #[arg(long, default_value = "0.25")]
    dark_limit: f64,

    /// Saturation*value limit under which a color counts as gray
    #[arg(long, default_value = "0.15")]
    gray_limit: f64,

    /// Let gray pixels match any gray reference color
    #[arg(long)]
    gray_matches_all: bool,

    /// Portion of the original to preserve via alpha-blend inversion
    #[arg(long, default_value = "0.0")]
    preserve: f64,

    /// Composite the result over a checkerboard for previewing
    #[arg(long)]
    checkerboard: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    for (name, value) in [
        ("--hue", cli.hue),
        ("--hue-strict", cli.hue_strict),
        ("--saturation", cli.saturation),
        ("--value-tol", cli.value_tol),
        ("--rgb", cli.rgb),
        ("--dark-limit", cli.dark_limit),
        ("--gray-limit", cli.gray_limit),
        ("--preserve", cli.preserve),
    ] {
        if !(0.0..=1.0).contains(&value) {
            eprintln!("Error: {name} must be between 0.0 and 1.0");
            process::exit(1);
        }
    }

    let key = cli.color.as_deref().map(|text| match parse_hex_color(text) {
        Ok(color) => color,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    });

    let sample_rect = cli.sample.as_deref().map(|text| match parse_rect(text) {
        Ok(rect) => rect,
        Err(text) => {
            eprintln!("Error: invalid --sample {text:?}, expected LEFT,TOP,WIDTH,HEIGHT");
            process::exit(1);
        }
    });

    let remover = ColorRemover {
        hue_tolerance: cli.hue,
        hue_tolerance_strict: cli.hue_strict,
        saturation_tolerance: cli.saturation,
        value_tolerance: cli.value_tol,
        rgb_tolerance: cli.rgb,
        dark_value_limiter: cli.dark_limit,
        gray_upper_limit: cli.gray_limit,
        source_preserve_portion: cli.preserve,
        gray_matches_all: cli.gray_matches_all,
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    let mut failures = 0u32;

    if input_path.is_dir() {
        let Some(output_dir) = cli.output.as_deref().map(PathBuf::from) else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: descreen <input_dir> -o <output_dir>");
            process::exit(1);
        };

        let mut inputs: Vec<PathBuf> = match std::fs::read_dir(input_path) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && codec::is_supported_image(path))
                .collect(),
            Err(e) => {
                eprintln!("Error: Failed to read directory: {e}");
                process::exit(1);
            }
        };
        inputs.sort();

        if let Err(e) = std::fs::create_dir_all(&output_dir) {
            eprintln!("Error: Failed to create output directory: {e}");
            process::exit(1);
        }

        for input in &inputs {
            let file_name = input.file_name().unwrap_or_default();
            let output = output_dir.join(file_name).with_extension("png");
            report(
                &cli,
                input,
                process_file(&cli, &remover, key, sample_rect, input, &output),
                &mut failures,
            );
        }

        if !cli.quiet {
            eprintln!(
                "[Summary] {} processed, {} failed (Total: {})",
                inputs.len() - failures as usize,
                failures,
                inputs.len()
            );
        }
    } else {
        let output = cli
            .output
            .as_deref()
            .map_or_else(|| codec::default_output_path(input_path), PathBuf::from);
        report(
            &cli,
            input_path,
            process_file(&cli, &remover, key, sample_rect, input_path, &output),
            &mut failures,
        );
    }

    if failures > 0 {
        process::exit(1);
    }
}

fn process_file(
    cli: &Cli,
    remover: &ColorRemover,
    key: Option<Color>,
    sample_rect: Option<Rect>,
    input: &Path,
    output: &Path,
) -> descreen::Result<()> {
    let source = codec::load(input)?;

    let key = match key {
        Some(color) => color,
        None => sample_key(&source, sample_rect),
    };

    let mut result = remover.remove_color(&source, key);
    if cli.checkerboard {
        painter::composite_checkerboard(&mut result);
    }

    codec::save(&result, output)
}

/// Average the reference color from the requested rectangle, or from the
/// two 50x50 top corner squares when none was given.
fn sample_key(source: &PixelBuffer, sample_rect: Option<Rect>) -> Color {
    if let Some(rect) = sample_rect {
        if let Some(color) = sampling::average_color(source, rect) {
            return color;
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let width = source.width() as i32;
    let left = sampling::average_color(source, Rect::new(0, 0, CORNER_SAMPLE, CORNER_SAMPLE));
    let right = sampling::average_color(
        source,
        Rect::new(width - CORNER_SAMPLE, 0, CORNER_SAMPLE, CORNER_SAMPLE),
    );

    match (left, right) {
        (Some(a), Some(b)) => Color::rgb(
            midpoint(a.r(), b.r()),
            midpoint(a.g(), b.g()),
            midpoint(a.b(), b.b()),
        ),
        (Some(color), None) | (None, Some(color)) => color,
        (None, None) => Color::rgb(255, 255, 255),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn midpoint(a: u8, b: u8) -> u8 {
    ((u16::from(a) + u16::from(b)) / 2) as u8
}

fn parse_hex_color(text: &str) -> descreen::Result<Color> {
    let digits = text.strip_prefix('#').unwrap_or(text);
    if digits.len() != 6 {
        return Err(descreen::Error::InvalidColor(text.to_string()));
    }
    let value = u32::from_str_radix(digits, 16)
        .map_err(|_| descreen::Error::InvalidColor(text.to_string()))?;
    Ok(Color::from_argb(0xff00_0000 | value))
}

fn parse_rect(text: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(text.to_string());
    }
    let mut values = [0i32; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| text.to_string())?;
    }
    Ok(Rect::new(values[0], values[1], values[2], values[3]))
}

fn report(cli: &Cli, input: &Path, result: descreen::Result<()>, failures: &mut u32) {
    let filename = input.file_name().map_or_else(
        || input.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    match result {
        Ok(()) => {
            if !cli.quiet {
                eprintln!("[OK] {filename}");
            }
        }
        Err(e) => {
            eprintln!("[FAIL] {filename}: {e}");
            *failures += 1;
        }
    }
}
