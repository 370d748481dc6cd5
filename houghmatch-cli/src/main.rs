use clap::Parser;
use houghmatch::io::{load_gray_image, load_template, save_gray_image, view_from_gray_image};
use houghmatch::lowlevel::stretch_to_u8;
use houghmatch::{BorderPolicy, Match, Matcher, MatcherConfig, OwnedImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Generalized Hough template matcher (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum BorderPolicyConfig {
    Strict,
    AllPixel,
}

impl From<BorderPolicyConfig> for BorderPolicy {
    fn from(value: BorderPolicyConfig) -> Self {
        match value {
            BorderPolicyConfig::Strict => BorderPolicy::Strict,
            BorderPolicyConfig::AllPixel => BorderPolicy::AllPixel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatcherConfigJson {
    sobel_kernel_size: usize,
    magnitude_threshold: f32,
    quantization_steps: usize,
    scale_factor: f32,
    sampling_stride: usize,
    border_policy: BorderPolicyConfig,
    parallel: bool,
}

impl Default for MatcherConfigJson {
    fn default() -> Self {
        let cfg = MatcherConfig::default();
        Self {
            sobel_kernel_size: cfg.sobel_kernel_size,
            magnitude_threshold: cfg.magnitude_threshold,
            quantization_steps: cfg.quantization_steps,
            scale_factor: cfg.scale_factor,
            sampling_stride: cfg.sampling_stride,
            border_policy: BorderPolicyConfig::AllPixel,
            parallel: cfg.parallel,
        }
    }
}

impl From<MatcherConfigJson> for MatcherConfig {
    fn from(value: MatcherConfigJson) -> Self {
        Self {
            sobel_kernel_size: value.sobel_kernel_size,
            magnitude_threshold: value.magnitude_threshold,
            quantization_steps: value.quantization_steps,
            scale_factor: value.scale_factor,
            sampling_stride: value.sampling_stride,
            border_policy: value.border_policy.into(),
            parallel: value.parallel,
        }
    }
}

/// Template region `[x, y, width, height]` cut from the preprocessed scene.
#[derive(Debug, Deserialize)]
struct RoiJson {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    template_path: String,
    template_roi: Option<RoiJson>,
    template_scale: f32,
    pre_blur_sigma: f32,
    output_path: Option<String>,
    codes_path: Option<String>,
    votes_path: Option<String>,
    matcher: MatcherConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            template_path: String::new(),
            template_roi: None,
            template_scale: 1.0,
            pre_blur_sigma: 0.0,
            output_path: None,
            codes_path: None,
            votes_path: None,
            matcher: MatcherConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TargetRecord {
    x: isize,
    y: isize,
    w: usize,
    h: usize,
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    x: usize,
    y: usize,
    votes: f64,
    score: f32,
    target: TargetRecord,
}

impl MatchRecord {
    fn new(value: Match, template_size: (usize, usize)) -> Self {
        let rect = value.target_rect(template_size);
        Self {
            x: value.x,
            y: value.y,
            votes: value.votes,
            score: value.score,
            target: TargetRecord {
                x: rect.x,
                y: rect.y,
                w: rect.width,
                h: rect.height,
            },
        }
    }
}

/// Applies the host-side Gaussian pre-blur; `sigma <= 0` leaves the image as is.
fn pre_blur(img: OwnedImage<u8>, sigma: f32) -> Result<OwnedImage<u8>, Box<dyn std::error::Error>> {
    if sigma.is_nan() || sigma <= 0.0 {
        return Ok(img);
    }
    let width = u32::try_from(img.width())?;
    let height = u32::try_from(img.height())?;
    let gray = image::GrayImage::from_raw(width, height, img.into_vec())
        .ok_or("image buffer does not match its dimensions")?;
    let blurred = image::imageops::blur(&gray, sigma);
    Ok(OwnedImage::from_view(view_from_gray_image(&blurred)?)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("houghmatch=debug".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }
    if config.template_path.is_empty() && config.template_roi.is_none() {
        return Err("either template_path or template_roi must be set in the config".into());
    }

    let image = pre_blur(load_gray_image(&config.image_path)?, config.pre_blur_sigma)?;
    let template = match &config.template_roi {
        Some(roi) => OwnedImage::from_view(image.view().roi(roi.x, roi.y, roi.width, roi.height)?)?,
        None => pre_blur(
            load_template(&config.template_path, config.template_scale)?,
            config.pre_blur_sigma,
        )?,
    };

    let matcher = Matcher::new(template.view(), config.matcher.into())?;
    let table = matcher.table();
    tracing::info!(
        max_votes = table.max_votes(),
        entries = table.total_entries(),
        "template loaded"
    );

    let report = matcher.match_image_detailed(image.view())?;
    if let Some(path) = &config.codes_path {
        save_gray_image(path, &stretch_to_u8(report.codes.view())?)?;
    }
    if let Some(path) = &config.votes_path {
        save_gray_image(path, &stretch_to_u8(report.votes.view())?)?;
    }

    // `null` when the scene is empty.
    let template_size = report.table.img_size();
    let output = report.best.map(|best| MatchRecord::new(best, template_size));
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
