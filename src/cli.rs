use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use screencap::report::{HtmlFileReport, JsonLinesReport, ReportSink, TracingReport};
use screencap::{BackendKind, MonitorIndex, ScreenCapConfig, ScreenshotFormat, TimeSpec};

#[derive(Parser, Debug)]
#[command(name = "screencap")]
#[command(version, about = "Screenshots, GIFs and WebM screen recordings for test reports")]
pub(crate) struct Cli {
    /// JSON configuration file; flags override its fields
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Screen grabber: xcap or x11
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// Directory captures are saved to
    #[arg(long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Directory links are made relative to (default: the report's directory)
    #[arg(long = "log-dir", global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Still image format: png, jpg or webp
    #[arg(long, global = true)]
    pub format: Option<ScreenshotFormat>,

    /// Image quality, 0-100
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Append report fragments to this file instead of logging them
    #[arg(long, global = true, value_name = "FILE")]
    pub report: Option<PathBuf>,

    #[arg(long = "report-format", global = true, value_enum, default_value_t = ReportFormat::Html)]
    pub report_format: ReportFormat,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReportFormat {
    Html,
    Json,
}

/// Arguments every still capture takes
#[derive(Args, Debug, Clone)]
pub(crate) struct ShotArgs {
    /// Basename, or a file name with an image extension
    #[arg(default_value = "screenshot")]
    pub name: String,

    /// 0 captures every monitor, 1..N a single one
    #[arg(long, short = 'm', default_value = "0")]
    pub monitor: MonitorIndex,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct EmbedArgs {
    /// Embed the capture in the report instead of only saving it
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub embed: bool,

    /// Width of the embedded media
    #[arg(long = "embed-width", value_name = "WIDTH")]
    pub embed_width: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Capture the screen
    Screenshot {
        #[command(flatten)]
        shot: ShotArgs,

        #[command(flatten)]
        embed: EmbedArgs,

        /// Wait before capturing, e.g. "2 seconds" or "00:01.5"
        #[arg(long)]
        delay: Option<TimeSpec>,
    },

    /// Capture part of the screen
    Partial {
        #[command(flatten)]
        shot: ShotArgs,

        #[command(flatten)]
        embed: EmbedArgs,

        #[arg(long, default_value_t = 0)]
        left: u32,

        #[arg(long, default_value_t = 0)]
        top: u32,

        #[arg(long, default_value_t = 700)]
        width: u32,

        #[arg(long, default_value_t = 300)]
        height: u32,
    },

    /// Take several screenshots in a row
    Burst {
        #[command(flatten)]
        shot: ShotArgs,

        #[command(flatten)]
        embed: EmbedArgs,

        #[arg(long, short = 'n', default_value_t = 2)]
        count: u32,

        /// Wait after each screenshot
        #[arg(long, default_value = "0")]
        interval: TimeSpec,
    },

    /// Record an animated GIF
    Gif {
        #[arg(default_value = "screenshot")]
        name: String,

        #[command(flatten)]
        embed: EmbedArgs,

        #[arg(long, default_value = "10 seconds")]
        duration: TimeSpec,

        #[arg(long = "size-percentage", default_value_t = 0.5)]
        size_percentage: f64,

        #[arg(long, short = 'm', default_value = "0")]
        monitor: MonitorIndex,
    },

    /// Record a WebM video until the duration elapses or Ctrl-C
    Record {
        #[arg(default_value = "recording")]
        name: String,

        #[command(flatten)]
        embed: EmbedArgs,

        /// Stop after this long; runs until Ctrl-C when omitted
        #[arg(long)]
        duration: Option<TimeSpec>,

        /// Frames per second (1-60); calibrated when omitted
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=60))]
        fps: Option<u8>,

        #[arg(long = "size-percentage", default_value_t = 1.0)]
        size_percentage: f64,

        #[arg(long, short = 'm', default_value = "1")]
        monitor: MonitorIndex,

        /// Draw the pointer into the video
        #[arg(long)]
        cursor: bool,

        /// Record a GIF of the same session alongside the video
        #[arg(long)]
        gif: bool,
    },

    /// List monitors
    Monitors,
}

impl Cli {
    /// Configuration file (or defaults) with the global flags applied
    pub fn load_config(&self) -> screencap::Result<ScreenCapConfig> {
        let mut config = match &self.config {
            Some(path) => ScreenCapConfig::from_json_file(path)?,
            None => ScreenCapConfig::default(),
        };

        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(directory) = &self.directory {
            config.screenshot_directory = Some(directory.clone());
        }
        match (&self.log_dir, &self.report) {
            (Some(dir), _) => config.log_directory = dir.clone(),
            (None, Some(report)) => {
                if let Some(parent) = report.parent().filter(|p| !p.as_os_str().is_empty()) {
                    config.log_directory = parent.to_path_buf();
                }
            }
            (None, None) => {}
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Command::Record { cursor: true, .. } = self.command {
            config.display_cursor = true;
        }
        Ok(config)
    }

    pub fn report_sink(&self) -> screencap::Result<Arc<dyn ReportSink>> {
        Ok(match (&self.report, self.report_format) {
            (Some(path), ReportFormat::Html) => Arc::new(HtmlFileReport::create(path)?),
            (Some(path), ReportFormat::Json) => Arc::new(JsonLinesReport::create(path)?),
            (None, _) => Arc::new(TracingReport),
        })
    }
}
