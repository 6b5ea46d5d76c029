mod cli;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Command, EmbedArgs, ShotArgs};
use screencap::record::default_encoder;
use screencap::{
    backend_for, GifOptions, Region, ScreenCap, ScreenshotOptions, TimeSpec, VideoOptions,
};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn shot_options(shot: ShotArgs) -> ScreenshotOptions {
    ScreenshotOptions {
        monitor: shot.monitor,
        ..ScreenshotOptions::named(shot.name)
    }
}

fn print_paths<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for path in paths {
        println!("{}", path.display());
    }
}

/// Wait for `duration`, or for Ctrl-C when there is none
async fn wait_for_stop(duration: Option<TimeSpec>) -> screencap::Result<()> {
    let elapsed = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration.duration()).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = elapsed => info!("Recording time elapsed"),
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Interrupted, stopping recordings");
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> screencap::Result<()> {
    let config = cli.load_config()?;
    let report = cli.report_sink()?;
    let backend = backend_for(config.backend);
    let mut cap = ScreenCap::with_parts(config, backend, default_encoder(), report)?;

    match cli.command {
        Command::Screenshot { shot, embed, delay } => {
            let opts = ScreenshotOptions {
                width: embed.embed_width,
                delay,
                ..shot_options(shot)
            };
            let path = if embed.embed {
                cap.take_screenshot(&opts)?
            } else {
                cap.take_screenshot_without_embedding(&opts)?
            };
            print_paths([&path]);
        }
        Command::Partial {
            shot,
            embed: EmbedArgs { embed, embed_width },
            left,
            top,
            width,
            height,
        } => {
            let region = Region {
                left,
                top,
                width,
                height,
            };
            let path = cap.take_partial_screenshot(
                &shot_options(shot),
                region,
                embed,
                embed_width.as_deref(),
            )?;
            print_paths([&path]);
        }
        Command::Burst {
            shot,
            embed: EmbedArgs { embed, embed_width },
            count,
            interval,
        } => {
            let paths = cap.take_multiple_screenshots(
                &shot_options(shot),
                count,
                interval,
                embed,
                embed_width.as_deref(),
            )?;
            print_paths(&paths);
        }
        Command::Gif {
            name,
            embed: EmbedArgs { embed, embed_width },
            duration,
            size_percentage,
            monitor,
        } => {
            let opts = GifOptions {
                name,
                size_percentage,
                embed,
                embed_width,
                monitor,
            };
            let path = cap.take_gif(&opts, duration)?;
            print_paths([&path]);
        }
        Command::Record {
            name,
            embed: EmbedArgs { embed, embed_width },
            duration,
            fps,
            size_percentage,
            monitor,
            gif,
            ..
        } => {
            let opts = VideoOptions {
                alias: None,
                name: name.clone(),
                fps,
                size_percentage,
                embed,
                embed_width: embed_width.clone(),
                monitor,
            };
            cap.start_video_recording(&opts)?;
            if gif {
                let gif_opts = GifOptions {
                    name,
                    embed,
                    embed_width,
                    monitor,
                    ..GifOptions::default()
                };
                if let Err(e) = cap.start_gif_recording(&gif_opts) {
                    cap.stop_all_video_recordings()?;
                    return Err(e);
                }
            }

            wait_for_stop(duration).await?;

            let mut paths = cap.stop_all_video_recordings()?;
            if cap.is_gif_recording() {
                paths.push(cap.stop_gif_recording()?);
            }
            print_paths(&paths);
        }
        Command::Monitors => {
            for monitor in cap.monitors()? {
                println!(
                    "{}: {} {}x{}+{}+{}{}",
                    monitor.index,
                    monitor.name,
                    monitor.width,
                    monitor.height,
                    monitor.x,
                    monitor.y,
                    if monitor.is_primary { " (primary)" } else { "" }
                );
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
