//! Minimal shell around the capture core: list devices, capture from one of
//! them for a while, save the result as WAV.

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;

use pcm_capture_core::storage::metadata;
use pcm_capture_core::{CaptureConfiguration, CaptureController, CaptureError};
use pcm_capture_cpal::CpalHost;

#[derive(Parser)]
#[command(name = "pcm-capture")]
#[command(version)]
#[command(about = "Capture raw PCM from an audio input device into a WAV file", long_about = None)]
struct Cli {
    /// List audio devices and exit
    #[arg(short, long)]
    list: bool,

    /// Index of the device to capture from (see --list)
    #[arg(short, long)]
    device: Option<usize>,

    /// Seconds to capture
    #[arg(short, long, default_value_t = 5.0)]
    seconds: f64,

    /// Output WAV file
    #[arg(short, long, default_value = "test.wav")]
    output: PathBuf,

    /// Also save a snapshot halfway through, while capture keeps running
    #[arg(long)]
    save_midway: bool,

    /// Write a JSON metadata sidecar next to the recording
    #[arg(long)]
    metadata: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Usage(msg)) => {
            eprintln!("usage error: {}", msg);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
enum RunError {
    Usage(String),
    Capture(CaptureError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Usage(msg) => write!(f, "{}", msg),
            RunError::Capture(e) => write!(f, "{}", e),
        }
    }
}

impl From<CaptureError> for RunError {
    fn from(e: CaptureError) -> Self {
        RunError::Capture(e)
    }
}

fn capture_duration(seconds: f64) -> Result<Duration, RunError> {
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        RunError::Usage(format!(
            "--seconds must be a finite, non-negative duration, got {}",
            seconds
        ))
    })
}

fn run(cli: Cli) -> Result<(), RunError> {
    let total = capture_duration(cli.seconds)?;
    let host = CpalHost::new();
    println!("Audio Driver: {}", host.host_name());

    let mut controller = CaptureController::new(host, CaptureConfiguration::default());
    for (index, device) in controller.list_devices()?.iter().enumerate() {
        println!("{:>3}  {}", index, device.display_label());
    }

    let Some(index) = cli.device else {
        if !cli.list {
            eprintln!("no --device given; nothing to capture");
        }
        return Ok(());
    };
    if cli.list {
        return Ok(());
    }

    let format = controller.start_capture(index)?;
    println!("Capturing from device {} at {}", index, format);

    if cli.save_midway {
        thread::sleep(total / 2);
        let midway = cli.output.with_extension("midway.wav");
        let partial = controller.snapshot_capture(&midway)?;
        println!(
            "Saved {:.2}s so far to {}",
            partial.duration_secs,
            partial.file_path.display()
        );
        thread::sleep(total - total / 2);
    } else {
        thread::sleep(total);
    }

    let result = controller.save_capture(&cli.output)?;
    println!(
        "Saved {:.2}s ({} bytes) to {} [sha256 {}]",
        result.duration_secs,
        result.data_bytes,
        result.file_path.display(),
        result.checksum
    );

    if cli.metadata {
        let sidecar = metadata::write_metadata(&result.metadata, &result.file_path)?;
        println!("Metadata written to {}", sidecar.display());
    }

    Ok(())
}
