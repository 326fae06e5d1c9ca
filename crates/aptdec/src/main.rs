use std::io;

use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, warn, LevelFilter};

use noaapt::{AptDecoderBuilder, CANONICAL_RATE};

mod cli;
mod input;
mod output;
mod resample;

use cli::{Args, CliError};

fn main() {
    match aptdec() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn aptdec() -> Result<(), CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    // create the decoder
    let decoder = AptDecoderBuilder::new()
        .with_percentiles(args.percentile_low, args.percentile_high)
        .with_min_distance(args.min_distance as usize)
        .with_trailing_line(args.trailing)
        .build();

    // file setup: locks stdin in case we need it
    let stdin = io::stdin();
    let stdin_handle = stdin.lock();
    let inbuf = file_setup(&args, stdin_handle)?;

    // read the whole recording and bring it to the decoder's rate
    let recording = input::read_recording(inbuf, args.rate)?;
    let mut samples = resample::resample(recording.samples, recording.rate, CANONICAL_RATE);
    if let Some(path) = &args.resampled {
        output::write_wav(path, &samples, CANONICAL_RATE)?;
    }
    resample::truncate_seconds(&mut samples, CANONICAL_RATE);

    let img = decoder
        .decode(&samples, CANONICAL_RATE)
        .context("Unable to decode recording")?;

    if img.is_empty() {
        warn!("no scan lines decoded; not writing \"{}\"", &args.output);
    } else {
        output::write_png(&args.output, &img)?;
    }

    if !args.quiet {
        println!(
            "decoded {} lines ({} padded pixels, {} dropped lines)",
            img.rows(),
            img.padded_samples(),
            img.dropped_rows()
        );
    }

    Ok(())
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
        return;
    } else if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        pretty_env_logger::formatted_builder()
            .filter_module("noaapt", log_filter)
            .filter_module("aptdec", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}

fn file_setup<'stdin>(
    args: &Args,
    stdin: std::io::StdinLock<'stdin>,
) -> Result<Box<dyn io::BufRead + 'stdin>, anyhow::Error> {
    if args.input_is_stdin() {
        info!("APT decoder reading standard input");
        if !is_terminal(&std::io::stdin()) {
            Ok(Box::new(io::BufReader::new(stdin)))
        } else {
            Err(anyhow!(
                "cowardly refusing to read audio samples from a terminal.

Pipe a WAV file or raw uncompressed audio from sox, rtl_fm,
or similar into this program, or use --file."
            ))
        }
    } else {
        info!("APT decoder reading file: \"{}\"", &args.file);
        Ok(Box::new(io::BufReader::new(
            std::fs::File::open(&args.file)
                .with_context(|| format!("Unable to open --file \"{}\"", args.file))?,
        )))
    }
}

#[cfg(not(target_os = "windows"))]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::fd::AsRawFd,
{
    terminal_size::terminal_size_using_fd(stream.as_raw_fd()).is_some()
}

#[cfg(target_os = "windows")]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::windows::io::AsRawHandle,
{
    terminal_size::terminal_size_using_handle(stream.as_raw_handle()).is_some()
}
