use std::fmt::Display;

use clap::{error::ErrorKind, value_parser, CommandFactory, Parser};

use noaapt::TrailingLine;

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program accepts a recording of a NOAA APT satellite pass and decodes it to a grayscale PNG image. The input may be a WAV file or raw PCM samples in signed 16-bit (i16) format at the given sampling --rate.

See --help for more details.
"#;

const USAGE_LONG: &str = r#"
This program accepts a recording of a NOAA APT satellite pass and decodes it to a grayscale PNG image. The input may be a WAV file or raw PCM samples in signed 16-bit (i16) format at the given sampling --rate.

WAV files are detected automatically, and their own sampling rate overrides --rate. Only the first channel of a multi-channel recording is used.

    aptdec --file noaa19.wav --output noaa19.png

You can also pipe in raw audio from sox or rtl_fm

    rtl_fm -f 137.1M -M fm -s 60k -r 20800 - \
        | aptdec --rate 20800 --output pass.png

Audio at any rate other than 20800 Hz is resampled to 20800 Hz, and the recording is cut down to a whole number of seconds. Use --resampled to save the audio which the decoder actually sees.

Each row of the output image is one scan line, 2080 pixels wide. If no scan lines are found, no image is written.
"#;

const ADVANCED: &str = "Advanced Decoder Options";

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print NOTHING, not even the summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Sampling rate of raw input (Hz)
    ///
    /// Only used for raw i16 input. WAV files carry their own
    /// sampling rate. The decoder works at 20800 Hz, so use this
    /// rate if your audio source supports it.
    #[arg(short, long, default_value_t = noaapt::CANONICAL_RATE)]
    #[arg(value_parser = value_parser!(u32).range(1..))]
    pub rate: u32,

    /// Input file (or "-" for stdin)
    ///
    /// The input must be a WAV file or one-channel (mono), signed
    /// 16-bit native-endian raw samples at --rate.
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// Output image file (PNG)
    #[arg(short, long, default_value_t = String::from("image.png"))]
    pub output: String,

    /// Also write the resampled audio to this WAV file
    ///
    /// The file contains mono 32-bit float samples at 20800 Hz,
    /// before truncation to whole seconds.
    #[arg(long)]
    pub resampled: Option<String>,

    /// Envelope percentile mapped to black (0.0 ≤ P ≤ 100.0)
    #[arg(long, default_value_t = noaapt::Digitizer::LOW_PERCENTILE)]
    #[arg(value_parser = parse_percentile)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub percentile_low: f32,

    /// Envelope percentile mapped to white (0.0 ≤ P ≤ 100.0)
    #[arg(long, default_value_t = noaapt::Digitizer::HIGH_PERCENTILE)]
    #[arg(value_parser = parse_percentile)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub percentile_high: f32,

    /// Minimum distance between line starts (pixels, <2080)
    #[arg(long, default_value_t = noaapt::MIN_DISTANCE as u32)]
    #[arg(value_parser = value_parser!(u32).range(1..2080))]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub min_distance: u32,

    /// Incomplete last line: "pad" with black or "drop" it
    #[arg(long, default_value_t = TrailingLine::Pad)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub trailing: TrailingLine,
}

impl Args {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }
}

/// Parse a percentile, which must be finite and within `[0, 100]`
fn parse_percentile(s: &str) -> Result<f32, String> {
    let p: f32 = s
        .parse()
        .map_err(|e| format!("\"{}\" is not a number: {}", s, e))?;
    if p.is_finite() && (0.0..=100.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{} is not in 0.0 ..= 100.0", s))
    }
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}
