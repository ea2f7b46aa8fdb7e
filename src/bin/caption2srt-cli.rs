use anyhow::{Context, Result, bail};
use clap::Parser;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use caption2srt::Transcoder;
use caption2srt::file_name::caption_file_name;
use caption2srt::logging;
use caption2srt::opts::Opts;
use caption2srt::output_type::OutputType;

fn main() -> Result<()> {
    logging::init();
    let params = get_params()?;

    let xml = read_input(params.input.as_ref())?;
    let opts = Opts {
        output_type: params.output_type,
    };
    let transcoder = Transcoder::new();

    match output_path(&params)? {
        Some(path) => {
            // Transcode into memory first so bad input never truncates an existing file.
            let text = transcoder.transcode_to_string(&xml, &opts)?;
            fs::write(&path, text)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            println!("{}", path.display());
        }
        None => {
            let stdout = io::stdout();
            transcoder.transcode(&xml, stdout.lock(), &opts)?;
        }
    }

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "caption2srt")]
#[command(about = "Convert timed-text XML captions into SRT subtitles")]
struct Params {
    /// Timed-text XML file to read (defaults to stdin).
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// File to write (defaults to stdout, or a derived name when --title is given).
    #[arg(short = 'o', long = "output", conflicts_with = "title")]
    pub output: Option<PathBuf>,

    #[arg(
        short = 't',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Srt
    )]
    pub output_type: OutputType,

    /// Video title used to derive the output file name.
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Caption language code appended to the derived file name.
    #[arg(short = 'l', long = "language", default_value = "")]
    pub language: String,

    /// Directory for derived output file names.
    #[arg(long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn output_path(params: &Params) -> Result<Option<PathBuf>> {
    if let Some(path) = &params.output {
        return Ok(Some(path.clone()));
    }

    let Some(title) = &params.title else {
        return Ok(None);
    };

    if !params.output_dir.is_dir() {
        bail!(
            "output directory does not exist: '{}'",
            params.output_dir.display()
        );
    }

    let name = caption_file_name(title, &params.language, params.output_type);
    Ok(Some(params.output_dir.join(name)))
}
