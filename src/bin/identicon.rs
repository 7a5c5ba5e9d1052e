use std::{io, path::PathBuf, process::ExitCode};

use clap::Parser;
use log::error;

use lib::{
    color::Rgba,
    options::parse_hex_key,
    render::{read_title, Identicon},
    Options, Result,
};

/// Generate an identicon from a title.
///
/// The title is taken from `--title`, or else from the first line of
/// standard input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PNG file to write.  May be omitted with `--base64` or `--ascii`.
    #[arg(required_unless_present_any = ["base64", "ascii"])]
    output: Option<PathBuf>,

    /// Title to hash instead of reading standard input
    #[arg(short, long)]
    title: Option<String>,

    /// SipHash key as text (at least 16 bytes; extra bytes are ignored)
    #[arg(short, long, conflicts_with = "key_hex")]
    key: Option<String>,

    /// SipHash key as hex digits
    #[arg(long)]
    key_hex: Option<String>,

    /// Rows and columns in the grid, 4 to 9
    #[arg(short, long, default_value_t = Options::default().grid_size, allow_negative_numbers = true)]
    grid_size: i32,

    /// Pixel size of each grid square
    #[arg(short, long, default_value_t = Options::default().square_size, allow_negative_numbers = true)]
    square_size: i32,

    /// Pixel size of the empty border
    #[arg(short, long, default_value_t = Options::default().border_size, allow_negative_numbers = true)]
    border_size: i32,

    /// Background color, `#RRGGBB` or `#RRGGBBAA`
    #[arg(long, default_value = "#FF9800")]
    background: String,

    /// Foreground color, `#RRGGBB` or `#RRGGBBAA`
    #[arg(long, default_value = "#E65100")]
    foreground: String,

    /// Print the PNG base64-encoded to standard output
    #[arg(long)]
    base64: bool,

    /// Print the grid as text to standard output
    #[arg(long)]
    ascii: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut options = Options::default()
        .with_grid_size(args.grid_size)
        .with_square_size(args.square_size)
        .with_border_size(args.border_size)
        .with_background(Rgba::from_hex(&args.background)?)
        .with_foreground(Rgba::from_hex(&args.foreground)?);

    if let Some(key) = &args.key {
        options = options.with_key(key.as_bytes());
    } else if let Some(hex) = &args.key_hex {
        options = options.with_key(parse_hex_key(hex)?);
    }

    let title = match &args.title {
        Some(title) => title.clone().into_bytes(),
        None => {
            eprintln!("Reading standard input to generate identicon...");
            read_title(&mut io::stdin().lock())?
        }
    };

    let identicon = Identicon::new(&title, &options)?;

    if args.ascii {
        print!("{}", identicon.grid);
    }
    if args.base64 {
        println!("{}", identicon.to_base64()?);
    }
    if let Some(path) = &args.output {
        identicon.save(path)?;
    }

    Ok(())
}
