//! md2html - convert one markdown document to an HTML fragment

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use markdown_html_converter::{ConversionOptions, HtmlConverter};

#[derive(Parser)]
#[command(name = "md2html")]
#[command(version, about = "Convert a markdown document to an HTML fragment", long_about = None)]
#[command(after_help = "EXAMPLES:
    md2html notes.md                    Print the fragment to stdout
    md2html notes.md -o notes.html      Write the fragment to a file
    cat notes.md | md2html --outline    Print the header outline as JSON")]
struct Cli {
    /// Markdown input file; reads stdin when omitted
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file; writes stdout when omitted
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Charset label of the input (default UTF-8; a byte order mark wins)
    #[arg(long, value_name = "LABEL")]
    charset: Option<String>,

    /// Give every header an id slug
    #[arg(long)]
    heading_ids: bool,

    /// Print the header outline as JSON instead of the HTML
    #[arg(long)]
    outline: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn read_input(input: Option<&PathBuf>) -> Result<Vec<u8>, String> {
    match input {
        Some(path) => fs::read(path).map_err(|e| format!("{}: {e}", path.display())),
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|e| format!("stdin: {e}"))?;
            Ok(bytes)
        }
    }
}

fn write_output(output: Option<&PathBuf>, text: &str) -> Result<(), String> {
    match output {
        Some(path) => fs::write(path, text).map_err(|e| format!("{}: {e}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.write_all(b"\n"))
                .map_err(|e| format!("stdout: {e}"))
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let bytes = read_input(cli.input.as_ref())?;
    log::info!("read {} bytes of markdown", bytes.len());

    let converter = HtmlConverter::with_options(ConversionOptions {
        heading_ids: cli.heading_ids,
        ..Default::default()
    });
    let conversion = converter
        .convert_bytes(&bytes, cli.charset.as_deref())
        .map_err(|e| e.to_string())?;

    if cli.outline {
        let json =
            serde_json::to_string_pretty(&conversion.headings).map_err(|e| e.to_string())?;
        write_output(cli.output.as_ref(), &json)
    } else {
        write_output(cli.output.as_ref(), &conversion.html)
    }
}
