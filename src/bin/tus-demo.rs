use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tus_upload::{HttpHandler, HttpRequest, HttpResponse, SessionConfig, UploadSession};

/// Interactive tus client: create an upload, query its offset and send
/// the file, one request per menu choice.
#[derive(Parser, Debug)]
#[command(name = "tus-demo", version, about)]
struct Args {
    /// File to upload.
    file: PathBuf,

    /// Creation endpoint of the tus server.
    #[arg(short, long, default_value = tus_upload::config::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Value sent as Tus-Resumable.
    #[arg(long, default_value = tus_upload::config::DEFAULT_PROTOCOL_VERSION)]
    protocol_version: String,

    /// Per-request timeout.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

/// Prints every request and response that passes through.
struct Echo<H>(H);

impl<H: HttpHandler> HttpHandler for Echo<H> {
    fn handle_request(&self, req: HttpRequest<'_>) -> io::Result<HttpResponse> {
        println!("{} request:\n{}", req.method, req);
        let method = req.method;
        let response = self.0.handle_request(req)?;
        println!("{} response:\n{}", method, response);
        Ok(response)
    }
}

const MENU: &str = "Choose your action:
1. POST
2. HEAD
3. PATCH with no Content-Length
4. PATCH with Content-Length
5. OPTIONS
6. DELETE
Q. Quit";

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let content = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;
    let config = SessionConfig::new(args.endpoint).with_protocol_version(args.protocol_version);
    let mut session = UploadSession::new(Echo(client), config);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!("{}", MENU);
        io::stdout().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        let outcome = match line.trim() {
            "1" => session
                .create_upload(content.len() as u64)
                .map(|location| format!("created {}", location)),
            "2" => session
                .query_offset()
                .map(|offset| format!("offset {} of {}", offset, session.total_length())),
            "3" | "4" => {
                let include_length = line.trim() == "4";
                let offset = session.offset();
                let start = (offset as usize).min(content.len());
                session
                    .upload_chunk(&content[start..], offset, include_length)
                    .map(|offset| format!("offset now {}, complete: {}", offset, session.is_complete()))
            }
            "5" => session.server_info().map(|info| format!("{:?}", info)),
            "6" => session.terminate().map(|_| String::from("terminated")),
            "q" | "Q" => break,
            _ => continue,
        };

        match outcome {
            Ok(message) => println!("{}\n", message),
            Err(err) => eprintln!("Error: {}\n", err),
        }
    }

    Ok(())
}
