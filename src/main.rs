use chrono::Local;
use clap::Parser;
use serde_json::json;
use serial_line_reader::config::ConfigLoader;
use serial_line_reader::logging::init_logging;
use serial_line_reader::port::available_port_names;
use serial_line_reader::{SerialLineReader, SystemBackend};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "serial-lines",
    version,
    about = "Print CR/LF-terminated lines received on a serial port and forward stdin lines to it.",
    long_about = "Opens one serial port with 8-N-1 framing and DTR/RTS asserted, prints every completed line it receives, and writes each line typed on stdin to the port terminated with CR LF. Stops on Ctrl+C."
)]
struct Args {
    /// Port number (3 for COM3), device path, or an alias from the config file.
    #[arg(required_unless_present = "list")]
    port: Option<String>,

    /// Baud rate. Defaults to `serial.default_baud` from the config.
    #[arg(short, long)]
    baud: Option<u32>,

    /// Explicit configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prefix each line with the local time it was printed.
    #[arg(short, long)]
    timestamps: bool,

    /// Print each line as a JSON object.
    #[arg(long, conflicts_with = "timestamps")]
    json: bool,

    /// List available serial ports and exit.
    #[arg(short, long)]
    list: bool,

    /// How often to poll the line queue, in milliseconds.
    #[arg(long, default_value_t = 20)]
    poll_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let loader = match &args.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(path) = &loader.config_path {
        eprintln!("Using configuration {}", path.display());
    }
    let config = loader.into_config();
    init_logging(&config.logging)?;

    if args.list {
        for name in available_port_names()? {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(port_arg) = args.port.as_deref() else {
        return Err("a port is required unless --list is given".into());
    };
    let port = config.serial.resolve_port(port_arg);
    let baud = args.baud.unwrap_or(config.serial.default_baud);

    let mut reader = SerialLineReader::with_backend(SystemBackend, config.serial.reader_settings());
    reader.try_open(port, baud)?;
    let device = reader.port_name().unwrap_or_default().to_string();

    let mut ticker = tokio::time::interval(Duration::from_millis(args.poll_ms.max(1)));
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for line in reader.drain_lines() {
                    print_line(&args, &device, &line);
                }
            }
            next = stdin.next_line(), if stdin_open => match next {
                Ok(Some(text)) => {
                    if !send_line(&reader, &text) {
                        warn!("Could not send {:?} to {}", text, device);
                    }
                }
                Ok(None) => {
                    info!("stdin closed; still listening on {}", device);
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
            _ = &mut shutdown => break,
        }
    }

    close_reader(&mut reader);
    for line in reader.drain_lines() {
        print_line(&args, &device, &line);
    }

    let stats = reader.stats();
    info!(
        bytes_read = stats.bytes_read,
        bytes_written = stats.bytes_written,
        lines = stats.lines_received,
        read_errors = stats.read_errors,
        "Session finished"
    );
    Ok(())
}

// Serial writes block for up to the port timeout and close joins the reader
// thread; both run with the executor's other tasks moved off this worker.
fn send_line(reader: &SerialLineReader, text: &str) -> bool {
    tokio::task::block_in_place(|| reader.write_line(text))
}

fn close_reader(reader: &mut SerialLineReader) {
    tokio::task::block_in_place(|| reader.close());
}

fn print_line(args: &Args, device: &str, line: &str) {
    if args.json {
        let record = json!({
            "port": device,
            "line": line,
            "timestamp": Local::now().to_rfc3339(),
        });
        println!("{record}");
    } else if args.timestamps {
        println!("{} {}", Local::now().format("%H:%M:%S%.3f"), line);
    } else {
        println!("{line}");
    }
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Signal received, closing port");
}
