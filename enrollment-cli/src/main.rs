//! Command line launcher for the enrollment service.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "enrollment")]
#[command(author, version, about = "Course and student enrollment service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display version information
    Version,
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long, env = "ENROLLMENT_HOST")]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long, env = "ENROLLMENT_PORT")]
        port: Option<u16>,
        /// Maximum number of students per course
        #[arg(long, env = "MAX_STUDENTS_PER_COURSE")]
        max_students: Option<usize>,
        /// Seconds a request may run before it fails with 500
        #[arg(long, env = "ENROLLMENT_REQUEST_TIMEOUT_SECS")]
        request_timeout: Option<u64>,
        /// Emit logs as JSON
        #[arg(long)]
        json_logs: bool,
    },
    /// List all registered routes
    Routes,
}

#[tokio::main]
async fn main() {
    enrollment::config::load_dotenv();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => print_version(),
        Some(Commands::Serve {
            host,
            port,
            max_students,
            request_timeout,
            json_logs,
        }) => {
            let config = commands::serve::ServeConfig {
                host,
                port,
                max_students,
                request_timeout_secs: request_timeout,
                json_logs,
            };
            if let Err(e) = commands::serve::execute(config).await {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
        Some(Commands::Routes) => commands::routes::execute(),
        None => {
            print_version();
            println!();
            println!("Run {} for usage information.", "enrollment --help".cyan());
        }
    }
}

fn print_version() {
    println!("enrollment {}", env!("CARGO_PKG_VERSION"));
}
