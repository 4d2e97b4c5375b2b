//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::say::run_say;
use crate::core::config::{Config, ConfigError, ENDPOINT_ENV_VAR};
use crate::ui::chat_loop::{run_chat, ChatSettings};
use crate::utils::logging::{init_tracing, TraceTarget};

#[derive(Parser)]
#[command(name = "deskchat", version)]
#[command(about = "A terminal chat client for the service desk's real-time chat endpoint")]
#[command(
    long_about = "Deskchat is a full-screen terminal chat client that talks to the service desk \
over a WebSocket. Each message you send is answered by exactly one reply.\n\n\
Environment Variables:\n\
  DESKCHAT_ENDPOINT  WebSocket URL of the chat service (overridden by --endpoint)\n\
  RUST_LOG           Diagnostic filter for --trace-file output (default deskchat=info)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a new line\n\
  Up/Down/PgUp/PgDn Scroll through the conversation\n\
  Ctrl+End          Jump back to the latest message\n\
  Ctrl+C / Ctrl+D   Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// WebSocket endpoint of the chat service
    #[arg(short = 'e', long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Write diagnostic output to the specified file
    #[arg(long, global = true, value_name = "FILE")]
    pub trace_file: Option<PathBuf>,

    /// Message sent automatically once the connection opens
    #[arg(long, global = true, value_name = "TEXT")]
    pub probe: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message, print the reply, and exit
    Say {
        /// Message to send (multiple words are joined with spaces)
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command {
        None | Some(Commands::Chat) => {
            let config = Config::load()?;
            let endpoint = resolve_endpoint(&args, &config)?;

            let trace_target = match args.trace_file.or_else(|| config.trace_file.clone()) {
                Some(path) => TraceTarget::File(path),
                None => TraceTarget::Off,
            };
            init_tracing(trace_target)?;

            run_chat(ChatSettings {
                endpoint,
                probe_message: args.probe.or_else(|| config.probe_message.clone()),
                log_file: args.log,
                show_timestamps: config.show_timestamps(),
            })
            .await
        }
        Some(Commands::Say { ref prompt }) => {
            let config = Config::load()?;
            let endpoint = resolve_endpoint(&args, &config)?;
            init_tracing(TraceTarget::Stderr)?;

            run_say(prompt.join(" "), endpoint, args.log.clone()).await
        }
        Some(Commands::Set { key, value }) => {
            let mut config = Config::load()?;
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            match config.set_value(&key, &value.join(" ")) {
                Ok(message) => {
                    config.save()?;
                    println!("✅ {message}");
                    Ok(())
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Unset { key }) => {
            let mut config = Config::load()?;
            match config.unset_value(&key) {
                Ok(message) => {
                    config.save()?;
                    println!("✅ {message}");
                    Ok(())
                }
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Config) => {
            let config = Config::load()?;
            config.print_all();
            println!();
            println!("Config file: {}", Config::get_config_path()?.display());
            Ok(())
        }
    }
}

fn resolve_endpoint(args: &Args, config: &Config) -> Result<String, ConfigError> {
    let env_endpoint = std::env::var(ENDPOINT_ENV_VAR).ok();
    config.resolve_endpoint(args.endpoint.as_deref(), env_endpoint.as_deref())
}

#[cfg(test)]
mod tests;
