use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::session::{SessionSettings, SessionTexts};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Chat in the terminal (default)
    Chat(ChatArgs),
    /// Serve the demo chat endpoint
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ChatArgs {
    /// Where replies come from
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Chat endpoint URL for the http backend
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Show the response-time status line
    #[arg(long)]
    pub latency: bool,

    /// Reply timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,
}

/// Reply strategy of the terminal client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// POST to a chat endpoint
    Http,
    /// Local canned replies after a short delay
    Simulated,
}

impl Backend {
    fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Simulated => "simulated",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub indicator: IndicatorConfig,
    pub texts: TextsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub backend: Backend,
    pub endpoint: String,
    pub request_timeout_ms: u64,
    pub show_latency: bool,
    pub simulated_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndicatorConfig {
    pub tick_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TextsConfig {
    pub welcome: String,
    pub fallback_reply: String,
    pub apology: String,
}

impl AppConfig {
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::load_from_cli(&cli)
    }

    /// Build the layered configuration.
    ///
    /// Priority: CLI flag > `CHAT_` env var > `--config` file > `./config.*` > defaults.
    pub fn load_from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let texts = SessionTexts::default();

        // 1. Defaults
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("client.backend", "http")?
            .set_default("client.endpoint", crate::reply::http::DEFAULT_ENDPOINT)?
            .set_default("client.request_timeout_ms", 30_000)?
            .set_default("client.show_latency", false)?
            .set_default("client.simulated_delay_ms", 500)?
            .set_default("indicator.tick_ms", 500)?
            .set_default("texts.welcome", texts.welcome)?
            .set_default("texts.fallback_reply", texts.fallback_reply)?
            .set_default("texts.apology", texts.apology)?;

        // 2. ./config.yaml (or any supported extension), if present
        builder = builder.add_source(File::with_name("config").required(false));

        // 3. Explicit config file
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // 4. Environment, e.g. CHAT_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("CHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 5. CLI overrides
        match &cli.command {
            Some(Command::Chat(args)) => {
                if let Some(backend) = args.backend {
                    builder = builder.set_override("client.backend", backend.as_str())?;
                }
                if let Some(endpoint) = &args.endpoint {
                    builder = builder.set_override("client.endpoint", endpoint.as_str())?;
                }
                if args.latency {
                    builder = builder.set_override("client.show_latency", true)?;
                }
                if let Some(ms) = args.timeout_ms {
                    builder = builder.set_override("client.request_timeout_ms", ms)?;
                }
            }
            Some(Command::Serve(args)) => {
                if let Some(port) = args.port {
                    builder = builder.set_override("server.port", u64::from(port))?;
                }
                if let Some(host) = &args.host {
                    builder = builder.set_override("server.host", host.as_str())?;
                }
            }
            None => {}
        }

        let loaded: Self = builder.build()?.try_deserialize()?;
        if loaded.indicator.tick_ms == 0 {
            return Err(config::ConfigError::Message(
                "indicator.tick_ms must be greater than zero".to_string(),
            ));
        }
        Ok(loaded)
    }

    /// Controller settings for the terminal client.
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            texts: SessionTexts {
                welcome: self.texts.welcome.clone(),
                fallback_reply: self.texts.fallback_reply.clone(),
                apology: self.texts.apology.clone(),
            },
            request_timeout: Duration::from_millis(self.client.request_timeout_ms),
            typing_tick: Duration::from_millis(self.indicator.tick_ms),
            track_latency: self.client.show_latency,
        }
    }

    #[must_use]
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.client.simulated_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_flags_parse() {
        let cli = Cli::try_parse_from([
            "chat-widget",
            "chat",
            "--backend",
            "simulated",
            "--latency",
        ])
        .unwrap();
        let Some(Command::Chat(args)) = cli.command else {
            panic!("expected chat subcommand");
        };
        assert_eq!(args.backend, Some(Backend::Simulated));
        assert!(args.latency);
    }

    #[test]
    fn test_subcommand_is_optional() {
        let cli = Cli::try_parse_from(["chat-widget"]).unwrap();
        assert!(cli.command.is_none());
    }
}
