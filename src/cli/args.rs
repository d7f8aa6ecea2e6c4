//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

/// SpeechGuard - hate speech classification for text and live audio
#[derive(Parser, Debug)]
#[command(name = "speech-guard")]
#[command(version)]
#[command(about = "Classify text or microphone audio for hate speech using Google Gemini")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a line of text
    Classify {
        /// Text to classify
        text: String,

        /// Gateway URL to send the request to
        #[arg(long, value_name = "URL")]
        server: Option<String>,

        /// Print the raw JSON verdict instead of the formatted report
        #[arg(long)]
        json: bool,
    },

    /// Record from the microphone and classify the capture
    Record {
        /// Gateway URL to send the request to
        #[arg(long, value_name = "URL")]
        server: Option<String>,

        /// Extra text sent along with the audio
        #[arg(short = 't', long, value_name = "TEXT")]
        text: Option<String>,

        /// Disable the provisional transcript while recording
        #[arg(long)]
        no_live_transcript: bool,

        /// Print the raw JSON verdict instead of the formatted report
        #[arg(long)]
        json: bool,
    },

    /// Run the inference gateway
    Serve {
        /// Port to listen on
        #[arg(short = 'p', long, value_name = "PORT")]
        port: Option<u16>,

        /// Directory of static demo assets
        #[arg(long, value_name = "DIR")]
        static_dir: Option<String>,

        /// Allowed CORS origin ("*" for any)
        #[arg(long, value_name = "ORIGIN")]
        cors_origin: Option<String>,

        /// Gemini API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Gemini model to use
        #[arg(short = 'm', long, value_name = "MODEL")]
        model: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "model",
    "server_url",
    "port",
    "static_dir",
    "cors_allow_origin",
    "live_transcript",
    "min_capture_ms",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_classify() {
        let cli = Cli::parse_from(["speech-guard", "classify", "hello there"]);
        if let Commands::Classify { text, server, json } = cli.command {
            assert_eq!(text, "hello there");
            assert!(server.is_none());
            assert!(!json);
        } else {
            panic!("Expected Classify command");
        }
    }

    #[test]
    fn cli_parses_classify_with_server() {
        let cli = Cli::parse_from([
            "speech-guard",
            "classify",
            "hello",
            "--server",
            "http://localhost:9000",
            "--json",
        ]);
        if let Commands::Classify { server, json, .. } = cli.command {
            assert_eq!(server.as_deref(), Some("http://localhost:9000"));
            assert!(json);
        } else {
            panic!("Expected Classify command");
        }
    }

    #[test]
    fn cli_parses_record_flags() {
        let cli = Cli::parse_from([
            "speech-guard",
            "record",
            "--no-live-transcript",
            "-t",
            "context words",
        ]);
        if let Commands::Record {
            text,
            no_live_transcript,
            ..
        } = cli.command
        {
            assert_eq!(text.as_deref(), Some("context words"));
            assert!(no_live_transcript);
        } else {
            panic!("Expected Record command");
        }
    }

    #[test]
    fn cli_parses_serve() {
        let cli = Cli::parse_from(["speech-guard", "serve", "-p", "9090", "-m", "gemini-2.5-pro"]);
        if let Commands::Serve { port, model, .. } = cli.command {
            assert_eq!(port, Some(9090));
            assert_eq!(model.as_deref(), Some("gemini-2.5-pro"));
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::parse_from(["speech-guard", "config", "init"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init
            }
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["speech-guard", "config", "set", "port", "9090"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "port");
            assert_eq!(value, "9090");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("api_key"));
        assert!(is_valid_config_key("min_capture_ms"));
        assert!(is_valid_config_key("cors_allow_origin"));
        assert!(!is_valid_config_key("invalid_key"));
    }

    #[test]
    fn verify_cli() {
        // Verify the CLI definition is valid
        Cli::command().debug_assert();
    }
}
