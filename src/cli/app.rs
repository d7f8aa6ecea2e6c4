//! Command runners

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};

use crate::application::capture::{CaptureConfig, CaptureUseCase, CaptureUseCaseError};
use crate::application::dispatch::{DispatchInput, DispatchUseCase};
use crate::application::ports::ConfigStore;
use crate::domain::classification::Verdict;
use crate::domain::config::AppConfig;
use crate::domain::error::{ConfigError, ErrorKind};
use crate::infrastructure::{CpalCaptureDevice, GeminiBackend, HttpPredictClient, XdgConfigStore};
use crate::server::{self, ServeOptions};

use super::args::{Cli, Commands, ConfigAction};
use super::config_cmd::handle_config_command;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Run the parsed CLI command
pub async fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Commands::Classify { text, server, json } => run_classify(text, server, json).await,
        Commands::Record {
            server,
            text,
            no_live_transcript,
            json,
        } => run_record(server, text, no_live_transcript, json).await,
        Commands::Serve {
            port,
            static_dir,
            cors_origin,
            api_key,
            model,
        } => run_serve(port, static_dir, cors_origin, api_key, model).await,
        Commands::Config { action } => run_config(action).await,
    }
}

/// Classify a line of text through the gateway
async fn run_classify(text: String, server: Option<String>, json: bool) -> ExitCode {
    let mut presenter = Presenter::new();

    let config = load_merged_config(AppConfig {
        server_url: server,
        ..Default::default()
    })
    .await;

    let dispatcher = DispatchUseCase::new(HttpPredictClient::new(config.server_url_or_default()));

    presenter.start_spinner("Classifying...");

    let input = DispatchInput {
        text: Some(text),
        audio: None,
    };

    match dispatcher.execute(input).await {
        Ok(verdict) => {
            presenter.stop_spinner();
            present_verdict(&presenter, &verdict, json)
        }
        Err(e) => {
            presenter.spinner_fail("Classification failed");
            presenter.error(&e.to_string());
            exit_for_kind(e.kind())
        }
    }
}

/// Record from the microphone, then classify the capture
async fn run_record(
    server: Option<String>,
    text: Option<String>,
    no_live_transcript: bool,
    json: bool,
) -> ExitCode {
    let mut presenter = Presenter::new();

    let cli_config = AppConfig {
        server_url: server,
        live_transcript: if no_live_transcript { Some(false) } else { None },
        ..Default::default()
    };
    let config = load_merged_config(cli_config).await;

    let device = Arc::new(CpalCaptureDevice::new());
    let transcriber = Arc::new(HttpPredictClient::new(config.server_url_or_default()));

    let capture_config = CaptureConfig {
        live_transcript: config.live_transcript_or_default(),
        min_capture_ms: config.min_capture_ms_or_default(),
        ..Default::default()
    };
    let capture = CaptureUseCase::new(device, Some(transcriber), capture_config);

    presenter.info("Press Enter to stop and classify, Ctrl-C to cancel.");

    if let Err(e) = capture.start().await {
        presenter.error(&e.to_string());
        if let Some(hint) = permission_hint(&e) {
            presenter.info(hint);
        }
        return exit_for_kind(e.kind());
    }

    presenter.start_spinner("Recording...");

    let transcript_rx = capture.transcript_feed().await;
    let level_rx = capture.level_feed();

    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(Duration::from_millis(100));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    // Enter stops and classifies; ctrl-c discards the capture
    let stopped = loop {
        tokio::select! {
            _ = stdin_lines.next_line() => break true,
            _ = &mut ctrl_c => break false,
            _ = ticker.tick() => {
                let level = *level_rx.borrow();
                let transcript = transcript_rx.as_ref().map(|rx| rx.borrow().clone());
                presenter.update_recording(capture.elapsed_ms(), level, transcript.as_deref());
            }
        }
    };

    if !stopped {
        presenter.stop_spinner();
        presenter.warn("Capture cancelled");
        if let Err(e) = capture.cancel().await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    presenter.update_spinner("Finalizing capture...");

    let output = match capture.stop().await {
        Ok(output) => output,
        Err(e) => {
            presenter.spinner_fail("Capture failed");
            presenter.error(&e.to_string());
            return exit_for_kind(e.kind());
        }
    };

    presenter.spinner_success(&format!(
        "Captured {:.1}s of audio ({})",
        output.audio.duration_ms() as f64 / 1000.0,
        output.audio.human_readable_size()
    ));

    if let Some(ref transcript) = output.provisional_transcript {
        presenter.info(&format!("Provisional transcript: {}", transcript));
    }

    presenter.start_spinner("Classifying...");

    let dispatcher = DispatchUseCase::new(HttpPredictClient::new(config.server_url_or_default()));
    let input = DispatchInput {
        text,
        audio: Some(output.audio),
    };

    match dispatcher.execute(input).await {
        Ok(verdict) => {
            presenter.stop_spinner();
            present_verdict(&presenter, &verdict, json)
        }
        Err(e) => {
            presenter.spinner_fail("Classification failed");
            presenter.error(&e.to_string());
            exit_for_kind(e.kind())
        }
    }
}

/// Run the inference gateway
async fn run_serve(
    port: Option<u16>,
    static_dir: Option<String>,
    cors_origin: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
) -> ExitCode {
    let presenter = Presenter::new();

    let cli_config = AppConfig {
        api_key,
        model,
        port,
        static_dir,
        cors_allow_origin: cors_origin,
        ..Default::default()
    };
    let config = load_merged_config(cli_config).await;

    let api_key = match config.api_key {
        Some(ref key) if !key.is_empty() => key.clone(),
        _ => {
            presenter.error(
                "Missing API key. Set GEMINI_API_KEY or run 'speech-guard config set api_key <key>'",
            );
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let backend = Arc::new(GeminiBackend::with_model(api_key, config.model_or_default()));

    let options = ServeOptions {
        port: config.port_or_default(),
        static_dir: PathBuf::from(config.static_dir_or_default()),
        cors_allow_origin: config.cors_allow_origin_or_default().to_string(),
    };

    match server::serve(options, backend.clone(), backend).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Handle the config subcommand
async fn run_config(action: ConfigAction) -> ExitCode {
    let presenter = Presenter::new();
    let store = XdgConfigStore::new();

    match handle_config_command(action, &store, &presenter).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&e.to_string());
            match e {
                ConfigError::ValidationError { .. } => ExitCode::from(EXIT_USAGE_ERROR),
                _ => ExitCode::from(EXIT_ERROR),
            }
        }
    }
}

fn present_verdict(presenter: &Presenter, verdict: &Verdict, json: bool) -> ExitCode {
    if json {
        match serde_json::to_string_pretty(verdict) {
            Ok(rendered) => presenter.output(&rendered),
            Err(e) => {
                presenter.error(&format!("Failed to render verdict: {}", e));
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        presenter.verdict(verdict);
    }
    ExitCode::from(EXIT_SUCCESS)
}

fn permission_hint(err: &CaptureUseCaseError) -> Option<&'static str> {
    match err {
        CaptureUseCaseError::Permission { kind, .. } => Some(kind.hint()),
        _ => None,
    }
}

fn exit_for_kind(kind: ErrorKind) -> ExitCode {
    match kind {
        ErrorKind::Validation => ExitCode::from(EXIT_USAGE_ERROR),
        _ => ExitCode::from(EXIT_ERROR),
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::new());

    // Build env config
    let env_config = AppConfig {
        api_key: env::var("GEMINI_API_KEY").ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}
