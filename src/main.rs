use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use roman_translator::api::GeminiClient;
use roman_translator::audio::{PlaybackEngine, SilentPlayer};
use roman_translator::config::{self, Config, Emotion, LANGUAGES};
use roman_translator::history::HistoryStore;
use roman_translator::logging;
use roman_translator::session::runtime::DEFAULT_DOWNLOAD_NAME;
use roman_translator::{Event, Runtime, Session, SessionState};

/// Gemini requests have no timeout of their own, this only bounds the wait
/// before the prompt comes back
const REQUEST_WAIT: Duration = Duration::from_secs(120);

const WRAP_WIDTH: usize = 72;

#[derive(Parser, Debug)]
#[command(name = "roman-translator", version, about = "Translate text and hear it spoken")]
struct Args {
    /// Source language code (e.g. en)
    #[arg(long)]
    from: Option<String>,

    /// Target language code (e.g. bn)
    #[arg(long)]
    to: Option<String>,

    /// Prebuilt Gemini voice
    #[arg(long)]
    voice: Option<String>,

    /// Start offline, using the built-in phrasebook only
    #[arg(long)]
    offline: bool,

    /// Config file (defaults to the per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let mut config = Config::load_from(&config_path)?;
    if let Some(from) = args.from {
        config.source_lang = from;
    }
    if let Some(to) = args.to {
        config.target_lang = to;
    }
    if let Some(voice) = args.voice {
        config.voice = voice;
    }
    config.offline |= args.offline;
    config.validate().context("invalid command line options")?;

    if config.gemini_api_key.is_empty() && !config.offline {
        tracing::warn!("no Gemini API key configured; set GEMINI_API_KEY or use --offline");
    }

    let client = Arc::new(GeminiClient::new(&config));
    let store = HistoryStore::in_dir(&config::app_dir());
    let history = store.load();
    tracing::info!(entries = history.len(), path = %store.path().display(), "history loaded");

    let session = Session::new(SessionState::from_config(&config, history));
    let mut runtime =
        Runtime::new(session, client.clone(), client, make_player()).with_history_store(store);

    print_banner(&runtime);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        runtime.drain();

        if !handle_line(&mut runtime, line.trim()) {
            break;
        }
        if !runtime.wait_idle(REQUEST_WAIT) {
            println!("(still waiting for Gemini, results will appear later)");
        }
        render(&runtime);
    }

    Ok(())
}

#[cfg(feature = "speaker")]
fn make_player() -> Box<dyn PlaybackEngine> {
    match roman_translator::audio::player::SpeakerPlayer::new() {
        Ok(player) => Box::new(player),
        Err(e) => {
            tracing::warn!("audio output unavailable, playing silently: {:#}", e);
            Box::new(SilentPlayer::new())
        }
    }
}

#[cfg(not(feature = "speaker"))]
fn make_player() -> Box<dyn PlaybackEngine> {
    Box::new(SilentPlayer::new())
}

/// Returns false when the user asked to quit
fn handle_line(runtime: &mut Runtime, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }
    let Some(command) = line.strip_prefix(':') else {
        runtime.dispatch(Event::SetInput(line.to_string()));
        runtime.translate();
        return true;
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name {
        "speak" => runtime.speak(),
        "stop" => runtime.dispatch(Event::StopPlayback),
        "swap" => runtime.dispatch(Event::SwapLanguages),
        "from" => set_language(runtime, arg, true),
        "to" => set_language(runtime, arg, false),
        "voice" => {
            runtime.dispatch(Event::SelectVoice(arg.to_string()));
            if !runtime.state().selected_voice.eq_ignore_ascii_case(arg) {
                let voices: Vec<_> = runtime
                    .session()
                    .available_voices()
                    .iter()
                    .map(|v| format!("{} ({})", v.name, v.description))
                    .collect();
                println!("voices: {}", voices.join(", "));
            }
        }
        "emotion" => match Emotion::parse(arg) {
            Some(emotion) => runtime.dispatch(Event::SelectEmotion(emotion)),
            None => {
                let names: Vec<_> = Emotion::ALL.iter().map(|e| e.to_string()).collect();
                println!("emotions: {}", names.join(", "));
            }
        },
        "news" => runtime.dispatch(Event::ToggleNewsMode),
        "online" => runtime.dispatch(Event::ConnectivityChanged { online: true }),
        "offline" => runtime.dispatch(Event::ConnectivityChanged { online: false }),
        "mic" => runtime.dispatch(Event::ToggleListening),
        "history" => print_history(runtime),
        "save" => {
            let path = if arg.is_empty() {
                PathBuf::from(DEFAULT_DOWNLOAD_NAME)
            } else {
                PathBuf::from(arg)
            };
            match runtime.save_download(&path) {
                Ok(()) => println!("saved {}", path.display()),
                Err(e) => println!("{:#}", e),
            }
        }
        "quit" | "q" | "exit" => return false,
        _ => print_help(),
    }
    true
}

fn set_language(runtime: &mut Runtime, code: &str, source: bool) {
    let event = if source {
        Event::SetSourceLanguage(code.to_string())
    } else {
        Event::SetTargetLanguage(code.to_string())
    };
    runtime.dispatch(event);
    if config::find_language(code).is_none() {
        let codes: Vec<_> = LANGUAGES
            .iter()
            .map(|l| format!("{} ({})", l.code, l.name))
            .collect();
        println!("languages: {}", codes.join(", "));
    }
}

fn render(runtime: &Runtime) {
    let state = runtime.state();
    if let Some(error) = state.error {
        println!("! {}", error);
    }
    if !state.translated_text.is_empty() {
        println!(
            "{}",
            textwrap::indent(&textwrap::fill(&state.translated_text, WRAP_WIDTH), "  ")
        );
    }
    if state.is_speaking() {
        println!("(speaking, :stop to interrupt)");
    }
}

fn print_banner(runtime: &Runtime) {
    let state = runtime.state();
    println!(
        "{} -> {} | voice {} | {} | {}",
        config::language_display_name(&state.source_lang),
        config::language_display_name(&state.target_lang),
        state.selected_voice,
        state.selected_emotion,
        if state.is_online { "online" } else { "offline" },
    );
    println!("Type text to translate, :help for commands.");
}

fn print_history(runtime: &Runtime) {
    let history = &runtime.state().history;
    if history.is_empty() {
        println!("(no history)");
        return;
    }
    for item in history.items() {
        let when = chrono::DateTime::from_timestamp_millis(item.timestamp)
            .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
            .unwrap_or_default();
        println!("{} [{}->{}] {} => {}", when, item.from, item.to, item.original, item.translated);
    }
}

fn print_help() {
    println!(
        "\
commands:
  <text>            translate text
  :speak            speak the translation (again to stop)
  :stop             stop playback
  :swap             swap languages and texts
  :from <code>      set source language
  :to <code>        set target language
  :voice <name>     choose a voice
  :emotion <name>   choose a speaking style
  :news             toggle news presenter mode
  :online/:offline  switch connectivity
  :history          show recent translations
  :save [path]      save the last audio as WAV
  :mic              start voice input
  :quit             exit"
    );
}
