use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rajesh::daemon::build_provider;
use rajesh::session::{QuoteGateway, Transcript};
use rajesh::voice::{AudioCapture, AudioPlayback, ConsoleSpeaker, TextToSpeech, rms};
use rajesh::{Config, Daemon};

/// Rajesh - voice assistant for Indian stock quotes
#[derive(Parser)]
#[command(name = "rajesh", version, about)]
struct Cli {
    /// Port for the quote API (overrides RAJESH_PORT and the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice features (for headless servers without audio hardware)
    #[arg(long, env = "RAJESH_DISABLE_VOICE")]
    disable_voice: bool,

    /// Type utterances on stdin and print replies instead of using audio
    #[arg(long)]
    console: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the quote API only
    Serve,
    /// Fetch and print a quote
    Quote {
        /// Exchange-suffixed symbol (e.g. TCS.NS)
        symbol: String,
    },
    /// Show which symbol a phrase resolves to
    Resolve {
        /// Spoken-style text (e.g. "price of infosys")
        text: Vec<String>,
    },
    /// Search for companies by name
    Search {
        /// Search text
        query: Vec<String>,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Namaste! Rajesh can hear you and speak back.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,rajesh=info",
        1 => "info,rajesh=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load_with_options(cli.disable_voice)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Serve => Ok(Daemon::new(config).serve().await?),
            Command::Quote { symbol } => {
                quote(&config, &symbol).await;
                Ok(())
            }
            Command::Resolve { text } => {
                resolve(&config, &text.join(" "));
                Ok(())
            }
            Command::Search { query } => search(&config, &query.join(" ")).await,
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestTts { text } => test_tts(&config, &text).await,
        };
    }

    tracing::info!(
        port = config.server.port,
        voice = config.voice.enabled,
        console = cli.console,
        locale = %config.voice.locale,
        "starting rajesh"
    );

    Daemon::new(config).run(cli.console).await?;
    Ok(())
}

/// Fetch and announce a symbol on the console; a failure ends in the apology
async fn quote(config: &Config, symbol: &str) {
    let gateway = QuoteGateway::new(
        build_provider(config),
        Arc::new(ConsoleSpeaker),
        config.voice.locale.clone(),
    );
    let mut transcript = Transcript::default();

    // the gateway has already printed the summary or the apology
    if let Some(quote) = gateway.fetch_and_announce(symbol.trim(), &mut transcript).await {
        println!();
        println!("{}", quote.card());
    }
}

/// Print the symbol a phrase resolves to
fn resolve(config: &Config, text: &str) {
    match config.resolver().resolve(text) {
        Some(symbol) => println!("{symbol}"),
        None => println!("No symbol recognized in \"{text}\""),
    }
}

/// Print search results
async fn search(config: &Config, query: &str) -> anyhow::Result<()> {
    let provider = build_provider(config);
    let items = provider.search(query.trim()).await?;

    if items.is_empty() {
        println!("No results for \"{query}\"");
        return Ok(());
    }

    for item in items {
        let name = item
            .shortname
            .as_deref()
            .or(item.longname.as_deref())
            .unwrap_or("-");
        println!(
            "{:<16} {:<40} {}",
            item.symbol.as_deref().unwrap_or("-"),
            name,
            item.exch.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Test microphone input by printing a level meter
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone to see audio levels.\n");

    let mut capture = AudioCapture::open()?;
    capture.start()?;

    let start = std::time::Instant::now();
    let mut max_level: f32 = 0.0;

    while start.elapsed() < Duration::from_secs(duration) {
        tokio::time::sleep(Duration::from_millis(100)).await;

        let level = rms(&capture.take_buffer());
        max_level = max_level.max(level);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bars = ((level * 200.0) as usize).min(50);
        print!("\r[{:<50}] {level:.4}", "=".repeat(bars));
        std::io::Write::flush(&mut std::io::stdout())?;
    }

    capture.stop();

    println!("\n\nMax level: {max_level:.4}");
    if max_level < 0.01 {
        println!("Warning: very low audio levels. Check your microphone.");
    } else {
        println!("Microphone is working!");
    }

    Ok(())
}

/// Test TTS by synthesizing and playing a phrase
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    let voice = &config.voice;
    let tts = if let Some(key) = &config.api_keys.openai {
        TextToSpeech::openai(
            key.clone(),
            voice.tts_model.clone(),
            voice.tts_voice.clone(),
            voice.tts_speed,
        )?
    } else if let Some(key) = &config.api_keys.elevenlabs {
        TextToSpeech::elevenlabs(key.clone(), voice.tts_voice.clone())?
    } else {
        anyhow::bail!("set OPENAI_API_KEY or ELEVENLABS_API_KEY to test TTS");
    };

    println!("Synthesizing with {:?}: \"{text}\"", tts.backend());
    let mp3 = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3.len());

    println!("Playing audio...");
    let playback = AudioPlayback::open()?;
    tokio::task::spawn_blocking(move || playback.play_mp3(&mp3)).await??;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}
