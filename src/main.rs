//! 命令行入口：翻译一个HTML文件

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::Level;

use page_translator::env::{core::LogLevel, EnvVar};
use page_translator::html::serialize_document;
use page_translator::translation::{
    ConfigManager, PageSession, PassMode, TranslationConfig, TranslationResult,
};

/// Incrementally translate the visible text of an HTML document
#[derive(Parser, Debug)]
#[command(name = "page-translator")]
#[command(version)]
#[command(about = "Translate the visible text of an HTML document")]
struct Cli {
    /// Input HTML file ("-" reads from stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Target language code (e.g. 'en', 'fr', 'zh-CN')
    #[arg(short = 't', long = "target-lang")]
    target_lang: Option<String>,

    /// Write the translated document to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Translation service endpoint
    #[arg(long)]
    api_url: Option<String>,

    /// Translate whole display elements instead of individual text nodes
    #[arg(long)]
    bulk: bool,

    /// HTML fragment appended to <body> after load (repeatable)
    #[arg(long = "insert-html", value_name = "HTML")]
    insert_html: Vec<String>,

    /// Document charset
    #[arg(long, default_value = "utf-8")]
    encoding: String,

    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        match LogLevel::get().as_deref() {
            Ok("trace") => Level::TRACE,
            Ok("debug") => Level::DEBUG,
            Ok("warn") => Level::WARN,
            Ok("error") => Level::ERROR,
            _ => Level::INFO,
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> TranslationResult<TranslationConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = ConfigManager::from_file(path)?.into_config();
            config.apply_env_overrides();
            config
        }
        None => ConfigManager::new()?.into_config(),
    };

    if let Some(lang) = &cli.target_lang {
        config.target_lang = lang.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::Read::read_to_end(&mut io::stdin(), &mut buf)?;
        Ok(buf)
    } else {
        fs::read(path)
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli)?;
    let source = read_input(&cli.input)?;

    let mode = if cli.bulk {
        PassMode::Bulk
    } else {
        PassMode::Incremental
    };
    let session = PageSession::from_config(source, &cli.encoding, config)?.with_mode(mode);

    // 命令行中的目标语言视为用户的选择
    let mut page = match &cli.target_lang {
        Some(lang) => session.change_language(lang).await?,
        None => session.load().await?,
    };
    for fragment in &cli.insert_html {
        let report = page.insert_html(fragment).await;
        tracing::debug!("插入片段翻译了 {} 个单元", report.units());
    }

    let cache = session.client().cache().stats();
    let client = session.client().stats();
    tracing::info!(
        "完成: 远程调用 {} 次, 失败 {} 次, 缓存命中率 {:.1}%",
        client.remote_calls,
        client.failures,
        cache.hit_rate() * 100.0
    );

    let html = serialize_document(page.document.dom())?;
    match &cli.output {
        Some(path) => fs::write(path, html)?,
        None => io::stdout().write_all(&html)?,
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
