use anyhow::{Context, Result};
use clap::Parser;
use gym_label_relay::{cli, config, detector, flavor, scanner, server, storage, vision};
use cli::{Cli, Commands};
use config::{Config, FlavorConfig};
use flavor::Flavor;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// CLI引数でフロー設定を上書きする
fn flavor_settings(
    config: &Config,
    flavor: Flavor,
    preset: Option<String>,
    filter_file: Option<PathBuf>,
) -> FlavorConfig {
    let mut settings = config.flavor(flavor).clone();
    if let Some(preset) = preset {
        settings.preset = preset;
    }
    if filter_file.is_some() {
        settings.filter_file = filter_file;
    }
    settings
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("書き込み失敗: {}", path.display()))?;
    println!("✔ 結果を保存: {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("設定の読み込みに失敗")?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("不正なアドレス: {}:{}", host, port))?;

            let vision = vision::RekognitionClient::from_config(&config)?;
            let store = storage::LocalObjectStore::new(&config.storage_root, &config.bucket);
            let state = server::AppState::from_config(&config, Arc::new(vision), Arc::new(store))?;

            server::serve(addr, state).await?;
        }

        Commands::Detect { path, flavor, preset, filter_file, output } => {
            println!("🏋 gym-relay - ラベル検出\n");

            let settings = flavor_settings(&config, flavor, preset, filter_file);
            let filter = settings.build_filter()?;
            let vision = vision::RekognitionClient::from_config(&config)?;

            println!("[1/2] 画像をスキャン中...");
            let images = scanner::scan_path(&path)?;
            println!("✔ {}枚の画像を検出\n", images.len());

            if images.is_empty() {
                anyhow::bail!("画像が見つかりません: {}", path.display());
            }

            println!("[2/2] ラベル検出中... ({})", flavor);
            let reports = detector::detect_images(
                &vision,
                &images,
                settings.detect_params(),
                &filter,
                cli.verbose,
            )
            .await?;

            for report in &reports {
                println!("📸 {}", report.file_name);
                if report.detections.is_empty() {
                    println!("    (該当する器具なし)");
                }
                for detection in &report.detections {
                    println!("    - {}", detection);
                }
                if cli.verbose {
                    if let Some(all) = &report.all_labels {
                        println!("    全ラベル: {}", all.join(", "));
                    }
                }
            }

            if let Some(output) = output {
                write_json(&output, &reports)?;
            }

            println!("\n✅ 検出完了");
        }

        Commands::Filter { input, flavor, preset, filter_file, output } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("読み込み失敗: {}", input.display()))?;
            let labels = vision::parse_labels(&content)?;

            let settings = flavor_settings(&config, flavor, preset, filter_file);
            let filter = settings.build_filter()?;
            let result = filter.apply(&labels)?;

            if cli.verbose {
                println!("ラベル数: {} → 一致: {}", labels.len(), result.detections.len());
            }

            match output {
                Some(output) => write_json(&output, &result)?,
                None => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }

        Commands::Config { show, filters } => {
            if show || !filters {
                println!("設定:");
                println!("  エンドポイント: {}", config.vision_endpoint.as_deref().unwrap_or("未設定"));
                println!("  トークン: {}", config.masked_token());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  バケット: {}", config.bucket);
                println!("  ストレージ: {}", config.storage_root.display());
                println!("  待受: {}:{}", config.host, config.port);
                for flavor in [Flavor::Frame, Flavor::Upload] {
                    let settings = config.flavor(flavor);
                    println!(
                        "  [{}] MaxLabels={} MinConfidence={} preset={}",
                        flavor, settings.max_labels, settings.min_confidence, settings.preset
                    );
                }
            }

            if filters {
                for flavor in [Flavor::Frame, Flavor::Upload] {
                    let filter = config.flavor(flavor).build_filter()?;
                    println!("[{}]", flavor);
                    println!("{}", serde_json::to_string_pretty(&filter)?);
                }
            }
        }
    }

    Ok(())
}
