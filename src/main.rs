use anyhow::{bail, Context};
use clap::Parser;
use dialoguer::{Confirm, Select};
use indicatif::{ProgressBar, ProgressStyle};
use leaf_id::{browse, cli, config, error, geocode, identify, location, scanner, store, views};
use leaf_id::capture::{CaptureSession, SaveFailureChoice};
use leaf_id::store::CollectionStore;
use leaf_id_common::{find_by_id, newest_first, CaptureState, COLLECTION_KEY};
use cli::{Cli, Commands};
use config::Config;
use error::LeafIdError;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "leaf_id=debug,leaf_id_common=debug"
    } else {
        "leaf_id=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().context("設定の読み込みに失敗しました")?;
    let data_dir = config.resolve_data_dir(cli.data_dir.as_deref())?;
    let collection = store::open_local(&data_dir);

    match cli.command {
        Commands::Scan { path, save, discard, lat, lng, no_location, variant } => {
            println!("🍃 leaf-id - 葉の識別\n");

            let images = scanner::scan_path(&path)?;
            if images.is_empty() {
                return Err(LeafIdError::NoImagesFound(path.display().to_string()).into());
            }
            println!("✔ {}枚の写真を検出\n", images.len());

            let api_key = store::load_api_key(collection.kv())?;
            let variant = variant.unwrap_or(config.prompt_variant);
            let identifier = identify::GeminiClient::new(&config)?.with_variant(variant);
            let geocoder = geocode::NominatimClient::new(&config)?;
            let location_timeout = Duration::from_secs(config.location_timeout_seconds);

            let mut failures = 0usize;
            for (i, image) in images.iter().enumerate() {
                println!("[{}/{}] {}", i + 1, images.len(), image.file_name);
                if let Some(date) = &image.date {
                    println!("  撮影日時: {}", date);
                }

                let mut session = CaptureSession::new(&identifier, &geocoder, &collection)
                    .with_location_timeout(location_timeout);
                session.begin(api_key.as_deref())?;

                let bar = spinner("識別中...");
                let card = session.identify_path(&image.path).await.map(views::render_card);
                bar.finish_and_clear();

                match card {
                    Ok(card) => println!("{}", card),
                    Err(e) => {
                        println!("✖ 識別に失敗しました: {}\n", e);
                        if matches!(session.state(), CaptureState::Error(_)) {
                            session.dismiss_error()?;
                        }
                        failures += 1;
                        continue;
                    }
                }

                let keep = if save {
                    true
                } else if discard {
                    false
                } else {
                    Confirm::new()
                        .with_prompt("Herbariumに保存しますか？")
                        .default(true)
                        .interact()
                        .map_err(LeafIdError::from)?
                };

                if !keep {
                    session.discard()?;
                    println!("- 破棄しました\n");
                    continue;
                }

                let source = location::LocationSource::from_args(lat, lng, no_location, image.path.clone());
                let bar = spinner("位置情報を取得中...");
                let mut saved = session.save(&source).await;
                bar.finish_and_clear();

                loop {
                    match saved {
                        Ok(outcome) => {
                            println!("{}\n", views::render_save_outcome(&outcome));
                            session.finish()?;
                            break;
                        }
                        Err(e) if e.is_storage_failure() => {
                            println!("✖ {} ({})", LeafIdError::StorageFull, e);
                            if save {
                                println!();
                                failures += 1;
                                break;
                            }

                            // 標本は保持されている。再試行か破棄を選ぶまで進まない
                            let labels: Vec<&str> = SaveFailureChoice::MENU.iter().map(|c| c.label()).collect();
                            let selection = Select::new()
                                .with_prompt("どうしますか？")
                                .items(&labels)
                                .default(0)
                                .interact()
                                .map_err(LeafIdError::from)?;

                            let bar = spinner("保存中...");
                            let resolved = session
                                .resolve_save_failure(SaveFailureChoice::MENU[selection], &source)
                                .await;
                            bar.finish_and_clear();

                            saved = match resolved {
                                Ok(Some(outcome)) => Ok(outcome),
                                Ok(None) => {
                                    println!("- 破棄しました\n");
                                    failures += 1;
                                    break;
                                }
                                Err(e) => Err(e),
                            };
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }

            if failures > 0 {
                bail!("{}件の処理に失敗しました", failures);
            }
            println!("✅ 完了");
        }

        Commands::Herbarium { json } => {
            let records = collection.load();
            if json {
                println!("{}", serde_json::to_string_pretty(&newest_first(&records))?);
            } else {
                println!("{}", views::render_herbarium(&records));
            }
        }

        Commands::Show { id } => {
            let records = collection.load();
            match find_by_id(&records, &id) {
                Some(record) => println!("{}", views::render_saved_card(record)),
                None => bail!("標本が見つかりません: {}", id),
            }
        }

        Commands::Arboretum => {
            println!("{}", views::render_arboretum(&collection.load()));
        }

        Commands::Browse => {
            let has_api_key = store::load_api_key(collection.kv())?.is_some();
            browse::run_browse(&collection, has_api_key)?;
        }

        Commands::Watch => {
            let mut events = collection.subscribe();
            let watcher = store::spawn_file_watcher(
                collection.kv().key_path(COLLECTION_KEY),
                store::DEFAULT_POLL_INTERVAL,
                collection.sender(),
            );

            println!("👀 コレクションを監視中: {} (Ctrl+C で終了)", data_dir.display());
            println!("  現在 {}件", collection.load().len());

            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Ok(event) => {
                            let now = chrono::Local::now().format("%H:%M:%S");
                            println!("[{}] {}: {}件", now, event.name(), collection.load().len());
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "Watcher lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            watcher.abort();
        }

        Commands::Config { set_api_key, clear_api_key, show, init } => {
            let kv = collection.kv();
            let show = show || (set_api_key.is_none() && !clear_api_key && !init);

            if init {
                config.save().context("設定ファイルの書き出しに失敗しました")?;
                println!("✔ 設定ファイルを書き出しました: {}", Config::config_path()?.display());
            }

            if let Some(key) = set_api_key {
                if store::save_api_key(kv, &key)? {
                    println!("✔ APIキーを設定しました");
                } else {
                    println!("空のAPIキーは保存されません");
                }
            }

            if clear_api_key {
                store::clear_api_key(kv)?;
                println!("✔ APIキーを削除しました");
            }

            if show {
                let env_key = std::env::var(config::API_KEY_ENV).ok().filter(|k| !k.trim().is_empty());
                let key_state = if env_key.is_some() {
                    "設定済み（環境変数）"
                } else if store::stored_api_key(kv)?.is_some() {
                    "設定済み"
                } else {
                    "未設定"
                };

                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!("  モデル: {}", config.model);
                println!("  エンドポイント: {}", config.endpoint());
                println!("  プロンプト形式: {}", config.prompt_variant);
                println!("  逆ジオコーディング: {}", config.geocode_base);
                println!(
                    "  タイムアウト: 識別 {}秒 / 地名 {}秒 / 位置 {}秒",
                    config.timeout_seconds, config.geocode_timeout_seconds, config.location_timeout_seconds
                );
                println!("  データ: {}", data_dir.display());
                println!("  APIキー: {}", key_state);
            }
        }
    }

    Ok(())
}
