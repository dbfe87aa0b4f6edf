use anyhow::{Context, Result};
use mimescraper::{
    enrich::{CompletionSettings, OpenAiNamer},
    pipeline,
    store::SupabaseStore,
    Config,
};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configuration ───────────────────────────────────────────
    let config = Config::from_env().context("loading configuration")?;
    info!(?config, "configuration loaded");

    // ─── 3) service handles ─────────────────────────────────────────
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;

    let namer = OpenAiNamer::new(client.clone(), config.openai_api_key.clone())
        .with_base_url(config.openai_base_url.clone())
        .with_settings(CompletionSettings::default().with_model(config.openai_model.clone()));

    let store = SupabaseStore::new(
        client.clone(),
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
        config.supabase_table.clone(),
    );

    // ─── 4) fetch → enrich → persist ────────────────────────────────
    let summary = pipeline::run(&client, &config.source_url, &namer, &store).await?;

    info!(
        scraped = summary.scraped,
        inserted = summary.inserted,
        failed = summary.failed.len(),
        failed_mimes = ?summary.failed,
        "all done"
    );
    Ok(())
}
