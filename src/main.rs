use anyhow::Context;
use clap::{Parser, Subcommand};
use signup::api::{create_router, AppState};
use signup::config::Config;
use signup::registration::{
    backend, LocalFilePicker, LocalStoragePermission, LogNotifier, RegistrationForm,
    RegistrationSession,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

#[derive(Parser, Debug)]
#[clap(name = "signup", about = "Account registration against Firebase")]
struct Args {
    /// Path to the TOML config (defaults to ./config.toml when present)
    #[clap(long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the registration HTTP API
    Serve {
        #[clap(long)]
        listen: Option<String>,
    },
    /// Submit one registration from the command line
    Register {
        #[clap(long, default_value = "")]
        username: String,
        #[clap(long)]
        email: String,
        #[clap(long, default_value = "")]
        password: String,
        #[clap(long, default_value = "")]
        dob: String,
        #[clap(long, default_value = "")]
        gender: String,
        /// Profile image to upload after the account is created
        #[clap(long)]
        image: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("signup=info")),
        )
        .init();

    let args = Args::parse();
    let (config_path, required) = match args.config {
        Some(path) => (path, true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };
    let mut cfg = Config::load(&config_path, required)?;

    match args.command {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                cfg.listen = listen;
            }
            serve(cfg).await
        }
        Command::Register {
            username,
            email,
            password,
            dob,
            gender,
            image,
        } => {
            let form = RegistrationForm::new(username, email, password, dob, gender);
            register_once(cfg, form, image).await
        }
    }
}

async fn serve(cfg: Config) -> anyhow::Result<()> {
    let addr = cfg.listen_addr()?;
    let registrar = backend::build(cfg.backend, &cfg.firebase)
        .await
        .context("set up registration backend")?;

    let app = create_router(AppState {
        registrar,
        backend: cfg.backend,
    });

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    info!("Registration API listening on {} ({} backend)", addr, cfg.backend);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn register_once(
    cfg: Config,
    form: RegistrationForm,
    image: Option<PathBuf>,
) -> anyhow::Result<()> {
    let registrar = backend::build(cfg.backend, &cfg.firebase)
        .await
        .context("set up registration backend")?;

    let wants_image = image.is_some();
    let permissions = LocalStoragePermission::new(&cfg.storage_root);
    let mut session = RegistrationSession::open(
        registrar,
        &permissions,
        Arc::new(LocalFilePicker::new(image)),
        Arc::new(LogNotifier),
    )
    .await;

    if wants_image && !session.select_image().await {
        info!("Continuing without a profile image");
    }

    let registered = session.submit(form).await?;
    info!("Registered user {} (image: {:?})", registered.user_id, registered.image);
    Ok(())
}
