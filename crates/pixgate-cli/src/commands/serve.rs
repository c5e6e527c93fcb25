use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, ValueEnum};
use pixgate_gateway::{build_router, GatewayAppState, UploadService};
use pixgate_storage::{BlobStore, MemoryStore, S3Config, S3Store, SupabaseConfig, SupabaseStore};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Storage backend the gateway forwards uploads to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// Supabase Storage REST API
    Supabase,
    /// S3-compatible endpoint (RustFS, MinIO, AWS)
    S3,
    /// In-process map; contents are lost on exit
    Memory,
}

#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0:5000", env = "PIXGATE_ADDRESS")]
    pub address: String,

    /// Storage backend
    #[arg(long, value_enum, default_value = "supabase", env = "PIXGATE_BACKEND")]
    pub backend: StorageBackend,

    /// Storage endpoint URL (Supabase project URL or S3 endpoint)
    #[arg(long, default_value = "https://example.supabase.co", env = "SUPABASE_URL")]
    pub storage_url: String,

    /// Storage access key (Supabase API key)
    #[arg(long, default_value = "", env = "SUPABASE_KEY", hide_env_values = true)]
    pub storage_key: String,

    /// Target bucket
    #[arg(long, default_value = "game_reviews", env = "SUPABASE_BUCKET")]
    pub bucket: String,

    /// S3 region
    #[arg(long, default_value = "us-east-1", env = "PIXGATE_S3_REGION")]
    pub s3_region: String,

    /// S3 access key id
    #[arg(long, default_value = "", env = "PIXGATE_S3_ACCESS_KEY")]
    pub s3_access_key: String,

    /// S3 secret access key
    #[arg(long, default_value = "", env = "PIXGATE_S3_SECRET_KEY", hide_env_values = true)]
    pub s3_secret_key: String,

    /// Base URL serving objects publicly (S3 and memory backends)
    #[arg(long, env = "PIXGATE_PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Timeout for each storage request, in seconds
    #[arg(long, default_value_t = 30, env = "PIXGATE_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    /// Largest accepted request body, in bytes
    #[arg(long, default_value_t = 16 * 1024 * 1024, env = "PIXGATE_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        let store = self.build_store()?;
        info!(
            "Storage backend: {} (bucket: {})",
            store.backend_name(),
            self.bucket
        );

        let upload_service = Arc::new(UploadService::new(store));
        let app = build_router(
            Arc::new(GatewayAppState::new(upload_service)),
            self.max_upload_bytes,
        );

        let listener = TcpListener::bind(&self.address)
            .await
            .with_context(|| format!("Failed to bind {}", self.address))?;
        info!("Upload gateway listening on {}", self.address);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Upload gateway exited");
        Ok(())
    }

    pub fn build_store(&self) -> anyhow::Result<Arc<dyn BlobStore>> {
        let store: Arc<dyn BlobStore> = match self.backend {
            StorageBackend::Supabase => {
                if self.storage_key.is_empty() {
                    warn!("No storage key configured; Supabase will only accept public buckets");
                }
                let config =
                    SupabaseConfig::new(&self.storage_url, &self.storage_key, &self.bucket)
                        .with_timeout(Duration::from_secs(self.request_timeout_secs));
                debug!("Supabase endpoint: {}", config.url);
                Arc::new(SupabaseStore::new(config)?)
            }
            StorageBackend::S3 => Arc::new(S3Store::new(S3Config {
                endpoint: self.storage_url.clone(),
                region: self.s3_region.clone(),
                access_key: self.s3_access_key.clone(),
                secret_key: self.s3_secret_key.clone(),
                bucket: self.bucket.clone(),
                public_base_url: self.public_base_url.clone(),
            })?),
            StorageBackend::Memory => {
                warn!("Using in-memory storage; uploads are lost on exit");
                let base_url = self
                    .public_base_url
                    .clone()
                    .unwrap_or_else(|| format!("memory://{}", self.bucket));
                Arc::new(MemoryStore::new(base_url))
            }
        };
        Ok(store)
    }
}

/// Resolves on Ctrl+C (and SIGTERM on unix)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}
