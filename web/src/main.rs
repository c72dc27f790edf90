//! Service entry point.

use critique_auth::{ConsoleEmailProvider, EmailProvider, SmtpEmailProvider, TokenSigner};
use critique_postgres::{PgCatalogRepository, PgPool, PgReviewRepository, PgUserRepository};
use critique_web::{AppState, Config, EmailMode, router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let pool = critique_postgres::connect(&config.database_url).await?;
    critique_postgres::migrate(&pool).await?;
    tracing::info!(database = %config.database_url, "database ready");

    let signer = TokenSigner::new(config.jwt_secret.as_bytes(), config.token_ttl);

    match config.email_mode.clone() {
        EmailMode::Console => {
            serve(&config, pool, signer, ConsoleEmailProvider::new()).await
        }
        EmailMode::Smtp {
            server,
            port,
            username,
            password,
        } => {
            let provider = SmtpEmailProvider::new(
                server,
                port,
                username,
                password,
                config.from_email.clone(),
                config.from_name.clone(),
            );
            serve(&config, pool, signer, provider).await
        }
    }
}

async fn serve<E>(
    config: &Config,
    pool: PgPool,
    signer: TokenSigner,
    email: E,
) -> anyhow::Result<()>
where
    E: EmailProvider + Clone + 'static,
{
    let state = AppState::new(
        PgCatalogRepository::new(pool.clone()),
        PgReviewRepository::new(pool.clone()),
        PgUserRepository::new(pool),
        email,
        signer,
        config.code_ttl,
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
