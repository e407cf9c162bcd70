use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use expense_tracker::repositories::{
    ExpenseRepository, InMemoryExpenseRepository, InMemoryUserRepository,
    PostgresExpenseRepository, PostgresUserRepository, UserRepository,
};
use expense_tracker::services::{
    AuthService, AuthServiceImpl, ExpenseService, ExpenseServiceImpl, TokenService,
};
use expense_tracker::{AppState, Config, build_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    let (user_repository, expense_repository): (
        Arc<dyn UserRepository>,
        Arc<dyn ExpenseRepository>,
    ) = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .acquire_timeout(config.request_timeout)
                .connect(database_url)
                .await?;
            log::info!("connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;
            log::info!("migrations completed");

            (
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresExpenseRepository::new(pool)),
            )
        }
        None => {
            log::warn!("DATABASE_URL is not set; data is kept in memory and lost on exit");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryExpenseRepository::new()),
            )
        }
    };

    let token_service = Arc::new(TokenService::new(
        &config.jwt_secret,
        config.token_lifetime,
    ));
    let auth_service: Arc<dyn AuthService> =
        Arc::new(AuthServiceImpl::new(user_repository, token_service));
    let expense_service: Arc<dyn ExpenseService> =
        Arc::new(ExpenseServiceImpl::new(expense_repository));

    let app = build_router(
        AppState {
            auth_service,
            expense_service,
        },
        config.request_timeout,
    );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("server running on http://{}", addr);
    log::info!("API docs at http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
