use secret_santa_backend::error::AppError;
use secret_santa_backend::run_server;
use secret_santa_backend::telemetry::setup_telemetry;
use secret_santa_config::get_config;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    setup_telemetry();

    let config = get_config()?;
    run_server(config).await
}
