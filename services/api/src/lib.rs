mod cli;
mod estimate;
mod infra;
mod routes;
mod server;

use admission_engine::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
