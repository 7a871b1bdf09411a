mod cli;
mod console;
mod infra;
mod routes;
mod server;

use union_portal::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
