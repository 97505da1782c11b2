mod cli;
mod infra;
mod reply;
mod routes;
mod server;

use burnban::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
