mod cli;
mod underwrite;

use loan_underwriter::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
