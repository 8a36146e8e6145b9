use crate::underwrite::{run_underwrite, UnderwriteArgs};
use clap::Parser;
use loan_underwriter::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "loan-underwriter",
    about = "Underwrite a loan application against a lending policy using a remote language model",
    version
)]
struct Cli {
    #[command(flatten)]
    args: UnderwriteArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    run_underwrite(cli.args).await
}
