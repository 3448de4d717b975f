use std::env;
use std::process::ExitCode;

use rsourcequery::query;

#[tokio::main]
async fn main() -> ExitCode {
    let Some(host) = env::args().nth(1) else {
        eprintln!("usage: rsourcequery <host:port>");
        return ExitCode::FAILURE;
    };

    match query(host.as_str(), None).await {
        Ok(info) => {
            println!("{info:#?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{host}: {e}");
            ExitCode::FAILURE
        }
    }
}
