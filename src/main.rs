use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match devflow_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("devflow: {}", e);
            ExitCode::FAILURE
        }
    }
}
