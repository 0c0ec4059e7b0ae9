#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use flexi_logger::Logger;
    use log::info;
    use review_schedule::{Workspace, http_api};

    let _logger = Logger::try_with_env_or_str("info")?
        .log_to_stderr()
        .start()?;

    let addr: SocketAddr = std::env::var("REVIEW_SCHEDULE_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    info!("event=http_start addr={addr}");
    println!("review-schedule HTTP API listening on http://{addr}");
    let workspace = Workspace::starting_on(chrono::Local::now().date_naive());
    http_api::serve(addr, workspace).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
