#[tokio::main]
async fn main() {
    if let Err(e) = agency_saas::run().await {
        eprintln!("agency-saas failed to start: {}", e);
        std::process::exit(1);
    }
}
