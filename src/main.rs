#[tokio::main]
async fn main() {
    if let Err(e) = bact_trace_lib::run().await {
        eprintln!("bact-trace: {e}");
        std::process::exit(1);
    }
}
