#[tokio::main]
async fn main() {
    if let Err(e) = lib_director_host::init().await {
        eprintln!("❌ Application error: {e}");
        std::process::exit(1);
    }
}
