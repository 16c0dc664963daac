use dotenv::dotenv;
use std::env;

fn main() {
    dotenv().ok();
    let endpoint_url = env::var("OCTRA_WALLET_ENDPOINT_URL")
        .unwrap_or_else(|_| "https://octra.network".to_string());
    let surface_mode =
        env::var("OCTRA_WALLET_SURFACE_MODE").unwrap_or_else(|_| "popup".to_string());
    let storage_dir = env::var("OCTRA_WALLET_STORAGE_DIR").unwrap_or_else(|_| "".to_string());
    let refresh_delay_ms =
        env::var("OCTRA_WALLET_REFRESH_DELAY_MS").unwrap_or_else(|_| "2000".to_string());

    println!("Octra Wallet Core Session Configuration:\n");
    println!("  Endpoint URL: {}", endpoint_url);
    println!("  Surface Mode: {}", surface_mode);
    println!(
        "  Storage Dir: {}",
        if storage_dir.is_empty() {
            "(platform default)"
        } else {
            &storage_dir
        }
    );
    println!("  Post-Transaction Refresh Delay (ms): {}", refresh_delay_ms);
}
