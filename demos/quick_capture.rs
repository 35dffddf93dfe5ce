//! Capture a page screenshot with the composed flow.
//!
//! Run with: cargo run --example quick_capture -- https://example.com example.png
//!
//! Options: --browser <path> to pin the executable, --no-sandbox for
//! containers, --full-page for the whole scrollable page.

use std::path::PathBuf;

use pagesnap::PageSnap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    let mut url = "https://example.com".to_string();
    let mut output = PathBuf::from("example.png");
    let mut builder = PageSnap::builder();
    let mut positional = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--browser" | "-b" => {
                i += 1;
                builder = builder.executable_path(PathBuf::from(&args[i]));
            }
            "--no-sandbox" => {
                builder = builder.no_sandbox();
            }
            "--full-page" => {
                builder = builder.full_page(true);
            }
            "--headed" => {
                builder = builder.headless(false);
            }
            other => {
                match positional {
                    0 => url = other.to_string(),
                    1 => output = PathBuf::from(other),
                    _ => anyhow::bail!("unexpected argument: {}", other),
                }
                positional += 1;
            }
        }
        i += 1;
    }

    let snap = builder.build();
    let outcome = snap.capture_url(&url, &output).await;
    snap.close().await?;

    let result = outcome?;
    println!(
        "captured {} -> {} ({} bytes at {})",
        url,
        result.path.display(),
        result.bytes,
        result.captured_at.to_rfc3339()
    );

    Ok(())
}
