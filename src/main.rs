/*
 * Responsibility
 * - tokio runtime entry
 * - calls app::run() and nothing else
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    gateway_auth::app::run().await
}
