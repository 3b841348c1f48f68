#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agrobot_server::start().await
}
