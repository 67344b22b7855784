#[tokio::main]
async fn main() -> anyhow::Result<()> {
    web::start_server().await
}
