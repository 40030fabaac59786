#[tokio::main]
async fn main() -> anyhow::Result<()> {
    interactive_stories_backend::run().await
}
