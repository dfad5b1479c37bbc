#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ortho_vision_lib::run().await
}
