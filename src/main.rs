#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wastelog_lib::run().await
}
