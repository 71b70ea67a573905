#[tokio::main]
async fn main() -> anyhow::Result<()> {
    church_portal_lib::run().await?;
    Ok(())
}
