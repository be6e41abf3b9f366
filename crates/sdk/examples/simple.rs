//! Simple SDK Example
//!
//! # Usage
//!
//! 1. Start the server:
//!    ```bash
//!    TAGSVC_DB_PATH=:memory: cargo run --package tagsvc-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package tagsvc-sdk --example simple
//!    ```

use tagsvc_sdk::{GetTagListRequest, SdkError, TagServiceClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Tag Service SDK - Simple Example");
    println!("================================\n");

    println!("1. Connecting to server...");
    let client = TagServiceClient::connect("http://127.0.0.1:8004").await?;
    println!("   ✓ Connected\n");

    println!("2. Creating tags...");
    for name in ["rust", "go", "zig"] {
        match client.create_tag(name, None).await {
            Ok(tag) => println!("   ✓ {} (id {})", tag.name, tag.id),
            Err(e) if e.biz_code() == Some(20010005) => println!("   - {} already exists", name),
            Err(e) => return Err(e.into()),
        }
    }
    println!();

    println!("3. Listing enabled tags...");
    let reply = client
        .list_tags(GetTagListRequest {
            state: Some(1),
            ..Default::default()
        })
        .await?;
    for tag in &reply.list {
        println!("   {:>4}  {}", tag.id, tag.name);
    }
    if let Some(pager) = reply.pager {
        println!("   ({} total)\n", pager.total_rows);
    }

    println!("4. Fetching a tag that does not exist...");
    match client.get_tag(999_999).await {
        Err(SdkError::Rpc(status)) => println!("   ✓ {} / {:?}\n", status.code(), status.first_typed_error()),
        other => println!("   unexpected: {:?}\n", other.map(|t| t.id)),
    }

    println!("Done!");
    Ok(())
}
