use std::fs;

use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let doc = flexwork::docs::ApiDoc::openapi();
    let s = serde_json::to_string_pretty(&doc)?;
    let path = "/tmp/openapi-generated.json";
    fs::write(path, s)?;
    println!("wrote {}", path);
    Ok(())
}
