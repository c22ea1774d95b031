use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("graffiti version: {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
