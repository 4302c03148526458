use anyhow::Result;

pub mod bump;
pub mod doctor;
pub mod fixture;
pub mod fmt;
pub mod lint;

pub async fn show_tasks() -> Result<()> {
    println!("🛠  opensearch-users development tasks");
    println!();
    println!("  🎨 cargo xtask fmt           # Sort manifests and format the code");
    println!("  🔍 cargo xtask lint          # Clippy over the workspace, warnings denied");
    println!("  🧪 cargo xtask test          # Coverage-gated tests against an OpenSearch container");
    println!("  🔖 cargo xtask bump <level>  # patch | minor | major version bump");
    println!("  🐳 cargo xtask fixture <op>  # up | down | status for the OpenSearch container");
    println!("  🩺 cargo xtask doctor        # Check that the delegated tools are installed");
    println!();
    println!("💡 Start with 'cargo xtask doctor' to verify your environment!");
    Ok(())
}
