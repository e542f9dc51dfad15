use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use vanish_icon::icon_gen;

#[derive(Debug, Parser)]
#[clap(
    name = "vanish-icon",
    about = "Render the Vanish Browser app icon into an Xcode asset catalog"
)]
struct Args {
    /// The AppIcon.appiconset directory to write into. It must already exist.
    #[clap(short, long, value_name = "DIR", default_value = "AppIcon.appiconset")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    icon_gen::generate_app_icon(&args.output)?;

    println!("\n🎨 Vanish Browser app icon is ready!");
    println!("📱 Open the project in Xcode to check the new icon.");
    Ok(())
}
