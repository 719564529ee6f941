//! Difference two 16-bit grayscale images, then measure a segmented image.
//!
//! Run with: cargo run --example compare_images -- <image1> <image2> <region> [output_dir]

use std::{env, fs, path::Path};

use watershed_compare::{
    RasterComparator,
    error::Result,
    io::load_raster,
    report::{JsonReport, ResultsTable, visualization::Visualizer},
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 4 {
        println!("Usage: {} <image1> <image2> <region> [output_dir]", args[0]);
        println!();
        println!("  image1, image2  16-bit grayscale images of equal size");
        println!("  region          segmented image; pixels equal to 255 are foreground");
        println!("  output_dir      where outputs are written (default: ./output)");
        return Ok(());
    }

    let output_dir = Path::new(args.get(4).map(String::as_str).unwrap_or("./output"));
    fs::create_dir_all(output_dir)?;

    let comparator = RasterComparator::open(&args[1], &args[2])?;
    let region = load_raster(&args[3])?;

    let report = comparator.full_analysis(&region)?;

    let difference_path = output_dir.join("difference.png");
    report.difference.save(&difference_path)?;

    let visualizer = Visualizer::new();
    let heatmap_path = output_dir.join("difference_heatmap.png");
    visualizer
        .visualize_components(&report.difference, &report.components)
        .save(&heatmap_path)?;

    let json_path = output_dir.join("report.json");
    fs::write(&json_path, JsonReport::from(&report).to_json()?)?;

    print!("{}", ResultsTable::from(&report).to_tsv());
    println!();
    println!("Components: {}", report.components.len());
    println!("Difference image: {}", difference_path.display());
    println!("Heat map:         {}", heatmap_path.display());
    println!("Report:           {}", json_path.display());

    Ok(())
}
