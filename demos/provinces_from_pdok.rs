use anyhow::Result;
use provtour::geometric::provinces::Provinces;

/// Example: loading province outlines from the PDOK WFS service and
/// printing the focus-target bounding boxes.
fn main() -> Result<()> {
    env_logger::init();

    println!("=== Example: Loading provinces from PDOK ===\n");

    println!("Downloading and processing provinces from PDOK WFS...");
    let provinces = Provinces::new(None).run()?;

    println!("\nProvinces processed successfully!");
    println!("  - Number of provinces: {}", provinces.features().len());

    let mut names: Vec<_> = provinces
        .bbox_lookup()
        .into_iter()
        .collect();
    names.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, bbox) in names {
        println!(
            "  - {:<16} x: {:.0}..{:.0}  y: {:.0}..{:.0}",
            name, bbox.min_x, bbox.max_x, bbox.min_y, bbox.max_y
        );
    }

    let extent = provinces.full_extent()?;
    println!(
        "\nFull extent: ({:.0}, {:.0}) - ({:.0}, {:.0})",
        extent.min_x, extent.min_y, extent.max_x, extent.max_y
    );

    Ok(())
}
