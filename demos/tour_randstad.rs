use anyhow::Result;
use provtour::tour::{Tour, TourConfig};

/// Example: a short tour over the three Randstad provinces, rendered with
/// reduced frame counts so it finishes quickly.
fn main() -> Result<()> {
    env_logger::init();

    println!("=== Example: Randstad tour ===\n");

    let config = TourConfig {
        targets: vec![
            "Noord-Holland".to_string(),
            "Zuid-Holland".to_string(),
            "Utrecht".to_string(),
        ],
        n_transition: 10,
        n_still: 20,
        output_dir: "./output/randstad_frames".into(),
        ..TourConfig::default()
    };

    println!("Visit order: {:?}", config.targets);
    println!(
        "Frames per segment: {} transition, {} still\n",
        config.n_transition, config.n_still
    );

    let summary = Tour::new(config).run()?;

    println!(
        "\nTour complete: {}/{} frames in {:?}",
        summary.rendered, summary.total_frames, summary.output_dir
    );
    println!("Assemble with e.g.: ffmpeg -i frame_%04d.png -r 25 tour.mp4");

    Ok(())
}
