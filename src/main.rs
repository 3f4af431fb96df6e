use anyhow::Result;

use provtour::tour::{Tour, TourConfig};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: provtour [config.json]");
        std::process::exit(2);
    }

    let config = match args.get(1) {
        Some(path) => TourConfig::from_file(path.as_str())?,
        None => TourConfig::default(),
    };

    let summary = Tour::new(config).run()?;

    println!(
        "Rendered {}/{} frames into {:?}",
        summary.rendered, summary.total_frames, summary.output_dir
    );
    if summary.failed > 0 {
        eprintln!(
            "{} frame(s) failed; the sequence has gaps at the logged indices",
            summary.failed
        );
    }
    Ok(())
}
