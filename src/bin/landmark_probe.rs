// Prints what the gesture engine sees in a landmark stream read from stdin.
//
//   python3 hands.py | landmark_probe
use anyhow::{Context, Result};

use gesture_control::activity::HandActivity;
use gesture_control::source::{JsonLinesSource, LandmarkSource};
use gesture_control::tilt::TiltContext;
use gesture_control::{Config, Side};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== Landmark Probe ===");
    let mut source = JsonLinesSource::new(std::io::stdin().lock());
    let thresholds = Config::load()
        .context("Failed to load configuration")?
        .thresholds();
    let mut left = HandActivity::new(Side::Left, thresholds);
    let mut right = HandActivity::new(Side::Right, thresholds);

    let mut tick = 0u64;
    while let Some(sample) = source.sample()? {
        tick += 1;
        let mut line = format!("[{:>5}]", tick);

        for (side, activity) in [(Side::Left, &mut left), (Side::Right, &mut right)] {
            let presence = sample.hand(side);
            let classified = activity.update(presence);
            let state = match (presence.is_present(), activity.is_active()) {
                (false, _) => "absent".to_string(),
                (true, false) => "present, inactive".to_string(),
                (true, true) => match (side, classified) {
                    (Side::Right, Some(frame)) => {
                        format!("active, {}", TiltContext::classify(frame).describe())
                    }
                    _ => "active".to_string(),
                },
            };
            line.push_str(&format!("  {}: {:<32}", side.as_str(), state));
        }

        if sample.quit {
            line.push_str("  quit");
        }
        println!("{}", line.trim_end());
    }

    println!("Stream ended after {} ticks", tick);
    Ok(())
}
