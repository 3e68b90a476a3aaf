//! `watch` subcommand — poll a light and print state changes.
//!
//! Stands in for the host's poll scheduler: calls `update` on a fixed
//! interval and reports every observed transition until Ctrl+C.

use std::sync::atomic::Ordering;
use std::time::Duration;

use super::{LightEntity, RUNNING, Result, TargetArgs, platform, resolve_target};

fn describe(entity: &impl LightEntity) -> String {
    if !entity.is_on() {
        return "off".into();
    }
    match (entity.hs_color(), entity.brightness()) {
        (Some(hs), Some(b)) => format!(
            "on (brightness {b}, hue {:.0}°, saturation {:.0}%)",
            hs.hue, hs.saturation
        ),
        _ => "on".into(),
    }
}

pub(super) fn cmd_watch(target: &TargetArgs, interval: u64) -> Result<()> {
    let light_config = resolve_target(target)?;
    let mut entity = platform::setup_light(&light_config)?;

    println!("Watching {} — Ctrl+C to stop.", entity.name());
    let mut last = describe(&entity);
    println!("{last}");

    while RUNNING.load(Ordering::SeqCst) {
        // Sleep in short slices so Ctrl+C is picked up promptly.
        let mut remaining = interval.max(1) * 1000;
        while remaining > 0 && RUNNING.load(Ordering::SeqCst) {
            let slice = remaining.min(200);
            std::thread::sleep(Duration::from_millis(slice));
            remaining -= slice;
        }
        if !RUNNING.load(Ordering::SeqCst) {
            break;
        }

        entity.update()?;
        let current = describe(&entity);
        if current != last {
            println!("{current}");
            last = current;
        }
    }

    Ok(())
}
