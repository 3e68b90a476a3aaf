//! `status` subcommand — read a light's state back from the device.

use super::{
    LightEntity, Result, StatusOutput, TargetArgs, color, kv, kv_width, platform, resolve_target,
};

pub(super) fn cmd_status(target: &TargetArgs, json: bool) -> Result<()> {
    let light_config = resolve_target(target)?;
    let entity = platform::setup_light(&light_config)?;

    // The cached RGB rendering of the current hue/saturation/brightness.
    let rendered = entity.hs_color().zip(entity.brightness()).map(|(hs, b)| {
        color::format_color(color::hsv_to_rgb(color::Hsv {
            hue: hs.hue,
            saturation: hs.saturation,
            value: color::brightness_to_value(b),
        }))
    });

    if json {
        let output = StatusOutput {
            name: entity.name().to_string(),
            serial: entity.serial().to_string(),
            index: entity.index(),
            on: entity.is_on(),
            brightness: entity.brightness(),
            hs_color: entity.hs_color(),
            color: rendered,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    let w = kv_width(&[
        "Name:",
        "Serial:",
        "Index:",
        "State:",
        "Brightness:",
        "Color:",
    ]);

    kv("Name:", entity.name(), w);
    kv("Serial:", entity.serial(), w);
    kv("Index:", entity.index(), w);
    kv("State:", if entity.is_on() { "on" } else { "off" }, w);
    if let Some(brightness) = entity.brightness() {
        kv("Brightness:", brightness, w);
    }
    if let (Some(hs), Some(hex)) = (entity.hs_color(), rendered) {
        kv(
            "Color:",
            format!("{hex} (hue {:.0}°, saturation {:.0}%)", hs.hue, hs.saturation),
            w,
        );
    }

    Ok(())
}
