//! `on` subcommand — turn a light on, optionally with color/brightness.

use super::{
    BlinkStickLight, HsColor, LightEntity, Result, TargetArgs, TurnOnOptions, color, device,
    resolve_target,
};

pub(super) fn cmd_on(target: &TargetArgs, color_arg: Option<&str>, brightness: Option<u8>) -> Result<()> {
    let light_config = resolve_target(target)?;

    let mut options = TurnOnOptions::default();
    if let Some(color_arg) = color_arg {
        let rgb = color::parse_color(color_arg)?;
        let hsv = color::rgb_to_hsv(rgb);
        options = options.hs_color(HsColor::new(hsv.hue, hsv.saturation));
    }
    if let Some(brightness) = brightness {
        options = options.brightness(brightness);
    }

    let handle = device::find_by_serial(&light_config.serial)?;
    let mut entity = BlinkStickLight::new(handle, light_config.name.clone(), light_config.index);
    entity.turn_on(options)?;

    println!(
        "{} is on (brightness {})",
        entity.name(),
        entity.brightness().unwrap_or_default()
    );
    Ok(())
}
