//! `off` subcommand — turn a light off.

use super::{BlinkStickLight, LightEntity, Result, TargetArgs, device, resolve_target};

pub(super) fn cmd_off(target: &TargetArgs) -> Result<()> {
    let light_config = resolve_target(target)?;

    let handle = device::find_by_serial(&light_config.serial)?;
    let mut entity = BlinkStickLight::new(handle, light_config.name.clone(), light_config.index);
    entity.turn_off()?;

    println!("{} is off", entity.name());
    Ok(())
}
