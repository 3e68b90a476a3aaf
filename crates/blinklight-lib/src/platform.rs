//! Platform setup — resolve devices from config and register light entities.
//!
//! Mirrors the host's setup contract: each configured light is resolved by
//! serial, wrapped in an entity, refreshed once, and handed to the host's
//! entity-collection callback. Any failure along the way is fatal for the
//! whole setup; nothing is registered and nothing is retried.

use crate::config::{Config, LightConfig};
use crate::device::{self, BlinkStickDevice, DeviceError, UsbDevice};
use crate::error::Result;
use crate::light::{BlinkStickLight, LightEntity};

/// Resolve one configured light through an arbitrary device resolver.
///
/// The resolver maps a serial to an open handle; production code passes
/// [`device::find_by_serial`], tests inject a mock. The configured LED
/// index is checked against the resolved device before the entity's
/// initial refresh runs.
pub fn setup_light_with<D, R>(light: &LightConfig, resolve: R) -> Result<BlinkStickLight<D>>
where
    D: BlinkStickDevice,
    R: FnOnce(&str) -> device::Result<D>,
{
    let device = resolve(&light.serial)?;

    if light.index >= device.led_count() {
        return Err(DeviceError::IndexOutOfRange {
            index: light.index,
            count: device.led_count(),
        }
        .into());
    }

    let mut entity = BlinkStickLight::new(device, light.name.clone(), light.index);

    // The host requests an immediate initial refresh; a device that can't
    // be read fails setup rather than registering a blind entity.
    entity.update()?;

    log::debug!(
        "set up light \"{}\" on {} index {}",
        entity.name(),
        entity.serial(),
        entity.index()
    );
    Ok(entity)
}

/// Resolve one configured light over USB.
pub fn setup_light(light: &LightConfig) -> Result<BlinkStickLight<UsbDevice>> {
    setup_light_with(light, device::find_by_serial)
}

/// Set up every light in the config, handing each entity to
/// `add_entities` in declaration order.
///
/// The first failure aborts setup; earlier entities remain with the host.
pub fn setup_platform<F>(config: &Config, mut add_entities: F) -> Result<()>
where
    F: FnMut(BlinkStickLight<UsbDevice>),
{
    for light in &config.lights {
        add_entities(setup_light(light)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::device::mock::MockDevice;

    #[test]
    fn setup_resolves_and_refreshes() {
        let config = LightConfig::new("BS031337-3.0");
        let entity = setup_light_with(&config, |serial| {
            let dev = MockDevice::with_serial(serial);
            dev.preload(0, Rgb::new(255, 0, 0));
            Ok(dev)
        })
        .unwrap();

        // The initial refresh already populated the cache.
        assert_eq!(entity.brightness(), Some(255));
        assert_eq!(entity.hs_color().unwrap().hue, 0.0);
        assert!(entity.is_on());
    }

    #[test]
    fn setup_unknown_serial_is_fatal() {
        let config = LightConfig::new("BS999999-3.0");
        let err = setup_light_with::<MockDevice, _>(&config, |serial| {
            Err(DeviceError::NotFound(serial.to_string()))
        })
        .unwrap_err();

        assert!(err.to_string().contains("BS999999-3.0"));
    }

    #[test]
    fn setup_rejects_index_beyond_device() {
        let mut config = LightConfig::new("BS031337-3.0");
        config.index = 8;

        let err = setup_light_with(&config, |serial| Ok(MockDevice::with_serial(serial)))
            .unwrap_err();

        assert!(err.to_string().contains("out of range"), "got: {err}");
    }

    #[test]
    fn setup_failed_initial_refresh_is_fatal() {
        let config = LightConfig::new("BS031337-3.0");
        let result = setup_light_with(&config, |serial| {
            let dev = MockDevice::with_serial(serial);
            dev.fail_get_color.set(true);
            Ok(dev)
        });

        assert!(result.is_err());
    }

    #[test]
    fn setup_uses_configured_name_and_index() {
        let mut config = LightConfig::new("BS031337-3.0");
        config.index = 4;
        config.name = "Shelf corner".into();

        let entity =
            setup_light_with(&config, |serial| Ok(MockDevice::with_serial(serial))).unwrap();

        assert_eq!(entity.name(), "Shelf corner");
        assert_eq!(entity.index(), 4);
    }
}
