//! Light entity — the host-facing view of one BlinkStick LED.
//!
//! The entity caches the last-known hue/saturation pair and brightness.
//! Both caches are overwritten wholesale on every successful read-back or
//! command; there is no merge logic. On/off is derived from brightness,
//! never stored.

use crate::color::{self, HsColor, Hsv};
use crate::device::{BlinkStickDevice, Result};

/// Brightness commanded when `turn_on` is called without one.
pub const DEFAULT_BRIGHTNESS: u8 = 255;

// ── Capability set ──

/// Bitset of capabilities a light entity exposes to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SupportedFeatures(u32);

impl SupportedFeatures {
    pub const BRIGHTNESS: SupportedFeatures = SupportedFeatures(1 << 0);
    pub const COLOR: SupportedFeatures = SupportedFeatures(1 << 1);

    pub const fn contains(self, other: SupportedFeatures) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for SupportedFeatures {
    type Output = SupportedFeatures;

    fn bitor(self, rhs: SupportedFeatures) -> SupportedFeatures {
        SupportedFeatures(self.0 | rhs.0)
    }
}

// ── Command options ──

/// Optional fields of a `turn_on` command. Absent fields fall back to the
/// entity's cache (color) or to [`DEFAULT_BRIGHTNESS`] (brightness).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TurnOnOptions {
    pub hs_color: Option<HsColor>,
    pub brightness: Option<u8>,
}

impl TurnOnOptions {
    pub fn hs_color(mut self, hs: HsColor) -> Self {
        self.hs_color = Some(hs);
        self
    }

    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }
}

// ── Entity capability trait ──

/// The capability set a light entity exposes to its host.
///
/// The host owns scheduling: it polls [`update`](LightEntity::update) and
/// dispatches [`turn_on`](LightEntity::turn_on) /
/// [`turn_off`](LightEntity::turn_off), serialized per entity. Every
/// operation is a blocking device round-trip; any failure propagates to
/// the host for that single call with no local recovery.
pub trait LightEntity {
    /// Display name, immutable after construction.
    fn name(&self) -> &str;

    /// Last-known/last-commanded brightness, 0–255, unset before the
    /// first refresh.
    fn brightness(&self) -> Option<u8>;

    /// Last-known/last-commanded color, unset before the first refresh.
    fn hs_color(&self) -> Option<HsColor>;

    /// Derived on/off state: true iff cached brightness > 0.
    fn is_on(&self) -> bool {
        self.brightness().is_some_and(|b| b > 0)
    }

    fn supported_features(&self) -> SupportedFeatures {
        SupportedFeatures::BRIGHTNESS | SupportedFeatures::COLOR
    }

    /// Refresh the cache from the device.
    fn update(&mut self) -> Result<()>;

    /// Turn the light on, optionally with a new color and/or brightness.
    fn turn_on(&mut self, options: TurnOnOptions) -> Result<()>;

    /// Turn the light off. The cached color and brightness are left
    /// untouched so the next `turn_on` restores them.
    fn turn_off(&mut self) -> Result<()>;
}

// ── BlinkStick implementation ──

/// One LED of a BlinkStick, exposed as a light entity.
#[derive(Debug)]
pub struct BlinkStickLight<D: BlinkStickDevice> {
    device: D,
    name: String,
    index: u16,
    serial: String,
    hs_color: Option<HsColor>,
    brightness: Option<u8>,
}

impl<D: BlinkStickDevice> BlinkStickLight<D> {
    /// Wrap a device handle as a light entity for the LED at `index`.
    ///
    /// The color and brightness caches start unset; the host-requested
    /// initial refresh (see [`crate::platform`]) populates them.
    pub fn new(device: D, name: impl Into<String>, index: u16) -> Self {
        let serial = device.serial().to_string();
        BlinkStickLight {
            device,
            name: name.into(),
            index,
            serial,
            hs_color: None,
            brightness: None,
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: BlinkStickDevice> LightEntity for BlinkStickLight<D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn brightness(&self) -> Option<u8> {
        self.brightness
    }

    fn hs_color(&self) -> Option<HsColor> {
        self.hs_color
    }

    fn update(&mut self) -> Result<()> {
        let rgb = self.device.get_color(self.index)?;
        let hsv = color::rgb_to_hsv(rgb);
        self.hs_color = Some(HsColor::new(hsv.hue, hsv.saturation));
        self.brightness = Some(color::value_to_brightness(hsv.value));
        Ok(())
    }

    fn turn_on(&mut self, options: TurnOnOptions) -> Result<()> {
        let hs = options
            .hs_color
            .or(self.hs_color)
            .unwrap_or(HsColor::WHITE);
        let brightness = options.brightness.unwrap_or(DEFAULT_BRIGHTNESS);

        let rgb = color::hsv_to_rgb(Hsv {
            hue: hs.hue,
            saturation: hs.saturation,
            value: color::brightness_to_value(brightness),
        });
        self.device.set_color(self.index, rgb)?;

        // Cache mutates only once the device write has succeeded.
        self.hs_color = Some(hs);
        self.brightness = Some(brightness);
        Ok(())
    }

    fn turn_off(&mut self) -> Result<()> {
        self.device.set_color(self.index, color::Rgb::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::device::mock::MockDevice;

    fn light() -> BlinkStickLight<MockDevice> {
        BlinkStickLight::new(MockDevice::new(), "Blinkstick Square", 0)
    }

    // ── construction ──

    #[test]
    fn new_light_has_no_cached_state() {
        let light = light();
        assert_eq!(light.name(), "Blinkstick Square");
        assert_eq!(light.serial(), "BS031337-3.0");
        assert_eq!(light.brightness(), None);
        assert_eq!(light.hs_color(), None);
        assert!(!light.is_on());
    }

    #[test]
    fn supported_features_brightness_and_color() {
        let light = light();
        let features = light.supported_features();
        assert!(features.contains(SupportedFeatures::BRIGHTNESS));
        assert!(features.contains(SupportedFeatures::COLOR));
    }

    // ── update ──

    #[test]
    fn update_red_yields_hue_zero_full_on() {
        let mut light = light();
        light.device().preload(0, Rgb::new(255, 0, 0));

        light.update().unwrap();

        let hs = light.hs_color().unwrap();
        assert_eq!(hs.hue, 0.0);
        assert_eq!(hs.saturation, 100.0);
        assert_eq!(light.brightness(), Some(255));
        assert!(light.is_on());
    }

    #[test]
    fn update_black_is_off() {
        let mut light = light();
        light.device().preload(0, Rgb::BLACK);

        light.update().unwrap();

        // A color was read back, but zero brightness derives to off.
        assert!(light.hs_color().is_some());
        assert_eq!(light.brightness(), Some(0));
        assert!(!light.is_on());
    }

    #[test]
    fn update_rescales_value_to_brightness() {
        let mut light = light();
        // Half-intensity red: HSV value 50.2% -> brightness 128
        light.device().preload(0, Rgb::new(128, 0, 0));

        light.update().unwrap();

        assert_eq!(light.brightness(), Some(128));
    }

    #[test]
    fn update_reads_configured_index() {
        let mut light = BlinkStickLight::new(MockDevice::new(), "corner", 5);
        light.device().preload(5, Rgb::new(0, 255, 0));

        light.update().unwrap();

        assert_eq!(light.hs_color().unwrap().hue, 120.0);
    }

    #[test]
    fn update_failure_leaves_cache_untouched() {
        let mut light = light();
        light.device().preload(0, Rgb::new(255, 0, 0));
        light.update().unwrap();

        light.device().fail_get_color.set(true);
        assert!(light.update().is_err());

        // Cache still holds the last successful read.
        assert_eq!(light.hs_color().unwrap().hue, 0.0);
        assert_eq!(light.brightness(), Some(255));
    }

    // ── turn_on ──

    #[test]
    fn turn_on_defaults_to_full_white() {
        let mut light = light();

        light.turn_on(TurnOnOptions::default()).unwrap();

        assert_eq!(
            light.device().writes.borrow().as_slice(),
            &[(0, Rgb::new(255, 255, 255))]
        );
        assert_eq!(light.brightness(), Some(255));
        assert_eq!(light.hs_color(), Some(HsColor::WHITE));
        assert!(light.is_on());
    }

    #[test]
    fn turn_on_uses_cached_color() {
        let mut light = light();
        light.device().preload(0, Rgb::new(255, 0, 0));
        light.update().unwrap();

        light.turn_on(TurnOnOptions::default()).unwrap();

        // Cached red, default brightness 255.
        assert_eq!(
            light.device().writes.borrow().last(),
            Some(&(0, Rgb::new(255, 0, 0)))
        );
    }

    #[test]
    fn turn_on_with_color_replaces_cache() {
        let mut light = light();

        light
            .turn_on(TurnOnOptions::default().hs_color(HsColor::new(240.0, 100.0)))
            .unwrap();

        assert_eq!(
            light.device().writes.borrow().last(),
            Some(&(0, Rgb::new(0, 0, 255)))
        );
        assert_eq!(light.hs_color(), Some(HsColor::new(240.0, 100.0)));
    }

    #[test]
    fn turn_on_with_brightness_scales_value() {
        let mut light = light();

        light
            .turn_on(
                TurnOnOptions::default()
                    .hs_color(HsColor::new(0.0, 100.0))
                    .brightness(128),
            )
            .unwrap();

        // brightness 128 -> value 50.2% -> red channel 128
        assert_eq!(
            light.device().writes.borrow().last(),
            Some(&(0, Rgb::new(128, 0, 0)))
        );
        assert_eq!(light.brightness(), Some(128));
    }

    #[test]
    fn turn_on_without_brightness_resets_to_full() {
        let mut light = light();
        light
            .turn_on(TurnOnOptions::default().brightness(10))
            .unwrap();

        // A later bare turn_on goes back to full, not the cached 10.
        light.turn_on(TurnOnOptions::default()).unwrap();

        assert_eq!(light.brightness(), Some(255));
    }

    #[test]
    fn turn_on_zero_brightness_writes_black() {
        let mut light = light();

        light
            .turn_on(TurnOnOptions::default().brightness(0))
            .unwrap();

        assert_eq!(
            light.device().writes.borrow().last(),
            Some(&(0, Rgb::BLACK))
        );
        assert!(!light.is_on());
    }

    #[test]
    fn turn_on_failure_leaves_cache_untouched() {
        let mut light = light();
        light.device().fail_set_color.set(true);

        let err = light.turn_on(TurnOnOptions::default().brightness(42));
        assert!(err.is_err());

        assert_eq!(light.brightness(), None);
        assert_eq!(light.hs_color(), None);
    }

    // ── turn_off ──

    #[test]
    fn turn_off_writes_black_at_index() {
        let mut light = BlinkStickLight::new(MockDevice::new(), "corner", 3);
        light.turn_off().unwrap();

        assert_eq!(
            light.device().writes.borrow().as_slice(),
            &[(3, Rgb::BLACK)]
        );
    }

    #[test]
    fn turn_off_preserves_cache() {
        let mut light = light();
        light
            .turn_on(
                TurnOnOptions::default()
                    .hs_color(HsColor::new(120.0, 100.0))
                    .brightness(200),
            )
            .unwrap();

        light.turn_off().unwrap();

        // Cache untouched: the next turn_on restores the same color.
        assert_eq!(light.hs_color(), Some(HsColor::new(120.0, 100.0)));
        assert_eq!(light.brightness(), Some(200));
    }

    // ── is_on derivation ──

    #[test]
    fn is_on_tracks_brightness_threshold() {
        let mut light = light();
        assert!(!light.is_on());

        light
            .turn_on(TurnOnOptions::default().brightness(1))
            .unwrap();
        assert!(light.is_on());

        light
            .turn_on(TurnOnOptions::default().brightness(0))
            .unwrap();
        assert!(!light.is_on());
    }
}
