//! Device communication — trait, USB backend, discovery.

use std::fmt;
use std::time::Duration;

use nusb::transfer::{Control, ControlType, Recipient};
use serde::Serialize;

use crate::color::Rgb;
use crate::protocol::*;

// ── Error type ──

/// Device communication errors.
///
/// String payloads follow the convention **"context: details"** where
/// *context* identifies the operation or step (e.g. `"USB enumeration"`,
/// `"GET_REPORT(1)"`) and *details* describes what went wrong.
#[derive(Debug)]
pub enum DeviceError {
    /// No attached device matches the requested serial.
    NotFound(String),
    /// No BlinkStick devices attached at all.
    NoDevices,
    OpenFailed(String),
    ReportFailed(String),
    IndexOutOfRange { index: u16, count: u16 },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NotFound(serial) => {
                write!(f, "No BlinkStick with serial {serial} found")
            }
            DeviceError::NoDevices => write!(f, "No BlinkStick devices found"),
            DeviceError::OpenFailed(e) => write!(f, "Failed to open device: {e}"),
            DeviceError::ReportFailed(e) => write!(f, "Feature report failed: {e}"),
            DeviceError::IndexOutOfRange { index, count } => {
                write!(f, "LED index {index} out of range (device has {count})")
            }
        }
    }
}

impl std::error::Error for DeviceError {}

pub type Result<T> = std::result::Result<T, DeviceError>;

// ── Device info ──

#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    /// Bus path, e.g. `usb:001/004`.
    pub path: String,
    /// Vendor serial, e.g. `BS031337-3.0`. The suffix encodes the
    /// hardware generation.
    pub serial: String,
    /// Product string from the USB descriptor.
    pub product: String,
    /// Hardware release parsed from the serial suffix, if present.
    pub release: Option<(u16, u16)>,
    /// Number of addressable LEDs on channel 0.
    pub led_count: u16,
}

/// Parse the hardware release from a vendor serial (`BS######-M.m`).
pub fn parse_release(serial: &str) -> Option<(u16, u16)> {
    let (_, version) = serial.rsplit_once('-')?;
    let (major, minor) = version.split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// LED count implied by a hardware release.
///
/// Generation 1.x and 2.x sticks drive a single onboard LED; later
/// generations (Square, Strip) expose eight addressable LEDs on channel 0.
pub fn led_count_for_release(release: Option<(u16, u16)>) -> u16 {
    match release {
        Some((major, _)) if major <= 2 => 1,
        _ => MULTI_LED_COUNT,
    }
}

// ── Trait ──

/// Synchronous, blocking access to one BlinkStick.
///
/// Every call is a direct blocking round-trip into the USB stack; there is
/// no internal concurrency and no retry. A handle is owned by exactly one
/// light entity and is never used concurrently with itself.
pub trait BlinkStickDevice {
    fn info(&self) -> &DeviceInfo;

    /// Read the current color of the LED at `index`.
    fn get_color(&self, index: u16) -> Result<Rgb>;

    /// Write a color to the LED at `index`.
    fn set_color(&self, index: u16, color: Rgb) -> Result<()>;

    fn serial(&self) -> &str {
        &self.info().serial
    }

    fn led_count(&self) -> u16 {
        self.info().led_count
    }
}

// ── Discovery ──

/// A BlinkStick seen during enumeration, before opening.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredDevice {
    pub path: String,
    pub serial: Option<String>,
    pub product: Option<String>,
}

/// List all attached BlinkStick devices without opening them.
///
/// Enumeration failures are logged and yield an empty list — callers
/// treat "cannot enumerate" the same as "nothing attached".
pub fn enumerate_devices() -> Vec<DiscoveredDevice> {
    let devices = match nusb::list_devices() {
        Ok(iter) => iter,
        Err(e) => {
            log::warn!("USB enumeration failed: {e}");
            return Vec::new();
        }
    };
    devices
        .filter(|dev| dev.vendor_id() == BLINKSTICK_VID && dev.product_id() == BLINKSTICK_PID)
        .map(|dev| DiscoveredDevice {
            path: format!("usb:{:03}/{:03}", dev.bus_number(), dev.device_address()),
            serial: dev.serial_number().map(|s| s.to_string()),
            product: dev.product_string().map(|s| s.to_string()),
        })
        .collect()
}

/// Open the BlinkStick with the given serial.
///
/// This is the platform setup entry point: no matching device is a fatal
/// setup error, surfaced as [`DeviceError::NotFound`] and never retried.
pub fn find_by_serial(serial: &str) -> Result<UsbDevice> {
    let device_info = nusb::list_devices()
        .map_err(|e| DeviceError::OpenFailed(format!("USB enumeration: {e}")))?
        .filter(|dev| dev.vendor_id() == BLINKSTICK_VID && dev.product_id() == BLINKSTICK_PID)
        .find(|dev| dev.serial_number() == Some(serial))
        .ok_or_else(|| DeviceError::NotFound(serial.to_string()))?;
    UsbDevice::open(device_info)
}

/// Open the first attached BlinkStick, regardless of serial.
pub fn find_first() -> Result<UsbDevice> {
    let device_info = nusb::list_devices()
        .map_err(|e| DeviceError::OpenFailed(format!("USB enumeration: {e}")))?
        .find(|dev| dev.vendor_id() == BLINKSTICK_VID && dev.product_id() == BLINKSTICK_PID)
        .ok_or(DeviceError::NoDevices)?;
    UsbDevice::open(device_info)
}

// ── USB implementation ──

/// A BlinkStick opened over raw USB control transfers.
///
/// BlinkStick is a HID device; all commands are class-level feature report
/// reads and writes on interface 0 (see [`crate::protocol`]).
pub struct UsbDevice {
    interface: nusb::Interface,
    info: DeviceInfo,
}

impl UsbDevice {
    fn open(device_info: nusb::DeviceInfo) -> Result<Self> {
        let serial = device_info
            .serial_number()
            .unwrap_or_default()
            .to_string();
        let product = device_info.product_string().unwrap_or_default().to_string();
        let path = format!(
            "usb:{:03}/{:03}",
            device_info.bus_number(),
            device_info.device_address()
        );

        let usb_device = device_info
            .open()
            .map_err(|e| DeviceError::OpenFailed(format!("USB open: {e}")))?;

        // Claim interface 0 (nusb auto-detaches the kernel HID driver)
        let interface = usb_device
            .claim_interface(0)
            .map_err(|e| DeviceError::OpenFailed(format!("claim interface 0: {e}")))?;

        let release = parse_release(&serial);
        let led_count = led_count_for_release(release);

        Ok(UsbDevice {
            interface,
            info: DeviceInfo {
                path,
                serial,
                product,
                release,
                led_count,
            },
        })
    }

    /// SET_REPORT for a feature report. `data[0]` must be the report ID.
    fn set_report(&self, data: &[u8]) -> Result<()> {
        let control = Control {
            control_type: ControlType::Class,
            recipient: Recipient::Interface,
            request: HID_SET_REPORT,
            value: feature_report(data[0]),
            index: 0,
        };
        self.interface
            .control_out_blocking(control, data, Duration::from_millis(USB_TIMEOUT_MS))
            .map_err(|e| DeviceError::ReportFailed(format!("SET_REPORT({}): {e}", data[0])))?;
        Ok(())
    }

    /// GET_REPORT for a feature report of `length` bytes (report ID included).
    fn get_report(&self, report_id: u8, length: usize) -> Result<Vec<u8>> {
        let control = Control {
            control_type: ControlType::Class,
            recipient: Recipient::Interface,
            request: HID_GET_REPORT,
            value: feature_report(report_id),
            index: 0,
        };
        let mut buf = vec![0u8; length];
        let n = self
            .interface
            .control_in_blocking(control, &mut buf, Duration::from_millis(USB_TIMEOUT_MS))
            .map_err(|e| DeviceError::ReportFailed(format!("GET_REPORT({report_id}): {e}")))?;
        buf.truncate(n);
        Ok(buf)
    }

    fn check_index(&self, index: u16) -> Result<()> {
        if index >= self.info.led_count {
            return Err(DeviceError::IndexOutOfRange {
                index,
                count: self.info.led_count,
            });
        }
        Ok(())
    }
}

impl BlinkStickDevice for UsbDevice {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn get_color(&self, index: u16) -> Result<Rgb> {
        self.check_index(index)?;

        if self.info.led_count == 1 {
            // Single-LED sticks expose their color through report 1.
            let data = self.get_report(REPORT_COLOR, 4)?;
            if data.len() < 4 {
                return Err(DeviceError::ReportFailed(format!(
                    "GET_REPORT({REPORT_COLOR}): short response ({} bytes)",
                    data.len()
                )));
            }
            return Ok(Rgb::new(data[1], data[2], data[3]));
        }

        // Multi-LED sticks report bulk LED data as GRB triples.
        let length = 1 + 3 * self.info.led_count as usize;
        let data = self.get_report(REPORT_LED_DATA, length)?;
        let offset = 1 + 3 * index as usize;
        if data.len() < offset + 3 {
            return Err(DeviceError::ReportFailed(format!(
                "GET_REPORT({REPORT_LED_DATA}): short response ({} bytes)",
                data.len()
            )));
        }
        Ok(Rgb::new(data[offset + 1], data[offset], data[offset + 2]))
    }

    fn set_color(&self, index: u16, color: Rgb) -> Result<()> {
        self.check_index(index)?;

        if self.info.led_count == 1 {
            return self.set_report(&[REPORT_COLOR, color.r, color.g, color.b]);
        }
        self.set_report(&[
            REPORT_INDEXED_COLOR,
            0, // channel
            index as u8,
            color.r,
            color.g,
            color.b,
        ])
    }
}

// ── Mock device (for tests) ──

pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// In-memory device for unit tests. Stores one color per LED;
    /// `set_color` writes, `get_color` reads back. Failure flags let
    /// tests inject I/O errors on either path.
    #[derive(Debug)]
    pub struct MockDevice {
        info: DeviceInfo,
        /// LED color storage, indexed by LED position.
        pub leds: RefCell<Vec<Rgb>>,
        /// Every `set_color` call in order: (index, color).
        pub writes: RefCell<Vec<(u16, Rgb)>>,
        /// If true, `get_color` returns an error.
        pub fail_get_color: Cell<bool>,
        /// If true, `set_color` returns an error.
        pub fail_set_color: Cell<bool>,
    }

    impl Default for MockDevice {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockDevice {
        pub fn new() -> Self {
            Self::with_serial("BS031337-3.0")
        }

        pub fn with_serial(serial: &str) -> Self {
            let release = parse_release(serial);
            let led_count = led_count_for_release(release);
            MockDevice {
                info: DeviceInfo {
                    path: "mock://blinkstick".into(),
                    serial: serial.into(),
                    product: "BlinkStick Square".into(),
                    release,
                    led_count,
                },
                leds: RefCell::new(vec![Rgb::BLACK; led_count as usize]),
                writes: RefCell::new(Vec::new()),
                fail_get_color: Cell::new(false),
                fail_set_color: Cell::new(false),
            }
        }

        /// Preload an LED color without recording a write.
        pub fn preload(&self, index: u16, color: Rgb) {
            self.leds.borrow_mut()[index as usize] = color;
        }

        /// Mutable access to device info (for tests that need a
        /// different product or LED count).
        pub fn info_mut(&mut self) -> &mut DeviceInfo {
            &mut self.info
        }
    }

    impl BlinkStickDevice for MockDevice {
        fn info(&self) -> &DeviceInfo {
            &self.info
        }

        fn get_color(&self, index: u16) -> Result<Rgb> {
            if self.fail_get_color.get() {
                return Err(DeviceError::ReportFailed(
                    "mock: get_color failure injected".into(),
                ));
            }
            if index >= self.info.led_count {
                return Err(DeviceError::IndexOutOfRange {
                    index,
                    count: self.info.led_count,
                });
            }
            Ok(self.leds.borrow()[index as usize])
        }

        fn set_color(&self, index: u16, color: Rgb) -> Result<()> {
            if self.fail_set_color.get() {
                return Err(DeviceError::ReportFailed(
                    "mock: set_color failure injected".into(),
                ));
            }
            if index >= self.info.led_count {
                return Err(DeviceError::IndexOutOfRange {
                    index,
                    count: self.info.led_count,
                });
            }
            self.leds.borrow_mut()[index as usize] = color;
            self.writes.borrow_mut().push((index, color));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockDevice;
    use super::*;

    // ── parse_release ──

    #[test]
    fn parse_release_square() {
        assert_eq!(parse_release("BS031337-3.0"), Some((3, 0)));
    }

    #[test]
    fn parse_release_first_gen() {
        assert_eq!(parse_release("BS000001-1.1"), Some((1, 1)));
    }

    #[test]
    fn parse_release_no_suffix() {
        assert_eq!(parse_release("BS000001"), None);
    }

    #[test]
    fn parse_release_garbage_version() {
        assert_eq!(parse_release("BS000001-x.y"), None);
    }

    // ── led_count_for_release ──

    #[test]
    fn single_led_generations() {
        assert_eq!(led_count_for_release(Some((1, 0))), 1);
        assert_eq!(led_count_for_release(Some((2, 3))), 1);
    }

    #[test]
    fn multi_led_generations() {
        assert_eq!(led_count_for_release(Some((3, 0))), 8);
        assert_eq!(led_count_for_release(None), 8);
    }

    // ── mock device ──

    #[test]
    fn mock_set_then_get() {
        let dev = MockDevice::new();
        dev.set_color(2, Rgb::new(10, 20, 30)).unwrap();
        assert_eq!(dev.get_color(2).unwrap(), Rgb::new(10, 20, 30));
        assert_eq!(dev.writes.borrow().as_slice(), &[(2, Rgb::new(10, 20, 30))]);
    }

    #[test]
    fn mock_index_out_of_range() {
        let dev = MockDevice::new();
        let err = dev.get_color(8).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::IndexOutOfRange { index: 8, count: 8 }
        ));
    }

    #[test]
    fn mock_single_led_serial() {
        let dev = MockDevice::with_serial("BS000042-1.0");
        assert_eq!(dev.led_count(), 1);
        assert!(dev.get_color(1).is_err());
    }

    #[test]
    fn mock_injected_failures() {
        let dev = MockDevice::new();
        dev.fail_get_color.set(true);
        assert!(dev.get_color(0).is_err());
        dev.fail_set_color.set(true);
        assert!(dev.set_color(0, Rgb::BLACK).is_err());
    }

    #[test]
    fn trait_accessors() {
        let dev = MockDevice::new();
        assert_eq!(dev.serial(), "BS031337-3.0");
        assert_eq!(dev.led_count(), 8);
    }
}
