//! Protocol constants for BlinkStick devices.
//!
//! BlinkStick controllers are USB HID devices driven entirely through
//! class-level feature reports on interface 0. Values match the vendor's
//! reference implementation and the USB HID 1.11 class specification.
//!
//! Report layout (feature reports, report ID as first byte):
//! - Report 1: `[1, r, g, b]` — color of the first LED; readable.
//! - Report 5: `[5, channel, index, r, g, b]` — indexed color write for
//!   multi-LED devices (Square, Strip, Flex).
//! - Report 6: `[6, g0, r0, b0, g1, r1, b1, ...]` — bulk LED data for
//!   channel 0; note the **GRB** channel order within each triple.

// ── USB identity ──

/// BlinkStick vendor ID (Agile Innovative Ltd.).
pub const BLINKSTICK_VID: u16 = 0x20A0;

/// BlinkStick product ID — shared across all variants; the generation is
/// encoded in the serial number suffix instead.
pub const BLINKSTICK_PID: u16 = 0x41E5;

// ── HID class requests ──

/// GET_REPORT class request.
pub const HID_GET_REPORT: u8 = 0x01;

/// SET_REPORT class request.
pub const HID_SET_REPORT: u8 = 0x09;

/// Feature report type, placed in the high byte of `wValue`.
pub const HID_REPORT_TYPE_FEATURE: u16 = 0x03;

/// `wValue` for a feature report request with the given report ID.
pub const fn feature_report(report_id: u8) -> u16 {
    (HID_REPORT_TYPE_FEATURE << 8) | report_id as u16
}

// ── Report IDs ──

/// Single color, first LED: `[1, r, g, b]`.
pub const REPORT_COLOR: u8 = 0x01;

/// Indexed color write: `[5, channel, index, r, g, b]`.
pub const REPORT_INDEXED_COLOR: u8 = 0x05;

/// Bulk LED data for channel 0, GRB triples.
pub const REPORT_LED_DATA: u8 = 0x06;

/// Control transfer timeout.
pub const USB_TIMEOUT_MS: u64 = 1000;

/// LED count of multi-LED variants (Square, Strip). Single-LED variants
/// (generation 1.x) carry exactly one.
pub const MULTI_LED_COUNT: u16 = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_report_sets_high_byte() {
        assert_eq!(feature_report(REPORT_COLOR), 0x0301);
        assert_eq!(feature_report(REPORT_INDEXED_COLOR), 0x0305);
        assert_eq!(feature_report(REPORT_LED_DATA), 0x0306);
    }
}
