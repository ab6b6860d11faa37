//! Position fix type and NMEA sentence decoder
//!
//! Decodes the two sentence kinds the rig's receiver emits (`$GPRMC` and
//! `$GPGGA`) into a [`GpsFix`]. Decoding never fails with an error type: any
//! malformed input is logged and yields the zero fix, so the caller always
//! gets a usable, if invalid, value and must call [`GpsFix::is_valid`] before
//! trusting it.
//!
//! Field indices follow what the rig's receiver actually emits, not the NMEA
//! standard layout.

use heapless::String;

/// NMEA line length ceiling (82 chars per the spec, plus CR/LF slack).
pub const MAX_SENTENCE_LEN: usize = 84;

/// Line-oriented source of raw NMEA sentences (serial-style).
///
/// An unavailable or timed-out read yields `None`, not an error; the control
/// loop treats that tick as having no position data.
pub trait SentenceSource {
    fn read_line(&mut self) -> Option<String<MAX_SENTENCE_LEN>>;
}

/// A decoded position fix.
///
/// The all-zero fix is the canonical "no data" sentinel and is never valid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpsFix {
    /// Latitude in degrees, negative south
    pub latitude: f64,
    /// Longitude in degrees, negative west
    pub longitude: f64,
    /// Altitude in meters above sea level, 0 when the sentence carries none
    pub altitude: f64,
}

impl GpsFix {
    /// The "no data" sentinel.
    pub const ZERO: GpsFix = GpsFix {
        latitude: 0.0,
        longitude: 0.0,
        altitude: 0.0,
    };

    pub const fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// A fix is valid iff latitude and longitude are both nonzero; altitude
    /// is additionally required when `no_altitude_ok` is false.
    pub fn is_valid(&self, no_altitude_ok: bool) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0 && (no_altitude_ok || self.altitude != 0.0)
    }
}

/// Decode one NMEA sentence into a fix.
///
/// Returns [`GpsFix::ZERO`] for unsupported, unrecognized, or malformed
/// input.
pub fn decode(sentence: &str) -> GpsFix {
    if sentence.starts_with("$GPRMC") {
        from_gprmc(sentence)
    } else if sentence.starts_with("$GPGGA") {
        from_gpgga(sentence)
    } else if sentence.starts_with("$GP") {
        crate::log_debug!("Unsupported NMEA sentence");
        GpsFix::ZERO
    } else {
        crate::log_warn!("Unrecognized sentence");
        GpsFix::ZERO
    }
}

/// Recommended-minimum sentence: latitude at fields 2/3, longitude at 4/5.
fn from_gprmc(sentence: &str) -> GpsFix {
    crate::log_debug!("Decoding $GPRMC");
    let count = sentence.split(',').count();
    if count != 12 {
        crate::log_warn!("$GPRMC unexpected field count {}", count);
    }
    if count < 6 {
        return GpsFix::ZERO;
    }
    let mut fields = sentence.split(',');
    let latitude = coordinate(field(&mut fields, 2), fields.next().unwrap_or(""));
    let longitude = coordinate(fields.next().unwrap_or(""), fields.next().unwrap_or(""));
    GpsFix::new(latitude, longitude, 0.0)
}

/// Fix-data sentence: latitude at fields 1/2, longitude at 3/4, satellite
/// count at 5, altitude at 8.
fn from_gpgga(sentence: &str) -> GpsFix {
    crate::log_debug!("Decoding $GPGGA");
    let count = sentence.split(',').count();
    if count != 15 {
        crate::log_warn!("$GPGGA unexpected field count {}", count);
    }
    if count < 9 {
        return GpsFix::ZERO;
    }
    let mut fields = sentence.split(',');
    let lat_value = field(&mut fields, 1);
    let lat_hemi = fields.next().unwrap_or("");
    let lon_value = fields.next().unwrap_or("");
    let lon_hemi = fields.next().unwrap_or("");
    let sats_field = fields.next().unwrap_or("");
    let alt_field = field(&mut fields, 2);

    let mut num_sats: i32 = -1;
    let mut altitude: Option<f64> = None;
    match sats_field.parse::<i32>() {
        Ok(n) => {
            num_sats = n;
            match alt_field.parse::<f64>() {
                Ok(a) => altitude = Some(a),
                Err(_) => crate::log_warn!("Invalid altitude field"),
            }
        }
        Err(_) => crate::log_warn!("Invalid satellite count field"),
    }

    if num_sats < 1 {
        crate::log_warn!("Insufficient satellite count");
        return GpsFix::ZERO;
    }
    match altitude {
        Some(alt) => GpsFix::new(
            coordinate(lat_value, lat_hemi),
            coordinate(lon_value, lon_hemi),
            alt,
        ),
        None => GpsFix::ZERO,
    }
}

/// Take the item `skip` positions ahead in the field iterator.
fn field<'a>(fields: &mut core::str::Split<'a, char>, skip: usize) -> &'a str {
    fields.nth(skip).unwrap_or("")
}

/// Convert a degrees/minutes value plus hemisphere into signed degrees.
///
/// All integer digits except the last two are whole degrees; the last two
/// integer digits plus the fraction are minutes ("4807.038" is 48 degrees,
/// 7.038 minutes). S and W negate. Any malformed part yields 0, which
/// propagates into a fix that callers must validate before use.
fn coordinate(value: &str, hemisphere: &str) -> f64 {
    let sign = match hemisphere {
        "N" | "n" | "E" | "e" => 1.0,
        "S" | "s" | "W" | "w" => -1.0,
        _ => {
            crate::log_warn!("Invalid lat/long orientation");
            return 0.0;
        }
    };

    let mut parts = value.split('.');
    let whole = parts.next().unwrap_or("");
    let frac = match parts.next() {
        Some(f) if parts.next().is_none() && whole.len() >= 2 => f,
        _ => {
            crate::log_warn!("Invalid coordinate");
            return 0.0;
        }
    };

    let (deg_digits, min_digits) = whole.split_at(whole.len() - 2);
    let degrees: f64 = if deg_digits.is_empty() {
        0.0
    } else {
        match deg_digits.parse() {
            Ok(d) => d,
            Err(_) => {
                crate::log_warn!("Invalid coordinate degrees");
                return 0.0;
            }
        }
    };

    let mut minutes_str: String<24> = String::new();
    if minutes_str.push_str(min_digits).is_err()
        || minutes_str.push('.').is_err()
        || minutes_str.push_str(frac).is_err()
    {
        crate::log_warn!("Coordinate value too long");
        return 0.0;
    }
    let minutes: f64 = match minutes_str.parse() {
        Ok(m) => m,
        Err(_) => {
            crate::log_warn!("Invalid coordinate minutes");
            return 0.0;
        }
    };

    (degrees + minutes / 60.0) * sign
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_conversion_north() {
        let v = coordinate("4807.038", "N");
        assert!((v - (48.0 + 7.038 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_hemisphere_signs() {
        assert!(coordinate("4807.038", "n") >= 0.0);
        assert!(coordinate("4807.038", "E") >= 0.0);
        assert!(coordinate("4807.038", "S") <= 0.0);
        assert!(coordinate("01131.000", "w") <= 0.0);
    }

    #[test]
    fn test_coordinate_two_integer_digits_is_pure_minutes() {
        // "07.038" has no degree digits: 0 degrees, 7.038 minutes
        let v = coordinate("07.038", "N");
        assert!((v - 7.038 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_rejects_malformed() {
        assert_eq!(coordinate("4807.038", "Q"), 0.0);
        assert_eq!(coordinate("4807.038", ""), 0.0);
        assert_eq!(coordinate("7.038", "N"), 0.0); // one integer digit
        assert_eq!(coordinate("4807", "N"), 0.0); // no decimal point
        assert_eq!(coordinate("48.07.038", "N"), 0.0);
        assert_eq!(coordinate("48ab.038", "N"), 0.0);
    }

    #[test]
    fn test_gprmc_too_few_fields_is_zero() {
        assert_eq!(decode("$GPRMC,123519,A"), GpsFix::ZERO);
    }

    #[test]
    fn test_gprmc_decodes_position() {
        // Field layout as the rig's receiver emits it: value/hemisphere at
        // 2/3 and 4/5.
        let fix = decode("$GPRMC,123519,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W,*6A");
        assert!((fix.latitude - (48.0 + 7.038 / 60.0)).abs() < 1e-9);
        assert!((fix.longitude - (11.0 + 31.0 / 60.0)).abs() < 1e-9);
        assert_eq!(fix.altitude, 0.0);
        assert!(fix.is_valid(true));
        assert!(!fix.is_valid(false)); // altitude required but absent
    }

    #[test]
    fn test_gpgga_decodes_position_with_altitude() {
        let fix = decode("$GPGGA,4807.038,N,01131.000,E,8,1,0.9,545.4,M,46.9,M,,,*47");
        assert!((fix.latitude - (48.0 + 7.038 / 60.0)).abs() < 1e-9);
        assert!((fix.altitude - 545.4).abs() < 1e-9);
        assert!(fix.is_valid(false));
    }

    #[test]
    fn test_gpgga_requires_satellites() {
        let fix = decode("$GPGGA,4807.038,N,01131.000,E,0,1,0.9,545.4,M,46.9,M,,,*47");
        assert_eq!(fix, GpsFix::ZERO);
    }

    #[test]
    fn test_gpgga_unparseable_satellites_or_altitude_is_zero() {
        let bad_sats = decode("$GPGGA,4807.038,N,01131.000,E,x,1,0.9,545.4,M,46.9,M,,,*47");
        assert_eq!(bad_sats, GpsFix::ZERO);
        let bad_alt = decode("$GPGGA,4807.038,N,01131.000,E,8,1,0.9,bad,M,46.9,M,,,*47");
        assert_eq!(bad_alt, GpsFix::ZERO);
    }

    #[test]
    fn test_unsupported_and_unrecognized_sentences() {
        assert_eq!(decode("$GPGSV,3,1,11,03,03,111,00*74"), GpsFix::ZERO);
        assert_eq!(decode("hello world"), GpsFix::ZERO);
        assert_eq!(decode(""), GpsFix::ZERO);
    }

    #[test]
    fn test_zero_fix_never_valid() {
        assert!(!GpsFix::ZERO.is_valid(true));
        assert!(!GpsFix::ZERO.is_valid(false));
        assert!(GpsFix::new(1.0, 2.0, 0.0).is_valid(true));
        assert!(!GpsFix::new(1.0, 2.0, 0.0).is_valid(false));
        assert!(!GpsFix::new(0.0, 2.0, 5.0).is_valid(true));
    }
}
