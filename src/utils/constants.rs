use chrono::{DateTime, TimeZone, Utc};

/// Sentinel standing in for a missing floating-point value in storage
pub const FP_MISSING_VALUE: f64 = -1.0E34;

/// Sentinel standing in for a missing integer value
pub const INT_MISSING_VALUE: i32 = -1;

/// Default value for generic character columns
pub const CHAR_MISSING_VALUE: char = ' ';

/// Default value for string columns
pub const STRING_MISSING_VALUE: &str = "";

/// WOCE flag meaning "acceptable / not checked by a human"
pub const WOCE_NOT_CHECKED: char = '2';

/// WOCE flag meaning "questionable"
pub const WOCE_QUESTIONABLE: char = '3';

/// WOCE flag meaning "bad"
pub const WOCE_BAD: char = '4';

/// Region ID covering the whole globe
pub const GLOBAL_REGION_ID: char = 'G';

/// Default relative tolerance for comparing floating-point data values
pub const MAX_RELATIVE_ERROR: f64 = 1.0E-6;

/// Default absolute tolerance for comparing floating-point data values
pub const MAX_ABSOLUTE_ERROR: f64 = 1.0E-6;

/// Longitude tolerance (degrees) for direct row-number WOCE flag assignment
pub const WOCE_LONGITUDE_TOLERANCE: f64 = 0.006;

/// Latitude tolerance (degrees) for direct row-number WOCE flag assignment
pub const WOCE_LATITUDE_TOLERANCE: f64 = 0.01;

/// Time tolerance (seconds) for direct row-number WOCE flag assignment
pub const WOCE_TIME_TOLERANCE: f64 = 1.0;

/// Position/time tolerance for round-robin WOCE flag reconciliation.
/// Deliberately much tighter than the direct-assignment tolerances.
pub const WOCE_RECONCILE_TOLERANCE: f64 = 1.0E-5;

/// Fixed-width string variables are sized in blocks of this many characters
pub const STRING_LENGTH_BLOCK: usize = 32;

/// Smallest allowed width of the string_length dimension
pub const MIN_STRING_LENGTH: usize = 32;

/// Far-future sentinel standing in for a missing date value
pub fn date_missing_value() -> DateTime<Utc> {
    // 3000-01-02 is always representable, so this cannot fire
    match Utc.with_ymd_and_hms(3000, 1, 2, 0, 0, 0) {
        chrono::LocalResult::Single(dt) => dt,
        _ => unreachable!("sentinel date is a fixed valid instant"),
    }
}

/// True when `value` is within `rel_err` relative or `abs_err` absolute
/// error of `expected`
pub fn close_to(value: f64, expected: f64, rel_err: f64, abs_err: f64) -> bool {
    let diff = (value - expected).abs();
    if diff <= abs_err {
        return true;
    }
    diff <= rel_err * value.abs().max(expected.abs())
}

/// Fold a longitude into the canonical [-180, 180) range
pub fn fold_longitude(longitude: f64) -> f64 {
    let mut folded = longitude % 360.0;
    if folded >= 180.0 {
        folded -= 360.0;
    } else if folded < -180.0 {
        folded += 360.0;
    }
    folded
}

/// Longitude comparison tolerant of the 360 degree wrap-around
pub fn longitudes_close(value: f64, expected: f64, rel_err: f64, abs_err: f64) -> bool {
    close_to(value, expected, rel_err, abs_err)
        || close_to(value + 360.0, expected, rel_err, abs_err)
        || close_to(value, expected + 360.0, rel_err, abs_err)
}
