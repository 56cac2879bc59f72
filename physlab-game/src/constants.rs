//! Centralized physics and content constants for the built-in games.
//!
//! Control domains and model baselines live here so the catalog and the
//! models agree on the same numbers.

// Gas laws -----------------------------------------------------------------
pub const VOLUME_MIN: f64 = 25.0;
pub const VOLUME_MAX: f64 = 200.0;
pub const VOLUME_DEFAULT: f64 = 100.0;
pub const TEMPERATURE_MIN: f64 = 200.0;
pub const TEMPERATURE_MAX: f64 = 500.0;
pub const TEMPERATURE_DEFAULT: f64 = 300.0;
/// Reference pressure in atm at the baseline volume.
pub const BOYLE_PRESSURE0: f64 = 1.0;
pub const BOYLE_VOLUME0: f64 = 100.0;
pub const CHARLES_VOLUME0: f64 = 100.0;
pub const CHARLES_TEMPERATURE0: f64 = 300.0;

// Satellite solar ----------------------------------------------------------
pub const PANEL_ANGLE_MIN: f64 = -90.0;
pub const PANEL_ANGLE_MAX: f64 = 90.0;
pub const PANEL_ANGLE_DEFAULT: f64 = 0.0;
pub const BETA_ANGLE_MIN: f64 = 0.0;
pub const BETA_ANGLE_MAX: f64 = 90.0;
pub const BETA_ANGLE_DEFAULT: f64 = 0.0;
pub const ORBIT_POSITION_DEFAULT: f64 = 0.0;
/// Sun direction in the orbit frame; the sun sits at 0°.
pub const SUN_DIRECTION: f64 = 0.0;
/// Degrees of orbit in shadow at beta = 0.
pub const MAX_ECLIPSE_ARC: f64 = 60.0;
pub const FULL_POWER_PERCENT: f64 = 100.0;

// Chladni ------------------------------------------------------------------
pub const FREQUENCY_MIN: f64 = 100.0;
pub const FREQUENCY_MAX: f64 = 600.0;
pub const FREQUENCY_DEFAULT: f64 = 100.0;
pub const TWIST_FREQUENCY_DEFAULT: f64 = 300.0;
pub const PLATE_SIZE_MIN: f64 = 0.5;
pub const PLATE_SIZE_MAX: f64 = 2.0;
pub const PLATE_SIZE_DEFAULT: f64 = 1.0;
/// Upper bounds (exclusive) of the frequency buckets, paired with `(m, n)`.
pub const CHLADNI_BUCKETS: [(f64, (u8, u8)); 5] = [
    (150.0, (1, 1)),
    (250.0, (2, 1)),
    (350.0, (2, 2)),
    (450.0, (3, 2)),
    (550.0, (3, 3)),
];
pub const CHLADNI_TOP_MODE: (u8, u8) = (4, 3);

// Retroreflection ----------------------------------------------------------
pub const INCIDENCE_MIN: f64 = -60.0;
pub const INCIDENCE_MAX: f64 = 60.0;
pub const INCIDENCE_DEFAULT: f64 = 0.0;
pub const CORNER_ANGLE_MIN: f64 = 60.0;
pub const CORNER_ANGLE_MAX: f64 = 120.0;
pub const CORNER_ANGLE_DEFAULT: f64 = 90.0;
/// Beyond this incidence a 2-D right-angle corner no longer sees both mirrors.
pub const CORNER_ACCEPTANCE: f64 = 45.0;
/// Return error, in degrees, still counted as "back to the source".
pub const RETRO_TOLERANCE: f64 = 1.0;

// Flow ---------------------------------------------------------------------
pub const DEFAULT_TRANSFER_APPS: usize = 4;
/// Failed attempts before the session reports the learner as struggling.
pub const STRUGGLE_AFTER_FAILED_ATTEMPTS: u32 = 2;
