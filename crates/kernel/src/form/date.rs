//! Date field modes and the attributes consumed by the client date picker.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::FormError;

/// Picker settings shared by every date field of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePickerSettings {
    /// Display mask in PHP-style notation (`d/m/Y`).
    pub mask: String,

    /// First day of the week, 0 = Sunday.
    pub first_day: u8,
}

impl Default for DatePickerSettings {
    fn default() -> Self {
        Self {
            mask: "d/m/Y".to_string(),
            first_day: 1,
        }
    }
}

impl DatePickerSettings {
    /// Mask in the notation the picker widget understands (`dd/mm/yy`).
    pub fn picker_mask(&self) -> String {
        let mut out = String::with_capacity(self.mask.len() * 2);
        for c in self.mask.chars() {
            match c {
                'd' => out.push_str("dd"),
                'm' => out.push_str("mm"),
                'Y' => out.push_str("yy"),
                'j' => out.push('d'),
                'n' => out.push('m'),
                other => out.push(other),
            }
        }
        out
    }

    /// Format a timestamp for display in the input box.
    pub fn display(&self, timestamp: i64) -> Option<String> {
        let pattern = self.strftime(false);
        DateTime::from_timestamp(timestamp, 0).map(|dt| dt.format(&pattern).to_string())
    }

    /// Parse a displayed value back into a date.
    pub fn parse(&self, value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), &self.strftime(true)).ok()
    }

    fn strftime(&self, parsing: bool) -> String {
        let mut out = String::with_capacity(self.mask.len() * 3);
        for c in self.mask.chars() {
            match c {
                'd' => out.push_str("%d"),
                'm' => out.push_str("%m"),
                'Y' => out.push_str("%Y"),
                'y' => out.push_str("%y"),
                'j' if parsing => out.push_str("%d"),
                'n' if parsing => out.push_str("%m"),
                'j' => out.push_str("%-d"),
                'n' => out.push_str("%-m"),
                '%' => out.push_str("%%"),
                other => out.push(other),
            }
        }
        out
    }
}

/// Which end(s) of the calendar a date field constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    #[default]
    None,
    From,
    Till,
    Range,
}

impl DateMode {
    /// Interpret a mode parameter. Anything unrecognised means no constraint.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("from") => Self::From,
            Some("till") => Self::Till,
            Some("range") => Self::Range,
            _ => Self::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::From => "from",
            Self::Till => "till",
            Self::Range => "range",
        }
    }

    /// Classes appended to the normal and error class strings.
    pub(crate) fn class_suffixes(&self) -> (&'static str, &'static str) {
        match self {
            Self::None => ("inputDatefieldNormal", "inputDatefieldNormal"),
            Self::From => (
                "atrium-form-date-from inputDatefieldFrom",
                "inputDatefieldFrom",
            ),
            Self::Till => (
                "atrium-form-date-till inputDatefieldTill",
                "inputDatefieldTill",
            ),
            Self::Range => (
                "atrium-form-date-range inputDatefieldRange",
                "inputDatefieldRange",
            ),
        }
    }

    /// Build the picker attributes for this mode.
    ///
    /// `from` and `till` read the first bound, `range` reads both. A bound
    /// that is absent, zero, negative, or outside chrono's range is missing.
    pub fn attributes(
        &self,
        field: &str,
        bound: Option<i64>,
        bound2: Option<i64>,
        settings: &DatePickerSettings,
    ) -> Result<BTreeMap<String, String>, FormError> {
        let missing = || FormError::MissingBound {
            field: field.to_string(),
            mode: *self,
        };

        let mut attributes = BTreeMap::new();
        attributes.insert("data-mask".to_string(), settings.picker_mask());
        attributes.insert("data-firstday".to_string(), settings.first_day.to_string());

        match self {
            Self::None => {}
            Self::From => {
                let start = bound.and_then(iso_date).ok_or_else(missing)?;
                attributes.insert("data-startdate".to_string(), start);
            }
            Self::Till => {
                let end = bound.and_then(iso_date).ok_or_else(missing)?;
                attributes.insert("data-enddate".to_string(), end);
            }
            Self::Range => {
                let start = bound.and_then(iso_date).ok_or_else(missing)?;
                let end = bound2.and_then(iso_date).ok_or_else(missing)?;
                attributes.insert("data-startdate".to_string(), start);
                attributes.insert("data-enddate".to_string(), end);
            }
        }

        Ok(attributes)
    }
}

impl fmt::Display for DateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a positive timestamp as `YYYY-MM-DD` (UTC).
pub fn iso_date(timestamp: i64) -> Option<String> {
    if timestamp <= 0 {
        return None;
    }
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // 2024-01-01T00:00:00Z and 2024-01-31T00:00:00Z
    const JAN_1: i64 = 1_704_067_200;
    const JAN_31: i64 = 1_706_659_200;

    #[test]
    fn test_picker_mask_translation() {
        let settings = DatePickerSettings::default();
        assert_eq!(settings.picker_mask(), "dd/mm/yy");

        let settings = DatePickerSettings {
            mask: "j-n-Y".to_string(),
            first_day: 0,
        };
        assert_eq!(settings.picker_mask(), "d-m-yy");
    }

    #[test]
    fn test_mode_from_param() {
        assert_eq!(DateMode::from_param(Some("from")), DateMode::From);
        assert_eq!(DateMode::from_param(Some("till")), DateMode::Till);
        assert_eq!(DateMode::from_param(Some("range")), DateMode::Range);
        assert_eq!(DateMode::from_param(Some("sometime")), DateMode::None);
        assert_eq!(DateMode::from_param(None), DateMode::None);
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(iso_date(JAN_1).as_deref(), Some("2024-01-01"));
        assert_eq!(iso_date(0), None);
        assert_eq!(iso_date(-5), None);
    }

    #[test]
    fn test_range_attributes() {
        let attrs = DateMode::Range
            .attributes("period", Some(JAN_1), Some(JAN_31), &DatePickerSettings::default())
            .unwrap();
        assert_eq!(attrs["data-startdate"], "2024-01-01");
        assert_eq!(attrs["data-enddate"], "2024-01-31");
        assert_eq!(attrs["data-mask"], "dd/mm/yy");
        assert_eq!(attrs["data-firstday"], "1");
    }

    #[test]
    fn test_till_uses_first_bound() {
        let attrs = DateMode::Till
            .attributes("until", Some(JAN_31), None, &DatePickerSettings::default())
            .unwrap();
        assert_eq!(attrs["data-enddate"], "2024-01-31");
        assert!(!attrs.contains_key("data-startdate"));
    }

    #[test]
    fn test_missing_bounds() {
        let settings = DatePickerSettings::default();
        for mode in [DateMode::From, DateMode::Till] {
            for bound in [None, Some(0)] {
                let err = mode.attributes("d", bound, None, &settings).unwrap_err();
                assert_eq!(
                    err,
                    FormError::MissingBound {
                        field: "d".to_string(),
                        mode
                    }
                );
            }
        }
        assert!(
            DateMode::Range
                .attributes("d", Some(JAN_1), Some(0), &settings)
                .is_err()
        );
        assert!(
            DateMode::Range
                .attributes("d", None, Some(JAN_31), &settings)
                .is_err()
        );
    }

    #[test]
    fn test_display_and_parse_roundtrip_with_mask() {
        let settings = DatePickerSettings::default();
        assert_eq!(settings.display(JAN_31).as_deref(), Some("31/01/2024"));
        assert_eq!(
            settings.parse("31/01/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 31)
        );
        assert_eq!(settings.parse("2024-01-31"), None);
    }
}
