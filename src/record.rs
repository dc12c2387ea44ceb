//! # Timesheet Record
//!
//! Turns the raw submitted form fields into a normalized [`TimesheetRecord`]:
//! trimmed and length-capped strings, a break restricted to 0/30/60 minutes,
//! and a total recomputed from the shift times.
//!
//! ## Total hours
//!
//! ```text
//! end < start  →  end += 24h          (overnight shift)
//! worked       =  max(0, end - start - break)
//! hours        =  round(worked / 60 × 4) / 4
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::TimesheetError;

/// Raw form fields, keyed by the form's field names.
pub type FormFields = HashMap<String, String>;

/// Choice value that switches a select to its free-text companion.
pub const OTHER_CHOICE: &str = "Other";

/// The only accepted break lengths in minutes.
pub const BREAK_CHOICES: [u32; 3] = [0, 30, 60];

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Per-field character caps applied before any pixel fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLimits {
    pub name: usize,
    /// Care home and job role (choice or free text).
    pub choice: usize,
    /// The job role shown in the narrow table cell.
    pub job_role_short: usize,
    /// `None` leaves remarks uncapped.
    pub remarks: Option<usize>,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            name: 20,
            choice: 25,
            job_role_short: 16,
            remarks: Some(11),
        }
    }
}

/// One normalized submission, ready for the compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct TimesheetRecord {
    pub employee_name: String,
    pub care_home: String,
    pub job_role: String,
    pub job_role_short: String,
    /// As submitted (`YYYY-MM-DD`).
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub break_minutes: u32,
    pub total_hours: f64,
    pub remarks: String,
}

impl TimesheetRecord {
    /// Build a record from form fields using the default caps.
    pub fn from_fields(fields: &FormFields) -> Result<Self, TimesheetError> {
        Self::from_fields_with(fields, &FieldLimits::default())
    }

    /// Build a record from form fields.
    ///
    /// Any `totalHours` present in `fields` is ignored; the total is always
    /// derived from the shift times.
    pub fn from_fields_with(
        fields: &FormFields,
        limits: &FieldLimits,
    ) -> Result<Self, TimesheetError> {
        let field = |key: &str| fields.get(key).map(String::as_str).unwrap_or("");

        let employee_name = required("Name", limit_chars(field("name"), limits.name))?;
        let care_home = required(
            "Care home",
            resolve_choice(field("careHome"), field("careHomeOther"), limits.choice),
        )?;
        let job_role = required(
            "Job role",
            resolve_choice(field("jobRole"), field("jobRoleOther"), limits.choice),
        )?;
        let job_role_short = limit_chars_with_ellipsis(&job_role, limits.job_role_short);

        let date = required("Date", field("date").trim().to_string())?;
        let start_time = required("Start time", field("startTime").trim().to_string())?;
        let end_time = required("End time", field("endTime").trim().to_string())?;

        let start = parse_clock(&start_time).ok_or_else(|| {
            TimesheetError::validation(format!("Start time must be HH:MM, got '{}'", start_time))
        })?;
        let end = parse_clock(&end_time).ok_or_else(|| {
            TimesheetError::validation(format!("End time must be HH:MM, got '{}'", end_time))
        })?;

        let break_minutes = normalize_break_minutes(field("breakMins"));
        let total_hours = total_hours(start, end, break_minutes);

        let remarks = match limits.remarks {
            Some(max) => limit_chars(field("remarks"), max),
            None => field("remarks").trim().to_string(),
        };

        Ok(Self {
            employee_name,
            care_home,
            job_role,
            job_role_short,
            date,
            start_time,
            end_time,
            break_minutes,
            total_hours,
            remarks,
        })
    }

    /// Date as printed on the sheet (`DD/MM/YYYY`).
    pub fn sheet_date(&self) -> String {
        format_date_for_sheet(&self.date)
    }

    /// Total hours as printed on the sheet.
    pub fn total_hours_label(&self) -> String {
        format_hours(self.total_hours)
    }

    /// Serializable metadata sent alongside the rendered image.
    pub fn meta(&self) -> SubmissionMeta {
        SubmissionMeta {
            name: self.employee_name.clone(),
            care_home: self.care_home.clone(),
            job_role_top: self.job_role.clone(),
            job_role_row: self.job_role_short.clone(),
            date: self.date.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            break_mins: self.break_minutes,
            total_hours: self.total_hours,
            remarks: self.remarks.clone(),
        }
    }

    /// File name for the rendered sheet: `timesheet_<name>_<millis>.png`.
    pub fn file_name(&self, timestamp_millis: i64) -> String {
        let safe_name = self.employee_name.split_whitespace().collect::<Vec<_>>().join("_");
        let safe_name = if safe_name.is_empty() {
            "employee".to_string()
        } else {
            safe_name
        };
        format!("timesheet_{}_{}.png", safe_name, timestamp_millis)
    }
}

/// Metadata JSON uploaded with the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMeta {
    pub name: String,
    pub care_home: String,
    pub job_role_top: String,
    pub job_role_row: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub break_mins: u32,
    pub total_hours: f64,
    #[serde(default)]
    pub remarks: String,
}

fn required(label: &str, value: String) -> Result<String, TimesheetError> {
    if value.is_empty() {
        Err(TimesheetError::validation(format!("{} is required", label)))
    } else {
        Ok(value)
    }
}

/// Pick the free-text value when the choice is "Other", otherwise the choice itself.
pub fn resolve_choice(choice: &str, other: &str, max: usize) -> String {
    if choice.trim() == OTHER_CHOICE {
        limit_chars(other, max)
    } else {
        limit_chars(choice, max)
    }
}

/// Trim and keep at most `max` characters.
pub fn limit_chars(s: &str, max: usize) -> String {
    s.trim().chars().take(max).collect()
}

/// Trim and cap at `max` characters, marking a cut with a trailing `…`.
///
/// For `max <= 1` there is no room for the marker and a plain prefix is kept.
pub fn limit_chars_with_ellipsis(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 1 {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

/// Restrict a submitted break to 0, 30 or 60 minutes. Anything else is 0.
pub fn normalize_break_minutes(raw: &str) -> u32 {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return 0;
    };
    BREAK_CHOICES
        .iter()
        .copied()
        .find(|&choice| choice as f64 == value)
        .unwrap_or(0)
}

/// Parse `HH:MM` (24-hour) into minutes since midnight.
pub fn parse_clock(raw: &str) -> Option<u32> {
    let (h, m) = raw.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    if h < 24 && m < 60 {
        Some(h * 60 + m)
    } else {
        None
    }
}

/// Worked hours between two clock times, rounded to the nearest quarter hour.
pub fn total_hours(start_minutes: u32, end_minutes: u32, break_minutes: u32) -> f64 {
    let end = if end_minutes < start_minutes {
        end_minutes + MINUTES_PER_DAY
    } else {
        end_minutes
    };
    let worked = (end as i64 - start_minutes as i64 - break_minutes as i64).max(0);
    (worked as f64 / 60.0 * 4.0).round() / 4.0
}

/// Shortest decimal form: `8`, `8.5`, `7.25`.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{:.0}", hours)
    } else {
        let s = format!("{:.2}", hours);
        s.trim_end_matches('0').to_string()
    }
}

/// `YYYY-MM-DD` → `DD/MM/YYYY`. Anything without a dash-separated triple is returned unchanged.
pub fn format_date_for_sheet(raw: &str) -> String {
    let mut parts = raw.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(y), Some(m), Some(d)) if !y.is_empty() && !m.is_empty() && !d.is_empty() => {
            format!("{}/{}/{}", d, m, y)
        }
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid_fields() -> FormFields {
        fields(&[
            ("name", "  Jane Doe  "),
            ("careHome", "Rose Court"),
            ("jobRole", "Senior Care Assistant"),
            ("date", "2026-02-05"),
            ("startTime", "09:00"),
            ("endTime", "17:30"),
            ("breakMins", "30"),
            ("remarks", "Covered the late shift"),
        ])
    }

    #[test]
    fn test_total_hours_day_shift() {
        assert_eq!(total_hours(9 * 60, 17 * 60 + 30, 30), 8.0);
    }

    #[test]
    fn test_total_hours_overnight() {
        assert_eq!(total_hours(22 * 60, 6 * 60, 0), 8.0);
    }

    #[test]
    fn test_total_hours_never_negative() {
        assert_eq!(total_hours(9 * 60, 9 * 60 + 10, 60), 0.0);
    }

    #[test]
    fn test_total_hours_rounds_to_quarter() {
        // 7h 20m → 7.25, 7h 23m → 7.5
        assert_eq!(total_hours(0, 7 * 60 + 20, 0), 7.25);
        assert_eq!(total_hours(0, 7 * 60 + 23, 0), 7.5);
    }

    #[test]
    fn test_break_normalization() {
        for raw in ["15", "-10", "abc", "", "45"] {
            assert_eq!(normalize_break_minutes(raw), 0, "input {:?}", raw);
        }
        assert_eq!(normalize_break_minutes("0"), 0);
        assert_eq!(normalize_break_minutes("30"), 30);
        assert_eq!(normalize_break_minutes(" 60 "), 60);
    }

    #[test]
    fn test_date_reformatting() {
        assert_eq!(format_date_for_sheet("2026-02-05"), "05/02/2026");
        assert_eq!(format_date_for_sheet(""), "");
        assert_eq!(format_date_for_sheet("badinput"), "badinput");
        assert_eq!(format_date_for_sheet("2026-02"), "2026-02");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(8.0), "8");
        assert_eq!(format_hours(8.5), "8.5");
        assert_eq!(format_hours(7.25), "7.25");
        assert_eq!(format_hours(0.0), "0");
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("09:00"), Some(540));
        assert_eq!(parse_clock("23:59"), Some(1439));
        assert_eq!(parse_clock("24:00"), None);
        assert_eq!(parse_clock("9"), None);
        assert_eq!(parse_clock("ab:cd"), None);
    }

    #[test]
    fn test_limit_chars_counts_characters() {
        assert_eq!(limit_chars("  héllo wörld  ", 5), "héllo");
        assert_eq!(limit_chars("short", 20), "short");
    }

    #[test]
    fn test_limit_chars_with_ellipsis() {
        assert_eq!(
            limit_chars_with_ellipsis("Senior Care Assistant", 16),
            "Senior Care Ass…"
        );
        assert_eq!(limit_chars_with_ellipsis("Nurse", 16), "Nurse");
        assert_eq!(limit_chars_with_ellipsis("Nurse", 1), "N");
    }

    #[test]
    fn test_record_from_fields() {
        let record = TimesheetRecord::from_fields(&valid_fields()).unwrap();

        assert_eq!(record.employee_name, "Jane Doe");
        assert_eq!(record.job_role, "Senior Care Assistant");
        assert_eq!(record.job_role_short, "Senior Care Ass…");
        assert_eq!(record.break_minutes, 30);
        assert_eq!(record.total_hours, 8.0);
        assert_eq!(record.remarks, "Covered the");
        assert_eq!(record.sheet_date(), "05/02/2026");
    }

    #[test]
    fn test_stale_total_is_ignored() {
        let mut f = valid_fields();
        f.insert("totalHours".to_string(), "12".to_string());
        let record = TimesheetRecord::from_fields(&f).unwrap();
        assert_eq!(record.total_hours, 8.0);
    }

    #[test]
    fn test_other_choice_uses_free_text() {
        let mut f = valid_fields();
        f.insert("careHome".to_string(), "Other".to_string());
        f.insert(
            "careHomeOther".to_string(),
            "  A Very Long Care Home Name Indeed  ".to_string(),
        );
        let record = TimesheetRecord::from_fields(&f).unwrap();
        assert_eq!(record.care_home, "A Very Long Care Home Nam");
    }

    #[test]
    fn test_other_choice_without_text_is_rejected() {
        let mut f = valid_fields();
        f.insert("jobRole".to_string(), "Other".to_string());
        let err = TimesheetRecord::from_fields(&f).unwrap_err();
        assert_eq!(err.to_string(), "Job role is required");
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let mut f = valid_fields();
        f.insert("name".to_string(), "   ".to_string());
        let err = TimesheetRecord::from_fields(&f).unwrap_err();
        assert!(matches!(err, TimesheetError::Validation(_)));
    }

    #[test]
    fn test_bad_time_is_rejected() {
        let mut f = valid_fields();
        f.insert("endTime".to_string(), "5pm".to_string());
        assert!(TimesheetRecord::from_fields(&f).is_err());
    }

    #[test]
    fn test_uncapped_remarks() {
        let limits = FieldLimits {
            remarks: None,
            ..Default::default()
        };
        let record = TimesheetRecord::from_fields_with(&valid_fields(), &limits).unwrap();
        assert_eq!(record.remarks, "Covered the late shift");
    }

    #[test]
    fn test_meta_round_trips_through_json() {
        let record = TimesheetRecord::from_fields(&valid_fields()).unwrap();
        let json = serde_json::to_string(&record.meta()).unwrap();
        assert!(json.contains("\"jobRoleTop\":\"Senior Care Assistant\""));

        let back: SubmissionMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record.meta());
    }

    #[test]
    fn test_file_name() {
        let record = TimesheetRecord::from_fields(&valid_fields()).unwrap();
        assert_eq!(
            record.file_name(1_700_000_000_000),
            "timesheet_Jane_Doe_1700000000000.png"
        );
    }
}
