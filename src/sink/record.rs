use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset, macros::format_description};

use crate::evaluation::ReflectionInput;

fn default_title_suffix() -> String {
    "나필사".to_string()
}

fn default_utc_offset_hours() -> i8 {
    9
}

/// Header shown above the form; the sink receives it as `formTitle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// `YYYY-MM-DD`; today's date is used when unset.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default = "default_title_suffix")]
    pub title_suffix: String,
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i8,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            date: None,
            title_suffix: default_title_suffix(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl FormConfig {
    pub fn offset(&self) -> UtcOffset {
        UtcOffset::from_hms(self.utc_offset_hours, 0, 0).unwrap_or_else(|err| {
            tracing::warn!(
                target: "sink",
                utc_offset_hours = self.utc_offset_hours,
                error = %err,
                "form_offset_invalid_using_utc"
            );
            UtcOffset::UTC
        })
    }

    fn title_date(&self, local_now: OffsetDateTime) -> Date {
        let Some(configured) = self.date.as_deref() else {
            return local_now.date();
        };
        Date::parse(configured.trim(), format_description!("[year]-[month]-[day]")).unwrap_or_else(
            |err| {
                tracing::warn!(
                    target: "sink",
                    date = %configured,
                    error = %err,
                    "form_date_invalid_using_today"
                );
                local_now.date()
            },
        )
    }
}

/// Row sent to the spreadsheet endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkRecord {
    pub form_title: String,
    pub student_info: String,
    pub impressive_phrase: String,
    pub content: String,
    pub timestamp: String,
}

impl SinkRecord {
    pub fn stamp(form: &FormConfig, input: &ReflectionInput, now: OffsetDateTime) -> Self {
        let local_now = now.to_offset(form.offset());
        Self {
            form_title: derive_form_title(form.title_date(local_now), &form.title_suffix),
            student_info: input.student_info.clone(),
            impressive_phrase: input.impressive_phrase.clone(),
            content: input.content.clone(),
            timestamp: format_submission_timestamp(local_now),
        }
    }
}

/// `9월 9일 나필사`: month and day without zero padding.
pub fn derive_form_title(date: Date, suffix: &str) -> String {
    format!("{}월 {}일 {}", u8::from(date.month()), date.day(), suffix)
        .trim_end()
        .to_string()
}

/// Korean locale rendering, e.g. `2025. 9. 9. 오후 3:04:05`.
pub fn format_submission_timestamp(at: OffsetDateTime) -> String {
    let (meridiem, hour) = match at.hour() {
        0 => ("오전", 12),
        hour @ 1..=11 => ("오전", hour),
        12 => ("오후", 12),
        hour => ("오후", hour - 12),
    };
    format!(
        "{}. {}. {}. {} {}:{:02}:{:02}",
        at.year(),
        u8::from(at.month()),
        at.day(),
        meridiem,
        hour,
        at.minute(),
        at.second()
    )
}
