//! Field validation for multipart submissions
//!
//! Every failing field is collected; nothing short-circuits. Error keys are
//! the form field names the client highlights.

use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;
use validator::ValidateEmail;

use super::submission_form::SubmissionForm;
use crate::features::incidents::models::IncidentSeverity;
use crate::shared::validation::sanitize_text;

/// Field name -> human-readable message
pub type FieldErrors = BTreeMap<String, String>;

pub const DETAILS_MAX_CHARS: usize = 1000;
const CATEGORY_MAX_CHARS: usize = 64;
// Column widths of incidents.reporter_*; checked after sanitizing
const REPORTER_NAME_MAX_CHARS: usize = 255;
const REPORTER_EMAIL_MAX_CHARS: usize = 255;
const REPORTER_PHONE_MAX_CHARS: usize = 32;

/// A guided submission whose core fields passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct GuidedReport {
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub landmark: Option<String>,
    pub impacts: Vec<String>,
    pub details: String,
    pub severity: IncidentSeverity,
    pub observed_date: Option<NaiveDate>,
    pub observed_time: Option<NaiveTime>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A quick submission whose core fields passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct QuickReport {
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
}

pub fn validate_guided(form: &SubmissionForm) -> Result<GuidedReport, FieldErrors> {
    let mut errors = FieldErrors::new();

    let category = check_category(form, &mut errors);
    let coordinates = check_coordinates(form, &mut errors);

    let raw_details = form.text("details").trim();
    if raw_details.is_empty() {
        errors.insert("details".into(), "A description is required.".into());
    } else if raw_details.chars().count() > DETAILS_MAX_CHARS {
        errors.insert(
            "details".into(),
            format!("Description must be at most {} characters.", DETAILS_MAX_CHARS),
        );
    }

    let full_name = sanitize_text(form.text("fullname"));
    if full_name.is_empty() {
        errors.insert("fullname".into(), "Your name is required.".into());
    } else if full_name.chars().count() > REPORTER_NAME_MAX_CHARS {
        errors.insert(
            "fullname".into(),
            format!("Name must be at most {} characters.", REPORTER_NAME_MAX_CHARS),
        );
    }

    let email = form.text("email").trim().to_string();
    if email.is_empty() || !email.validate_email() {
        errors.insert("email".into(), "A valid email is required.".into());
    } else if email.chars().count() > REPORTER_EMAIL_MAX_CHARS {
        errors.insert(
            "email".into(),
            format!("Email must be at most {} characters.", REPORTER_EMAIL_MAX_CHARS),
        );
    }

    let phone = non_empty(sanitize_text(form.text("phone")));
    if phone
        .as_ref()
        .is_some_and(|p| p.chars().count() > REPORTER_PHONE_MAX_CHARS)
    {
        errors.insert(
            "phone".into(),
            format!("Phone must be at most {} characters.", REPORTER_PHONE_MAX_CHARS),
        );
    }

    let Some((latitude, longitude)) = coordinates else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut impacts: Vec<String> = form
        .impacts
        .iter()
        .map(|i| sanitize_text(i))
        .filter(|i| !i.is_empty())
        .collect();
    let other = sanitize_text(form.text("otherImpacts"));
    if !other.is_empty() {
        impacts.push(other);
    }

    Ok(GuidedReport {
        category,
        latitude,
        longitude,
        landmark: non_empty(sanitize_text(form.text("landmark"))),
        impacts,
        details: sanitize_text(raw_details),
        severity: parse_severity(form.text("severity")),
        observed_date: parse_date(form.text("date")),
        observed_time: parse_time(form.text("time")),
        full_name,
        email,
        phone,
    })
}

pub fn validate_quick(form: &SubmissionForm) -> Result<QuickReport, FieldErrors> {
    let mut errors = FieldErrors::new();

    let category = check_category(form, &mut errors);
    let coordinates = check_coordinates(form, &mut errors);

    let description = sanitize_text(form.text("description"));
    if description.is_empty() && form.files.is_empty() {
        errors.insert(
            "description".into(),
            "Provide a description or at least one evidence file.".into(),
        );
    } else if form.text("description").trim().chars().count() > DETAILS_MAX_CHARS {
        errors.insert(
            "description".into(),
            format!("Description must be at most {} characters.", DETAILS_MAX_CHARS),
        );
    }

    match coordinates {
        Some((latitude, longitude)) if errors.is_empty() => Ok(QuickReport {
            category,
            latitude,
            longitude,
            description,
        }),
        _ => Err(errors),
    }
}

fn check_category(form: &SubmissionForm, errors: &mut FieldErrors) -> String {
    let category = sanitize_text(form.text("category"));
    if category.is_empty() {
        errors.insert("category".into(), "Incident category is required.".into());
    } else if category.chars().count() > CATEGORY_MAX_CHARS {
        errors.insert("category".into(), "Incident category is not recognised.".into());
    }
    category
}

fn check_coordinates(form: &SubmissionForm, errors: &mut FieldErrors) -> Option<(f64, f64)> {
    let parsed = parse_coordinates(form.text("latitude"), form.text("longitude"));
    if parsed.is_none() {
        errors.insert("location".into(), "A valid location is required.".into());
    }
    parsed
}

/// Both components must be finite numbers within WGS84 bounds
pub fn parse_coordinates(lat: &str, lng: &str) -> Option<(f64, f64)> {
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    let in_range = lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng);
    in_range.then_some((lat, lng))
}

/// Unknown or empty severity falls back to the default
fn parse_severity(value: &str) -> IncidentSeverity {
    IncidentSeverity::from_form(value).unwrap_or_else(|| {
        if !value.trim().is_empty() {
            tracing::debug!("Unknown severity {:?}, using default", value);
        }
        IncidentSeverity::default()
    })
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| tracing::debug!("Dropping unparseable date {:?}: {}", value, e))
        .ok()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| tracing::debug!("Dropping unparseable time {:?}: {}", value, e))
        .ok()
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
