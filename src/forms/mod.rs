//! Typed management forms
//!
//! Each form is read from the JSON object produced by
//! [`form_to_json`](crate::ui::form_to_json) and validated. Validation failures
//! are collected per field into [`FormErrors`].

pub mod cron;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::epd;
use crate::eta::{Company, Direction, EtaFormat, Locale};
use crate::ui::{form_to_json, is_numeric, FormSource};

const REQUIRED: &str = "This field is required.";
const NOT_A_CHOICE: &str = "Not a valid choice.";
const NOT_AN_INTEGER: &str = "Not a valid integer value.";

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "invalid form ({})", parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// A form that can be built from submitted fields
pub trait SubmittedForm: Sized {
    fn from_fields(data: &Map<String, Value>) -> Result<Self, FormErrors>;
}

/// Serialize `form` and validate it as `F`
pub fn parse_form<F: SubmittedForm, S: FormSource + ?Sized>(form: &S) -> Result<F, FormErrors> {
    F::from_fields(&form_to_json(form))
}

/// Reads fields out of a submitted object, recording errors as it goes
struct FieldReader<'a> {
    data: &'a Map<String, Value>,
    errors: FormErrors,
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a Map<String, Value>) -> Self {
        Self {
            data,
            errors: FormErrors::default(),
        }
    }

    /// Field as trimmed text; numbers are accepted as their decimal text
    fn text(&self, name: &str) -> Option<String> {
        let text = match self.data.get(name)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(text).filter(|s| !s.is_empty())
    }

    fn required(&mut self, name: &str) -> Option<String> {
        let value = self.text(name);
        if value.is_none() {
            self.errors.add(name, REQUIRED);
        }
        value
    }

    fn choice<T: FromStr>(&mut self, name: &str) -> Option<T> {
        let raw = self.required(name)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.errors.add(name, NOT_A_CHOICE);
                None
            }
        }
    }

    /// Checkbox state. Strings other than "" and "false" count as checked.
    fn flag(&self, name: &str) -> bool {
        match self.data.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !(s.is_empty() || s.eq_ignore_ascii_case("false")),
            _ => false,
        }
    }

    /// Integer field; `default` only applies when the field was not submitted
    fn integer(&mut self, name: &str, default: i64) -> Option<i64> {
        let raw = match self.data.get(name) {
            None | Some(Value::Null) => return Some(default),
            Some(v) => v,
        };

        let parsed = match raw {
            Value::Number(n) => n.as_i64(),
            Value::String(s) if is_numeric(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(name, NOT_AN_INTEGER);
        }
        parsed
    }

    /// Optional foreign key; empty means none
    fn optional_id(&mut self, name: &str) -> Option<i64> {
        let raw = self.text(name)?;
        match raw.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                self.errors.add(name, NOT_A_CHOICE);
                None
            }
        }
    }

    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, FormErrors> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        // Every field that failed to read recorded an error above
        build().ok_or(self.errors)
    }
}

/// E-paper and ETA settings stored in the site configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpaperSettings {
    pub epd_brand: String,
    pub epd_model: String,
    pub eta_locale: Locale,
    pub dry_run: bool,
    pub degree: i64,
}

impl EpaperSettings {
    /// Like [`SubmittedForm::from_fields`], with `locale` used when the form
    /// leaves `eta_locale` out
    pub fn from_fields_with_locale(
        data: &Map<String, Value>,
        locale: Locale,
    ) -> Result<Self, FormErrors> {
        let mut reader = FieldReader::new(data);

        let epd_brand = reader
            .text("epd_brand")
            .filter(|b| b != epd::BRAND_PLACEHOLDER && b != "None");
        if epd_brand.is_none() {
            reader.errors.add("epd_brand", REQUIRED);
        }

        let epd_model = reader.required("epd_model");
        if let (Some(brand), Some(model)) = (&epd_brand, &epd_model) {
            if !epd::models(brand).contains(&model.as_str()) {
                reader.errors.add("epd_model", NOT_A_CHOICE);
            }
        }

        let eta_locale = match reader.text("eta_locale") {
            Some(_) => reader.choice::<Locale>("eta_locale"),
            None => Some(locale),
        };
        let dry_run = reader.flag("dry_run");
        let degree = reader.integer("degree", 0);

        reader.finish(|| {
            Some(EpaperSettings {
                epd_brand: epd_brand?,
                epd_model: epd_model?,
                eta_locale: eta_locale?,
                dry_run,
                degree: degree?,
            })
        })
    }
}

impl SubmittedForm for EpaperSettings {
    fn from_fields(data: &Map<String, Value>) -> Result<Self, FormErrors> {
        Self::from_fields_with_locale(data, Locale::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkForm {
    pub transport: Company,
    pub no: String,
    pub direction: Direction,
    pub service_type: String,
    pub stop_id: String,
    pub bookmark_group_id: Option<i64>,
}

impl SubmittedForm for BookmarkForm {
    fn from_fields(data: &Map<String, Value>) -> Result<Self, FormErrors> {
        let mut reader = FieldReader::new(data);

        let transport = reader.choice::<Company>("transport");
        let no = reader.required("no");
        let direction = reader.choice::<Direction>("direction");
        let service_type = reader.required("service_type");
        let stop_id = reader.required("stop_id");
        let bookmark_group_id = reader.optional_id("bookmark_group_id");

        reader.finish(|| {
            Some(BookmarkForm {
                transport: transport?,
                no: no?,
                direction: direction?,
                service_type: service_type?,
                stop_id: stop_id?,
                bookmark_group_id,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkGroupForm {
    pub name: String,
}

impl SubmittedForm for BookmarkGroupForm {
    fn from_fields(data: &Map<String, Value>) -> Result<Self, FormErrors> {
        let mut reader = FieldReader::new(data);
        let name = reader.required("name");
        reader.finish(|| Some(BookmarkGroupForm { name: name? }))
    }
}

/// Cron-driven refresh of one bookmark group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleForm {
    pub schedule: String,
    pub bookmark_group_id: Option<i64>,
    pub eta_format: EtaFormat,
    pub layout: String,
    pub is_partial: bool,
    /// Partial refreshes between full refreshes, 0 for never
    pub partial_cycle: i64,
    pub enabled: bool,
}

impl SubmittedForm for ScheduleForm {
    fn from_fields(data: &Map<String, Value>) -> Result<Self, FormErrors> {
        let mut reader = FieldReader::new(data);

        let schedule = reader.required("schedule");
        if let Some(expr) = &schedule {
            if let Err(e) = cron::validate(expr) {
                tracing::debug!("Rejected cron expression '{}': {}", expr, e);
                reader.errors.add("schedule", "Invalid cron expression.");
            }
        }

        let bookmark_group_id = reader.optional_id("bookmark_group_id");
        let eta_format = reader.choice::<EtaFormat>("eta_format");
        let layout = reader.required("layout");
        let is_partial = reader.flag("is_partial");

        let partial_cycle = reader.integer("partial_cycle", 0);
        if matches!(partial_cycle, Some(n) if n < 0) {
            reader.errors.add("partial_cycle", "Number must be at least 0.");
        }

        let enabled = reader.flag("enabled");

        reader.finish(|| {
            Some(ScheduleForm {
                schedule: schedule?,
                bookmark_group_id,
                eta_format: eta_format?,
                layout: layout?,
                is_partial,
                partial_cycle: partial_cycle?,
                enabled,
            })
        })
    }
}

impl ScheduleForm {
    /// Whether the configured display can render this schedule's layout
    pub fn layout_supported(&self, brand: &str, model: &str) -> bool {
        epd::layouts(brand, model, self.eta_format)
            .map(|names| names.contains(&self.layout.as_str()))
            .unwrap_or(false)
    }
}
