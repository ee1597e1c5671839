//! Five-field cron expression validation for refresh schedules

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CronError {
    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid {field} field: '{value}'")]
    InvalidField { field: &'static str, value: String },
}

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    /// Symbolic names, the first one mapping to `min`
    aliases: &'static [&'static str],
}

const FIELDS: [FieldSpec; 5] = [
    FieldSpec {
        name: "minute",
        min: 0,
        max: 59,
        aliases: &[],
    },
    FieldSpec {
        name: "hour",
        min: 0,
        max: 23,
        aliases: &[],
    },
    FieldSpec {
        name: "day",
        min: 1,
        max: 31,
        aliases: &[],
    },
    FieldSpec {
        name: "month",
        min: 1,
        max: 12,
        aliases: &[
            "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
        ],
    },
    // 7 is Sunday as well
    FieldSpec {
        name: "day of week",
        min: 0,
        max: 7,
        aliases: &["sun", "mon", "tue", "wed", "thu", "fri", "sat"],
    },
];

impl FieldSpec {
    fn value(&self, token: &str) -> Option<u32> {
        if let Ok(n) = token.parse::<u32>() {
            return (self.min..=self.max).contains(&n).then_some(n);
        }
        let lower = token.to_ascii_lowercase();
        self.aliases
            .iter()
            .position(|a| *a == lower)
            .map(|idx| self.min + idx as u32)
    }

    fn item_is_valid(&self, item: &str) -> bool {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => (range, Some(step)),
            None => (item, None),
        };

        if let Some(step) = step {
            match step.parse::<u32>() {
                Ok(n) if n > 0 => {}
                _ => return false,
            }
        }

        if range == "*" {
            return true;
        }

        match range.split_once('-') {
            Some((start, end)) => match (self.value(start), self.value(end)) {
                (Some(s), Some(e)) => s <= e,
                _ => false,
            },
            None => self.value(range).is_some(),
        }
    }

    fn check(&self, field: &str) -> Result<(), CronError> {
        if field.split(',').all(|item| self.item_is_valid(item)) {
            Ok(())
        } else {
            Err(CronError::InvalidField {
                field: self.name,
                value: field.to_string(),
            })
        }
    }
}

/// Validate a `minute hour day month day-of-week` expression
pub fn validate(expr: &str) -> Result<(), CronError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != FIELDS.len() {
        return Err(CronError::FieldCount(fields.len()));
    }

    for (spec, field) in FIELDS.iter().zip(&fields) {
        spec.check(field)?;
    }
    Ok(())
}

pub fn is_valid(expr: &str) -> bool {
    validate(expr).is_ok()
}
