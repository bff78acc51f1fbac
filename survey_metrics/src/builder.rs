pub use crate::config::*;

use chrono::{NaiveDateTime, Timelike};
use log::debug;

/// A builder for survey submissions.
///
/// It collects the raw form input and turns it into an [`Entry`] once the
/// submission time is known.
///
/// ```
/// use survey_metrics::builder::Submission;
/// use chrono::NaiveDate;
/// # use survey_metrics::MetricErrors;
///
/// let now = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .unwrap()
///     .and_hms_opt(9, 30, 0)
///     .unwrap();
/// let entry = Submission::new("  steps ")
///     .name("")
///     .value(1200.0)
///     .build(now)?;
///
/// assert_eq!(entry.category, "steps");
/// assert_eq!(entry.name, "anonymous");
/// assert_eq!(entry.timestamp_string(), "2024-03-01T09:30:00");
/// # Ok::<(), MetricErrors>(())
/// ```
#[derive(PartialEq, Debug, Clone)]
pub struct Submission {
    category: String,
    name: Option<String>,
    value: f64,
}

impl Submission {
    pub fn new(category: &str) -> Submission {
        Submission {
            category: category.to_string(),
            name: None,
            value: 0.0,
        }
    }

    pub fn name(self, name: &str) -> Submission {
        Submission {
            name: Some(name.to_string()),
            ..self
        }
    }

    /// Sets the value of the submission.
    ///
    /// The form only accepts values from zero upwards, so anything below
    /// (or not a number at all) is floored at zero.
    pub fn value(self, value: f64) -> Submission {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        Submission { value, ..self }
    }

    /// Validates the submission and stamps it with the given time.
    ///
    /// Fails with [`MetricErrors::EmptyCategory`] when the category is blank
    /// after trimming.
    pub fn build(&self, now: NaiveDateTime) -> Result<Entry, MetricErrors> {
        let category = self.category.trim();
        if category.is_empty() {
            return Err(MetricErrors::EmptyCategory);
        }
        let name = match self.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => ANONYMOUS.to_string(),
        };
        // Second precision only: sub-second parts are not written to the store.
        let timestamp = now.with_nanosecond(0).unwrap_or(now);
        debug!(
            "build: category: {:?} name: {:?} value: {:?}",
            category, name, self.value
        );
        Ok(Entry {
            timestamp,
            name,
            category: category.to_string(),
            value: self.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_milli_opt(14, 3, 9, 750)
            .unwrap()
    }

    #[test]
    fn trims_category() {
        let e = Submission::new("  sleep\t").value(7.5).build(now()).unwrap();
        assert_eq!(e.category, "sleep");
        assert_eq!(e.value, 7.5);
    }

    #[test]
    fn blank_category_is_rejected() {
        assert_eq!(
            Submission::new("   ").name("bob").build(now()),
            Err(MetricErrors::EmptyCategory)
        );
        assert_eq!(
            Submission::new("").build(now()),
            Err(MetricErrors::EmptyCategory)
        );
    }

    #[test]
    fn blank_name_is_anonymous() {
        let e = Submission::new("water").name("  ").build(now()).unwrap();
        assert_eq!(e.name, ANONYMOUS);
        let e = Submission::new("water").build(now()).unwrap();
        assert_eq!(e.name, ANONYMOUS);
        let e = Submission::new("water").name(" Ada ").build(now()).unwrap();
        assert_eq!(e.name, "Ada");
    }

    #[test]
    fn value_is_floored_at_zero() {
        let e = Submission::new("water").value(-3.0).build(now()).unwrap();
        assert_eq!(e.value, 0.0);
        let e = Submission::new("water").value(f64::NAN).build(now()).unwrap();
        assert_eq!(e.value, 0.0);
    }

    #[test]
    fn timestamp_has_second_precision() {
        let e = Submission::new("water").build(now()).unwrap();
        assert_eq!(e.timestamp_string(), "2024-05-17T14:03:09");
    }
}
