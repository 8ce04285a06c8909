//! Single employee record and the manual-entry form definition

use crate::error::{Result, SalaryError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const EDUCATION_LEVELS: [&str; 4] = ["High School", "Bachelors", "PhD", "Masters"];
pub const JOB_TITLES: [&str; 4] = ["Data Scientist", "Software Engineer", "Analyst", "Manager"];
pub const INDUSTRIES: [&str; 4] = ["IT", "Education", "Healthcare", "Finance"];
pub const LOCATIONS: [&str; 4] = ["New York", "Bangalore", "London", "San Francisco"];
pub const COMPANY_SIZES: [&str; 3] = ["Small", "Medium", "Large"];

/// File name offered for the sample input download
pub const SAMPLE_FILE_NAME: &str = "sample_salary_input.csv";

/// One-row sample for the bulk upload page
pub const SAMPLE_CSV: &str = "education_level,years_experience,job_title,industry,location,company_size,certifications,age,working_hours\n\
Bachelors,5,Data Scientist,IT,New York,Medium,2,30,40\n";

/// Drop-down field on the manual entry form
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceField {
    pub name: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
}

/// Bounded integer field on the manual entry form
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NumericField {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl NumericField {
    pub fn check(&self, value: f64) -> Result<()> {
        if !value.is_finite() || value < self.min || value > self.max {
            return Err(SalaryError::InvalidField {
                column: self.name.to_string(),
                reason: format!("{} must be between {} and {}", value, self.min, self.max),
            });
        }
        Ok(())
    }
}

pub const CHOICE_FIELDS: [ChoiceField; 5] = [
    ChoiceField {
        name: "education_level",
        label: "Education Level",
        options: &EDUCATION_LEVELS,
    },
    ChoiceField {
        name: "job_title",
        label: "Job Title",
        options: &JOB_TITLES,
    },
    ChoiceField {
        name: "industry",
        label: "Industry",
        options: &INDUSTRIES,
    },
    ChoiceField {
        name: "location",
        label: "Location",
        options: &LOCATIONS,
    },
    ChoiceField {
        name: "company_size",
        label: "Company Size",
        options: &COMPANY_SIZES,
    },
];

pub const NUMERIC_FIELDS: [NumericField; 4] = [
    NumericField {
        name: "years_experience",
        label: "Years of Experience",
        min: 0.0,
        max: 50.0,
        default: 3.0,
    },
    NumericField {
        name: "age",
        label: "Age",
        min: 18.0,
        max: 80.0,
        default: 30.0,
    },
    NumericField {
        name: "certifications",
        label: "Certifications",
        min: 0.0,
        max: 10.0,
        default: 0.0,
    },
    NumericField {
        name: "working_hours",
        label: "Working Hours per Week",
        min: 0.0,
        max: 100.0,
        default: 40.0,
    },
];

/// Look up the bounds of a numeric form field by column name
pub fn numeric_field(name: &str) -> Option<&'static NumericField> {
    NUMERIC_FIELDS.iter().find(|f| f.name == name)
}

/// A hand-entered employee record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub education_level: String,
    pub years_experience: f64,
    pub job_title: String,
    pub industry: String,
    pub location: String,
    pub company_size: String,
    pub certifications: f64,
    pub age: f64,
    pub working_hours: f64,
}

impl Default for EmployeeRecord {
    fn default() -> Self {
        Self {
            education_level: EDUCATION_LEVELS[0].to_string(),
            years_experience: 3.0,
            job_title: JOB_TITLES[0].to_string(),
            industry: INDUSTRIES[0].to_string(),
            location: LOCATIONS[0].to_string(),
            company_size: COMPANY_SIZES[0].to_string(),
            certifications: 0.0,
            age: 30.0,
            working_hours: 40.0,
        }
    }
}

impl EmployeeRecord {
    /// The record shipped in the sample input file
    pub fn sample() -> Self {
        Self {
            education_level: "Bachelors".to_string(),
            years_experience: 5.0,
            job_title: "Data Scientist".to_string(),
            industry: "IT".to_string(),
            location: "New York".to_string(),
            company_size: "Medium".to_string(),
            certifications: 2.0,
            age: 30.0,
            working_hours: 40.0,
        }
    }

    /// Categorical values paired with their column names
    pub fn categorical_values(&self) -> [(&'static str, &str); 5] {
        [
            ("education_level", self.education_level.as_str()),
            ("job_title", self.job_title.as_str()),
            ("industry", self.industry.as_str()),
            ("location", self.location.as_str()),
            ("company_size", self.company_size.as_str()),
        ]
    }

    /// Numeric values paired with their column names
    pub fn numeric_values(&self) -> [(&'static str, f64); 4] {
        [
            ("years_experience", self.years_experience),
            ("age", self.age),
            ("certifications", self.certifications),
            ("working_hours", self.working_hours),
        ]
    }

    /// Reject blank categories and numbers outside the form bounds
    pub fn validate(&self) -> Result<()> {
        for (column, value) in self.categorical_values() {
            if value.trim().is_empty() {
                return Err(SalaryError::InvalidField {
                    column: column.to_string(),
                    reason: "value is empty".to_string(),
                });
            }
        }
        for (column, value) in self.numeric_values() {
            if let Some(field) = numeric_field(column) {
                field.check(value)?;
            }
        }
        Ok(())
    }

    /// One-row frame in the sample file's column order
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = df!(
            "education_level" => [self.education_level.as_str()],
            "years_experience" => [self.years_experience],
            "job_title" => [self.job_title.as_str()],
            "industry" => [self.industry.as_str()],
            "location" => [self.location.as_str()],
            "company_size" => [self.company_size.as_str()],
            "certifications" => [self.certifications],
            "age" => [self.age],
            "working_hours" => [self.working_hours]
        )?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv_bytes;

    #[test]
    fn test_sample_record_is_valid() {
        let record = EmployeeRecord::sample();
        assert!(record.validate().is_ok());
        let df = record.to_dataframe().unwrap();
        assert_eq!(df.shape(), (1, 9));
    }

    #[test]
    fn test_out_of_range_age_rejected() {
        let record = EmployeeRecord {
            age: 12.0,
            ..EmployeeRecord::sample()
        };
        let err = record.validate().unwrap_err();
        assert_eq!(err.column(), Some("age"));
    }

    #[test]
    fn test_blank_category_rejected() {
        let record = EmployeeRecord {
            industry: "  ".to_string(),
            ..EmployeeRecord::sample()
        };
        assert_eq!(record.validate().unwrap_err().column(), Some("industry"));
    }

    #[test]
    fn test_sample_csv_matches_sample_record() {
        let df = read_csv_bytes(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(df.shape(), (1, 9));
        let job = df.column("job_title").unwrap().str().unwrap().get(0);
        assert_eq!(job, Some(EmployeeRecord::sample().job_title.as_str()));
    }

    #[test]
    fn test_form_defaults_within_bounds() {
        for field in NUMERIC_FIELDS {
            assert!(field.check(field.default).is_ok(), "{}", field.name);
        }
        assert!(EmployeeRecord::default().validate().is_ok());
    }
}
