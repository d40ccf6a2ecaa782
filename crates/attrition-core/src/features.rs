//! Feature catalogue for the attrition model.
//!
//! The model was trained on a fixed list of employee attributes. Each entry
//! also carries its manual-entry definition: integer fields have a range and
//! a default, categorical fields have an option list whose first entry is the
//! default.

use arrow::datatypes::{DataType, Field, Schema};

use crate::record::Value;

/// How a feature is entered and encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole number within an inclusive range.
    Integer { min: i64, max: i64, default: i64 },
    /// Free-text category; `options` are the values offered on manual entry.
    Category { options: &'static [&'static str] },
}

/// One feature of the model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Human-readable label shown by `attrition fields`.
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Category { .. })
    }

    /// Value used for manual entry when the field is not given.
    pub fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::Integer { default, .. } => Value::Number(default as f64),
            FieldKind::Category { options } => {
                Value::Category(options.first().copied().unwrap_or_default().to_string())
            }
        }
    }

    /// Arrow type of the column in a catalogue-shaped table.
    pub fn data_type(&self) -> DataType {
        match self.kind {
            FieldKind::Integer { .. } => DataType::Int64,
            FieldKind::Category { .. } => DataType::Utf8,
        }
    }
}

const fn int(name: &'static str, label: &'static str, min: i64, max: i64, default: i64) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Integer { min, max, default },
    }
}

const fn cat(name: &'static str, label: &'static str, options: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Category { options },
    }
}

/// Every feature the model expects, in training column order.
pub const FEATURES: &[FieldSpec] = &[
    int("Age", "Age", 18, 60, 30),
    cat(
        "BusinessTravel",
        "Business Travel",
        &["Non-Travel", "Travel_Rarely", "Travel_Frequently"],
    ),
    int("DailyRate", "Daily Rate", 100, 1500, 800),
    cat(
        "Department",
        "Department",
        &["Sales", "Research & Development", "Human Resources"],
    ),
    int("DistanceFromHome", "Distance From Home", 1, 50, 10),
    int("Education", "Education (1=Below College, 5=Doctor)", 1, 5, 1),
    cat(
        "EducationField",
        "Education Field",
        &[
            "Life Sciences",
            "Medical",
            "Marketing",
            "Technical Degree",
            "Human Resources",
            "Other",
        ],
    ),
    int("EnvironmentSatisfaction", "Environment Satisfaction", 1, 4, 1),
    cat("Gender", "Gender", &["Male", "Female"]),
    int("HourlyRate", "Hourly Rate", 30, 150, 80),
    int("JobInvolvement", "Job Involvement", 1, 4, 1),
    int("JobLevel", "Job Level", 1, 5, 1),
    cat(
        "JobRole",
        "Job Role",
        &[
            "Sales Executive",
            "Research Scientist",
            "Laboratory Technician",
            "Manufacturing Director",
            "Healthcare Representative",
            "Manager",
            "Sales Representative",
            "Research Director",
            "Human Resources",
        ],
    ),
    int("JobSatisfaction", "Job Satisfaction", 1, 4, 1),
    cat("MaritalStatus", "Marital Status", &["Single", "Married", "Divorced"]),
    int("MonthlyIncome", "Monthly Income", 1000, 20000, 5000),
    int("MonthlyRate", "Monthly Rate", 2000, 30000, 15000),
    int("NumCompaniesWorked", "Num Companies Worked", 0, 10, 1),
    cat("OverTime", "OverTime", &["Yes", "No"]),
    int("PercentSalaryHike", "Percent Salary Hike", 10, 25, 15),
    int("PerformanceRating", "Performance Rating", 1, 4, 1),
    int("RelationshipSatisfaction", "Relationship Satisfaction", 1, 4, 1),
    int("StockOptionLevel", "Stock Option Level", 0, 3, 0),
    int("TotalWorkingYears", "Total Working Years", 0, 40, 10),
    int("TrainingTimesLastYear", "Training Times Last Year", 0, 10, 3),
    int("WorkLifeBalance", "Work Life Balance", 1, 4, 1),
    int("YearsAtCompany", "Years At Company", 0, 40, 5),
    int("YearsInCurrentRole", "Years In Current Role", 0, 20, 3),
    int("YearsSinceLastPromotion", "Years Since Last Promotion", 0, 15, 1),
    int("YearsWithCurrManager", "Years With Current Manager", 0, 17, 2),
];

/// Features that are label-encoded before scoring.
pub const CATEGORICAL_FEATURES: &[&str] = &[
    "BusinessTravel",
    "Department",
    "EducationField",
    "Gender",
    "JobRole",
    "MaritalStatus",
    "OverTime",
];

/// Feature names in training column order.
pub fn feature_names() -> impl Iterator<Item = &'static str> {
    FEATURES.iter().map(|f| f.name)
}

/// Look up a feature by exact name.
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FEATURES.iter().find(|f| f.name == name)
}

/// Position of a feature in training column order.
pub fn position(name: &str) -> Option<usize> {
    FEATURES.iter().position(|f| f.name == name)
}

pub fn is_categorical(name: &str) -> bool {
    CATEGORICAL_FEATURES.contains(&name)
}

/// Arrow schema of a table holding exactly the catalogue columns.
pub fn input_schema() -> Schema {
    Schema::new(
        FEATURES
            .iter()
            .map(|f| Field::new(f.name, f.data_type(), false))
            .collect::<Vec<_>>(),
    )
}
