//! Batch submission form: field values, static validation rules, dirty/touched tracking.
//!
//! Rules:
//! - batch number: required, at most 20 characters
//! - branch code, source code, entry date: required
//! - exchange rate: required and at least [`MIN_EXCH_RATE`] (zero is invalid)
//!
//! Validity is always derived from the current values; patching a field never has other side effects.

use crate::file::SelectedFile;
use crate::ids::{BatchNo, BranchCode, SourceCode, BATCH_NO_MAX_LEN};
use crate::models::UploadRequest;
use crate::utils::date;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Smallest accepted exchange rate (0.000001).
pub const MIN_EXCH_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    BatchNo,
    BranchCode,
    SourceCode,
    ExchRate,
    EntryDate,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::BatchNo,
        Field::BranchCode,
        Field::SourceCode,
        Field::ExchRate,
        Field::EntryDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::BatchNo => "batchNo",
            Field::BranchCode => "branchCode",
            Field::SourceCode => "sourceCode",
            Field::ExchRate => "exchRate",
            Field::EntryDate => "entryDate",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    Required,
    MaxLength { max: usize, actual: usize },
    Min { min: Decimal },
}

/// Which rule a [`FieldError`] comes from, for `has_error` lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    MaxLength,
    Min,
}

impl FieldError {
    pub fn kind(&self) -> FieldErrorKind {
        match self {
            FieldError::Required => FieldErrorKind::Required,
            FieldError::MaxLength { .. } => FieldErrorKind::MaxLength,
            FieldError::Min { .. } => FieldErrorKind::Min,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required => f.write_str("is required"),
            FieldError::MaxLength { max, actual } => {
                write!(f, "must be at most {} characters (got {})", max, actual)
            }
            FieldError::Min { min } => write!(f, "must be at least {}", min),
        }
    }
}

/// Values applied by [`UploadForm::reset`].
#[derive(Clone, Debug, PartialEq)]
pub struct FormDefaults {
    pub exch_rate: Decimal,
    pub entry_date: NaiveDate,
}

impl FormDefaults {
    /// Exchange rate 1, entry date = today's local calendar date.
    pub fn today() -> Self {
        Self {
            exch_rate: Decimal::ONE,
            entry_date: chrono::Local::now().date_naive(),
        }
    }
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self::today()
    }
}

/// Programmatic update of one or more fields. `None` leaves a field as it is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormPatch {
    pub batch_no: Option<String>,
    pub branch_code: Option<String>,
    pub source_code: Option<String>,
    pub exch_rate: Option<Decimal>,
    pub entry_date: Option<NaiveDate>,
}

impl FormPatch {
    pub fn batch_no(mut self, v: impl Into<String>) -> Self {
        self.batch_no = Some(v.into());
        self
    }

    pub fn branch_code(mut self, v: impl Into<String>) -> Self {
        self.branch_code = Some(v.into());
        self
    }

    pub fn source_code(mut self, v: impl Into<String>) -> Self {
        self.source_code = Some(v.into());
        self
    }

    pub fn exch_rate(mut self, v: Decimal) -> Self {
        self.exch_rate = Some(v);
        self
    }

    pub fn entry_date(mut self, v: NaiveDate) -> Self {
        self.entry_date = Some(v);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UploadForm {
    batch_no: String,
    branch_code: String,
    source_code: String,
    exch_rate: Option<Decimal>,
    entry_date: Option<NaiveDate>,
    dirty: HashSet<Field>,
    touched: HashSet<Field>,
}

impl UploadForm {
    pub fn new(defaults: FormDefaults) -> Self {
        let mut form = Self {
            batch_no: String::new(),
            branch_code: String::new(),
            source_code: String::new(),
            exch_rate: None,
            entry_date: None,
            dirty: HashSet::new(),
            touched: HashSet::new(),
        };
        form.reset(defaults);
        form
    }

    pub fn batch_no(&self) -> &str {
        &self.batch_no
    }

    pub fn branch_code(&self) -> &str {
        &self.branch_code
    }

    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn exch_rate(&self) -> Option<Decimal> {
        self.exch_rate
    }

    pub fn entry_date(&self) -> Option<NaiveDate> {
        self.entry_date
    }

    /// Current value as display text (empty when unset).
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::BatchNo => self.batch_no.clone(),
            Field::BranchCode => self.branch_code.clone(),
            Field::SourceCode => self.source_code.clone(),
            Field::ExchRate => self
                .exch_rate
                .map(|r| r.normalize().to_string())
                .unwrap_or_default(),
            Field::EntryDate => self.entry_date.as_ref().map(date::format).unwrap_or_default(),
        }
    }

    pub fn errors(&self, field: Field) -> Vec<FieldError> {
        let mut errors = Vec::new();
        match field {
            Field::BatchNo => {
                if self.batch_no.is_empty() {
                    errors.push(FieldError::Required);
                }
                let actual = self.batch_no.chars().count();
                if actual > BATCH_NO_MAX_LEN {
                    errors.push(FieldError::MaxLength {
                        max: BATCH_NO_MAX_LEN,
                        actual,
                    });
                }
            }
            Field::BranchCode => {
                if self.branch_code.is_empty() {
                    errors.push(FieldError::Required);
                }
            }
            Field::SourceCode => {
                if self.source_code.is_empty() {
                    errors.push(FieldError::Required);
                }
            }
            Field::ExchRate => match self.exch_rate {
                None => errors.push(FieldError::Required),
                Some(rate) if rate < MIN_EXCH_RATE => errors.push(FieldError::Min { min: MIN_EXCH_RATE }),
                Some(_) => {}
            },
            Field::EntryDate => {
                if self.entry_date.is_none() {
                    errors.push(FieldError::Required);
                }
            }
        }
        errors
    }

    pub fn is_field_valid(&self, field: Field) -> bool {
        self.errors(field).is_empty()
    }

    pub fn is_valid(&self) -> bool {
        Field::ALL.iter().all(|f| self.is_field_valid(*f))
    }

    /// Fields that currently fail at least one rule.
    pub fn invalid_fields(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| !self.is_field_valid(*f))
            .collect()
    }

    pub fn is_dirty(&self, field: Field) -> bool {
        self.dirty.contains(&field)
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn mark_touched(&mut self, field: Field) {
        self.touched.insert(field);
    }

    /// True when `field` fails `kind` and the user has interacted with it; drives inline error display.
    pub fn has_error(&self, field: Field, kind: FieldErrorKind) -> bool {
        (self.is_dirty(field) || self.is_touched(field))
            && self.errors(field).iter().any(|e| e.kind() == kind)
    }

    /// User edit from a text input. Marks the field dirty.
    /// Text that does not parse as a number/date leaves the field empty, which then fails `Required`.
    pub fn edit(&mut self, field: Field, text: &str) {
        match field {
            Field::BatchNo => self.batch_no = text.to_string(),
            Field::BranchCode => self.branch_code = text.to_string(),
            Field::SourceCode => self.source_code = text.to_string(),
            Field::ExchRate => self.exch_rate = Decimal::from_str(text.trim()).ok(),
            Field::EntryDate => self.entry_date = date::parse(text).ok(),
        }
        self.dirty.insert(field);
    }

    /// Programmatic update (reference data defaults, working day). Dirty/touched state is not changed.
    pub fn patch(&mut self, patch: FormPatch) {
        if let Some(v) = patch.batch_no {
            self.batch_no = v;
        }
        if let Some(v) = patch.branch_code {
            self.branch_code = v;
        }
        if let Some(v) = patch.source_code {
            self.source_code = v;
        }
        if let Some(v) = patch.exch_rate {
            self.exch_rate = Some(v);
        }
        if let Some(v) = patch.entry_date {
            self.entry_date = Some(v);
        }
    }

    /// Clear every field, then apply `defaults`. Dirty/touched state is cleared too.
    pub fn reset(&mut self, defaults: FormDefaults) {
        self.batch_no.clear();
        self.branch_code.clear();
        self.source_code.clear();
        self.exch_rate = Some(defaults.exch_rate);
        self.entry_date = Some(defaults.entry_date);
        self.dirty.clear();
        self.touched.clear();
    }

    /// Build the request for one submit attempt. Fails with the invalid fields when the form is not valid.
    pub fn to_request(&self, file: SelectedFile) -> Result<UploadRequest, Vec<Field>> {
        let invalid = self.invalid_fields();
        if !invalid.is_empty() {
            return Err(invalid);
        }
        let (Some(exch_rate), Some(entry_date)) = (self.exch_rate, self.entry_date) else {
            return Err(vec![Field::ExchRate, Field::EntryDate]);
        };
        let batch_no = BatchNo::parse(&self.batch_no).map_err(|_| vec![Field::BatchNo])?;
        let branch_code = BranchCode::parse(&self.branch_code).map_err(|_| vec![Field::BranchCode])?;
        let source_code = SourceCode::parse(&self.source_code).map_err(|_| vec![Field::SourceCode])?;
        Ok(UploadRequest {
            batch_no,
            branch_code,
            source_code,
            exch_rate,
            entry_date,
            file,
        })
    }
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new(FormDefaults::today())
    }
}
