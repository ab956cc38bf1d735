//! Validated identifiers sent to the backend. Use these instead of raw strings once a value leaves the form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Longest batch number the ledger accepts.
pub const BATCH_NO_MAX_LEN: usize = 20;

fn validate_batch_no(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Batch number is required".to_string());
    }
    let len = s.chars().count();
    if len > BATCH_NO_MAX_LEN {
        return Err(format!(
            "Batch number must be at most {} characters (got {})",
            BATCH_NO_MAX_LEN, len
        ));
    }
    Ok(s.to_string())
}

fn validate_branch_code(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Branch code is required".to_string());
    }
    Ok(s.to_string())
}

fn validate_source_code(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Source code is required".to_string());
    }
    Ok(s.to_string())
}

/// Batch number: non-empty, at most 20 characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BatchNo(String);

/// Branch code as listed by `GET /branches`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BranchCode(String);

/// Transaction source code as listed by `GET /source-codes`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceCode(String);

macro_rules! code_serde {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
                ser.serialize_str(&self.0)
            }
        }
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
                let s = String::deserialize(de)?;
                Self::from_str(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
code_serde!(BatchNo);
code_serde!(BranchCode);
code_serde!(SourceCode);

macro_rules! code_type {
    ($name:ident, $validate:ident) => {
        impl $name {
            pub fn parse(s: impl AsRef<str>) -> Result<Self, String> {
                Self::from_str(s.as_ref())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
        impl FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self($validate(s)?))
            }
        }
        impl From<$name> for String {
            fn from(code: $name) -> Self {
                code.0
            }
        }
        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}
code_type!(BatchNo, validate_batch_no);
code_type!(BranchCode, validate_branch_code);
code_type!(SourceCode, validate_source_code);
