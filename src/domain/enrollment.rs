use crate::error::PaymentError;
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Largest salary slip the backend accepts.
pub const MAX_SALARY_SLIP_BYTES: usize = 5 * 1024 * 1024;

static PAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("static pattern is valid"));
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("static pattern is valid"));

pub const INDIAN_STATES: [&str; 36] = [
    "Andaman and Nicobar Islands",
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chandigarh",
    "Chhattisgarh",
    "Dadra and Nagar Haveli and Daman and Diu",
    "Delhi",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jammu and Kashmir",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Ladakh",
    "Lakshadweep",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Puducherry",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
];

/// Canonical spelling of an Indian state or union territory, matched
/// case-insensitively.
pub fn canonical_state(name: &str) -> Option<&'static str> {
    let name = name.trim();
    INDIAN_STATES
        .iter()
        .copied()
        .find(|state| state.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(PaymentError::validation(format!("Unknown gender: {s}"))),
        }
    }
}

/// Applicant details sent with a forex card application.
///
/// Serializes to the backend's `userDetails` document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardApplication {
    pub pan: String,
    pub dob: NaiveDate,
    #[serde(rename = "phonenumber")]
    pub phone_number: String,
    pub gender: Gender,
    #[serde(with = "rust_decimal::serde::float")]
    pub salary: Decimal,
    pub address: String,
    pub state: String,
    pub country: String,
}

impl CardApplication {
    /// Checks the details locally, before anything is uploaded.
    ///
    /// The state is normalized to its canonical spelling on success.
    pub fn validate(&mut self) -> Result<(), PaymentError> {
        if [&self.pan, &self.phone_number, &self.address, &self.country]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(PaymentError::validation("Please fill all fields"));
        }
        if !PAN_PATTERN.is_match(&self.pan) {
            return Err(PaymentError::validation(
                "Enter valid PAN card number (e.g., ABCDE1234F)",
            ));
        }
        if !PHONE_PATTERN.is_match(&self.phone_number) {
            return Err(PaymentError::validation(
                "Enter a valid 10-digit phone number starting from 6-9",
            ));
        }
        if self.salary <= Decimal::ZERO {
            return Err(PaymentError::validation("Salary should be a positive number"));
        }
        let Some(state) = canonical_state(&self.state) else {
            return Err(PaymentError::validation("Please select a state"));
        };
        self.state = state.to_string();
        Ok(())
    }
}

/// Salary proof attached to an application. Must be a PDF of at most 5 MB.
#[derive(Debug, Clone, PartialEq)]
pub struct SalarySlip {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SalarySlip {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.bytes.is_empty() {
            return Err(PaymentError::validation("Please upload a document"));
        }
        if !self.is_pdf() {
            return Err(PaymentError::validation("Only PDF files are allowed."));
        }
        if self.bytes.len() > MAX_SALARY_SLIP_BYTES {
            return Err(PaymentError::validation("File size should be less than 5MB"));
        }
        Ok(())
    }

    fn is_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF-")
            || self.file_name.to_ascii_lowercase().ends_with(".pdf")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PaymentError::validation(format!("Unknown application status: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// An applicant as listed to administrators.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Applicant {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub salary: Option<Decimal>,
    #[serde(default)]
    pub pan: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplicationCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ApplicationCounts {
    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }

    /// Share of decided and undecided applications that were approved, in percent.
    pub fn approval_rate(&self) -> Decimal {
        match self.total() {
            0 => Decimal::ZERO,
            total => (Decimal::from(self.approved) * Decimal::ONE_HUNDRED / Decimal::from(total))
                .round_dp(2),
        }
    }
}
