//! Record types flowing between pipeline stages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One executive row. Every stage reads and writes the full record; columns a
/// stage has not reached yet stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutiveRecord {
    #[serde(rename = "Original Order")]
    pub original_order: Option<usize>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Youtube URL")]
    pub youtube_url: String,

    #[serde(rename = "Company Website")]
    pub company_website: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Domain Notes")]
    pub domain_notes: Option<DomainNote>,
    #[serde(rename = "Confidence")]
    pub confidence: Option<ResolutionConfidence>,

    #[serde(rename = "LinkedIn Search URL")]
    pub linkedin_search_url: String,
    #[serde(rename = "Employment Verified", with = "yes_no")]
    pub employment_verified: bool,
    #[serde(rename = "Verification Source")]
    pub verification_source: String,
    #[serde(rename = "Verified At")]
    pub verified_at: Option<NaiveDate>,

    #[serde(rename = "Candidate Email 1")]
    pub candidate_email_1: String,
    #[serde(rename = "Candidate Email 2")]
    pub candidate_email_2: String,
    #[serde(rename = "Email Confidence")]
    pub email_confidence: Option<EmailConfidence>,

    #[serde(rename = "OSINT Verification Source")]
    pub osint_verification_source: String,
    #[serde(rename = "OSINT Evidence")]
    pub osint_evidence: String,
    #[serde(rename = "OSINT Confidence")]
    pub osint_confidence: Option<u8>,
    #[serde(rename = "OSINT Video Published")]
    pub osint_video_published: String,

    #[serde(rename = "Quality Tier")]
    pub quality_tier: Option<QualityTier>,
    #[serde(rename = "Evidence")]
    pub evidence: String,
    #[serde(rename = "Verified Confidence")]
    pub verified_confidence: String,
}

impl ExecutiveRecord {
    /// Column headers in serialization order. Used when a stage writes an
    /// empty table.
    pub const COLUMNS: [&'static str; 23] = [
        "Original Order",
        "Name",
        "Title",
        "Company",
        "Youtube URL",
        "Company Website",
        "Source",
        "Domain Notes",
        "Confidence",
        "LinkedIn Search URL",
        "Employment Verified",
        "Verification Source",
        "Verified At",
        "Candidate Email 1",
        "Candidate Email 2",
        "Email Confidence",
        "OSINT Verification Source",
        "OSINT Evidence",
        "OSINT Confidence",
        "OSINT Video Published",
        "Quality Tier",
        "Evidence",
        "Verified Confidence",
    ];

    pub fn new(name: &str, title: &str, company: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            ..Self::default()
        }
    }

    pub fn has_website(&self) -> bool {
        !self.company_website.trim().is_empty()
    }

    pub fn has_email_1(&self) -> bool {
        !self.candidate_email_1.trim().is_empty()
    }

    pub fn has_email_2(&self) -> bool {
        !self.candidate_email_2.trim().is_empty()
    }

    pub fn has_any_email(&self) -> bool {
        self.has_email_1() || self.has_email_2()
    }

    pub fn has_both_emails(&self) -> bool {
        self.has_email_1() && self.has_email_2()
    }

    /// Short label for log lines.
    pub fn label(&self) -> String {
        let name = if self.name.trim().is_empty() {
            "(no name)"
        } else {
            self.name.trim()
        };
        if self.company.trim().is_empty() {
            name.to_string()
        } else {
            format!("{} @ {}", name, self.company.trim())
        }
    }
}

/// How the company website was (or was not) found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainNote {
    MappedKnownDomain,
    VerifiedFromMapping,
    VerifiedFromSlug,
    NotFound,
    NoCompanyInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionConfidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailConfidence {
    Low,
    Medium,
    High,
}

/// Selection tiers in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    #[serde(rename = "strict")]
    Strict,
    A,
    B,
    C,
    #[serde(rename = "fallback")]
    Fallback,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Strict,
        QualityTier::A,
        QualityTier::B,
        QualityTier::C,
        QualityTier::Fallback,
    ];
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityTier::Strict => write!(f, "strict"),
            QualityTier::A => write!(f, "A"),
            QualityTier::B => write!(f, "B"),
            QualityTier::C => write!(f, "C"),
            QualityTier::Fallback => write!(f, "fallback"),
        }
    }
}

/// One row of the email pattern log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternLogEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Email 1")]
    pub email_1: String,
    #[serde(rename = "Email 2")]
    pub email_2: String,
    #[serde(rename = "Patterns Tried")]
    pub patterns_tried: String,
}

/// One row of the manual verification template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationTemplateRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "LinkedIn Search URL")]
    pub linkedin_search_url: String,
    #[serde(rename = "Verification Source")]
    pub verification_source: String,
    #[serde(rename = "Employment Verified", with = "yes_no")]
    pub employment_verified: bool,
    #[serde(rename = "Verified At")]
    pub verified_at: Option<NaiveDate>,
}

/// A row of the manual overrides file. Only the join keys and the verdict are
/// read; other columns are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VerificationOverride {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Employment Verified")]
    pub employment_verified: String,
    #[serde(rename = "Verification Source")]
    pub verification_source: String,
}

/// `yes`/`no` columns. Reading accepts the usual truthy spellings.
pub(crate) mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn is_truthy(value: &str) -> bool {
        matches!(
            value.trim().to_lowercase().as_str(),
            "yes" | "true" | "y" | "1"
        )
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "yes" } else { "no" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().is_some_and(is_truthy))
    }
}
