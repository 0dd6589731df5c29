//! Inbound job submission shapes.

use serde::{Deserialize, Serialize};

use crate::options::Options;

/// How the source video is referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Drive,
    Url,
}

/// A `POST /jobs` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_hint: Option<String>,
    #[serde(default)]
    pub options: Options,
}

/// Reasons a JobRequest fails validation before a Job is ever created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestValidationError {
    #[error("source_type=drive requires drive_file_id and no source_url")]
    MissingDriveFileId,
    #[error("source_type=url requires source_url and no drive_file_id")]
    MissingSourceUrl,
    #[error("exactly one of drive_file_id/source_url must be set")]
    ConflictingSourceFields,
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl JobRequest {
    /// Validate the source-reference exclusivity rule and normalize Options.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        let has_drive = self.drive_file_id.as_deref().is_some_and(|s| !s.is_empty());
        let has_url = self.source_url.as_deref().is_some_and(|s| !s.is_empty());

        match self.source_type {
            SourceType::Drive => {
                if has_url {
                    return Err(RequestValidationError::ConflictingSourceFields);
                }
                if !has_drive {
                    return Err(RequestValidationError::MissingDriveFileId);
                }
            }
            SourceType::Url => {
                if has_drive {
                    return Err(RequestValidationError::ConflictingSourceFields);
                }
                if !has_url {
                    return Err(RequestValidationError::MissingSourceUrl);
                }
            }
        }

        self.options
            .validate()
            .map_err(RequestValidationError::InvalidOptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive_request(drive_file_id: Option<&str>, source_url: Option<&str>) -> JobRequest {
        JobRequest {
            source_type: SourceType::Drive,
            drive_file_id: drive_file_id.map(String::from),
            source_url: source_url.map(String::from),
            title_hint: None,
            options: Options::default(),
        }
    }

    #[test]
    fn rejects_neither_source_field() {
        let req = drive_request(None, None);
        assert_eq!(
            req.validate(),
            Err(RequestValidationError::MissingDriveFileId)
        );
    }

    #[test]
    fn rejects_both_source_fields() {
        let req = drive_request(Some("file123"), Some("https://example.com/v.mp4"));
        assert_eq!(
            req.validate(),
            Err(RequestValidationError::ConflictingSourceFields)
        );
    }

    #[test]
    fn accepts_well_formed_drive_request() {
        let req = drive_request(Some("file123"), None);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn url_source_requires_source_url() {
        let mut req = drive_request(Some("file123"), None);
        req.source_type = SourceType::Url;
        req.drive_file_id = None;
        assert_eq!(
            req.validate(),
            Err(RequestValidationError::MissingSourceUrl)
        );
    }
}
