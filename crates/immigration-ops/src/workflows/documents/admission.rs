use mime::Mime;

use super::domain::ArtifactUpload;
use crate::config::DocumentConfig;

/// Non-standard alias some browsers report for JPEG files.
const IMAGE_JPG: &str = "image/jpg";

pub const IMAGE_ADVISORY: &str = "For tribunal submissions, PDF format at 300 DPI is recommended.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("File \"{file_name}\" is too large. Maximum size is {limit_label}.")]
    FileTooLarge {
        file_name: String,
        byte_size: u64,
        limit_label: String,
    },
    #[error("File \"{file_name}\" has an unsupported format. Please upload PDF, JPG, or PNG files.")]
    UnsupportedType { file_name: String, mime_type: String },
}

/// Size and type gate applied before any upload joins the collection.
#[derive(Debug, Clone)]
pub struct AdmissionPolicy {
    max_bytes: u64,
}

impl AdmissionPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn from_config(config: &DocumentConfig) -> Self {
        Self::new(config.max_upload_bytes)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Size is checked first, then type.
    pub fn check(&self, upload: &ArtifactUpload) -> Result<(), AdmissionError> {
        let byte_size = upload.byte_size();
        if byte_size > self.max_bytes {
            return Err(AdmissionError::FileTooLarge {
                file_name: upload.file_name.clone(),
                byte_size,
                limit_label: limit_label(self.max_bytes),
            });
        }

        if !is_allowed_type(&upload.mime_type) {
            return Err(AdmissionError::UnsupportedType {
                file_name: upload.file_name.clone(),
                mime_type: upload.mime_type.clone(),
            });
        }

        Ok(())
    }

    pub fn advisories(&self, upload: &ArtifactUpload) -> Vec<String> {
        match upload.mime_type.parse::<Mime>() {
            Ok(parsed) if parsed.type_() == mime::IMAGE => vec![format!(
                "Note: \"{}\" is an image file. {IMAGE_ADVISORY}",
                upload.file_name
            )],
            _ => Vec::new(),
        }
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::from_config(&DocumentConfig::default())
    }
}

pub fn is_allowed_type(mime_type: &str) -> bool {
    let Ok(parsed) = mime_type.trim().parse::<Mime>() else {
        return false;
    };
    let essence = parsed.essence_str();
    essence == mime::APPLICATION_PDF.essence_str()
        || essence == mime::IMAGE_JPEG.essence_str()
        || essence == mime::IMAGE_PNG.essence_str()
        || essence == IMAGE_JPG
}

fn limit_label(max_bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if max_bytes >= MIB && max_bytes % MIB == 0 {
        format!("{}MB", max_bytes / MIB)
    } else {
        super::reconciler::format_file_size(max_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, mime_type: &str, len: usize) -> ArtifactUpload {
        ArtifactUpload::new(name, mime_type, vec![0u8; len])
    }

    #[test]
    fn accepts_the_four_allowed_types() {
        for mime_type in ["application/pdf", "image/jpeg", "image/jpg", "image/png"] {
            assert!(is_allowed_type(mime_type), "{mime_type} should be allowed");
        }
        assert!(is_allowed_type("application/pdf; charset=binary"));
        assert!(!is_allowed_type("image/gif"));
        assert!(!is_allowed_type("application/msword"));
        assert!(!is_allowed_type("not a mime"));
    }

    #[test]
    fn size_is_checked_before_type() {
        let policy = AdmissionPolicy::new(4);
        let err = policy
            .check(&upload("scan.gif", "image/gif", 5))
            .expect_err("oversized");
        assert!(matches!(err, AdmissionError::FileTooLarge { byte_size: 5, .. }));
    }

    #[test]
    fn limit_is_inclusive() {
        let policy = AdmissionPolicy::new(4);
        assert!(policy.check(&upload("a.pdf", "application/pdf", 4)).is_ok());
    }

    #[test]
    fn default_policy_reports_twenty_megabytes() {
        let policy = AdmissionPolicy::default();
        let err = policy
            .check(&upload("huge.pdf", "application/pdf", 20 * 1024 * 1024 + 1))
            .expect_err("oversized");
        assert_eq!(
            err.to_string(),
            "File \"huge.pdf\" is too large. Maximum size is 20MB."
        );
    }

    #[test]
    fn unsupported_message_lists_accepted_formats() {
        let err = AdmissionPolicy::default()
            .check(&upload("letter.docx", "application/msword", 10))
            .expect_err("unsupported");
        assert_eq!(
            err.to_string(),
            "File \"letter.docx\" has an unsupported format. Please upload PDF, JPG, or PNG files."
        );
    }

    #[test]
    fn only_images_get_the_dpi_advisory() {
        let policy = AdmissionPolicy::default();
        let advisories = policy.advisories(&upload("photo.png", "image/png", 1));
        assert_eq!(advisories.len(), 1);
        assert!(advisories[0].ends_with(IMAGE_ADVISORY));
        assert!(policy
            .advisories(&upload("form.pdf", "application/pdf", 1))
            .is_empty());
    }
}
