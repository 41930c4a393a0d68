//! Tag de plantilla de job: `workflow/vN/config`.
//!
//! El tag identifica el par (versión de workflow, configuración). La
//! gramática es exactamente `<slug> "/" "v" <entero positivo> "/" <slug>`;
//! cualquier otra forma es un error (nunca se devuelve un centinela).

use std::fmt;
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::DomainError;

/// Triple `workflow/vN/config` ya parseado.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobTemplateTag {
    pub workflow_tag: String,
    pub version: u32,
    pub configuration_tag: String,
}

// Slug: alfanumérico ASCII y guiones (los tags de configuración existentes
// incluyen mayúsculas, p.ej. `b37xGen`).
fn is_slug(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl FromStr for JobTemplateTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 3 {
            return Err(DomainError::InvalidTag(s.to_string()));
        }
        let (workflow_tag, version_part, configuration_tag) = (parts[0], parts[1], parts[2]);
        if !is_slug(workflow_tag) || !is_slug(configuration_tag) {
            return Err(DomainError::InvalidTag(s.to_string()));
        }
        let digits = version_part
            .strip_prefix('v')
            .ok_or_else(|| DomainError::InvalidTag(s.to_string()))?;
        // Sin ceros a la izquierda: la versión mínima es v1.
        if digits.is_empty() || digits.starts_with('0') || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidTag(s.to_string()));
        }
        let version: u32 = digits.parse().map_err(|_| DomainError::InvalidTag(s.to_string()))?;
        Ok(JobTemplateTag { workflow_tag: workflow_tag.to_string(),
                            version,
                            configuration_tag: configuration_tag.to_string() })
    }
}

impl fmt::Display for JobTemplateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/v{}/{}", self.workflow_tag, self.version, self.configuration_tag)
    }
}

// En el wire el tag viaja como string plano.
impl Serialize for JobTemplateTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for JobTemplateTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e: DomainError| D::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_are_inverse() {
        let tag: JobTemplateTag = "exomeseq/v1/b37xGen".parse().expect("valid tag");
        assert_eq!(tag.workflow_tag, "exomeseq");
        assert_eq!(tag.version, 1);
        assert_eq!(tag.configuration_tag, "b37xGen");
        assert_eq!(tag.to_string(), "exomeseq/v1/b37xGen");
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!("exomeseq/v1".parse::<JobTemplateTag>().is_err());
        assert!("exomeseq/v1/b37/extra".parse::<JobTemplateTag>().is_err());
        assert!("".parse::<JobTemplateTag>().is_err());
    }

    #[test]
    fn rejects_bad_version_segment() {
        assert!("exomeseq/v0/b37".parse::<JobTemplateTag>().is_err());
        assert!("exomeseq/1/b37".parse::<JobTemplateTag>().is_err());
        assert!("exomeseq/vx/b37".parse::<JobTemplateTag>().is_err());
        assert!("exomeseq/v01/b37".parse::<JobTemplateTag>().is_err());
        assert!("exomeseq/v/b37".parse::<JobTemplateTag>().is_err());
    }

    #[test]
    fn rejects_empty_or_invalid_slugs() {
        assert!("/v1/b37".parse::<JobTemplateTag>().is_err());
        assert!("exomeseq/v1/".parse::<JobTemplateTag>().is_err());
        assert!("exome seq/v1/b37".parse::<JobTemplateTag>().is_err());
    }

    #[test]
    fn serde_roundtrip_as_plain_string() {
        let tag: JobTemplateTag = "wgs/v12/hg38".parse().unwrap();
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"wgs/v12/hg38\"");
        let back: JobTemplateTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }
}
