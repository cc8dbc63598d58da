use std::borrow::Cow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::constants::PLACEHOLDER_IMAGE;

// ───── Constants ──────────────────────────────────────────────────────
const MAX_TITLE_LENGTH: u64 = 120;
const MAX_SHORT_DESCRIPTION_LENGTH: u64 = 300;
const MAX_CATEGORY_LENGTH: u64 = 60;
const MAX_META_LENGTH: u64 = 120;

// ───── Database Models ───────────────────────────────────────────────

/// A portfolio project as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub features: Vec<String>,
    pub image: String,
    pub images: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub duration: Option<String>,
    pub role: Option<String>,
    pub client: Option<String>,
    pub challenges: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The stored shape of a project before the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInsert {
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub features: Vec<String>,
    pub image: String,
    pub images: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub duration: Option<String>,
    pub role: Option<String>,
    pub client: Option<String>,
    pub challenges: Option<String>,
}

// ───── API Response Models ──────────────────────────────────────────

/// What a listing card needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCard {
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub image: String,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectCreatedResponse {
    pub id: Uuid,
    pub message: String,
    pub detail_url: String,
}

// ───── Input & Validation Requests ──────────────────────────────────

/// Raw admin form state. List fields arrive as the text the admin typed:
/// technologies comma-separated, features one per line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectForm {
    #[validate(
        length(max = MAX_TITLE_LENGTH),
        custom(function = "validate_required")
    )]
    pub title: String,

    #[validate(
        length(max = MAX_SHORT_DESCRIPTION_LENGTH),
        custom(function = "validate_required")
    )]
    pub short_description: String,

    #[validate(custom(function = "validate_required"))]
    pub description: String,

    #[validate(
        length(max = MAX_CATEGORY_LENGTH),
        custom(function = "validate_required")
    )]
    pub category: String,

    #[validate(custom(function = "validate_technologies"))]
    pub technologies: String,

    pub features: String,

    #[validate(custom(function = "validate_optional_url"))]
    pub live_url: String,

    #[validate(custom(function = "validate_optional_url"))]
    pub github_url: String,

    #[validate(length(max = MAX_META_LENGTH))]
    pub duration: String,

    #[validate(length(max = MAX_META_LENGTH))]
    pub role: String,

    #[validate(length(max = MAX_META_LENGTH))]
    pub client: String,

    pub challenges: String,

    #[validate(custom(function = "validate_image_urls"))]
    pub images: Vec<String>,
}

impl ProjectForm {
    /// Appends freshly uploaded image URLs after the ones already attached.
    pub fn append_images(&mut self, uploaded: Vec<String>) {
        self.images.extend(uploaded);
    }

    /// Detaches the image at `index`; out-of-range indexes are ignored.
    pub fn remove_image(&mut self, index: usize) {
        if index < self.images.len() {
            self.images.remove(index);
        }
    }
}

// ───── Field Mapping ────────────────────────────────────────────────

/// Splits the comma-separated technologies input, trimming each entry.
pub fn split_technologies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tech| !tech.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits the one-per-line features input, dropping blank lines.
pub fn split_features(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|feature| !feature.is_empty())
        .map(str::to_string)
        .collect()
}

fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

// ───── Validation Helpers ───────────────────────────────────────────
pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(new_validation_error("required", "This field is required"));
    }
    Ok(())
}

pub fn validate_technologies(value: &str) -> Result<(), ValidationError> {
    if split_technologies(value).is_empty() {
        return Err(new_validation_error("technologies_empty", "List at least one technology"));
    }
    Ok(())
}

pub fn validate_optional_url(url: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() {
        return Ok(());
    }
    validate_url(url.trim())
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) => {
            if parsed.scheme() == "http" || parsed.scheme() == "https" {
                Ok(())
            } else {
                Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://"))
            }
        }
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

pub fn validate_image_urls(images: &[String]) -> Result<(), ValidationError> {
    if images.iter().any(|image| image.trim().is_empty()) {
        return Err(new_validation_error("image_empty", "Image URLs cannot be empty"));
    }
    Ok(())
}

fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

// ───── Conversions ──────────────────────────────────────────────────
impl TryFrom<ProjectForm> for ProjectInsert {
    type Error = ValidationErrors;

    fn try_from(form: ProjectForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let technologies = split_technologies(&form.technologies);
        let features = split_features(&form.features);
        let images: Vec<String> = form.images.into_iter().map(|image| image.trim().to_string()).collect();
        let image = images
            .first()
            .cloned()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

        Ok(ProjectInsert {
            title: form.title.trim().to_string(),
            short_description: form.short_description.trim().to_string(),
            description: form.description.trim().to_string(),
            category: form.category.trim().to_string(),
            technologies,
            features,
            image,
            images,
            live_url: optional_text(form.live_url),
            github_url: optional_text(form.github_url),
            duration: optional_text(form.duration),
            role: optional_text(form.role),
            client: optional_text(form.client),
            challenges: optional_text(form.challenges),
        })
    }
}

impl Project {
    pub fn to_card(&self) -> ProjectCard {
        ProjectCard {
            id: self.id,
            title: self.title.clone(),
            short_description: self.short_description.clone(),
            category: self.category.clone(),
            technologies: self.technologies.clone(),
            image: self.cover_image().to_string(),
            live_url: self.live_url.clone(),
            github_url: self.github_url.clone(),
        }
    }

    /// The image to render; never empty even for records written elsewhere.
    pub fn cover_image(&self) -> &str {
        if !self.image.trim().is_empty() {
            &self.image
        } else {
            self.images
                .iter()
                .find(|image| !image.trim().is_empty())
                .map(String::as_str)
                .unwrap_or(PLACEHOLDER_IMAGE)
        }
    }

    /// Rebuilds the admin form from a stored record, for editing.
    pub fn to_form(&self) -> ProjectForm {
        ProjectForm {
            title: self.title.clone(),
            short_description: self.short_description.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            technologies: self.technologies.join(", "),
            features: self.features.join("\n"),
            live_url: self.live_url.clone().unwrap_or_default(),
            github_url: self.github_url.clone().unwrap_or_default(),
            duration: self.duration.clone().unwrap_or_default(),
            role: self.role.clone().unwrap_or_default(),
            client: self.client.clone().unwrap_or_default(),
            challenges: self.challenges.clone().unwrap_or_default(),
            images: self.images.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProjectForm {
        ProjectForm {
            title: "Catalog".into(),
            short_description: "Short".into(),
            description: "Long form text.".into(),
            category: "Web Development".into(),
            technologies: "React, Node.js".into(),
            features: "Fast\nSecure\n".into(),
            ..ProjectForm::default()
        }
    }

    #[test]
    fn form_lists_are_split_at_the_write_boundary() {
        let insert = ProjectInsert::try_from(valid_form()).unwrap();

        assert_eq!(insert.technologies, vec!["React", "Node.js"]);
        assert_eq!(insert.features, vec!["Fast", "Secure"]);
    }

    #[test]
    fn split_drops_empty_segments() {
        assert_eq!(split_technologies(" Rust ,, actix ,"), vec!["Rust", "actix"]);
        assert_eq!(split_features("\n  one \r\n\n two\n   \n"), vec!["one", "two"]);
        assert!(split_features("").is_empty());
    }

    #[test]
    fn missing_images_fall_back_to_placeholder() {
        let insert = ProjectInsert::try_from(valid_form()).unwrap();

        assert_eq!(insert.image, PLACEHOLDER_IMAGE);
        assert!(insert.images.is_empty());
    }

    #[test]
    fn first_uploaded_image_becomes_the_cover() {
        let form = ProjectForm {
            images: vec!["https://cdn.dev/a.png".into(), "https://cdn.dev/b.png".into()],
            ..valid_form()
        };

        let insert = ProjectInsert::try_from(form).unwrap();
        assert_eq!(insert.image, "https://cdn.dev/a.png");
        assert_eq!(insert.images.len(), 2);
    }

    #[test]
    fn blank_optional_fields_are_stored_as_absent() {
        let form = ProjectForm {
            live_url: "   ".into(),
            role: " Lead ".into(),
            ..valid_form()
        };

        let insert = ProjectInsert::try_from(form).unwrap();
        assert_eq!(insert.live_url, None);
        assert_eq!(insert.role.as_deref(), Some("Lead"));
        assert_eq!(insert.challenges, None);
    }

    #[test]
    fn required_fields_are_enforced() {
        let form = ProjectForm {
            title: "  ".into(),
            technologies: " , ".into(),
            ..valid_form()
        };

        let errors = ProjectInsert::try_from(form).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("technologies"));
    }

    #[test]
    fn non_http_urls_are_rejected() {
        let form = ProjectForm {
            github_url: "ftp://example.com/repo".into(),
            ..valid_form()
        };

        assert!(ProjectInsert::try_from(form).is_err());
    }

    #[test]
    fn edit_form_round_trips_lists() {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            title: "Catalog".into(),
            short_description: "Short".into(),
            description: "Long".into(),
            category: "Web".into(),
            technologies: vec!["React".into(), "Node.js".into()],
            features: vec!["Fast".into(), "Secure".into()],
            image: PLACEHOLDER_IMAGE.into(),
            images: vec![],
            live_url: None,
            github_url: Some("https://github.com/example".into()),
            duration: None,
            role: None,
            client: None,
            challenges: None,
            created_at: now,
            updated_at: now,
        };

        let form = project.to_form();
        assert_eq!(form.technologies, "React, Node.js");
        assert_eq!(form.features, "Fast\nSecure");
        assert_eq!(form.github_url, "https://github.com/example");
    }

    #[test]
    fn removing_an_image_keeps_the_rest_in_order() {
        let mut form = valid_form();
        form.append_images(vec!["a".into(), "b".into(), "c".into()]);

        form.remove_image(1);
        form.remove_image(10);

        assert_eq!(form.images, vec!["a", "c"]);
    }
}
