use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{
        fetch_generation::{FetchGeneration, FetchTicket},
        listing::ProjectSource,
    },
    entities::{demo::demo_project, project::Project},
    errors::AppError,
};

static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.;]|\n").expect("valid sentence regex"));

/// Result of looking one project up. A miss and an outage stay distinct here;
/// callers decide whether to collapse them.
#[derive(Debug)]
pub enum DetailOutcome {
    Found(Project),
    NotFound,
    Unavailable(AppError),
}

impl DetailOutcome {
    /// The record to render: the stored one, or the fixed demo record for
    /// both a miss and an outage.
    pub fn resolve_or_demo(self) -> (Project, ProjectSource) {
        match self {
            DetailOutcome::Found(project) => (project, ProjectSource::Store),
            DetailOutcome::NotFound => {
                tracing::info!("Project not found, showing demo project");
                (demo_project(), ProjectSource::Demo)
            }
            DetailOutcome::Unavailable(e) => {
                tracing::warn!("Error fetching project, showing demo project: {}", e);
                (demo_project(), ProjectSource::Demo)
            }
        }
    }
}

/// Free text rendered either as a paragraph or, when it reads as several
/// sentences, as a bulleted list. The stored text itself is left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum FormattedText {
    Paragraph(String),
    List(Vec<String>),
}

impl FormattedText {
    pub fn from_text(text: &str) -> Self {
        let items: Vec<String> = SENTENCE_BREAK
            .split(text)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();

        if items.len() > 1 {
            FormattedText::List(items)
        } else {
            FormattedText::Paragraph(text.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailResponse {
    pub source: ProjectSource,
    pub project: Project,
    pub description_formatted: FormattedText,
    pub challenges_formatted: Option<FormattedText>,
}

impl ProjectDetailResponse {
    pub fn new(project: Project, source: ProjectSource) -> Self {
        ProjectDetailResponse {
            source,
            description_formatted: FormattedText::from_text(&project.description),
            challenges_formatted: project.challenges.as_deref().map(FormattedText::from_text),
            project,
        }
    }
}

/// State of the project detail page.
#[derive(Debug, Default)]
pub struct DetailView {
    project: Option<(Project, ProjectSource)>,
    generation: FetchGeneration,
}

impl DetailView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation.next()
    }

    /// Lands a lookup; returns `false` if a newer lookup has started since.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, outcome: DetailOutcome) -> bool {
        if !self.generation.is_current(ticket) {
            tracing::debug!("Dropping stale project detail response");
            return false;
        }
        self.project = Some(outcome.resolve_or_demo());
        true
    }

    pub fn is_loading(&self) -> bool {
        self.project.is_none()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref().map(|(project, _)| project)
    }

    pub fn into_response(self) -> ProjectDetailResponse {
        let (project, source) = self.project.unwrap_or_else(|| (demo_project(), ProjectSource::Demo));
        ProjectDetailResponse::new(project, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn several_sentences_render_as_a_list() {
        let formatted = FormattedText::from_text("Built the API. Wrote tests; shipped it\nCelebrated.");
        assert_eq!(
            formatted,
            FormattedText::List(vec![
                "Built the API".into(),
                "Wrote tests".into(),
                "shipped it".into(),
                "Celebrated".into(),
            ])
        );
    }

    #[test]
    fn a_single_sentence_stays_a_paragraph() {
        let text = "Only one sentence here.";
        assert_eq!(FormattedText::from_text(text), FormattedText::Paragraph(text.into()));
        assert_eq!(FormattedText::from_text(""), FormattedText::Paragraph(String::new()));
    }

    #[test]
    fn miss_and_outage_resolve_to_the_same_record() {
        let (missing, missing_source) = DetailOutcome::NotFound.resolve_or_demo();
        let (offline, offline_source) =
            DetailOutcome::Unavailable(AppError::StoreUnavailable("down".into())).resolve_or_demo();

        assert_eq!(missing, offline);
        assert_eq!(missing_source, ProjectSource::Demo);
        assert_eq!(offline_source, ProjectSource::Demo);
    }

    #[test]
    fn late_lookup_cannot_overwrite_newer_navigation() {
        let mut view = DetailView::new();
        let old = view.begin_fetch();
        let new = view.begin_fetch();

        let mut current = demo_project();
        current.title = "Current".into();

        assert!(view.apply_fetch(new, DetailOutcome::Found(current)));
        assert!(!view.apply_fetch(old, DetailOutcome::NotFound));
        assert_eq!(view.project().map(|p| p.title.as_str()), Some("Current"));
    }

    #[test]
    fn response_formats_description_and_challenges() {
        let response = ProjectDetailResponse::new(demo_project(), ProjectSource::Demo);
        assert!(matches!(response.description_formatted, FormattedText::List(_)));
        assert!(matches!(response.challenges_formatted, Some(FormattedText::List(_))));
    }
}
