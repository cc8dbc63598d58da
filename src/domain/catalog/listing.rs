use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::{
    catalog::fetch_generation::{FetchGeneration, FetchTicket},
    entities::{
        demo::demo_projects,
        project::{Project, ProjectCard},
    },
    errors::AppError,
};

pub const ALL_CATEGORIES: &str = "All";
pub const NO_PROJECTS_MESSAGE: &str = "No projects found in this category.";

/// The active category filter. `All` is a pseudo-category that shows everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Missing, blank, and "All" all mean no filtering. Anything else is
    /// taken verbatim and matched exactly.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => CategoryFilter::All,
            Some(value) if value.trim().is_empty() || value == ALL_CATEGORIES => CategoryFilter::All,
            Some(value) => CategoryFilter::Category(value.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Category(category) => category,
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(category) => project.category == *category,
        }
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Display-only toggle; it never changes which projects are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl FromStr for ViewMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(AppError::BadRequest(format!("Unknown view mode: {}", other))),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Grid => write!(f, "grid"),
            ViewMode::List => write!(f, "list"),
        }
    }
}

/// Whether the records on screen came from the catalog or the built-in demo set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectSource {
    Store,
    Demo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListingResponse {
    pub categories: Vec<String>,
    pub active_filter: CategoryFilter,
    pub view_mode: ViewMode,
    pub source: ProjectSource,
    pub total: usize,
    pub projects: Vec<ProjectCard>,
    pub empty_message: Option<&'static str>,
}

/// State of the project showcase: the last fetched set, the selected
/// category, and the grid/list toggle. Filtering never goes back to the store.
#[derive(Debug)]
pub struct ListingView {
    all_projects: Vec<Project>,
    active_filter: CategoryFilter,
    view_mode: ViewMode,
    source: ProjectSource,
    loading: bool,
    generation: FetchGeneration,
}

impl Default for ListingView {
    fn default() -> Self {
        ListingView {
            all_projects: Vec::new(),
            active_filter: CategoryFilter::All,
            view_mode: ViewMode::Grid,
            source: ProjectSource::Store,
            loading: true,
            generation: FetchGeneration::default(),
        }
    }
}

impl ListingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.loading = true;
        self.generation.next()
    }

    /// Lands a fetch result. A failed fetch swaps in the demo set so the page
    /// is never empty. Returns `false` when the ticket was superseded and the
    /// result was dropped.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Project>, AppError>) -> bool {
        if !self.generation.is_current(ticket) {
            tracing::debug!("Dropping stale project listing response");
            return false;
        }

        match result {
            Ok(projects) => {
                self.all_projects = projects;
                self.source = ProjectSource::Store;
            }
            Err(e) => {
                tracing::warn!("Error fetching projects, showing demo data: {}", e);
                self.all_projects = demo_projects();
                self.source = ProjectSource::Demo;
            }
        }
        self.loading = false;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn source(&self) -> ProjectSource {
        self.source
    }

    pub fn all_projects(&self) -> &[Project] {
        &self.all_projects
    }

    pub fn active_filter(&self) -> &CategoryFilter {
        &self.active_filter
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    /// "All" followed by each distinct category, in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut categories = vec![ALL_CATEGORIES.to_string()];

        for project in &self.all_projects {
            if seen.insert(project.category.as_str()) {
                categories.push(project.category.clone());
            }
        }
        categories
    }

    pub fn select_filter(&mut self, filter: CategoryFilter) {
        self.active_filter = filter;
    }

    pub fn visible(&self) -> Vec<&Project> {
        self.all_projects
            .iter()
            .filter(|project| self.active_filter.matches(project))
            .collect()
    }

    /// True when the current filter leaves nothing to show.
    pub fn is_empty(&self) -> bool {
        !self.all_projects.iter().any(|project| self.active_filter.matches(project))
    }

    pub fn to_response(&self) -> ProjectListingResponse {
        let projects: Vec<ProjectCard> = self.visible().into_iter().map(Project::to_card).collect();

        ProjectListingResponse {
            categories: self.categories(),
            active_filter: self.active_filter.clone(),
            view_mode: self.view_mode,
            source: self.source,
            total: self.all_projects.len(),
            empty_message: projects.is_empty().then_some(NO_PROJECTS_MESSAGE),
            projects,
        }
    }
}
