// src/listing/filter.rs
use crate::types::{Category, ExperienceLevel, JobPosting, JobType};
use serde::{Deserialize, Serialize};

pub const JOBS_PER_PAGE: usize = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceFilter {
    #[default]
    All,
    Only(ExperienceLevel),
}

impl CategoryFilter {
    fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }

    /// Parse a query-string value (`all`, `tech`, `non-tech`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "all" => Some(CategoryFilter::All),
            "tech" => Some(CategoryFilter::Only(Category::Tech)),
            "non-tech" | "nontech" | "non_tech" => Some(CategoryFilter::Only(Category::NonTech)),
            _ => None,
        }
    }
}

impl ExperienceFilter {
    fn matches(&self, level: ExperienceLevel) -> bool {
        match self {
            ExperienceFilter::All => true,
            ExperienceFilter::Only(wanted) => *wanted == level,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "all" => Some(ExperienceFilter::All),
            "fresher" => Some(ExperienceFilter::Only(ExperienceLevel::Fresher)),
            "experienced" => Some(ExperienceFilter::Only(ExperienceLevel::Experienced)),
            _ => None,
        }
    }
}

/// Facets and search term applied to the public listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilters {
    pub category: CategoryFilter,
    pub experience: ExperienceFilter,
    pub remote_only: bool,
    pub internship_only: bool,
    pub search_term: String,
}

impl JobFilters {
    pub fn matches(&self, job: &JobPosting) -> bool {
        self.category.matches(job.category)
            && self.experience.matches(job.experience_level)
            && (!self.remote_only || job.location.to_lowercase() == "remote")
            && (!self.internship_only || job.job_type == JobType::Internship)
            && self.matches_search(job)
    }

    fn matches_search(&self, job: &JobPosting) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        [&job.title, &job.company, &job.location]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// One page of the filtered listing.
#[derive(Debug, Serialize)]
pub struct JobPage<'a> {
    pub items: Vec<&'a JobPosting>,
    pub page: usize,
    pub total_count: usize,
    pub total_pages: usize,
}

impl JobPage<'_> {
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

pub fn filter_jobs<'a>(jobs: &'a [JobPosting], filters: &JobFilters) -> Vec<&'a JobPosting> {
    jobs.iter().filter(|job| filters.matches(job)).collect()
}

pub fn total_pages(count: usize) -> usize {
    count.div_ceil(JOBS_PER_PAGE)
}

/// Filter `jobs` (kept in store order) and cut out the 1-based `page`.
/// A page past the end yields no items.
pub fn paginate<'a>(jobs: &'a [JobPosting], filters: &JobFilters, page: usize) -> JobPage<'a> {
    let filtered = filter_jobs(jobs, filters);
    let total_count = filtered.len();
    let page = page.max(1);
    let items = filtered
        .into_iter()
        .skip(page.saturating_sub(1).saturating_mul(JOBS_PER_PAGE))
        .take(JOBS_PER_PAGE)
        .collect();

    JobPage {
        items,
        page,
        total_count,
        total_pages: total_pages(total_count),
    }
}
