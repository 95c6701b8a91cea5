// src/listing/mod.rs
//! Public listing: facets, search, pagination and the detail helpers.

pub mod detail;
pub mod filter;
pub mod pagination;

pub use detail::{posted_ago, share_links, share_url, similar_jobs, summary_line, ShareLinks};
pub use filter::{
    filter_jobs, paginate, total_pages, CategoryFilter, ExperienceFilter, JobFilters, JobPage,
    JOBS_PER_PAGE,
};
pub use pagination::{page_strip, PageItem};

use crate::types::JobPosting;
use serde::Serialize;

pub const EMPTY_LISTING_MESSAGE: &str = "No jobs found matching your criteria.";

/// Listing intents. Every facet or search change sends the viewer back to
/// page 1 so a narrowed result set never leaves them on an empty page.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingIntent {
    SetCategory(CategoryFilter),
    SetExperience(ExperienceFilter),
    ToggleRemoteOnly,
    ToggleInternshipOnly,
    SetSearchTerm(String),
    GoToPage(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingState {
    pub filters: JobFilters,
    pub page: usize,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            filters: JobFilters::default(),
            page: 1,
        }
    }
}

/// What the listing view renders for the current state.
#[derive(Debug, Serialize)]
pub struct ListingView<'a> {
    #[serde(flatten)]
    pub page: JobPage<'a>,
    pub page_strip: Vec<PageItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl ListingState {
    pub fn apply(&mut self, intent: ListingIntent, jobs: &[JobPosting]) {
        match intent {
            ListingIntent::SetCategory(category) => {
                self.filters.category = category;
                self.page = 1;
            }
            ListingIntent::SetExperience(experience) => {
                self.filters.experience = experience;
                self.page = 1;
            }
            ListingIntent::ToggleRemoteOnly => {
                self.filters.remote_only = !self.filters.remote_only;
                self.page = 1;
            }
            ListingIntent::ToggleInternshipOnly => {
                self.filters.internship_only = !self.filters.internship_only;
                self.page = 1;
            }
            ListingIntent::SetSearchTerm(term) => {
                self.filters.search_term = term;
                self.page = 1;
            }
            ListingIntent::GoToPage(page) => {
                let last = total_pages(filter_jobs(jobs, &self.filters).len()).max(1);
                self.page = page.clamp(1, last);
            }
        }
    }

    pub fn view<'a>(&self, jobs: &'a [JobPosting]) -> ListingView<'a> {
        build_view(jobs, &self.filters, self.page)
    }
}

pub fn build_view<'a>(jobs: &'a [JobPosting], filters: &JobFilters, page: usize) -> ListingView<'a> {
    let page = paginate(jobs, filters, page);
    let page_strip = page_strip(page.page, page.total_pages);
    let empty_message = page.is_empty().then_some(EMPTY_LISTING_MESSAGE);
    ListingView {
        page,
        page_strip,
        empty_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::job;
    use crate::types::Category;

    fn jobs(n: i64) -> Vec<JobPosting> {
        (1..=n).map(|id| job(id, "Engineer", "Acme", "Pune")).collect()
    }

    #[test]
    fn test_every_filter_change_resets_to_first_page() {
        let all = jobs(30);
        let intents = vec![
            ListingIntent::SetCategory(CategoryFilter::Only(Category::NonTech)),
            ListingIntent::SetExperience(ExperienceFilter::All),
            ListingIntent::ToggleRemoteOnly,
            ListingIntent::ToggleInternshipOnly,
            ListingIntent::SetSearchTerm("eng".to_string()),
        ];
        for intent in intents {
            let mut state = ListingState::default();
            state.apply(ListingIntent::GoToPage(3), &all);
            assert_eq!(state.page, 3);
            state.apply(intent, &all);
            assert_eq!(state.page, 1);
        }
    }

    #[test]
    fn test_go_to_page_is_clamped() {
        let all = jobs(23);
        let mut state = ListingState::default();
        state.apply(ListingIntent::GoToPage(9), &all);
        assert_eq!(state.page, 3);
        state.apply(ListingIntent::GoToPage(0), &all);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_view_of_twenty_three_jobs() {
        let all = jobs(23);
        let view = ListingState::default().view(&all);
        assert_eq!(view.page.items.len(), 9);
        assert_eq!(view.page.total_pages, 3);
        assert_eq!(
            view.page_strip,
            vec![PageItem::Page(1), PageItem::Page(2), PageItem::Page(3)]
        );
        assert!(view.empty_message.is_none());
    }

    #[test]
    fn test_empty_result_renders_message_without_strip() {
        let all = jobs(5);
        let mut state = ListingState::default();
        state.apply(ListingIntent::SetSearchTerm("nothing-matches".into()), &all);
        let view = state.view(&all);
        assert!(view.page.items.is_empty());
        assert_eq!(view.page.total_pages, 0);
        assert!(view.page_strip.is_empty());
        assert_eq!(view.empty_message, Some(EMPTY_LISTING_MESSAGE));
    }
}
