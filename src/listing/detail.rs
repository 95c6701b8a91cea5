// src/listing/detail.rs
use crate::types::JobPosting;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;

const SIMILAR_JOBS_LIMIT: usize = 3;

const FACEBOOK_SHARE: &str = "https://www.facebook.com/sharer/sharer.php";
const TELEGRAM_SHARE: &str = "https://t.me/share/url";
const WHATSAPP_SHARE: &str = "https://api.whatsapp.com/send";
const LINKEDIN_SHARE: &str = "https://www.linkedin.com/shareArticle";

/// Share targets for a posting, each with the title and link encoded as
/// query parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareLinks {
    pub url: String,
    pub facebook: String,
    pub telegram: String,
    pub whatsapp: String,
    pub linkedin: String,
}

/// Other postings from the same company or category, in collection order.
pub fn similar_jobs<'a>(job: &JobPosting, all: &'a [JobPosting]) -> Vec<&'a JobPosting> {
    all.iter()
        .filter(|other| {
            other.id != job.id && (other.company == job.company || other.category == job.category)
        })
        .take(SIMILAR_JOBS_LIMIT)
        .collect()
}

/// Relative "posted" label shown on job cards.
pub fn posted_ago(posted: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - posted).num_seconds() as f64;
    let buckets = [
        (31_536_000.0, "years"),
        (2_592_000.0, "months"),
        (86_400.0, "days"),
        (3_600.0, "hours"),
        (60.0, "minutes"),
    ];

    for (size, unit) in buckets {
        let interval = seconds / size;
        if interval > 1.0 {
            return format!("{} {} ago", interval.floor() as i64, unit);
        }
    }
    "Just now".to_string()
}

/// First sentence of a description, used as the card teaser.
pub fn summary_line(description: &str) -> String {
    let first = description.split(". ").next().unwrap_or_default();
    if first.ends_with('.') {
        first.to_string()
    } else {
        format!("{}.", first)
    }
}

/// The link to share: the posting's own URL when it is absolute, else its
/// detail page on the board when the public address is configured.
pub fn share_url(job: &JobPosting, public_url: Option<&str>) -> Option<String> {
    if job.url.starts_with("https://") || job.url.starts_with("http://") {
        return Some(job.url.clone());
    }
    public_url.map(|base| format!("{}/#/job/{}", base.trim_end_matches('/'), job.id))
}

pub fn share_links(title: &str, url: &str) -> Option<ShareLinks> {
    let whatsapp_text = format!("{} {}", title, url);
    Some(ShareLinks {
        url: url.to_string(),
        facebook: share_link(FACEBOOK_SHARE, &[("u", url)])?,
        telegram: share_link(TELEGRAM_SHARE, &[("url", url), ("text", title)])?,
        whatsapp: share_link(WHATSAPP_SHARE, &[("text", whatsapp_text.as_str())])?,
        linkedin: share_link(
            LINKEDIN_SHARE,
            &[("mini", "true"), ("url", url), ("title", title)],
        )?,
    })
}

fn share_link(base: &str, params: &[(&str, &str)]) -> Option<String> {
    Url::parse_with_params(base, params).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::job;
    use crate::types::Category;
    use chrono::Duration;

    #[test]
    fn test_similar_jobs_share_company_or_category() {
        let mut other_category = job(4, "Sales", "Elsewhere", "Delhi");
        other_category.category = Category::NonTech;
        let mut same_company = job(5, "Cashier", "Acme", "Delhi");
        same_company.category = Category::NonTech;
        let all = vec![
            job(1, "Dev", "Acme", "Pune"),
            job(2, "Ops", "Other", "Pune"),
            job(3, "QA", "Third", "Pune"),
            other_category,
            same_company,
            job(6, "SRE", "Fourth", "Pune"),
        ];

        let similar: Vec<i64> = similar_jobs(&all[0], &all).iter().map(|j| j.id).collect();
        assert_eq!(similar, vec![2, 3, 5]);

        let for_sales: Vec<i64> = similar_jobs(&all[3], &all).iter().map(|j| j.id).collect();
        assert_eq!(for_sales, vec![5]);
    }

    #[test]
    fn test_posted_ago_buckets() {
        let now = Utc::now();
        assert_eq!(posted_ago(now, now), "Just now");
        assert_eq!(posted_ago(now - Duration::seconds(90), now), "1 minutes ago");
        assert_eq!(posted_ago(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(posted_ago(now - Duration::days(3), now), "3 days ago");
        assert_eq!(posted_ago(now - Duration::days(65), now), "2 months ago");
        assert_eq!(posted_ago(now - Duration::days(800), now), "2 years ago");
        // exactly one unit is not "more than one"
        assert_eq!(posted_ago(now - Duration::hours(1), now), "60 minutes ago");
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(summary_line("Build APIs. Ship fast."), "Build APIs.");
        assert_eq!(summary_line("Single sentence"), "Single sentence.");
        assert_eq!(summary_line("Ends here."), "Ends here.");
    }

    #[test]
    fn test_share_url_prefers_absolute_job_url() {
        let mut posting = job(7, "Dev", "Acme", "Pune");
        assert_eq!(share_url(&posting, None), None);
        assert_eq!(
            share_url(&posting, Some("https://jobs.example.com/")).as_deref(),
            Some("https://jobs.example.com/#/job/7")
        );

        posting.url = "https://acme.com/careers/7".to_string();
        assert_eq!(
            share_url(&posting, Some("https://jobs.example.com")).as_deref(),
            Some("https://acme.com/careers/7")
        );
    }

    #[test]
    fn test_share_links_encode_title_and_url() {
        let links = share_links("C++ & Go Dev", "https://jobs.example.com/#/job/7").unwrap();
        let url = "https%3A%2F%2Fjobs.example.com%2F%23%2Fjob%2F7";

        assert_eq!(links.url, "https://jobs.example.com/#/job/7");
        assert_eq!(
            links.facebook,
            format!("https://www.facebook.com/sharer/sharer.php?u={}", url)
        );
        assert_eq!(
            links.telegram,
            format!("https://t.me/share/url?url={}&text=C%2B%2B+%26+Go+Dev", url)
        );
        assert_eq!(
            links.whatsapp,
            format!("https://api.whatsapp.com/send?text=C%2B%2B+%26+Go+Dev+{}", url)
        );
        assert_eq!(
            links.linkedin,
            format!(
                "https://www.linkedin.com/shareArticle?mini=true&url={}&title=C%2B%2B+%26+Go+Dev",
                url
            )
        );
    }
}
