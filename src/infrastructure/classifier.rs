//! Page classification for fetched enrolment pages.
//!
//! Pure function over page content plus the post-redirect URL. Three shapes
//! are recognized, checked in order:
//! 1. a fatal error box - the site knows the ID but refuses the page;
//! 2. a course page header (either in place or after a redirect to
//!    `course/view.php`) - the course exists and has a name;
//! 3. neither - recorded as `NoContent`, a terminal outcome, never a gap.

use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Selector};

use crate::domain::record::CourseStatus;
use crate::domain::session::FetchedPage;

/// CSS selectors for the recognized page shapes.
#[derive(Debug, Clone)]
pub struct ClassifierSelectors {
    pub error_box: String,
    pub error_message: String,
    pub course_header: String,
}

impl Default for ClassifierSelectors {
    fn default() -> Self {
        Self {
            error_box: r#"div.errorbox[data-rel="fatalerror"]"#.to_string(),
            error_message: "p.errormessage".to_string(),
            course_header: "div.page-header-headings h1".to_string(),
        }
    }
}

/// Classifier with pre-parsed selectors, shared read-only by all workers.
pub struct PageClassifier {
    error_box: Selector,
    error_message: Selector,
    course_header: Selector,
}

impl PageClassifier {
    pub fn new() -> Result<Self> {
        Self::with_selectors(&ClassifierSelectors::default())
    }

    pub fn with_selectors(selectors: &ClassifierSelectors) -> Result<Self> {
        Ok(Self {
            error_box: parse_selector(&selectors.error_box)?,
            error_message: parse_selector(&selectors.error_message)?,
            course_header: parse_selector(&selectors.course_header)?,
        })
    }

    /// Classify one fetched page into a status and detail text.
    pub fn classify(&self, page: &FetchedPage) -> (CourseStatus, String) {
        let document = Html::parse_document(&page.body);

        if let Some(error_box) = document.select(&self.error_box).next() {
            let message = error_box
                .select(&self.error_message)
                .next()
                .map(element_text)
                .unwrap_or_else(|| "unspecified error".to_string());
            return (CourseStatus::Error, message);
        }

        if let Some(header) = document.select(&self.course_header).next() {
            return (CourseStatus::Success, element_text(header));
        }

        if page.final_url.contains("course/view.php") {
            // Redirected to a course page whose header we could not find.
            return (
                CourseStatus::NoContent,
                "redirected to course page without a recognizable header".to_string(),
            );
        }

        (
            CourseStatus::NoContent,
            "no course found, but no error or redirect".to_string(),
        )
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("invalid CSS selector '{selector}': {e}"))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(final_url: &str, body: &str) -> FetchedPage {
        FetchedPage {
            final_url: final_url.to_string(),
            body: body.to_string(),
        }
    }

    fn classifier() -> PageClassifier {
        PageClassifier::new().unwrap()
    }

    #[test]
    fn fatal_error_box_is_an_error_record() {
        let body = r#"
            <div data-rel="fatalerror" class="errorbox alert">
                <p class="errormessage">Invalid course ID</p>
            </div>
        "#;
        let (status, detail) = classifier().classify(&page("https://lms/enrol/index.php?id=3", body));
        assert_eq!(status, CourseStatus::Error);
        assert_eq!(detail, "Invalid course ID");
    }

    #[test]
    fn course_header_after_redirect_is_success() {
        let body = r#"
            <div class="page-header-headings">
                <h1>Operating Systems  </h1>
            </div>
        "#;
        let (status, detail) =
            classifier().classify(&page("https://lms/course/view.php?id=12", body));
        assert_eq!(status, CourseStatus::Success);
        assert_eq!(detail, "Operating Systems");
    }

    #[test]
    fn course_header_without_redirect_is_also_success() {
        let body = r#"<div class="page-header-headings"><h1>Algorithms</h1></div>"#;
        let (status, detail) = classifier().classify(&page("https://lms/enrol/index.php?id=7", body));
        assert_eq!(status, CourseStatus::Success);
        assert_eq!(detail, "Algorithms");
    }

    #[test]
    fn unrecognized_page_is_no_content_not_a_gap() {
        let body = "<html><body><p>Nothing here</p></body></html>";
        let (status, detail) = classifier().classify(&page("https://lms/enrol/index.php?id=9", body));
        assert_eq!(status, CourseStatus::NoContent);
        assert!(detail.contains("no course found"));
    }

    #[test]
    fn error_box_wins_over_header() {
        let body = r#"
            <div data-rel="fatalerror" class="errorbox"><p class="errormessage">Denied</p></div>
            <div class="page-header-headings"><h1>Ghost Course</h1></div>
        "#;
        let (status, _) = classifier().classify(&page("https://lms/enrol/index.php?id=5", body));
        assert_eq!(status, CourseStatus::Error);
    }
}
