use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::error::HttpError;
use crate::domain::entities::{CatTagResult, TypeCount};

use super::text;

const BLOCK_TITLE: &str = "Post Counts";

#[derive(Debug, Error)]
#[error("failed to render `{template}`")]
pub struct TemplateRenderError {
    template: &'static str,
    #[source]
    error: AskamaError,
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        HttpError::from_error(
            "presentation::views",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Template rendering failed",
            &err,
        )
    }
}

/// Render `template` to a string, naming the template type on failure.
pub fn render_fragment<T: Template>(template: T) -> Result<String, TemplateRenderError> {
    template.render().map_err(|error| TemplateRenderError {
        template: std::any::type_name::<T>(),
        error,
    })
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    render_fragment(template).map(Html).map_err(HttpError::from)
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatTagSectionView {
    pub heading: String,
    pub titles: Vec<String>,
}

/// Everything the block template needs, already phrased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteCountsView {
    pub class_name: Option<String>,
    pub title: String,
    pub type_lines: Vec<String>,
    pub current_item_line: String,
    /// `None` when no item matches, which hides the section.
    pub cat_tag: Option<CatTagSectionView>,
}

impl SiteCountsView {
    pub fn build(
        type_counts: &[TypeCount],
        current_id: i64,
        cat_tag: &CatTagResult,
        class_name: Option<String>,
    ) -> Self {
        let type_lines = type_counts
            .iter()
            .map(|entry| text::type_count_line(entry.count, &entry.label))
            .collect();

        let cat_tag = (!cat_tag.is_empty()).then(|| CatTagSectionView {
            heading: text::cat_tag_heading(cat_tag.count as u64),
            titles: cat_tag.items.iter().map(|item| item.title.clone()).collect(),
        });

        Self {
            class_name,
            title: BLOCK_TITLE.to_string(),
            type_lines,
            current_item_line: text::current_item_line(current_id),
            cat_tag,
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/site_counts.html")]
pub struct SiteCountsTemplate {
    pub view: SiteCountsView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ItemStub;

    fn counts() -> Vec<TypeCount> {
        vec![
            TypeCount {
                count: 1,
                label: "post".to_string(),
            },
            TypeCount {
                count: 0,
                label: "page".to_string(),
            },
            TypeCount {
                count: 5,
                label: "products".to_string(),
            },
        ]
    }

    fn shortlist(titles: &[&str]) -> CatTagResult {
        let items: Vec<ItemStub> = titles
            .iter()
            .enumerate()
            .map(|(idx, title)| ItemStub {
                id: idx as i64 + 1,
                title: title.to_string(),
            })
            .collect();
        CatTagResult::excluding(&items, 0)
    }

    #[test]
    fn build_phrases_every_line() {
        let view = SiteCountsView::build(&counts(), 42, &shortlist(&["Hello"]), None);

        assert_eq!(
            view.type_lines,
            vec![
                "There is 1 post.",
                "There are 0 page.",
                "There are 5 products."
            ]
        );
        assert_eq!(view.current_item_line, "The current post ID is 42.");
        assert_eq!(
            view.cat_tag,
            Some(CatTagSectionView {
                heading: "1 post with the tag of foo and the category of baz".to_string(),
                titles: vec!["Hello".to_string()],
            })
        );
    }

    #[test]
    fn empty_shortlist_hides_section() {
        let view = SiteCountsView::build(&counts(), 42, &CatTagResult::default(), None);
        assert!(view.cat_tag.is_none());

        let html = render_fragment(SiteCountsTemplate { view }).expect("render");
        assert!(!html.contains("the tag of foo"));
        assert_eq!(html.matches("<h2>").count(), 1);
    }

    #[test]
    fn template_renders_well_formed_fragment() {
        let view = SiteCountsView::build(
            &counts(),
            7,
            &shortlist(&["First", "Second"]),
            Some("wide".to_string()),
        );
        let html = render_fragment(SiteCountsTemplate { view }).expect("render");

        assert!(html.starts_with(r#"<div class="wide">"#));
        assert!(html.contains("<h2>Post Counts</h2>"));
        assert!(html.contains("<li>There is 1 post.</li>"));
        assert!(html.contains("<li>There are 5 products.</li>"));
        assert!(html.contains("<p>The current post ID is 7.</p>"));
        assert!(html.contains("<h2>2 posts with the tag of foo and the category of baz</h2>"));
        assert!(html.contains("<li>First</li>"));
        assert!(html.trim_end().ends_with("</div>"));
        assert_eq!(html.matches("<ul>").count(), html.matches("</ul>").count());
    }

    #[test]
    fn template_omits_class_attribute_when_absent() {
        let view = SiteCountsView::build(&counts(), 7, &CatTagResult::default(), None);
        let html = render_fragment(SiteCountsTemplate { view }).expect("render");
        assert!(html.starts_with("<div>"));
    }

    #[test]
    fn template_escapes_class_and_titles() {
        let view = SiteCountsView::build(
            &counts(),
            7,
            &shortlist(&["<script>alert(1)</script>"]),
            Some(r#"x" onclick="evil"#.to_string()),
        );
        let html = render_fragment(SiteCountsTemplate { view }).expect("render");

        assert!(!html.contains("<script>"));
        assert!(!html.contains(r#"x" onclick"#));
        assert!(html.contains("alert(1)"));
        assert!(html.starts_with(r#"<div class="x"#));
    }
}
