//! Page discovery from the wiki's title index.

use scraper::{Html, Selector};
use tracing::{debug, error, info};

use crate::fetch::WikiSource;
use crate::models::{FailureKind, FailureLog};

/// Parse a title index page into page paths, in document order.
///
/// Uses the `.titleindex li > a` anchors Trac renders for the index.
pub fn parse_title_index(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let link_sel = Selector::parse(".titleindex li > a").unwrap();

    document
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .inspect(|href| debug!("Discovered {}", href))
        .map(str::to_string)
        .collect()
}

/// Fetch and parse the title index.
///
/// A fetch failure is recorded and yields no pages, so the crawl still
/// completes.
pub async fn discover_pages<S: WikiSource + ?Sized>(
    source: &S,
    index_path: &str,
    failures: &mut FailureLog,
) -> Vec<String> {
    info!("Fetching title index {}{}", source.base_url(), index_path);

    match source.fetch_text(index_path).await {
        Ok(html) => {
            let pages = parse_title_index(&html);
            info!("Title index lists {} pages", pages.len());
            pages
        }
        Err(e) => {
            error!("Error fetching title index {}: {}", index_path, e);
            failures.record(FailureKind::Index, index_path, &e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::MockSource;

    fn sample_index() -> &'static str {
        r#"
        <html>
        <body>
        <div id="content" class="wiki">
          <ul><li><a href="/wiki/NotInIndex">stray link</a></li></ul>
          <div class="titleindex">
            <ul>
              <li><a href="/wiki/Start">Start</a></li>
              <li><a href="/wiki/TracAdmin">TracAdmin</a>
                <ul>
                  <li><a href="/wiki/TracAdmin/Sub">Sub</a></li>
                </ul>
              </li>
              <li><span>no link</span></li>
              <li><a href="/wiki/Caf%C3%A9">Café</a></li>
            </ul>
          </div>
        </div>
        </body>
        </html>
        "#
    }

    #[test]
    fn test_parse_title_index_document_order() {
        let pages = parse_title_index(sample_index());

        assert_eq!(
            pages,
            vec![
                "/wiki/Start",
                "/wiki/TracAdmin",
                "/wiki/TracAdmin/Sub",
                "/wiki/Caf%C3%A9",
            ]
        );
    }

    #[test]
    fn test_parse_title_index_without_container() {
        assert!(parse_title_index("<html><body><ul><li><a href=\"/x\">x</a></li></ul></body></html>").is_empty());
    }

    #[tokio::test]
    async fn test_discover_pages_fetch_failure_is_soft() {
        let source = MockSource::new("https://wiki.example.org");
        let mut failures = FailureLog::new();

        let pages = discover_pages(&source, "/wiki/TitleIndex", &mut failures).await;

        assert!(pages.is_empty());
        assert_eq!(failures.count(FailureKind::Index), 1);
        assert_eq!(failures.paths(), vec!["/wiki/TitleIndex"]);
    }

    #[tokio::test]
    async fn test_discover_pages() {
        let source = MockSource::new("https://wiki.example.org")
            .with("/wiki/TitleIndex", sample_index());
        let mut failures = FailureLog::new();

        let pages = discover_pages(&source, "/wiki/TitleIndex", &mut failures).await;

        assert_eq!(pages.len(), 4);
        assert!(failures.is_empty());
    }
}
