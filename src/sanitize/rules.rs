//! The transformation steps applied to every page.

use dom_query::Document;
use regex::Regex;

use super::PageContext;
use crate::models::AssetReference;
use crate::paths::{collapse_raw_attachment, ATTACHMENT_PREFIX, RAW_ATTACHMENT_PREFIX};

/// A named, independently testable transformation step.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&Document, &mut PageContext<'_>),
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Chrome removed from every page.
const CHROME_SELECTORS: &[&str] = &[
    "#metanav",
    "#mainnav",
    "#ctxtnav",
    "#search",
    "#altlinks",
    ".trac-modifiedby",
    "#trac-noscript",
    r#"link[rel="search"]"#,
    r#"link[rel="help"]"#,
    r#"link[rel="alternate"]"#,
    r#"link[rel="start"]"#,
    r#"link[rel="shortcut icon"]"#,
    "meta[http-equiv]",
    r#"meta[name="ROBOTS"]"#,
    r#"meta[name="robots"]"#,
    "script:not([src])",
    r#"span[class="icon"]"#,
    r#"a[class="trac-rawlink"]"#,
];

const FOLDABLE_SCRIPT: &str = "<script>jQuery(document).ready(function($) {\n     $('.foldable').enableFolding(true, true); });\n  </script>\n";

pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule { name: "strip-chrome", apply: strip_chrome },
        Rule { name: "strip-head-comments", apply: strip_head_comments },
        Rule { name: "charset-first", apply: charset_first },
        Rule { name: "icon-type", apply: strip_icon_type },
        Rule { name: "strip-download-all", apply: strip_download_all },
        Rule { name: "relative-origin-urls", apply: relative_origin_urls },
        Rule { name: "foldable-script", apply: append_foldable_script },
        Rule { name: "missing-date-placeholders", apply: fill_date_placeholders },
        Rule { name: "collect-assets", apply: collect_assets },
        Rule { name: "alias-images", apply: alias_images },
        Rule { name: "strip-anonymous-author", apply: strip_anonymous_author },
        Rule { name: "timeline-dates", apply: timeline_dates },
        Rule { name: "static-header-footer", apply: static_header_footer },
        Rule { name: "rewrite-wiki-links", apply: rewrite_wiki_links },
    ]
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Timestamp in a Trac title, after its textual prefix.
fn title_timestamp(title: &str) -> Option<&str> {
    let start = title.find(|c: char| c.is_ascii_digit())?;
    Some(title[start..].trim_end())
}

/// Date part of a Trac timeline title: the first run of digits and dashes.
fn title_date<'t>(re: &Regex, title: &'t str) -> Option<&'t str> {
    re.captures(title).and_then(|c| c.get(1)).map(|m| m.as_str())
}

pub fn strip_chrome(doc: &Document, ctx: &mut PageContext<'_>) {
    doc.select(&CHROME_SELECTORS.join(", ")).remove();

    let blocked = &ctx.options.skin.blocked_script_suffixes;
    for script in doc.select("script[src]").iter() {
        let Some(src) = script.attr("src") else {
            continue;
        };
        if blocked.iter().any(|suffix| src.ends_with(suffix.as_str())) {
            script.remove();
        }
    }

    for p in doc.select("p").iter() {
        if p.text().contains("#acl ") {
            p.remove();
        }
    }
}

pub fn strip_head_comments(doc: &Document, _ctx: &mut PageContext<'_>) {
    let head = doc.select("head");
    for node in head.nodes() {
        for child in node.descendants() {
            if child.is_comment() {
                child.remove_from_parent();
            }
        }
    }
}

pub fn charset_first(doc: &Document, _ctx: &mut PageContext<'_>) {
    doc.select("head meta[charset]").remove();
    doc.select("head").prepend_html(r#"<meta charset="utf-8">"#);
}

pub fn strip_icon_type(doc: &Document, _ctx: &mut PageContext<'_>) {
    doc.select(r#"link[rel="icon"]"#).remove_attr("type");
}

pub fn strip_download_all(doc: &Document, _ctx: &mut PageContext<'_>) {
    for p in doc.select("#attachments p").iter() {
        if p.text().contains("Download all attachments") {
            p.remove();
        }
    }
}

/// Strip `base` from the start of `value`, ignoring ASCII case.
fn strip_origin<'v>(value: &'v str, base: &str) -> Option<&'v str> {
    let head = value.get(..base.len())?;
    if !head.eq_ignore_ascii_case(base) {
        return None;
    }
    let rest = &value[base.len()..];
    if rest.is_empty() || rest.starts_with(['/', '?', '#']) {
        Some(rest)
    } else {
        None
    }
}

pub fn relative_origin_urls(doc: &Document, ctx: &mut PageContext<'_>) {
    let base = ctx.options.base_url.as_str();
    if base.is_empty() {
        return;
    }

    for (selector, attr) in [("script[src]", "src"), ("link[href]", "href")] {
        for el in doc.select(selector).iter() {
            let Some(value) = el.attr(attr) else {
                continue;
            };
            if let Some(rest) = strip_origin(&value, base) {
                let relative = if rest.is_empty() { "/" } else { rest };
                el.set_attr(attr, relative);
            }
        }
    }
}

pub fn append_foldable_script(doc: &Document, _ctx: &mut PageContext<'_>) {
    doc.select("head").append_html(FOLDABLE_SCRIPT);
}

/// Elements rendering an unevaluated `${...date...}` expression show the
/// timestamp carried in their title instead.
pub fn fill_date_placeholders(doc: &Document, _ctx: &mut PageContext<'_>) {
    let placeholder = Regex::new(r"(?i)^\$\{[^}]*date[^}]*\}$").unwrap();

    for el in doc.select("[title]").iter() {
        let text = el.text();
        if !placeholder.is_match(text.trim()) {
            continue;
        }
        let timestamp = el
            .attr("title")
            .and_then(|title| title_timestamp(&title).map(escape_text))
            .unwrap_or_default();
        el.replace_with_html(timestamp);
    }
}

pub fn collect_assets(doc: &Document, ctx: &mut PageContext<'_>) {
    let companion = &ctx.options.skin.companion_stylesheet;

    for link in doc.select(r#"link[rel="stylesheet"][href]"#).iter() {
        let Some(href) = link.attr("href") else {
            continue;
        };
        if !AssetReference::is_local(&href) {
            continue;
        }
        ctx.assets.push(AssetReference::new(href.to_string()));
        if let Some((dir, file)) = href.rsplit_once('/') {
            if file == companion.linked {
                ctx.assets
                    .push(AssetReference::new(format!("{}/{}", dir, companion.companion)));
            }
        }
    }

    for (selector, attr) in [("script[src]", "src"), ("img[src]", "src")] {
        for el in doc.select(selector).iter() {
            if let Some(value) = el.attr(attr) {
                if AssetReference::is_local(&value) {
                    ctx.assets.push(AssetReference::new(value.to_string()));
                }
            }
        }
    }

    for a in doc.select("a[href]").iter() {
        let Some(href) = a.attr("href") else {
            continue;
        };
        let is_attachment =
            href.starts_with(ATTACHMENT_PREFIX) || href.starts_with(RAW_ATTACHMENT_PREFIX);
        if is_attachment && AssetReference::is_local(&href) {
            ctx.assets.push(AssetReference::new(href.to_string()));
        }
    }
}

pub fn alias_images(doc: &Document, ctx: &mut PageContext<'_>) {
    let skin = &ctx.options.skin;

    for img in doc.select("img[src]").iter() {
        let Some(src) = img.attr("src") else {
            continue;
        };
        if *src == *skin.logo_source {
            img.set_attr("src", &skin.logo_path);
        } else if let Some(collapsed) = collapse_raw_attachment(&src) {
            img.set_attr("src", &collapsed);
        }
    }
}

pub fn strip_anonymous_author(doc: &Document, _ctx: &mut PageContext<'_>) {
    let re = Regex::new(r"\s*-?\s*added by\s*<(?:em|span)[^>]*>anonymous</(?:em|span)>").unwrap();

    for li in doc.select("#attachments li").iter() {
        let inner = li.inner_html();
        let stripped = re.replace_all(&inner, "");
        if stripped.len() != inner.len() {
            li.set_html(stripped.into_owned());
        }
    }
}

pub fn timeline_dates(doc: &Document, _ctx: &mut PageContext<'_>) {
    let date = Regex::new(r"^\D*([\d-]+)").unwrap();
    for a in doc.select("a.timeline").iter() {
        let title = a.attr("title");
        let replacement = match title.as_deref().and_then(|t| title_date(&date, t)) {
            Some(date) => date.to_string(),
            None => escape_text(&a.text()),
        };
        a.replace_with_html(replacement);
    }
}

pub fn static_header_footer(doc: &Document, ctx: &mut PageContext<'_>) {
    let header = doc.select("#header");
    if header.exists() {
        let inner = header.inner_html();
        header.replace_with_html(format!("<header>{}</header>", inner));
    }

    let footer = doc.select("#footer");
    if footer.exists() {
        footer.replace_with_html(ctx.options.skin.footer_html.as_str());
    }
}

/// Drop `prefix` from `href` when it starts with it as a whole path segment.
pub fn strip_wiki_prefix(href: &str, prefix: &str) -> Option<String> {
    let rest = href.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some("/".to_string())
    } else if rest.starts_with('/') {
        Some(rest.to_string())
    } else if rest.starts_with(['?', '#']) {
        Some(format!("/{}", rest))
    } else {
        None
    }
}

pub fn rewrite_wiki_links(doc: &Document, ctx: &mut PageContext<'_>) {
    if !ctx.options.rewrite_wiki_links {
        return;
    }
    let prefix = ctx.options.wiki_prefix.as_str();

    for a in doc.select("a[href]").iter() {
        let Some(href) = a.attr("href") else {
            continue;
        };
        if let Some(rewritten) = strip_wiki_prefix(&href, prefix) {
            a.set_attr("href", &rewritten);
        }
    }
}
