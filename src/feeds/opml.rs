use super::Subscription;
use anyhow::{Context, Result};
use opml::{Outline, OPML};
use std::path::Path;

pub fn read_opml(path: &Path) -> Result<Vec<Subscription>> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read subscription file: {}", path.display()))?;
    parse_opml(&xml).with_context(|| format!("Failed to parse OPML: {}", path.display()))
}

/// Every outline carrying an `xmlUrl`, depth-first in document order.
/// Category outlines without one are walked but not returned. A body with
/// no outlines at all is an empty list.
pub fn parse_opml(xml: &str) -> Result<Vec<Subscription>> {
    let doc = match OPML::from_str(xml) {
        Ok(doc) => doc,
        Err(opml::Error::BodyHasNoOutlines) => return Ok(Vec::new()),
        Err(e) => return Err(e).context("invalid OPML document"),
    };
    let mut subs = Vec::new();
    collect(&doc.body.outlines, &mut subs);
    Ok(subs)
}

fn collect(outlines: &[Outline], out: &mut Vec<Subscription>) {
    for outline in outlines {
        if let Some(url) = outline.xml_url.as_deref().filter(|u| !u.trim().is_empty()) {
            let title = outline
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .or_else(|| Some(outline.text.clone()).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| "Unknown".to_string());
            out.push(Subscription {
                title,
                url: url.trim().to_string(),
                website: outline.html_url.clone().filter(|u| !u.is_empty()),
                description: outline.description.clone().filter(|d| !d.is_empty()),
            });
        }
        collect(&outline.outlines, out);
    }
}
