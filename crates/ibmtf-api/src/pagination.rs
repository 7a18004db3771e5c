// Cursor pagination helpers.
//
// Paged collections carry an optional `next` link whose href holds a
// `start` query parameter. `collect_all` follows those cursors until a page
// comes back without one. A `next` link that cannot be read aborts the
// listing instead of ending it early.

use std::future::Future;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// A `first` / `next` link in a paged collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub href: String,
}

impl PageLink {
    /// The `start` cursor carried in the href, if any.
    ///
    /// Relative hrefs are resolved against a placeholder base, since only
    /// the query matters. An href that is not a URL reference at all is a
    /// decode error rather than the end of the listing.
    pub fn start(&self) -> Result<Option<String>, Error> {
        let url = Url::parse(&self.href)
            .or_else(|_| Url::parse("http://localhost/")?.join(&self.href))
            .map_err(|e| Error::Deserialization {
                message: format!("invalid next link {:?}: {e}", self.href),
                body: self.href.clone(),
            })?;
        Ok(url
            .query_pairs()
            .find(|(k, _)| k == "start")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty()))
    }
}

/// A page of records plus the cursor for the next page.
pub trait Paged {
    type Item;

    /// Cursor for the following page; `Ok(None)` on the last page.
    fn next_start(&self) -> Result<Option<String>, Error>;
    fn into_items(self) -> Vec<Self::Item>;
}

/// Fetch every page and concatenate the records in page order.
///
/// `fetch` receives `None` on the first call and the previous page's cursor
/// afterwards. The first error aborts the listing; records already collected
/// are dropped. There is no page cap.
pub async fn collect_all<P, F, Fut>(mut fetch: F) -> Result<Vec<P::Item>, Error>
where
    P: Paged,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<P, Error>>,
{
    let mut all = Vec::new();
    let mut start: Option<String> = None;

    loop {
        let page = fetch(start.take()).await?;
        let next = page.next_start()?;
        all.extend(page.into_items());

        match next {
            Some(cursor) => start = Some(cursor),
            None => break,
        }
    }

    Ok(all)
}
