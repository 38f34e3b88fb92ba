use reqwest::header::{HeaderMap, LINK};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::client::{ApiClient, ApiResponse, ErrorEnvelope};
use crate::errors::Result;

/// Pagination state extracted from a response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paging {
    /// URL of the next page, `None` when pagination is exhausted
    pub next: Option<Url>,
}

/// Extracts the next-page URL from an RFC-5988 `Link` response header
///
/// Link headers look like:
///
/// ```text
/// <https://api.newrelic.com/v2/alerts_policies.json?page=2>; rel="next",
/// <https://api.newrelic.com/v2/alerts_policies.json?page=9>; rel="last"
/// ```
///
/// A pure function of the response headers; a missing header, a header
/// without a `rel="next"` entry, or an entry that fails to parse all
/// yield an exhausted [`Paging`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkHeaderPager;

impl LinkHeaderPager {
    pub fn parse(&self, headers: &HeaderMap) -> Paging {
        let next = headers
            .get_all(LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .find_map(parse_link_entry);

        Paging { next }
    }
}

/// Parses one `<url>; rel="..."` entry, returning the URL when the entry
/// is tagged `rel="next"`.
fn parse_link_entry(entry: &str) -> Option<Url> {
    let mut parts = entry.split(';');

    let target = parts.next()?.trim();
    let target = target.strip_prefix('<')?.strip_suffix('>')?;

    let is_next = parts.any(|param| {
        let param = param.trim();
        matches!(
            param.strip_prefix("rel=").map(|v| v.trim_matches('"')),
            Some("next")
        )
    });

    if is_next {
        Url::parse(target).ok()
    } else {
        None
    }
}

/// One page of a paginated list response
///
/// Implemented by each resource's list envelope so [`fetch_all`] can peel
/// the items out of the wrapper.
pub trait Paginated: DeserializeOwned {
    type Item;

    fn into_items(self) -> Vec<Self::Item>;
}

/// Follow `rel="next"` links until the listing is exhausted
///
/// Query parameters are only applied to the first request; next-page
/// links already carry them. Any error aborts the whole fetch and
/// discards pages accumulated so far. A next link equal to the page just
/// fetched stops the loop instead of re-fetching it.
pub(crate) async fn fetch_all<E, P, R>(
    client: &ApiClient<E>,
    pager: LinkHeaderPager,
    first_url: Url,
    params: Option<&P>,
) -> Result<Vec<R::Item>>
where
    E: ErrorEnvelope,
    P: Serialize + ?Sized,
    R: Paginated,
{
    let mut items = Vec::new();
    let mut next_url = Some(first_url);
    let mut first_page = true;

    while let Some(url) = next_url.take() {
        let response: ApiResponse<R> = if first_page {
            client.get(url.clone(), params).await?
        } else {
            client.get(url.clone(), None::<&()>).await?
        };
        first_page = false;

        items.extend(response.body.into_items());

        next_url = match pager.parse(&response.headers).next {
            Some(next) if next != url => {
                debug!(next = %next, "Following next page link");
                Some(next)
            }
            Some(_) => {
                debug!(url = %url, "Next page link repeats the current page, stopping");
                None
            }
            None => None,
        };
    }

    Ok(items)
}
