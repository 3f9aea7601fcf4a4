//! Page windows over ordered record collections.
//!
//! A page is the half-open range `[size * index, size * (index + 1))` of the
//! collection, clipped to its length. Pages can be addressed by an explicit
//! integer index or by an opaque [`PageToken`]; both name the same index
//! space, and the continuation returned in a [`Page`] can be rendered in
//! either form.

use crate::{Error, Result};
use core::{fmt, str::FromStr};

/// Opaque continuation token for token-style addressing.
///
/// Clients must treat tokens as opaque. The current encoding is the decimal
/// page index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageToken(u64);

impl PageToken {
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    /// The zero-based page index this token refers to.
    pub const fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<u64>().map(Self).map_err(|e| {
            Error::invalid_selector("pageToken", format!("`{s}` is not a page token: {e}"))
        })
    }
}

/// Which page of a collection to return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageSelector<'a> {
    /// The first page.
    #[default]
    First,
    /// A zero-based page index.
    Index(i64),
    /// A token previously returned as a continuation. Empty means first page.
    Token(&'a str),
}

impl PageSelector<'_> {
    /// Resolves the selector to a page index without checking bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a negative index or a token that
    /// is not a valid page reference.
    pub fn resolve(&self) -> Result<u64> {
        match *self {
            Self::First => Ok(0),
            Self::Index(index) => u64::try_from(index).map_err(|_| {
                Error::invalid_selector(
                    "pageIndex",
                    format!("The page index must not be negative, got {index}"),
                )
            }),
            Self::Token("") => Ok(0),
            Self::Token(token) => token.parse::<PageToken>().map(PageToken::index),
        }
    }
}

/// One window of a collection plus the continuation to the next window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<R> {
    pub records: Vec<R>,
    /// Index of the next page, present only when it holds records.
    pub next_index: Option<u64>,
}

impl<R> Page<R> {
    fn whole(records: Vec<R>) -> Self {
        Self {
            records,
            next_index: None,
        }
    }

    /// The continuation as an opaque token.
    pub fn next_token(&self) -> Option<String> {
        self.next_index.map(|i| PageToken::new(i).to_string())
    }

    /// Whether this is the final page.
    pub fn is_last(&self) -> bool {
        self.next_index.is_none()
    }
}

/// Returns the page of `records` selected by `page_size` and `selector`.
///
/// A `page_size` of zero, or one at least as large as the collection, returns
/// every record with no continuation. Otherwise the selected window is
/// returned, with `next_index` set when a further non-empty page exists.
///
/// The last valid index is `ceil(len / page_size) - 1`, not
/// `floor(len / page_size) - 1`, so a trailing partial page stays reachable.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] when `page_size` is negative or `selector`
///   does not resolve to a page index.
/// - [`Error::OutOfRange`] when the index is past the last page. This is only
///   checked when the collection actually spans several pages.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(records), fields(len = records.len())))]
pub fn paginate<R>(
    mut records: Vec<R>,
    page_size: i64,
    selector: PageSelector<'_>,
) -> Result<Page<R>> {
    if page_size < 0 {
        return Err(Error::negative_page_size(page_size));
    }
    let index = selector.resolve()?;

    let len = records.len();
    let size = usize::try_from(page_size).unwrap_or(usize::MAX);
    if size == 0 || size >= len {
        return Ok(Page::whole(records));
    }

    // `size < len` here, so pages >= 2 and the trailing partial page counts.
    let pages = len.div_ceil(size);
    let index = usize::try_from(index)
        .ok()
        .filter(|&i| i < pages)
        .ok_or_else(Error::page_out_of_range)?;

    let start = index * size;
    let end = (start + size).min(len);
    records.truncate(end);
    records.drain(..start);

    let next = index + 1;
    Ok(Page {
        records,
        next_index: (next < pages).then_some(next as u64),
    })
}
