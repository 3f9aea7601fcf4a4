use crate::{Page, PageSelector, Record, Result, order_by, paginate};

/// An order key plus a page request, applied to a record snapshot.
///
/// Ordering is global, so it always runs before the collection is sliced
/// into pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Query<'a> {
    order_by: Option<&'a str>,
    page_size: i64,
    page: PageSelector<'a>,
}

impl<'a> Query<'a> {
    /// A query that returns every record in input order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders by `field`. An empty name leaves the input order untouched.
    pub fn order_by(mut self, field: &'a str) -> Self {
        self.order_by = (!field.is_empty()).then_some(field);
        self
    }

    /// Page size; zero disables pagination.
    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page(mut self, page: PageSelector<'a>) -> Self {
        self.page = page;
        self
    }

    /// Orders then paginates `records`.
    pub fn run<R: Record>(&self, records: Vec<R>) -> Result<Page<R>> {
        let records = match self.order_by {
            Some(field) => order_by(records, field)?,
            None => records,
        };
        paginate(records, self.page_size, self.page)
    }
}
