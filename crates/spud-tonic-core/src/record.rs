//! Orderable fields of the wire [`Potato`].

use crate::proto::Potato;
use spud::{FieldRegistry, Record};
use std::sync::LazyLock;

static POTATO_FIELDS: LazyLock<FieldRegistry<Potato>> = LazyLock::new(|| {
    FieldRegistry::<Potato>::new()
        .field("id", |p| p.id.clone())
        .field("name", |p| p.name.clone())
        .field("size", |p| p.size.to_string())
});

impl Record for Potato {
    fn fields() -> &'static FieldRegistry<Self> {
        &POTATO_FIELDS
    }
}
