//! Ordering of record collections by a field selected at runtime.
//!
//! Record types do not expose their fields reflectively. Instead each type
//! registers an accessor per field in a [`FieldRegistry`], keyed by the
//! lowercase field name. [`order_by`] resolves the requested name against that
//! registry and sorts by the accessor's string rendering.

use crate::{Error, Result};

/// Extracts the string representation of one field of `R`.
pub type Accessor<R> = fn(&R) -> String;

/// A named field of a record type together with its accessor.
pub struct Field<R> {
    name: &'static str,
    accessor: Accessor<R>,
}

impl<R> Field<R> {
    /// The registered (lowercase) field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Renders this field of `record` as a string.
    pub fn value(&self, record: &R) -> String {
        (self.accessor)(record)
    }
}

impl<R> Clone for Field<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Field<R> {}

impl<R> core::fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// The set of orderable fields of a record type.
///
/// Built once per type, usually inside a `LazyLock` returned from
/// [`Record::fields`].
pub struct FieldRegistry<R> {
    fields: Vec<Field<R>>,
}

impl<R> FieldRegistry<R> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Registers a field under `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not lowercase or is already registered. Both are
    /// static construction mistakes in the record type's registry.
    pub fn field(mut self, name: &'static str, accessor: Accessor<R>) -> Self {
        assert!(
            !name.chars().any(char::is_uppercase),
            "field name `{name}` must be registered in lowercase"
        );
        assert!(
            self.fields.iter().all(|f| f.name != name),
            "field `{name}` registered twice"
        );
        self.fields.push(Field { name, accessor });
        self
    }

    /// Looks up a field by name, ignoring case.
    ///
    /// Matching lowercases `name` with [`str::to_lowercase`]. That agrees with
    /// full Unicode case folding for ASCII names but not for every script
    /// (`"ẞ"` lowercases to `"ß"`, never to `"ss"`).
    pub fn resolve(&self, name: &str) -> Result<Field<R>> {
        let wanted = name.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.name == wanted)
            .copied()
            .ok_or_else(|| Error::field_not_found(name))
    }

    /// Registered field names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

impl<R> Default for FieldRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> core::fmt::Debug for FieldRegistry<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// A record type whose fields can be addressed by name.
pub trait Record: Sized + 'static {
    fn fields() -> &'static FieldRegistry<Self>;
}

/// Sorts `records` ascending by the named field of [`Record::fields`].
///
/// See [`order_by_with`].
pub fn order_by<R: Record>(records: Vec<R>, field: &str) -> Result<Vec<R>> {
    order_by_with(records, field, R::fields())
}

/// Sorts `records` ascending by the string value of `field`.
///
/// The comparison is lexicographic on the rendered value, including for
/// numeric fields. The sort is stable: records with equal values keep their
/// input order. An empty collection is returned as is without resolving the
/// field name.
///
/// # Errors
///
/// Returns [`Error::FieldNotFound`] when `field` matches no registered field.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(records, registry), fields(len = records.len())))]
pub fn order_by_with<R>(
    records: Vec<R>,
    field: &str,
    registry: &FieldRegistry<R>,
) -> Result<Vec<R>> {
    if records.is_empty() {
        return Ok(records);
    }

    let field = registry.resolve(field)?;

    // Render every key once; `sort_by` is stable.
    let mut keyed: Vec<(String, R)> = records
        .into_iter()
        .map(|record| (field.value(&record), record))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Item {
        id: u32,
        name: &'static str,
        size: i32,
    }

    impl Record for Item {
        fn fields() -> &'static FieldRegistry<Self> {
            static FIELDS: LazyLock<FieldRegistry<Item>> = LazyLock::new(|| {
                FieldRegistry::<Item>::new()
                    .field("id", |item| item.id.to_string())
                    .field("name", |item| item.name.to_string())
                    .field("size", |item| item.size.to_string())
            });
            &FIELDS
        }
    }

    fn item(id: u32, name: &'static str, size: i32) -> Item {
        Item { id, name, size }
    }

    fn ids(items: &[Item]) -> Vec<u32> {
        items.iter().map(|i| i.id).collect()
    }

    fn sample() -> Vec<Item> {
        vec![
            item(1, "B", 1),
            item(2, "A", 42),
            item(3, "C", 666),
            item(4, "A", 10),
        ]
    }

    #[test]
    fn orders_by_name_keeping_ties_in_input_order() {
        let sorted = order_by(sample(), "name").unwrap();
        assert_eq!(ids(&sorted), [2, 4, 1, 3]);
    }

    #[test]
    fn field_lookup_ignores_case() {
        let lower = order_by(sample(), "name").unwrap();
        let title = order_by(sample(), "Name").unwrap();
        let upper = order_by(sample(), "NAME").unwrap();
        assert_eq!(lower, title);
        assert_eq!(lower, upper);
    }

    #[test]
    fn numeric_fields_compare_as_strings() {
        let sorted = order_by(sample(), "size").unwrap();
        // "1" < "10" < "42" < "666"
        assert_eq!(ids(&sorted), [1, 4, 2, 3]);

        let sorted = order_by(vec![item(1, "x", 9), item(2, "y", 10)], "size").unwrap();
        assert_eq!(ids(&sorted), [2, 1]);
    }

    #[test]
    fn stable_across_many_duplicates() {
        let records: Vec<Item> = (0..50)
            .map(|id| item(id, if id % 3 == 0 { "a" } else { "b" }, 0))
            .collect();
        let sorted = order_by(records, "name").unwrap();

        let (a, b): (Vec<_>, Vec<_>) = sorted.iter().partition(|i| i.name == "a");
        assert!(a.windows(2).all(|w| w[0].id < w[1].id));
        assert!(b.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(ids(&sorted[..a.len()]), ids(&a.into_iter().cloned().collect::<Vec<_>>()));
    }

    #[test]
    fn contents_are_not_modified() {
        let mut before = sample();
        let sorted = order_by(before.clone(), "id").unwrap();
        assert_eq!(sorted, before);

        let mut sorted = order_by(sample(), "name").unwrap();
        sorted.sort_by_key(|i| i.id);
        before.sort_by_key(|i| i.id);
        assert_eq!(sorted, before);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = order_by(sample(), "weight").unwrap_err();
        assert_eq!(
            err,
            Error::FieldNotFound {
                field: "weight".to_string()
            }
        );
        assert_eq!(err.to_string(), "field weight not found");
    }

    #[test]
    fn unknown_field_is_rejected_for_single_record() {
        let err = order_by(vec![item(1, "A", 1)], "Colour").unwrap_err();
        assert!(matches!(err, Error::FieldNotFound { field } if field == "Colour"));
    }

    #[test]
    fn empty_collection_skips_field_resolution() {
        let sorted = order_by(Vec::<Item>::new(), "does-not-exist").unwrap();
        assert!(sorted.is_empty());
    }

    #[test]
    fn explicit_registry_overrides_record_fields() {
        let registry = FieldRegistry::<Item>::new().field("reversed", |i| {
            i.name.chars().rev().collect::<String>()
        });
        let sorted = order_by_with(sample(), "REVERSED", &registry).unwrap();
        assert_eq!(ids(&sorted), [2, 4, 1, 3]);
        assert!(order_by_with(sample(), "name", &registry).is_err());
    }

    #[test]
    fn resolve_lowercases_non_ascii_names() {
        let registry = FieldRegistry::<Item>::new().field("größe", |i| i.size.to_string());
        assert_eq!(registry.resolve("GRÖSSE").unwrap_err(), Error::field_not_found("GRÖSSE"));
        assert_eq!(registry.resolve("GRÖßE").unwrap().name(), "größe");
        assert_eq!(registry.resolve("Größe").unwrap().name(), "größe");
    }

    #[test]
    fn registry_lists_names_in_registration_order() {
        assert_eq!(Item::fields().names().collect::<Vec<_>>(), ["id", "name", "size"]);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_registration_panics() {
        let _ = FieldRegistry::<Item>::new()
            .field("id", |i| i.id.to_string())
            .field("id", |i| i.name.to_string());
    }

    #[test]
    #[should_panic(expected = "lowercase")]
    fn uppercase_registration_panics() {
        let _ = FieldRegistry::<Item>::new().field("Id", |i| i.id.to_string());
    }
}
