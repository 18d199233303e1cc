use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the record identifier, always a string.
pub const ID_FIELD: &str = "id";
/// Field holding the creation time in epoch milliseconds.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Fields a patch may never touch.
///
/// `_id` is included so a document store's native key cannot be smuggled
/// in through an update either.
const PROTECTED_FIELDS: [&str; 3] = [ID_FIELD, "_id", CREATED_AT_FIELD];

/// Caller-supplied fields of a record or patch.
pub type Fields = Map<String, Value>;

/// A stored record.
///
/// A record is a flat JSON object that always carries [`ID_FIELD`] and
/// [`CREATED_AT_FIELD`] once it has been persisted, plus whatever fields the
/// caller supplied. It serializes as the bare object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    /// Builds a record from caller fields, stamping the identity fields over
    /// whatever the caller supplied for them.
    pub fn new(id: impl Into<String>, created_at: i64, fields: Fields) -> Self {
        let mut fields = fields;
        fields.insert(ID_FIELD.to_owned(), Value::String(id.into()));
        fields.insert(CREATED_AT_FIELD.to_owned(), Value::from(created_at));
        Self(fields)
    }

    /// Wraps already-normalized fields without stamping anything.
    pub fn from_fields(fields: Fields) -> Self {
        Self(fields)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str(ID_FIELD)
    }

    pub fn created_at(&self) -> Option<i64> {
        self.0.get(CREATED_AT_FIELD).and_then(Value::as_i64)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a field only when it holds a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }

    /// Shallow-merges `patch` over this record. Patch fields win; the
    /// identity fields are left untouched.
    pub fn merge(&mut self, patch: Fields) {
        for (key, value) in sanitize_patch(patch) {
            self.0.insert(key, value);
        }
    }

    /// Returns the record with `field` dropped.
    pub fn without(mut self, field: &str) -> Self {
        self.0.remove(field);
        self
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

/// Removes the identity fields from a patch.
pub fn sanitize_patch(mut patch: Fields) -> Fields {
    for field in PROTECTED_FIELDS {
        patch.remove(field);
    }
    patch
}

/// Reads a caller-supplied id: only a non-empty string counts.
pub fn requested_id(fields: &Fields) -> Option<&str> {
    fields
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}
