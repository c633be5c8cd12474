//! Enumeration result: one object key inside one bucket.

use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A (bucket, key) pair produced while listing a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BucketObjectRef {
    pub bucket_name: String,
    pub object_key: String,
}

impl BucketObjectRef {
    pub fn new(bucket_name: impl Into<String>, object_key: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            object_key: object_key.into(),
        }
    }
}

/// Renders as `bucket key`, one space apart.
impl Display for BucketObjectRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.bucket_name, self.object_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_bucket_then_key() {
        let r = BucketObjectRef::new("bucket1", "runs/42/result.txt");
        assert_eq!(r.to_string(), "bucket1 runs/42/result.txt");
    }

    #[test]
    fn serializes_both_fields() {
        let r = BucketObjectRef::new("b", "k");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["bucket_name"], "b");
        assert_eq!(json["object_key"], "k");
    }
}
