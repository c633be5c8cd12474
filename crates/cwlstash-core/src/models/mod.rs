pub mod manifest;
pub mod object_ref;

pub use manifest::{FileOutput, Manifest, ManifestEntry, FILE_CLASS};
pub use object_ref::BucketObjectRef;
