//! Derive storage-relative paths from document references.

/// Marker prefix under which the storage service exposes public objects.
fn public_marker(bucket: &str) -> String {
    format!("/storage/v1/object/public/{bucket}/")
}

/// Derive the storage-relative path for `reference` within `bucket`.
///
/// Two patterns resolve:
/// - a public object URL: everything after the public-object marker;
/// - a bare relative path already prefixed with `"{bucket}/"`.
///
/// `None` means "no derivable path" — the store fallback is unavailable
/// for this reference, which is only fatal if the public fetch also
/// failed.
pub fn derive_storage_path(reference: &str, bucket: &str) -> Option<String> {
    let marker = public_marker(bucket);
    if let Some(idx) = reference.find(&marker) {
        let path = &reference[idx + marker.len()..];
        return (!path.is_empty()).then(|| path.to_string());
    }

    if let Some(path) = reference.strip_prefix(&format!("{bucket}/")) {
        return (!path.is_empty()).then(|| path.to_string());
    }

    None
}
