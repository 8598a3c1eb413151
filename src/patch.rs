use serde::{Deserialize, Deserializer};

/// Deserializes a patch field into `Option<Option<T>>` so that a key that
/// is absent (`None`), explicitly `null` (`Some(None)`) and present with a
/// value (`Some(Some(v))`) stay distinguishable.
///
/// Use together with `#[serde(default)]`; serde only calls this when the
/// key is present.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct PatchDoc {
        #[serde(default, deserialize_with = "double_option")]
        faculty_id: Option<Option<Uuid>>,
    }

    #[test]
    fn absent_key_means_leave_untouched() {
        let p: PatchDoc = serde_json::from_str("{}").unwrap();
        assert_eq!(p.faculty_id, None);
    }

    #[test]
    fn explicit_null_means_clear() {
        let p: PatchDoc = serde_json::from_str(r#"{"facultyId": null}"#).unwrap();
        assert_eq!(p.faculty_id, Some(None));
    }

    #[test]
    fn present_value_means_assign() {
        let id = Uuid::new_v4();
        let p: PatchDoc =
            serde_json::from_str(&format!(r#"{{"facultyId": "{id}"}}"#)).unwrap();
        assert_eq!(p.faculty_id, Some(Some(id)));
    }
}
