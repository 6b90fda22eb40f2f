use serde_json::{Map, Value};

/// Apply an RFC 7386 JSON merge-patch to `target`.
///
/// Object members of `patch` are merged recursively, `null` members remove
/// the attribute, and any non-object patch replaces `target` outright.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Some(patch_obj) = patch.as_object() else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Some(target_obj) = target.as_object_mut() else {
        return;
    };

    for (name, value) in patch_obj {
        if value.is_null() {
            target_obj.remove(name);
        } else if value.is_object() {
            let slot = target_obj
                .entry(name.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            merge_patch(slot, value);
        } else {
            target_obj.insert(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_clears_owner() {
        let mut key = json!({"id": 4, "uuid": "0xa092a0", "member_id": 1});
        merge_patch(&mut key, &json!({"member_id": null}));
        assert_eq!(key, json!({"id": 4, "uuid": "0xa092a0"}));
    }

    #[test]
    fn sets_and_merges_nested() {
        let mut base = json!({"name": "Cafe", "hours": {"open": 8}});
        merge_patch(&mut base, &json!({"name": "Kitchen", "hours": {"close": 18}}));
        assert_eq!(base, json!({"name": "Kitchen", "hours": {"open": 8, "close": 18}}));
    }

    #[test]
    fn non_object_patch_replaces() {
        let mut base = json!({"name": "x"});
        merge_patch(&mut base, &json!([1, 2]));
        assert_eq!(base, json!([1, 2]));
    }
}
