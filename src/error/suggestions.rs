//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints that
//! mention the offending path or key.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::TaskFileNotFound => suggest_task_file_not_found(context),
        ErrorCode::ConfigMissingRequired => suggest_config_missing_required(context),
        _ => code.suggestion().to_string(),
    }
}

fn suggest_task_file_not_found(context: Option<&Value>) -> String {
    let Some(path) = context.and_then(|c| c.get("path")).and_then(Value::as_str) else {
        return ErrorCode::TaskFileNotFound.suggestion().to_string();
    };

    format!(
        "Task file '{path}' does not exist. Check the path passed to --task-file, \
         or create it with `{{\"project\": \"\", \"tasks\": []}}`"
    )
}

fn suggest_config_missing_required(context: Option<&Value>) -> String {
    let Some(key) = context.and_then(|c| c.get("config_key")).and_then(Value::as_str) else {
        return ErrorCode::ConfigMissingRequired.suggestion().to_string();
    };

    let env_key = format!("TASKCTX_{}", key.replace('.', "_").to_uppercase());
    format!("Set `{key}` in config.toml, or export {env_key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_file_suggestion_mentions_path() {
        let ctx = serde_json::json!({ "path": "/tmp/tasks.json" });
        let suggestion = suggest_for_error(ErrorCode::TaskFileNotFound, Some(&ctx));
        assert!(suggestion.contains("/tmp/tasks.json"));
    }

    #[test]
    fn config_key_suggestion_names_env_var() {
        let ctx = serde_json::json!({ "config_key": "index.path" });
        let suggestion = suggest_for_error(ErrorCode::ConfigMissingRequired, Some(&ctx));
        assert!(suggestion.contains("TASKCTX_INDEX_PATH"));
    }

    #[test]
    fn falls_back_to_static_suggestion() {
        let suggestion = suggest_for_error(ErrorCode::DatabaseError, None);
        assert_eq!(suggestion, ErrorCode::DatabaseError.suggestion());
    }
}
