use redash_query::{ExecutionRequest, Parameters, QueryError, Result};
use rmcp::model::{JsonObject, Tool};
use serde_json::{json, Value};
use std::sync::Arc;

/// Name of the single tool this server exposes
pub const EXECUTE_QUERY: &str = "execute_query";

const QUERY_ID_ARG: &str = "query_id";

/// Static descriptor advertised in `tools/list`
pub fn execute_query_tool() -> Tool {
    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert(
        "properties".to_string(),
        json!({
            "query_id": {
                "type": "integer",
                "description": "Id of the saved Redash query to run"
            },
            "params": {
                "type": "object",
                "description": "Values for the query's parameters, keyed by parameter name"
            }
        }),
    );
    schema.insert("required".to_string(), json!([QUERY_ID_ARG]));

    Tool::new(
        EXECUTE_QUERY,
        "Execute Redash query and get results",
        Arc::new(schema),
    )
}

/// Validate `execute_query` arguments into an [`ExecutionRequest`]
pub fn parse_execute_query_args(arguments: Option<&JsonObject>) -> Result<ExecutionRequest> {
    let arguments = arguments
        .ok_or_else(|| QueryError::Validation("query_id is required".to_string()))?;

    let query_id = match arguments.get(QUERY_ID_ARG) {
        None | Some(Value::Null) => {
            return Err(QueryError::Validation("query_id is required".to_string()))
        }
        Some(value) => value.as_u64().ok_or_else(|| {
            QueryError::Validation(format!(
                "query_id must be a positive integer, got {}",
                value
            ))
        })?,
    };

    let parameters = match arguments.get("params") {
        None | Some(Value::Null) => Parameters::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(QueryError::Validation(format!(
                "params must be an object, got {}",
                other
            )))
        }
    };

    Ok(ExecutionRequest::new(query_id)?.with_parameters(parameters))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_descriptor_schema() {
        let tool = serde_json::to_value(execute_query_tool()).unwrap();
        assert_eq!(tool["name"], "execute_query");
        assert_eq!(tool["inputSchema"]["required"], json!(["query_id"]));
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert_eq!(tool["inputSchema"]["properties"]["query_id"]["type"], "integer");
        assert_eq!(tool["inputSchema"]["properties"]["params"]["type"], "object");
    }

    #[test]
    fn test_parse_with_params() {
        let request = parse_execute_query_args(Some(&args(json!({
            "query_id": 42,
            "params": { "country": "PT" }
        }))))
        .unwrap();

        assert_eq!(request.query_id(), 42);
        assert_eq!(request.parameters()["country"], "PT");
    }

    #[test]
    fn test_params_default_to_empty() {
        let request = parse_execute_query_args(Some(&args(json!({ "query_id": 7 })))).unwrap();
        assert!(request.parameters().is_empty());
    }

    #[test]
    fn test_missing_arguments() {
        let err = parse_execute_query_args(None).unwrap_err();
        assert!(matches!(err, QueryError::Validation(_)));

        let err = parse_execute_query_args(Some(&args(json!({ "params": {} })))).unwrap_err();
        assert!(matches!(err, QueryError::Validation(_)));
    }

    #[test]
    fn test_non_integer_query_id() {
        for bad in [json!("42"), json!(4.5), json!(-3), json!(0)] {
            let err =
                parse_execute_query_args(Some(&args(json!({ "query_id": bad })))).unwrap_err();
            assert!(matches!(err, QueryError::Validation(_)), "accepted {}", bad);
        }
    }

    #[test]
    fn test_params_must_be_object() {
        let err = parse_execute_query_args(Some(&args(json!({
            "query_id": 1,
            "params": ["a"]
        }))))
        .unwrap_err();
        assert!(matches!(err, QueryError::Validation(_)));
    }
}
