use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use toolgate_mcp::{bind_arguments, ParamKind, Tool, ToolError, ToolSpec};

const DOC: &str = "Get the current weather for a city.\n\n\
                   Args:\n    city: Name of the city to get weather for\n\n\
                   Returns:\n    A string describing the weather";

/// Demo weather tool reporting a random plausible temperature
pub struct GetWeatherTool;

#[derive(Debug, Deserialize)]
struct GetWeatherArgs {
    city: String,
}

#[async_trait::async_trait]
impl Tool for GetWeatherTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new("get_weather", DOC).param("city", ParamKind::Text)
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: GetWeatherArgs = bind_arguments("getWeather", arguments)?;
        let temp = rand::rng().random_range(15..=35);
        Ok(json!(format!("The temperature in {} is {}°C", args.city, temp)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolgate_mcp::derive_schema;

    #[tokio::test]
    async fn test_reports_weather_for_city() {
        let result = GetWeatherTool.call(json!({"city": "Oslo"})).await.unwrap();
        let text = result.as_str().unwrap();
        assert!(text.starts_with("The temperature in Oslo is"));
    }

    #[tokio::test]
    async fn test_rejects_missing_city() {
        let err = GetWeatherTool.call(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_schema_carries_city_description() {
        let schema = derive_schema(&GetWeatherTool.spec()).unwrap();
        assert_eq!(schema.name, "getWeather");
        assert_eq!(schema.description, "Get the current weather for a city.");
        assert_eq!(
            schema.input_schema.properties["city"]["description"],
            "Name of the city to get weather for"
        );
        assert_eq!(schema.input_schema.required, vec!["city"]);
    }
}
