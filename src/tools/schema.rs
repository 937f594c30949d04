//! Declarative tool schemas, rendered to the OpenAI function format the
//! completion API expects.

use serde_json::{json, Value};

/// One named parameter in a tool schema.
#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Declared shape of one tool: unique name, description, ordered parameters.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ToolParam>,
}

impl ToolSchema {
    /// Names of all parameters marked required.
    pub fn required_params(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params.iter().filter(|p| p.required).map(|p| p.name)
    }

    /// Convert to OpenAI function-schema JSON.
    pub fn to_openai_json(&self) -> Value {
        let mut properties = serde_json::Map::new();
        for p in &self.params {
            properties.insert(
                p.name.to_string(),
                json!({"type": "string", "description": p.description}),
            );
        }
        let required: Vec<&str> = self.required_params().collect();

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        })
    }
}

/// Schema for the `send_email` tool.
pub fn send_email_schema() -> ToolSchema {
    ToolSchema {
        name: "send_email",
        description: "Send an email to a recipient.",
        params: vec![
            ToolParam {
                name: "to",
                description: "Recipient email address",
                required: true,
            },
            ToolParam {
                name: "subject",
                description: "Email subject line",
                required: true,
            },
            ToolParam {
                name: "body",
                description: "Email body text",
                required: true,
            },
        ],
    }
}

/// Schema for the `schedule_event` tool.
pub fn schedule_event_schema() -> ToolSchema {
    ToolSchema {
        name: "schedule_event",
        description: "Schedule a calendar event.",
        params: vec![
            ToolParam {
                name: "title",
                description: "Event title",
                required: true,
            },
            ToolParam {
                name: "date",
                description: "Event date, YYYY-MM-DD or DD-MM",
                required: true,
            },
            ToolParam {
                name: "time",
                description: "Start time, HH:MM",
                required: true,
            },
            ToolParam {
                name: "end_time",
                description: "End time, HH:MM",
                required: false,
            },
            ToolParam {
                name: "location",
                description: "Event location",
                required: false,
            },
            ToolParam {
                name: "description",
                description: "Event description",
                required: false,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_email_schema_json() {
        let schema = send_email_schema().to_openai_json();
        assert_eq!(schema["type"], "function");
        assert_eq!(schema["function"]["name"], "send_email");
        let params = &schema["function"]["parameters"];
        assert!(params["properties"]["to"].is_object());
        assert!(params["properties"]["subject"].is_object());
        assert!(params["properties"]["body"].is_object());
        let required = params["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
    }

    #[test]
    fn test_schedule_event_required_params() {
        let schema = schedule_event_schema();
        let required: Vec<&str> = schema.required_params().collect();
        assert_eq!(required, vec!["title", "date", "time"]);
    }

    #[test]
    fn test_schedule_event_optional_params_in_properties() {
        let json = schedule_event_schema().to_openai_json();
        let props = &json["function"]["parameters"]["properties"];
        assert!(props["end_time"].is_object());
        assert!(props["location"].is_object());
        let required = json["function"]["parameters"]["required"]
            .as_array()
            .unwrap();
        assert!(!required.iter().any(|v| v == "end_time"));
    }
}
