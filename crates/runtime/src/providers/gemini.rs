//! Google Gemini `generateContent` backend.
//!
//! Gemini does not hand out ids for function calls, so calls get a generated
//! id when parsed; results are matched back to calls by tool name on the wire.

use crate::model::{
    Backend, FinishReason, Message, ModelError, ModelRequest, ModelResponse, Part, Role,
    ToolCall, ToolSpec, Usage,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTools>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

/// One part; exactly one field is set.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<ApiFunctionResponse>,
    /// Issued alongside a function call; must be replayed unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTools {
    function_declarations: Vec<ApiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct ApiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: ApiUsage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating a Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiBackendBuilder {
    api_key: String,
    model: String,
    max_tokens: u32,
    system: Option<String>,
    base_url: String,
}

impl GeminiBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 4096,
            system: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn build(self) -> GeminiBackend {
        GeminiBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            max_tokens: self.max_tokens,
            system: self.system,
            base_url: self.base_url,
        }
    }
}

/// Gemini API backend.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    system: Option<String>,
    base_url: String,
}

impl GeminiBackend {
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> GeminiBackendBuilder {
        GeminiBackendBuilder::new(api_key, model)
    }

    fn message_to_api(msg: &Message) -> ApiContent {
        let role = match msg.role {
            Role::Assistant => "model",
            Role::User | Role::System => "user",
        };

        let parts = msg
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => ApiPart {
                    text: Some(text.clone()),
                    ..Default::default()
                },
                Part::ToolCall(call) => ApiPart {
                    function_call: Some(ApiFunctionCall {
                        id: None,
                        name: call.name.clone(),
                        args: call.input.clone(),
                    }),
                    thought_signature: call.signature.clone(),
                    ..Default::default()
                },
                Part::ToolResult(result) => {
                    let response = if result.is_error {
                        json!({ "error": result.content })
                    } else {
                        json!({ "result": result.content })
                    };
                    ApiPart {
                        function_response: Some(ApiFunctionResponse {
                            id: None,
                            name: result.name.clone(),
                            response,
                        }),
                        ..Default::default()
                    }
                }
            })
            .collect();

        ApiContent {
            role: Some(role.to_string()),
            parts,
        }
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiFunctionDeclaration {
        ApiFunctionDeclaration {
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: schema_to_api(&spec.schema),
        }
    }

    fn response_to_message(content: Option<ApiContent>) -> Message {
        let parts = content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|part| {
                let text = part.text.filter(|t| !t.is_empty()).map(Part::Text);
                let call = part.function_call.map(|call| {
                    Part::ToolCall(ToolCall {
                        id: call
                            .id
                            .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple())),
                        name: call.name,
                        input: call.args,
                        signature: part.thought_signature,
                    })
                });
                text.into_iter().chain(call)
            })
            .collect();

        Message {
            role: Role::Assistant,
            parts,
        }
    }

    fn finish_reason(reason: Option<&str>, has_calls: bool) -> FinishReason {
        if has_calls {
            return FinishReason::ToolCalls;
        }
        match reason {
            None | Some("STOP") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
                FinishReason::ContentFilter
            }
            Some(other) => FinishReason::Unknown(other.to_string()),
        }
    }
}

/// Convert a JSON Schema object to Gemini's OpenAPI subset.
///
/// Property types become upper-case enum names; anything unrecognised is
/// declared as a string.
fn schema_to_api(schema: &Value) -> Value {
    let properties: Map<String, Value> = schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| {
                    let kind = match prop.get("type").and_then(Value::as_str) {
                        Some("number") => "NUMBER",
                        Some("integer") => "INTEGER",
                        Some("boolean") => "BOOLEAN",
                        _ => "STRING",
                    };
                    let description = prop
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    (
                        name.clone(),
                        json!({ "type": kind, "description": description }),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let required = schema
        .get("required")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

impl Backend for GeminiBackend {
    fn name(&self) -> String {
        format!("Google Gemini ({})", self.model)
    }

    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let contents: Vec<ApiContent> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(Self::message_to_api)
            .collect();

        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![ApiTools {
                function_declarations: request.tools.iter().map(Self::tool_to_api).collect(),
            }]
        };

        let api_request = ApiRequest {
            contents,
            tools,
            system_instruction: self.system.as_ref().map(|s| ApiContent {
                role: None,
                parts: vec![ApiPart {
                    text: Some(s.clone()),
                    ..Default::default()
                }],
            }),
            generation_config: ApiGenerationConfig {
                max_output_tokens: self.max_tokens,
            },
        };

        debug!(model = %self.model, messages = request.messages.len(), "calling gemini");

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ModelError::from_response(response).await);
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no candidates returned".into()))?;

        let message = Self::response_to_message(candidate.content);
        let finish_reason = Self::finish_reason(
            candidate.finish_reason.as_deref(),
            !message.tool_calls().is_empty(),
        );
        let usage = Usage {
            input_tokens: api_response.usage_metadata.prompt_token_count,
            output_tokens: api_response.usage_metadata.candidates_token_count,
        };

        Ok(ModelResponse {
            message,
            finish_reason,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ToolResult;
    use mockito::Matcher;

    #[test]
    fn schema_types_are_upper_cased() {
        let schema = json!({
            "type": "object",
            "properties": {
                "latitude": {"type": "number", "description": "Latitude coordinate"},
                "days": {"type": "integer"},
                "units": {"type": "array"}
            },
            "required": ["latitude"]
        });

        assert_eq!(
            schema_to_api(&schema),
            json!({
                "type": "OBJECT",
                "properties": {
                    "latitude": {"type": "NUMBER", "description": "Latitude coordinate"},
                    "days": {"type": "INTEGER", "description": ""},
                    "units": {"type": "STRING", "description": ""}
                },
                "required": ["latitude"]
            })
        );
    }

    #[test]
    fn results_become_function_responses() {
        let msg = Message::tool_results(vec![
            ToolResult {
                tool_call_id: "call_1".into(),
                name: "get_forecast".into(),
                content: "5-day forecast for Tokyo:".into(),
                is_error: false,
            },
            ToolResult {
                tool_call_id: "call_2".into(),
                name: "get_moon_phase".into(),
                content: "Error: Unknown tool: get_moon_phase".into(),
                is_error: true,
            },
        ]);

        let api = serde_json::to_value(GeminiBackend::message_to_api(&msg)).unwrap();
        assert_eq!(
            api,
            json!({
                "role": "user",
                "parts": [
                    {"functionResponse": {"name": "get_forecast", "response": {"result": "5-day forecast for Tokyo:"}}},
                    {"functionResponse": {"name": "get_moon_phase", "response": {"error": "Error: Unknown tool: get_moon_phase"}}}
                ]
            })
        );
    }

    #[test]
    fn assistant_turns_use_model_role() {
        let msg = Message {
            role: Role::Assistant,
            parts: vec![Part::ToolCall(ToolCall {
                id: "call_1".into(),
                name: "get_current_weather".into(),
                input: json!({"city": "Tokyo"}),
                signature: None,
            })],
        };
        let api = serde_json::to_value(GeminiBackend::message_to_api(&msg)).unwrap();
        assert_eq!(api["role"], "model");
        assert_eq!(api["parts"][0]["functionCall"]["args"]["city"], "Tokyo");
    }

    #[tokio::test]
    async fn thought_signature_survives_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{
                            "functionCall": {"name": "get_current_weather", "args": {"city": "Tokyo"}},
                            "thoughtSignature": "SIG123"
                        }]},
                        "finishReason": "STOP"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let backend = GeminiBackend::builder("g-key", "gemini-test")
            .base_url(server.url())
            .build();
        let mut messages = vec![Message::user("Weather in Tokyo?")];
        let response = backend
            .call(ModelRequest {
                messages: &messages,
                tools: &[],
            })
            .await
            .unwrap();
        first.assert_async().await;
        first.remove_async().await;

        let call = response.message.tool_calls().remove(0);
        assert_eq!(call.signature.as_deref(), Some("SIG123"));

        messages.push(response.message);
        messages.push(Message::tool_results(vec![ToolResult {
            tool_call_id: call.id,
            name: call.name,
            content: "Current weather in Tokyo:".into(),
            is_error: false,
        }]));

        let second = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_body(Matcher::Regex(r#""thoughtSignature":"SIG123""#.into()))
            .with_status(200)
            .with_body(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Clear."}]},"finishReason":"STOP"}]}"#,
            )
            .create_async()
            .await;

        let response = backend
            .call(ModelRequest {
                messages: &messages,
                tools: &[],
            })
            .await
            .unwrap();
        second.assert_async().await;
        assert_eq!(response.message.text(), "Clear.");

        let replayed = serde_json::to_value(GeminiBackend::message_to_api(&messages[1])).unwrap();
        assert_eq!(
            replayed,
            json!({
                "role": "model",
                "parts": [{
                    "functionCall": {"name": "get_current_weather", "args": {"city": "Tokyo"}},
                    "thoughtSignature": "SIG123"
                }]
            })
        );
    }

    #[tokio::test]
    async fn parses_function_calls_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "g-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "Compare London and Paris"}]}],
                "tools": [{"functionDeclarations": [{"name": "get_current_weather"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [
                            {"functionCall": {"name": "get_current_weather", "args": {"city": "London"}}},
                            {"functionCall": {"name": "get_current_weather", "args": {"city": "Paris"}}}
                        ]},
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": {"promptTokenCount": 30, "candidatesTokenCount": 10}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let backend = GeminiBackend::builder("g-key", "gemini-test")
            .base_url(server.url())
            .build();
        let messages = [Message::user("Compare London and Paris")];
        let tools = [ToolSpec {
            name: "get_current_weather".into(),
            description: "Get current weather conditions for a city".into(),
            schema: json!({"type": "object", "properties": {"city": {"type": "string"}}, "required": ["city"]}),
        }];

        let response = backend
            .call(ModelRequest {
                messages: &messages,
                tools: &tools,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        let calls = response.message.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].input["city"], "London");
        assert_eq!(calls[1].input["city"], "Paris");
        assert_ne!(calls[0].id, calls[1].id);
        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert_eq!(response.usage.total_tokens(), 40);
    }

    #[tokio::test]
    async fn text_answer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_body(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"It is sunny."}]},"finishReason":"STOP"}]}"#,
            )
            .create_async()
            .await;

        let backend = GeminiBackend::builder("g-key", "gemini-test")
            .base_url(server.url())
            .build();
        let response = backend
            .call(ModelRequest {
                messages: &[Message::user("weather?")],
                tools: &[],
            })
            .await
            .unwrap();

        assert_eq!(response.message.text(), "It is sunny.");
        assert_eq!(response.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn missing_candidates_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let backend = GeminiBackend::builder("g-key", "gemini-test")
            .base_url(server.url())
            .build();
        let err = backend
            .call(ModelRequest {
                messages: &[Message::user("weather?")],
                tools: &[],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::InvalidResponse(_)), "{err}");
    }
}
