use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// The json type of a tool parameter
pub enum ParameterKind {
    String,
}

impl ParameterKind {
    fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            ParameterKind::String => value.is_string(),
        }
    }
}

/// A single named parameter of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub description: String,
    pub required: bool,
}

impl ToolParameter {
    /// A required string parameter, which is all the StackQL tools use
    pub fn string<N, D>(name: N, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        ToolParameter {
            name: name.into(),
            kind: ParameterKind::String,
            description: description.into(),
            required: true,
        }
    }
}

/// A tool that can be used by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// Parameters that the tool accepts, in declaration order
    pub parameters: Vec<ToolParameter>,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D, parameters: Vec<ToolParameter>) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Render the parameters as the json schema object the model expects
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.kind.as_str(),
                    "description": param.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Names of required parameters that are absent (or null) in `arguments`
    pub fn missing_required<'a>(&'a self, arguments: &Value) -> Vec<&'a str> {
        self.parameters
            .iter()
            .filter(|param| param.required)
            .filter(|param| arguments.get(&param.name).map_or(true, Value::is_null))
            .map(|param| param.name.as_str())
            .collect()
    }

    /// Names of supplied parameters whose value has the wrong json type
    pub fn mistyped<'a>(&'a self, arguments: &Value) -> Vec<&'a str> {
        self.parameters
            .iter()
            .filter(|param| {
                arguments
                    .get(&param.name)
                    .is_some_and(|value| !value.is_null() && !param.kind.accepts(value))
            })
            .map(|param| param.name.as_str())
            .collect()
    }
}

/// A tool call request that a system can execute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// The name of the tool to execute
    pub name: String,
    /// The arguments for the execution, as parsed from the model's json
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new ToolCall with the given name and arguments
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}
