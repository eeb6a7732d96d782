//! Request envelope: URI templates, path parameters and flattened queries.

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

/// An outbound call before it is bound to an endpoint.
///
/// The path is a template such as `scans/{scan_id}/launch`; every
/// `{name}` placeholder must be bound with [`ApiRequest::path`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    template: String,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, template: impl Into<String>) -> Self {
        Self {
            method,
            template: template.into(),
            path_params: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(template: impl Into<String>) -> Self {
        Self::new(Method::GET, template)
    }

    pub fn post(template: impl Into<String>) -> Self {
        Self::new(Method::POST, template)
    }

    pub fn put(template: impl Into<String>) -> Self {
        Self::new(Method::PUT, template)
    }

    pub fn delete(template: impl Into<String>) -> Self {
        Self::new(Method::DELETE, template)
    }

    /// Binds a path placeholder. The value is percent-encoded on resolve.
    pub fn path(mut self, name: &str, value: impl ToString) -> Self {
        self.path_params.push((name.to_string(), value.to_string()));
        self
    }

    /// Adds query parameters from any serializable value.
    ///
    /// Nested objects are flattened to dotted keys (`filter.search_type=and`),
    /// arrays of objects are indexed (`filter.0.quality=eq`), arrays of
    /// scalars repeat the key and `null` values are dropped.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        let value = serde_json::to_value(query)?;
        match value {
            Value::Object(_) => flatten_into("", &value, &mut self.query),
            Value::Null => {}
            other => {
                return Err(Error::InvalidRequest(format!(
                    "query parameters must be an object, got {}",
                    other
                )));
            }
        }
        Ok(self)
    }

    pub fn query_pair(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Sets the JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Substitutes path parameters into the template.
    pub fn render_path(&self) -> Result<String> {
        let mut rendered = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                Error::InvalidRequest(format!("unterminated placeholder in '{}'", self.template))
            })?;
            let name = &after[..close];
            let value = self
                .path_params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value)
                .ok_or_else(|| {
                    Error::InvalidRequest(format!(
                        "no value bound for '{{{}}}' in '{}'",
                        name, self.template
                    ))
                })?;
            rendered.push_str(&urlencoding::encode(value));
            rest = &after[close + 1..];
        }
        rendered.push_str(rest);

        Ok(rendered)
    }

    /// Resolves the request against an endpoint into an absolute URL.
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        let path = self.render_path()?;
        let mut url = base.join(path.trim_start_matches('/'))?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Binds the request to `base`, producing what the transport sends.
    pub fn prepare(&self, base: &Url) -> Result<PreparedRequest> {
        Ok(PreparedRequest {
            method: self.method.clone(),
            url: self.resolve(base)?,
            headers: HeaderMap::new(),
            body: self.body.clone(),
        })
    }
}

/// A fully resolved request as handed to a [`Transport`](super::Transport).
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl PreparedRequest {
    /// Short `METHOD url` form used in log lines.
    pub fn signature(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        }
    };

    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(&join(key), nested, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        flatten_into(&join(&index.to_string()), item, out)
                    }
                    scalar => flatten_into(prefix, scalar, out),
                }
            }
        }
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
