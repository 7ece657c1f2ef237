//! Schema registry keyed by controller, action and direction
//!
//! The registry is populated once at startup and is read-only afterwards, so
//! it can be shared across request handlers behind an `Arc`. Schemas can be
//! registered one by one, from a [`RouteSchemer`] implementation, or loaded
//! from a directory of schemer documents.
//!
//! Every declared controller inherits the schemas of the `application`
//! controller: when `users#index` has no request schema of its own,
//! `application#index` is used. A controller nothing was registered or
//! declared for has no schemer at all and resolves to nothing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::APPLICATION_CONTROLLER;
use crate::engine::CompiledSchema;
use crate::error::{SchemerError, SchemerResult};

/// Suffix of the conventional schemer name
const SCHEMER_SUFFIX: &str = "RouteSchemer";

/// File-name suffix written by the scaffold generator
const SCHEMER_FILE_SUFFIX: &str = "_route_schemer";

/// Whether data is inbound (filtered) or outbound (validated as-is)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Incoming request parameters
    Request,
    /// Outgoing response payload
    Response,
}

impl Direction {
    /// Both directions, request first
    pub const ALL: [Self; 2] = [Self::Request, Self::Response];

    /// Direction for a `request` flag
    pub const fn from_request(request: bool) -> Self {
        if request { Self::Request } else { Self::Response }
    }

    /// Lowercase label
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controller path and action name
///
/// Controller identifiers are normalized to snake-case paths, so
/// `Admin::UsersController`, `Admin::Users` and `admin/users` are one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    controller: String,
    action: String,
}

impl RouteKey {
    /// Create a normalized route key
    pub fn new(controller: impl AsRef<str>, action: impl AsRef<str>) -> Self {
        Self {
            controller: normalize_controller(controller.as_ref()),
            action: underscore(action.as_ref()),
        }
    }

    /// Controller path (`admin/users`)
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Action name (`create`)
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Same action on the `application` controller
    pub fn application(&self) -> Self {
        Self {
            controller: APPLICATION_CONTROLLER.to_string(),
            action: self.action.clone(),
        }
    }

    /// Conventional schemer name (`Admin::UsersRouteSchemer`)
    pub fn schemer_name(&self) -> String {
        format!("{}{SCHEMER_SUFFIX}", camelize(&self.controller))
    }

    /// Conventional schema method name (`create_request_schema`)
    pub fn schema_method(&self, direction: Direction) -> String {
        format!("{}_{}_schema", self.action, direction)
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.controller, self.action)
    }
}

/// A registered, compiled schema
#[derive(Debug, Clone)]
pub struct RouteSchema {
    key: RouteKey,
    direction: Direction,
    schema: CompiledSchema,
}

impl RouteSchema {
    /// Route this schema was registered for
    pub fn key(&self) -> &RouteKey {
        &self.key
    }

    /// Direction this schema validates
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Compiled schema
    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }
}

/// Static schema provider for one controller
///
/// ```rust
/// use route_schemer::{Direction, RouteSchemer, SchemaRegistry};
/// use serde_json::{Value, json};
///
/// struct UsersRouteSchemer;
///
/// impl RouteSchemer for UsersRouteSchemer {
///     const CONTROLLER: &'static str = "users";
///
///     fn actions() -> &'static [&'static str] {
///         &["create"]
///     }
///
///     fn schema(action: &str, direction: Direction) -> Option<Value> {
///         match (action, direction) {
///             ("create", Direction::Request) => Some(json!({
///                 "type": "object",
///                 "properties": { "name": { "type": "string" } }
///             })),
///             _ => None,
///         }
///     }
/// }
///
/// let mut registry = SchemaRegistry::new();
/// assert_eq!(registry.register_schemer::<UsersRouteSchemer>()?, 1);
/// # Ok::<(), route_schemer::SchemerError>(())
/// ```
pub trait RouteSchemer {
    /// Controller this schemer serves
    const CONTROLLER: &'static str;

    /// Actions this schemer declares schemas for
    fn actions() -> &'static [&'static str];

    /// Schema for an action and direction, `None` when not declared
    fn schema(action: &str, direction: Direction) -> Option<Value>;
}

/// On-disk schemer document
///
/// ```json
/// {
///   "controller": "admin/users",
///   "actions": {
///     "create": { "request": { "type": "object" }, "response": { "type": "object" } }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemerDocument {
    /// Controller path; defaults to the file stem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    /// Schemas per action
    #[serde(default)]
    pub actions: BTreeMap<String, ActionSchemas>,
}

/// Request and response schema of one action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSchemas {
    /// Request schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Value>,
    /// Response schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

/// Registry of compiled schemas
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<(RouteKey, Direction), Arc<RouteSchema>>,
    controllers: HashSet<String>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` schemer document in a directory
    pub fn load_dir(dir: impl AsRef<Path>) -> SchemerResult<Self> {
        let mut registry = Self::new();
        registry.load_dir_into(dir)?;
        Ok(registry)
    }

    /// Compile and register a schema, replacing any previous one
    pub fn register(
        &mut self,
        controller: impl AsRef<str>,
        action: impl AsRef<str>,
        direction: Direction,
        schema: Value,
    ) -> SchemerResult<()> {
        let key = RouteKey::new(controller, action);
        let compiled = CompiledSchema::compile_for(&format!("{key} {direction}"), schema)?;
        debug!(route = %key, %direction, "Registered schema");

        let entry = RouteSchema {
            key: key.clone(),
            direction,
            schema: compiled,
        };
        self.controllers.insert(key.controller().to_string());
        self.schemas.insert((key, direction), Arc::new(entry));
        Ok(())
    }

    /// Declare a controller's schemer without registering any schema
    ///
    /// A declared controller inherits the `application` schemas.
    pub fn declare(&mut self, controller: impl AsRef<str>) {
        self.controllers
            .insert(normalize_controller(controller.as_ref()));
    }

    /// True when the controller has a schemer (declared or with schemas)
    pub fn has_controller(&self, controller: impl AsRef<str>) -> bool {
        self.controllers
            .contains(&normalize_controller(controller.as_ref()))
    }

    /// Register a request schema
    pub fn register_request(
        &mut self,
        controller: impl AsRef<str>,
        action: impl AsRef<str>,
        schema: Value,
    ) -> SchemerResult<()> {
        self.register(controller, action, Direction::Request, schema)
    }

    /// Register a response schema
    pub fn register_response(
        &mut self,
        controller: impl AsRef<str>,
        action: impl AsRef<str>,
        schema: Value,
    ) -> SchemerResult<()> {
        self.register(controller, action, Direction::Response, schema)
    }

    /// Register every schema a [`RouteSchemer`] declares; returns the count
    pub fn register_schemer<T: RouteSchemer>(&mut self) -> SchemerResult<usize> {
        self.declare(T::CONTROLLER);
        let mut count = 0;
        for action in T::actions() {
            for direction in Direction::ALL {
                if let Some(schema) = T::schema(action, direction) {
                    self.register(T::CONTROLLER, action, direction, schema)?;
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// Register a schemer document; returns the count
    pub fn register_document(
        &mut self,
        document: SchemerDocument,
        default_controller: &str,
    ) -> SchemerResult<usize> {
        let controller = document
            .controller
            .unwrap_or_else(|| default_controller.to_string());
        self.declare(&controller);

        let mut count = 0;
        for (action, schemas) in document.actions {
            let pairs = [
                (Direction::Request, schemas.request),
                (Direction::Response, schemas.response),
            ];
            for (direction, schema) in pairs {
                if let Some(schema) = schema {
                    self.register(&controller, &action, direction, schema)?;
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// Load a directory into this registry; returns the schema count
    pub fn load_dir_into(&mut self, dir: impl AsRef<Path>) -> SchemerResult<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SchemerError::Registry(format!(
                "schema directory not found: {}",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut count = 0;
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!(path = %path.display(), "Skipping schemer file with non UTF-8 name");
                continue;
            };
            let default_controller = stem.strip_suffix(SCHEMER_FILE_SUFFIX).unwrap_or(stem);

            let contents = std::fs::read_to_string(&path)?;
            let document: SchemerDocument = serde_json::from_str(&contents).map_err(|e| {
                SchemerError::Registry(format!("{}: {}", path.display(), e))
            })?;
            count += self.register_document(document, default_controller)?;
        }

        info!(dir = %dir.display(), schemas = count, "Loaded route schemas");
        Ok(count)
    }

    /// Schema for a route
    ///
    /// Falls back to the `application` controller only when the route's own
    /// controller has a schemer.
    pub fn resolve(&self, key: &RouteKey, direction: Direction) -> Option<Arc<RouteSchema>> {
        let found = self
            .schemas
            .get(&(key.clone(), direction))
            .or_else(|| {
                self.controllers
                    .contains(key.controller())
                    .then(|| self.schemas.get(&(key.application(), direction)))
                    .flatten()
            })
            .cloned();

        if found.is_none() {
            debug!(
                route = %key,
                schemer = %key.schemer_name(),
                method = %key.schema_method(direction),
                "No schema registered"
            );
        }
        found
    }

    /// Registered routes, sorted
    pub fn routes(&self) -> Vec<(RouteKey, Direction)> {
        let mut routes: Vec<_> = self.schemas.keys().cloned().collect();
        routes.sort();
        routes
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// `Admin::UsersController` / `admin/users` -> `admin/users`
fn normalize_controller(controller: &str) -> String {
    let trimmed = controller.trim().trim_matches('/');
    let trimmed = trimmed
        .strip_suffix(SCHEMER_SUFFIX)
        .or_else(|| trimmed.strip_suffix("Controller"))
        .unwrap_or(trimmed);

    trimmed
        .split(['/', ':'])
        .filter(|segment| !segment.is_empty())
        .map(underscore)
        .collect::<Vec<_>>()
        .join("/")
}

/// `UserProfiles` -> `user_profiles`, `HTTPRequests` -> `http_requests`
fn underscore(word: &str) -> String {
    let chars: Vec<char> = word.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// `admin/user_profiles` -> `Admin::UserProfiles`
fn camelize(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            segment
                .split('_')
                .map(|part| {
                    let mut chars = part.chars();
                    chars
                        .next()
                        .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                        .unwrap_or_default()
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("::")
}
