//! Template registry: named, parameterized render functions
//!
//! Every generated artifact comes from a registered template. Rendering is a
//! pure function of `(template id, parameters)` - no I/O, no caching - so
//! identical inputs always produce byte-identical output. JSON-shaped
//! artifacts are built as structured values and serialized; YAML-shaped
//! artifacts are rendered as text and verified by parsing before they are
//! returned.

mod apps;
mod packages;
mod workspace;

use crate::error::{Result, ScaffoldError};
use std::collections::BTreeMap;

/// Interpolation parameters for a template, looked up by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateParams {
    values: BTreeMap<String, String>,
}

impl TemplateParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub(crate) fn require(&self, key: &'static str) -> std::result::Result<&str, RenderFail> {
        self.get(key).ok_or(RenderFail::Missing(key))
    }
}

/// Why a render function could not produce output. Mapped to the public
/// error taxonomy by [`render`], which knows the template id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderFail {
    Missing(&'static str),
    Invalid(&'static str),
}

pub(crate) type RenderFn = fn(&TemplateParams) -> std::result::Result<String, RenderFail>;

/// Every registered template, by id.
const REGISTRY: &[(&str, RenderFn)] = &[
    ("workspace/package.json", workspace::root_package_json),
    ("workspace/pnpm-workspace.yaml", workspace::pnpm_workspace),
    ("workspace/turbo.json", workspace::turbo_json),
    ("workspace/gitignore", workspace::gitignore),
    ("workspace/env.example", workspace::env_example),
    ("package/manifest", packages::manifest),
    ("package/tsconfig.json", packages::tsconfig),
    ("tsconfig/base.json", packages::tsconfig_base),
    ("tsconfig/node.json", packages::tsconfig_node),
    ("eslint/index.js", packages::eslint_index),
    ("db/schema.prisma", packages::prisma_schema),
    ("db/index.ts", packages::db_index),
    ("queue/index.ts", packages::queue_index),
    ("docker/compose.yml", packages::compose_yml),
    ("worker/index.ts", apps::worker_index),
    ("node-app/index.ts", apps::node_index),
];

/// Render a registered template with the given parameters.
pub fn render(id: &str, params: &TemplateParams) -> Result<String> {
    let render_fn = REGISTRY
        .iter()
        .find(|(template_id, _)| *template_id == id)
        .map(|(_, render_fn)| *render_fn)
        .ok_or_else(|| ScaffoldError::UnknownTemplate(id.to_string()))?;

    render_fn(params).map_err(|fail| match fail {
        RenderFail::Missing(param) => ScaffoldError::MissingParam {
            template: id.to_string(),
            param,
        },
        RenderFail::Invalid(param) => ScaffoldError::InvalidParam {
            template: id.to_string(),
            param,
        },
    })
}

/// Ids of all registered templates, in registration order.
pub fn template_ids() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(id, _)| *id)
}

/// A reference to a registered template plus the parameters to render it
/// with. Referenced by descriptors; resolved at materialization time only.
#[derive(Debug, Clone)]
pub struct TemplateRef {
    pub id: &'static str,
    pub params: TemplateParams,
}

impl TemplateRef {
    pub fn new(id: &'static str, params: TemplateParams) -> Self {
        Self { id, params }
    }

    /// A template that takes no parameters.
    pub fn bare(id: &'static str) -> Self {
        Self::new(id, TemplateParams::new())
    }

    pub fn render(&self) -> Result<String> {
        render(self.id, &self.params)
    }
}

/// Pretty-print a JSON value with a trailing newline, the way npm tooling
/// writes manifests.
pub(crate) fn pretty_json<T: serde::Serialize>(value: &T) -> String {
    let mut text =
        serde_json::to_string_pretty(value).expect("JSON templates always serialize");
    text.push('\n');
    text
}

/// Parse an optional JSON-object parameter into a string map.
pub(crate) fn string_map(
    params: &TemplateParams,
    key: &'static str,
) -> std::result::Result<BTreeMap<String, String>, RenderFail> {
    match params.get(key) {
        None => Ok(BTreeMap::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|_| RenderFail::Invalid(key)),
    }
}

/// Check that rendered YAML actually parses before handing it out.
pub(crate) fn verified_yaml(text: String) -> std::result::Result<String, RenderFail> {
    serde_yaml::from_str::<serde_yaml::Value>(&text).map_err(|_| RenderFail::Invalid("yaml"))?;
    Ok(text)
}
