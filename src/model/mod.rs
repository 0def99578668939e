//! Document model as seen by the dependency engine.
//!
//! A [`Project`] owns a [`Site`]; every site may list further
//! [`DependencyNode`]s, each embedding the fully resolved site of the
//! package version it points at. Those embedded lists are the edges of the
//! dependency graph.
//!
//! The model is plain data. It is deserialized by an outer layer (the CLI
//! loads it from JSON) and never parsed by the engine itself.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ─── Identifiers ───────────────────────────────────────────────────

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Stable identity of a logical package, shared by all its versions.
    PackageId
);
string_id!(
    /// Identity of the project a package was published from.
    ProjectId
);
string_id!(
    /// Exact version label. Versions are compared for equality only.
    Version
);
string_id!(
    /// Identity of an importable object (component, token, ...).
    ObjectId
);

// ─── Importable Objects ────────────────────────────────────────────

/// The kinds of objects that can be referenced across a package boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Component,
    StyleToken,
    Mixin,
    Theme,
    ImageAsset,
    GlobalVariantGroup,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Component => "component",
            ObjectKind::StyleToken => "style token",
            ObjectKind::Mixin => "mixin",
            ObjectKind::Theme => "theme",
            ObjectKind::ImageAsset => "image asset",
            ObjectKind::GlobalVariantGroup => "global variant group",
        };
        f.write_str(s)
    }
}

/// A component declared in a site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ObjectId,
    pub name: String,
    /// Id of the component's root tree node.
    pub root: ObjectId,
    /// Components instantiated directly in this component's tree,
    /// default slot contents included.
    #[serde(default)]
    pub instantiates: Vec<ObjectId>,
    /// External data sources this component reads from.
    #[serde(default)]
    pub data_sources: Vec<String>,
}

/// Any non-component importable object: tokens, mixins, themes, images
/// and global variant groups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub name: String,
}

/// An instance of a context-providing component wrapped around every page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalContext {
    pub component: ObjectId,
    #[serde(default)]
    pub props: BTreeMap<String, String>,
}

// ─── Documents ─────────────────────────────────────────────────────

/// A document: the content of a project or of one published package version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub global_contexts: Vec<GlobalContext>,
    /// Component kind (e.g. "button") → component used by default for it.
    #[serde(default)]
    pub default_components: BTreeMap<String, ObjectId>,
    /// Packages this site imports directly.
    #[serde(default)]
    pub dependencies: Vec<Arc<DependencyNode>>,
}

impl Site {
    pub fn component(&self, id: &ObjectId) -> Option<&Component> {
        self.components.iter().find(|c| &c.id == id)
    }

    /// Every importable object declared directly in this site, components first.
    pub fn importable_objects(&self) -> impl Iterator<Item = (&ObjectId, ObjectKind)> {
        self.components
            .iter()
            .map(|c| (&c.id, ObjectKind::Component))
            .chain(self.assets.iter().map(|a| (&a.id, a.kind)))
    }

    /// Ids of components instantiated by this site's own components.
    pub fn instantiated_components(&self) -> impl Iterator<Item = &ObjectId> {
        self.components.iter().flat_map(|c| c.instantiates.iter())
    }
}

/// A versioned reference to a package, with the package's site embedded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub package_id: PackageId,
    pub version: Version,
    pub project_id: ProjectId,
    pub name: String,
    /// Code-only package with no visual content.
    #[serde(default)]
    pub hostless: bool,
    pub site: Site,
}

impl DependencyNode {
    /// Dependencies declared by this node's own site.
    pub fn dependencies(&self) -> &[Arc<DependencyNode>] {
        &self.site.dependencies
    }

    /// `name@version`, for messages.
    pub fn label(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// The root document whose dependencies are being managed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    /// Package id this project publishes under, if it has ever been published.
    #[serde(default)]
    pub package_id: Option<PackageId>,
    pub name: String,
    pub site: Site,
}

impl Project {
    pub fn new(project_id: impl Into<ProjectId>, name: &str) -> Self {
        Self {
            project_id: project_id.into(),
            package_id: None,
            name: name.to_string(),
            site: Site::default(),
        }
    }

    pub fn direct_dependencies(&self) -> &[Arc<DependencyNode>] {
        &self.site.dependencies
    }
}

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod tests;
