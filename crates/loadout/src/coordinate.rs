//! Package coordinates and dependency declarations.
//!
//! A coordinate identifies a fetchable package: `namespace:name`, an
//! optional semver constraint, and an optional variant for registries that
//! publish more than one artifact per release. Coordinates are immutable
//! once built and compare structurally.

use std::fmt;

use semver::VersionReq;
use thiserror::Error;

/// Errors produced while parsing coordinate text forms.
///
/// These are configuration errors: they surface at the call site that built
/// the value, never from a resolution run.
#[derive(Debug, Error)]
pub enum CoordinateError {
    #[error("invalid package spec '{spec}': expected namespace:name[@constraint]")]
    Malformed { spec: String },

    #[error("invalid label '{label}' in '{spec}': labels are lowercase alphanumeric with inner dashes")]
    Label { spec: String, label: String },

    #[error("invalid version constraint in '{spec}'")]
    Constraint {
        spec: String,
        #[source]
        source: semver::Error,
    },
}

/// Identity of a fetchable package: `namespace:name[@constraint]`.
///
/// Without a constraint the newest non-yanked release satisfies the
/// coordinate. The optional variant selects an alternate artifact of the
/// release and participates in identity and on-disk naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageCoordinate {
    namespace: String,
    name: String,
    version: Option<VersionReq>,
    variant: Option<String>,
}

impl PackageCoordinate {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, CoordinateError> {
        let namespace = namespace.into();
        let name = name.into();
        let spec = format!("{namespace}:{name}");
        validate_label(&namespace, &spec)?;
        validate_label(&name, &spec)?;
        Ok(Self {
            namespace,
            name,
            version: None,
            variant: None,
        })
    }

    /// Parse the `namespace:name[@constraint]` text form.
    pub fn parse(spec: &str) -> Result<Self, CoordinateError> {
        let (package, constraint) = match spec.split_once('@') {
            Some((package, constraint)) => (package, Some(constraint)),
            None => (spec, None),
        };

        let (namespace, name) = package.split_once(':').ok_or_else(|| {
            CoordinateError::Malformed {
                spec: spec.to_string(),
            }
        })?;
        if namespace.is_empty() || name.is_empty() || name.contains(':') {
            return Err(CoordinateError::Malformed {
                spec: spec.to_string(),
            });
        }

        let mut coordinate = Self::new(namespace, name).map_err(|err| match err {
            CoordinateError::Label { label, .. } => CoordinateError::Label {
                spec: spec.to_string(),
                label,
            },
            other => other,
        })?;

        if let Some(constraint) = constraint {
            let req = VersionReq::parse(constraint).map_err(|source| {
                CoordinateError::Constraint {
                    spec: spec.to_string(),
                    source,
                }
            })?;
            coordinate.version = Some(req);
        }

        Ok(coordinate)
    }

    pub fn with_version(mut self, version: VersionReq) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&VersionReq> {
        self.version.as_ref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }
}

impl fmt::Display for PackageCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        if let Some(variant) = &self.variant {
            write!(f, " ({variant})")?;
        }
        Ok(())
    }
}

fn validate_label(label: &str, spec: &str) -> Result<(), CoordinateError> {
    let valid = !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CoordinateError::Label {
            spec: spec.to_string(),
            label: label.to_string(),
        })
    }
}

/// A transitive package this declaration must never pull in.
///
/// Either side may be `*` to match any namespace or any name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Exclusion {
    namespace: String,
    name: String,
}

impl Exclusion {
    /// Parse the `namespace:name` text form, where either label may be `*`.
    pub fn parse(spec: &str) -> Result<Self, CoordinateError> {
        let (namespace, name) = spec.split_once(':').ok_or_else(|| {
            CoordinateError::Malformed {
                spec: spec.to_string(),
            }
        })?;
        for label in [namespace, name] {
            if label != "*" {
                validate_label(label, spec)?;
            }
        }
        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    pub fn matches(&self, namespace: &str, name: &str) -> bool {
        (self.namespace == "*" || self.namespace == namespace)
            && (self.name == "*" || self.name == name)
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// A coordinate to resolve plus the exclusions applied throughout its
/// transitive subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    coordinate: PackageCoordinate,
    exclusions: Vec<Exclusion>,
}

impl DependencyDeclaration {
    pub fn new(coordinate: PackageCoordinate) -> Self {
        Self {
            coordinate,
            exclusions: Vec::new(),
        }
    }

    pub fn exclude(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }

    pub fn coordinate(&self) -> &PackageCoordinate {
        &self.coordinate
    }

    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }
}
