//! Log-eligibility directives and their resolution.
//!
//! A [`LogDirective`] is an environment allow-list attached either directly
//! to a method slot or to one of the interface types a client stub
//! implements. The [`EligibilityResolver`] decides, per invocation, whether
//! a directive applies — using a mapping precomputed at registration time,
//! so no runtime introspection happens on the call path.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Declared logging rule: an allow-list of environment names.
///
/// An empty list means the directive matches every environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogDirective {
    environments: BTreeSet<String>,
}

impl LogDirective {
    /// A directive that matches in every environment.
    pub fn all() -> Self {
        Self::default()
    }

    /// A directive restricted to the given environments.
    pub fn environments<I, S>(environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            environments: environments.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this directive allows logging in `environment`.
    ///
    /// Matching is exact string equality; no case folding, no wildcards.
    pub fn matches(&self, environment: &str) -> bool {
        self.environments.is_empty() || self.environments.contains(environment)
    }
}

/// Identity of a method slot, independent of any runtime instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodIdentity {
    pub declaring_type: String,
    pub name: String,
    pub parameter_types: Vec<String>,
}

impl MethodIdentity {
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameter_types: Vec::new(),
        }
    }

    /// Distinguishes overloads sharing a declaring type and name.
    pub fn with_parameters<I, S>(mut self, parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_types = parameter_types.into_iter().map(Into::into).collect();
        self
    }

    /// `"<declaringType>.<name>"`, the form used in log lines.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)
    }
}

/// A named type with an optional directive attached to it.
#[derive(Clone, Debug)]
pub struct TypeDirective {
    pub name: String,
    pub directive: Option<LogDirective>,
}

impl TypeDirective {
    pub fn new(name: impl Into<String>, directive: Option<LogDirective>) -> Self {
        Self {
            name: name.into(),
            directive,
        }
    }
}

/// One interface a client stub implements, plus its ancestor chain.
///
/// Ancestors are ordered most specific first, mirroring a supertype walk.
#[derive(Clone, Debug)]
pub struct InterfaceCapability {
    pub name: String,
    pub directive: Option<LogDirective>,
    pub ancestors: Vec<TypeDirective>,
}

impl InterfaceCapability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directive: None,
            ancestors: Vec::new(),
        }
    }

    pub fn directive(mut self, directive: LogDirective) -> Self {
        self.directive = Some(directive);
        self
    }

    pub fn ancestor(mut self, name: impl Into<String>, directive: Option<LogDirective>) -> Self {
        self.ancestors.push(TypeDirective::new(name, directive));
        self
    }
}

/// Ordered set of interfaces a stub's type implements.
///
/// Declaration order is significant: when directives conflict across
/// interfaces, the first interface wins.
#[derive(Clone, Debug, Default)]
pub struct CapabilitySet {
    interfaces: Vec<InterfaceCapability>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interface(mut self, interface: InterfaceCapability) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceCapability> {
        self.interfaces.iter()
    }
}

/// Decides whether a given invocation is eligible for logging.
///
/// Directly attached method directives are registered up front via
/// [`EligibilityResolver::method`]; interface and ancestor directives travel
/// with the [`CapabilitySet`] passed to [`EligibilityResolver::resolve`].
/// The configured environment is fixed at construction and compared by
/// exact equality.
#[derive(Clone, Debug, Default)]
pub struct EligibilityResolver {
    environment: String,
    method_directives: HashMap<MethodIdentity, LogDirective>,
}

impl EligibilityResolver {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            method_directives: HashMap::new(),
        }
    }

    /// Attach a directive directly to a method slot.
    pub fn method(mut self, method: MethodIdentity, directive: LogDirective) -> Self {
        self.method_directives.insert(method, directive);
        self
    }

    /// Whether an invocation of `method` on a stub with `capabilities`
    /// should be logged.
    ///
    /// Resolution order, first match wins with no merging:
    /// 1. a directive attached directly to the method;
    /// 2. per interface in declaration order, the interface's own directive;
    /// 3. otherwise that interface's ancestors, most specific first, stopping
    ///    before the method's declaring type — a hit anywhere ends the whole
    ///    resolution.
    ///
    /// No directive found anywhere means the method is not loggable.
    pub fn resolve(&self, method: &MethodIdentity, capabilities: &CapabilitySet) -> bool {
        match self.find_directive(method, capabilities) {
            Some(directive) => directive.matches(&self.environment),
            None => false,
        }
    }

    fn find_directive<'a>(
        &'a self,
        method: &MethodIdentity,
        capabilities: &'a CapabilitySet,
    ) -> Option<&'a LogDirective> {
        if let Some(directive) = self.method_directives.get(method) {
            return Some(directive);
        }
        for interface in capabilities.interfaces() {
            if let Some(directive) = &interface.directive {
                return Some(directive);
            }
            for ancestor in &interface.ancestors {
                if ancestor.name == method.declaring_type {
                    break;
                }
                if let Some(directive) = &ancestor.directive {
                    return Some(directive);
                }
            }
        }
        None
    }
}
