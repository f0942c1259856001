//! Search options for name resolution.

/// Exact vs. prefix matching. Fixed per call, not per search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind
{
    /// Byte-exact component match.
    Exact,
    /// Case-sensitive, byte-wise string prefix on the raw component name.
    Prefix,
}

/// How far the indexed search ranges from the current scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSearch
{
    /// Search only the current namespace level.
    ThisScope,
    /// Walk outward one namespace level at a time toward the global scope.
    OutwardScopes,
    /// Recursively visit every namespace regardless of lexical context.
    AllNamespaces,
}

/// What to find and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindNameOptions
{
    pub find_types: bool,
    /// Only accept types with a concrete definition, skipping bare forward
    /// declarations.
    pub find_type_defs_only: bool,
    pub find_functions: bool,
    /// Report "some `Foo<...>` exists" when bare `Foo` matched nothing.
    pub find_templates: bool,
    pub find_namespaces: bool,
    pub find_variables: bool,
    pub match_kind: MatchKind,
    pub scope_search: ScopeSearch,
    /// Every search stage stops as soon as this many results exist.
    pub max_results: usize,
}

impl FindNameOptions
{
    /// Exact search for every kind, first sufficient match wins.
    pub fn exact() -> Self
    {
        Self {
            find_types: true,
            find_type_defs_only: false,
            find_functions: true,
            find_templates: true,
            find_namespaces: true,
            find_variables: true,
            match_kind: MatchKind::Exact,
            scope_search: ScopeSearch::OutwardScopes,
            max_results: 1,
        }
    }

    /// Prefix search for every kind, collecting up to `max_results`.
    pub fn prefix(max_results: usize) -> Self
    {
        Self {
            match_kind: MatchKind::Prefix,
            max_results,
            ..Self::exact()
        }
    }
}

impl Default for FindNameOptions
{
    fn default() -> Self
    {
        Self::exact()
    }
}
