//! Qualified identifier model.
//!
//! An [`Identifier`] names a program entity the way a user or the debug info
//! spells it: an ordered sequence of components (`my_ns::Container<int>::size`),
//! optionally anchored at the global scope with a leading `::`. Components can
//! carry template-argument lists and "special" markers for names that do not
//! exist in source at all (the program entry point, PLT thunks, ELF-only
//! symbols, anonymous namespaces, CPU registers).

use std::fmt;

/// Marker for component names that are not ordinary source identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialName
{
    /// A normal source-level name.
    None,
    /// The program entry point, independent of what it is actually called.
    Main,
    /// A PLT thunk for the named symbol.
    Plt,
    /// A symbol that only exists in the ELF symbol table, not in debug info.
    Elf,
    /// An anonymous namespace.
    AnonymousNamespace,
    /// A CPU register reference. Never resolvable by the symbol index.
    Register,
    /// Internal escape marker: the name is taken literally, no interpretation.
    Escaped,
}

/// One scope component of an [`Identifier`].
///
/// The presence of a template-argument list distinguishes `Foo<>` (an explicit
/// empty list) from plain `Foo`, so the list is `Option<Vec<String>>` rather
/// than a possibly-empty vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentifierComponent
{
    name: String,
    template_args: Option<Vec<String>>,
    special: SpecialName,
}

impl IdentifierComponent
{
    /// Create a plain component with no template arguments.
    pub fn new(name: impl Into<String>) -> Self
    {
        Self {
            name: name.into(),
            template_args: None,
            special: SpecialName::None,
        }
    }

    /// Create a component with a (possibly empty) template-argument list.
    pub fn with_template_args(name: impl Into<String>, args: Vec<String>) -> Self
    {
        Self {
            name: name.into(),
            template_args: Some(args),
            special: SpecialName::None,
        }
    }

    /// Create a special component. The name is only meaningful for the marker
    /// kinds that carry one (`Plt`, `Elf`, `Register`, `Escaped`).
    pub fn special(special: SpecialName, name: impl Into<String>) -> Self
    {
        Self {
            name: name.into(),
            template_args: None,
            special,
        }
    }

    /// Plain name without template arguments.
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Template-argument list, if one is present (even empty).
    pub fn template_args(&self) -> Option<&[String]>
    {
        self.template_args.as_deref()
    }

    /// Whether this component has a template-argument list at all.
    pub fn has_template_args(&self) -> bool
    {
        self.template_args.is_some()
    }

    /// Special marker for this component.
    pub fn special_name(&self) -> SpecialName
    {
        self.special
    }

    /// Canonical string form used as an index key: the plain name followed by
    /// canonicalized template arguments when a list is present. Special
    /// markers render in their `$`-prefixed form.
    pub fn canonical_name(&self) -> String
    {
        match self.special {
            SpecialName::None | SpecialName::Escaped => {}
            SpecialName::Main => return "$main".to_string(),
            SpecialName::Plt => return format!("$plt({})", self.name),
            SpecialName::Elf => return format!("$elf({})", self.name),
            SpecialName::AnonymousNamespace => return "$anon".to_string(),
            SpecialName::Register => return format!("$reg({})", self.name),
        }

        match &self.template_args {
            Some(args) => format!("{}<{}>", self.name, args.join(", ")),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for IdentifierComponent
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.canonical_name())
    }
}

/// Whether an identifier is anchored at the global scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualification
{
    /// Leading `::`: resolution starts at the global scope.
    Global,
    /// No anchor: resolution walks outward from the current scope.
    Relative,
}

/// A qualified, possibly-templated name.
///
/// The empty relative identifier is the canonical "no identifier" value. A
/// global-qualified identifier with zero components names the global scope
/// itself; the two are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier
{
    qualification: Qualification,
    components: Vec<IdentifierComponent>,
}

impl Default for Identifier
{
    fn default() -> Self
    {
        Self::empty()
    }
}

impl Identifier
{
    /// The canonical empty ("no identifier") value.
    pub fn empty() -> Self
    {
        Self {
            qualification: Qualification::Relative,
            components: Vec::new(),
        }
    }

    /// The global scope itself (`::` with no components).
    pub fn global_scope() -> Self
    {
        Self {
            qualification: Qualification::Global,
            components: Vec::new(),
        }
    }

    /// Create an identifier from parts.
    pub fn new(qualification: Qualification, components: Vec<IdentifierComponent>) -> Self
    {
        Self {
            qualification,
            components,
        }
    }

    /// Single-component relative identifier.
    pub fn from_component(component: IdentifierComponent) -> Self
    {
        Self {
            qualification: Qualification::Relative,
            components: vec![component],
        }
    }

    /// Split a source-form qualified name (`a::b<c, d>::e`) into components.
    ///
    /// `::` separators inside template-argument brackets do not split. A
    /// leading `::` produces a global-qualified identifier. This is a helper
    /// for index construction and tests, not an expression parser: special
    /// `$`-markers are built programmatically, never parsed.
    pub fn parse(text: &str) -> Self
    {
        let (qualification, mut rest) = match text.strip_prefix("::") {
            Some(stripped) => (Qualification::Global, stripped),
            None => (Qualification::Relative, text),
        };

        let mut components = Vec::new();
        while !rest.is_empty() {
            let (piece, remainder) = split_leading_component(rest);
            components.push(parse_component(piece));
            rest = remainder;
        }

        Self {
            qualification,
            components,
        }
    }

    /// Whether this is the canonical empty value.
    pub fn is_empty(&self) -> bool
    {
        self.components.is_empty() && self.qualification == Qualification::Relative
    }

    pub fn qualification(&self) -> Qualification
    {
        self.qualification
    }

    pub fn components(&self) -> &[IdentifierComponent]
    {
        &self.components
    }

    /// Last component, if any.
    pub fn last_component(&self) -> Option<&IdentifierComponent>
    {
        self.components.last()
    }

    /// Append a component, preserving qualification.
    pub fn push(&mut self, component: IdentifierComponent)
    {
        self.components.push(component);
    }

    /// A copy with `component` appended.
    pub fn child(&self, component: IdentifierComponent) -> Self
    {
        let mut result = self.clone();
        result.push(component);
        result
    }

    /// All components but the last, preserving qualification.
    ///
    /// The scope of a single global name is the bare global qualifier; the
    /// scope of a single relative name is the empty identifier.
    pub fn scope(&self) -> Self
    {
        let take = self.components.len().saturating_sub(1);
        Self {
            qualification: self.qualification,
            components: self.components[..take].to_vec(),
        }
    }

    /// True if any component is a register reference.
    pub fn has_register_component(&self) -> bool
    {
        self.components.iter().any(|c| c.special_name() == SpecialName::Register)
    }

    /// If this identifier is a single module-symbol-only marker (`$main`,
    /// `$plt(x)`, `$elf(x)`), return that component.
    pub fn as_module_symbol_marker(&self) -> Option<&IdentifierComponent>
    {
        if self.components.len() != 1 {
            return None;
        }
        let component = &self.components[0];
        match component.special_name() {
            SpecialName::Main | SpecialName::Plt | SpecialName::Elf => Some(component),
            _ => None,
        }
    }

    /// Unambiguous rendering used as a test oracle: every component is quoted
    /// and every scope boundary is explicit, so `a::b` and a single component
    /// literally named `"a::b"` render differently.
    pub fn debug_name(&self) -> String
    {
        let mut out = String::new();
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 || self.qualification == Qualification::Global {
                out.push_str("::");
            }
            out.push('"');
            out.push_str(&component.canonical_name());
            out.push('"');
        }
        if self.components.is_empty() && self.qualification == Qualification::Global {
            out.push_str("::");
        }
        out
    }
}

impl fmt::Display for Identifier
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.qualification == Qualification::Global {
            write!(f, "::")?;
        }
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, "::")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

/// Split `text` at the first `::` that is not inside template brackets.
fn split_leading_component(text: &str) -> (&str, &str)
{
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                return (&text[..i], &text[i + 2..]);
            }
            _ => {}
        }
        i += 1;
    }
    (text, "")
}

/// Parse one component, splitting off a top-level template-argument list.
fn parse_component(piece: &str) -> IdentifierComponent
{
    let Some(open) = piece.find('<') else {
        return IdentifierComponent::new(piece.trim());
    };
    if !piece.ends_with('>') {
        // Mismatched brackets; take the text literally rather than guessing.
        return IdentifierComponent::new(piece.trim());
    }

    let name = piece[..open].trim();
    let inner = &piece[open + 1..piece.len() - 1];
    if inner.trim().is_empty() {
        return IdentifierComponent::with_template_args(name, Vec::new());
    }

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, b) in inner.bytes().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                args.push(inner[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(inner[start..].trim().to_string());
    IdentifierComponent::with_template_args(name, args)
}
